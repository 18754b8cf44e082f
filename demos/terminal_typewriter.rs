//! Terminal Typewriter: Drives a looping typewriter on a playback thread
//! and renders its snapshots with crossterm.
//!
//! Usage: `cargo run --example terminal_typewriter [script.toml]`
//!
//! Space pauses/resumes, Escape skips, 'r' resets, 'q' quits.
//! Logs go to stderr; set `RUST_LOG=quill=debug` and redirect with
//! `2>quill.log` to watch state transitions.

use crossbeam_channel::{select, unbounded};
use crossterm::{
    cursor,
    event::{KeyCode, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use quill::actor::InputActor;
use quill::{
    CursorStyle, HighlightStyle, PlaybackActor, PlaybackCommand, Script, Typewriter,
    TypewriterConfig, TypewriterState, WordsFrom,
};
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn build_typewriter(script: Option<&Script>) -> Result<Typewriter, Box<dyn std::error::Error>> {
    let config = TypewriterConfig {
        type_speed: Duration::from_millis(60),
        delete_speed: Duration::from_millis(25),
        loop_enabled: true,
        loop_delay: Duration::from_millis(1_200),
        cursor_color: Some("#7fdbff".into()),
        enable_keyboard_controls: true,
        max_visible_segments: Some(64),
        ..TypewriterConfig::default()
    };
    let mut tw = Typewriter::new(config)?;

    if let Some(script) = script {
        tw.enqueue_script(script);
        return Ok(tw);
    }

    tw.type_text("Hello, terminal")
        .pause_for(Duration::from_millis(600))
        .delete_words(1)
        .colorize("#ff4136")
        .type_text("world")
        .clear_color()
        .type_text("!")
        .new_line()
        .type_text("Quill types, deletes and highlights text.")
        .highlight_words(1, WordsFrom::End, HighlightStyle::new("#ffdc00").with_color("#111111"))
        .pause_for(Duration::from_millis(1_500))
        .delete_all();
    Ok(tw)
}

fn parse_hex(color: &str) -> Option<Color> {
    let hex = color.strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some(Color::Rgb {
                r: it.next()??,
                g: it.next()??,
                b: it.next()??,
            })
        }
        6 => Some(Color::Rgb {
            r: channel(&hex[0..2])?,
            g: channel(&hex[2..4])?,
            b: channel(&hex[4..6])?,
        }),
        _ => None,
    }
}

fn render(out: &mut impl Write, state: &TypewriterState) -> io::Result<()> {
    queue!(
        out,
        cursor::MoveTo(0, 0),
        Clear(ClearType::All),
        SetForegroundColor(Color::DarkGrey),
        Print("Quill Terminal Typewriter  [space] pause  [esc] skip  [r] reset  [q] quit"),
        ResetColor,
        cursor::MoveTo(0, 2),
    )?;

    for segment in state.visible_segments() {
        if segment.is_new_line {
            queue!(out, cursor::MoveToNextLine(1))?;
            continue;
        }
        let fg = segment
            .highlight
            .as_ref()
            .and_then(|h| h.color.as_deref())
            .or(segment.color.as_deref())
            .and_then(parse_hex);
        let bg = segment
            .highlight
            .as_ref()
            .and_then(|h| parse_hex(&h.background));
        if let Some(fg) = fg {
            queue!(out, SetForegroundColor(fg))?;
        }
        if let Some(bg) = bg {
            queue!(out, SetBackgroundColor(bg))?;
        }
        queue!(out, Print(&segment.text), ResetColor)?;
    }

    if state.cursor_visible() {
        let glyph = match state.cursor.style {
            CursorStyle::Block => "█",
            CursorStyle::Underline => "_",
            CursorStyle::Bar => "▏",
        };
        if let Some(color) = state.cursor.color.as_deref().and_then(parse_hex) {
            queue!(out, SetForegroundColor(color))?;
        }
        queue!(out, Print(glyph), ResetColor)?;
    }

    let status = if state.is_paused() {
        "paused"
    } else if state.is_typing() {
        "typing"
    } else {
        "idle"
    };
    let (_, height) = terminal::size()?;
    queue!(
        out,
        cursor::MoveTo(0, height.saturating_sub(1)),
        SetForegroundColor(Color::DarkGrey),
        Print(format!(
            "{status} | segments {}/{} | hidden units {}",
            state.window.visible_segments, state.window.total_segments, state.window.hidden_units
        )),
        ResetColor,
    )?;
    out.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let script = std::env::args().nth(1).map(Script::load).transpose()?;
    let typewriter = build_typewriter(script.as_ref())?;

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let playback = PlaybackActor::spawn(typewriter)?;
    let (key_tx, key_rx) = unbounded();
    let input = InputActor::spawn(key_tx, Duration::from_millis(50))?;
    playback.send(PlaybackCommand::Start);

    let result = (|| -> io::Result<()> {
        loop {
            select! {
                recv(key_rx) -> key => {
                    let Ok(key) = key else { break };
                    let quit = matches!(key.code, KeyCode::Char('q'))
                        || (key.code == KeyCode::Char('c')
                            && key.modifiers.contains(KeyModifiers::CONTROL));
                    if quit {
                        break;
                    }
                    playback.send(PlaybackCommand::Key(key));
                }
                recv(playback.states()) -> state => {
                    let Ok(state) = state else { break };
                    render(&mut stdout, &state)?;
                }
            }
        }
        Ok(())
    })();

    input.join();
    playback.join();
    execute!(stdout, cursor::Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result.map_err(Into::into)
}
