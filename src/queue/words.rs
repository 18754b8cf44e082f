//! Word spans over a per-unit whitespace map.
//!
//! A word is a maximal run of non-whitespace units. Line breaks are
//! whitespace. All functions take the map produced by
//! [`SegmentBuffer::whitespace_map`](crate::buffer::SegmentBuffer::whitespace_map).

/// Number of tail units `DeleteWords(count)` removes.
///
/// Trailing whitespace goes first, then `count` words together with the
/// whitespace between them. Whitespace before the last counted word stays.
pub fn trailing_delete_span(ws: &[bool], count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let mut i = ws.len();
    while i > 0 && ws[i - 1] {
        i -= 1;
    }

    let mut words = 0;
    while i > 0 {
        while i > 0 && !ws[i - 1] {
            i -= 1;
        }
        words += 1;
        if words == count {
            break;
        }
        let mut j = i;
        while j > 0 && ws[j - 1] {
            j -= 1;
        }
        if j == 0 {
            break;
        }
        i = j;
    }
    ws.len() - i
}

/// Unit range `(start, length)` covering the first `count` words.
pub fn leading_word_range(ws: &[bool], count: usize) -> Option<(usize, usize)> {
    let start = ws.iter().position(|w| !w)?;
    if count == 0 {
        return None;
    }
    let mut end = start;
    let mut words = 0;
    while end < ws.len() {
        while end < ws.len() && !ws[end] {
            end += 1;
        }
        words += 1;
        if words == count {
            break;
        }
        let next = ws[end..].iter().position(|w| !w);
        match next {
            Some(offset) => end += offset,
            None => break,
        }
    }
    Some((start, end - start))
}

/// Unit range `(start, length)` covering the last `count` words.
///
/// Trailing whitespace is not part of the range.
pub fn trailing_word_range(ws: &[bool], count: usize) -> Option<(usize, usize)> {
    let end = ws.iter().rposition(|w| !w)? + 1;
    if count == 0 {
        return None;
    }
    let mut start = end;
    let mut words = 0;
    while start > 0 {
        while start > 0 && !ws[start - 1] {
            start -= 1;
        }
        words += 1;
        if words == count {
            break;
        }
        match ws[..start].iter().rposition(|w| !w) {
            Some(idx) => start = idx + 1,
            None => break,
        }
    }
    Some((start, end - start))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(text: &str) -> Vec<bool> {
        text.chars().map(char::is_whitespace).collect()
    }

    #[test]
    fn test_trailing_delete_span_basic() {
        assert_eq!(trailing_delete_span(&map("hello big world"), 1), 5);
        assert_eq!(trailing_delete_span(&map("hello big world"), 2), 9);
        assert_eq!(trailing_delete_span(&map("hello big world"), 0), 0);
    }

    #[test]
    fn test_trailing_delete_span_trailing_whitespace() {
        // "world  " -> trailing spaces plus the word, leading space kept
        assert_eq!(trailing_delete_span(&map("hello world  "), 1), 7);
    }

    #[test]
    fn test_trailing_delete_span_more_than_available() {
        assert_eq!(trailing_delete_span(&map("  one two"), 5), 7);
        assert_eq!(trailing_delete_span(&map("   "), 1), 3);
        assert_eq!(trailing_delete_span(&[], 3), 0);
    }

    #[test]
    fn test_trailing_delete_span_multiple_spaces() {
        assert_eq!(trailing_delete_span(&map("a   b"), 2), 5);
    }

    #[test]
    fn test_leading_word_range() {
        assert_eq!(leading_word_range(&map("  one two three"), 2), Some((2, 7)));
        assert_eq!(leading_word_range(&map("one"), 4), Some((0, 3)));
        assert_eq!(leading_word_range(&map("   "), 1), None);
        assert_eq!(leading_word_range(&map("one"), 0), None);
    }

    #[test]
    fn test_trailing_word_range() {
        assert_eq!(trailing_word_range(&map("one two three  "), 2), Some((4, 9)));
        assert_eq!(trailing_word_range(&map("one"), 3), Some((0, 3)));
        assert_eq!(trailing_word_range(&map(""), 1), None);
    }
}
