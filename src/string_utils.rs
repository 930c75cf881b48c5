//! UTF-8 safe offset helpers
//!
//! Text positions inside the surface are byte offsets. Callers (a UI, a
//! test, a stale captured range) can hand us any byte index, so every split
//! goes through `floor_char_boundary` first.

/// Returns the largest index `<= index` that lies on a UTF-8 character boundary.
///
/// Indices past the end clamp to `s.len()`.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_char_boundary() {
        let s = "Hei på deg"; // 'å' is 2 bytes at 5..7
        assert_eq!(floor_char_boundary(s, 5), 5);
        assert_eq!(floor_char_boundary(s, 6), 5);
        assert_eq!(floor_char_boundary(s, 7), 7);
        assert_eq!(floor_char_boundary(s, 100), s.len());
    }

    #[test]
    fn test_floor_char_boundary_emoji() {
        let s = "a🎉b"; // emoji is 4 bytes at 1..5
        for i in 1..5 {
            assert_eq!(floor_char_boundary(s, i), 1);
        }
        assert_eq!(floor_char_boundary(s, 5), 5);
    }
}
