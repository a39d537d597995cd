//! Sort key normalisation for requirement IDs.
//!
//! Converts export IDs (e.g., "2", "2a", "10b", "6a(1)", "5b Opt B") into
//! lexicographically-sortable strings so that sorting by key recovers
//! outline order: "9" before "10", "2" before "2a", "2a" before "2a(1)".
//!
//! # Export ID conventions
//!
//! - Plain numeric: main requirement 1, 2, ..., 12
//! - Letter suffix: sub-requirement 2a, 2b (sometimes bracketed: 2[a], 2(a))
//! - Numeric sub-index: 6a(1), 6a(2)
//! - Trailing option name: 6a avian, 5b Opt B

/// Normalise a requirement ID into a lexicographically-sortable string.
///
/// Input: ID like "2", "2a", "10b", "6a(1)", "5b Opt B"
/// Output: "002.000.000", "002.001.000", "010.002.000", "006.001.001", "005.002.000 opt b"
///
/// # Algorithm
///
/// 1. Extract leading ASCII digits → main number (zero-padded to 3 digits)
/// 2. Skip brackets, take one letter → letter index (a=001, b=002, ...)
/// 3. Skip brackets, take digits → sub-index
/// 4. Whatever remains, trimmed and lowercased, is appended after a space
pub fn requirement_sort_key(id: &str) -> String {
    let s = id.trim();
    if s.is_empty() {
        return "000.000.000".to_string();
    }

    let lower = s.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut i = 0;

    let main = take_number(bytes, &mut i);

    skip_brackets(bytes, &mut i);
    let letter = match bytes.get(i) {
        Some(b) if b.is_ascii_lowercase() && !continues_word(bytes, i + 1) => {
            i += 1;
            (b - b'a') as u32 + 1
        }
        _ => 0,
    };

    skip_brackets(bytes, &mut i);
    let sub = if letter > 0 { take_number(bytes, &mut i) } else { 0 };
    skip_brackets(bytes, &mut i);

    let rest = lower[i..].trim();
    let key = format!("{:03}.{:03}.{:03}", main, letter, sub);
    if rest.is_empty() {
        key
    } else {
        format!("{key} {rest}")
    }
}

fn take_number(bytes: &[u8], i: &mut usize) -> u32 {
    let start = *i;
    while *i < bytes.len() && bytes[*i].is_ascii_digit() {
        *i += 1;
    }
    std::str::from_utf8(&bytes[start..*i])
        .ok()
        .and_then(|d| d.parse().ok())
        .unwrap_or(0)
}

fn skip_brackets(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && matches!(bytes[*i], b'(' | b')' | b'[' | b']') {
        *i += 1;
    }
}

/// A letter followed by more letters is a word ("opt"), not a suffix.
fn continues_word(bytes: &[u8], i: usize) -> bool {
    bytes.get(i).is_some_and(|b| b.is_ascii_lowercase())
}
