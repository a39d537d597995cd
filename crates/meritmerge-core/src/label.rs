//! Display-label classification.
//!
//! Scraped labels come in a handful of shapes: bare main numbers (`"4"`),
//! lettered sub-requirements (`"(a)"`, `"b."`), numbered sub-items
//! (`"(1)"`), and composites that carry the full path (`"2a"`,
//! `"6b(2)"`). Option headers have no label at all.

use std::sync::OnceLock;

use regex::Regex;

/// Main requirement numbers above this are treated as sub-item indices.
pub const MAX_MAIN_NUMBER: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// No label: option and section headers.
    Empty,
    /// `"4"`, `"4."`
    MainNumber(u32),
    /// `"(a)"`, `"a"`, `"a."`, `"a)"`
    Letter(char),
    /// `"(1)"`, `"1)"`
    SubIndex(u32),
    /// `"2a"`, `"2(a)"`, `"6b(2)"`
    Composite {
        main: u32,
        letter: char,
        sub: Option<u32>,
    },
    /// Anything else.
    Other,
}

impl LabelKind {
    /// Outline depth band: 0 main, 1 option header, 2 lettered, 3 numbered sub-item.
    pub fn level(&self) -> Option<u8> {
        match self {
            Self::Empty => Some(1),
            Self::MainNumber(n) if *n <= MAX_MAIN_NUMBER => Some(0),
            Self::MainNumber(_) => Some(3),
            Self::Letter(_) => Some(2),
            Self::SubIndex(_) => Some(3),
            Self::Composite { sub: None, .. } => Some(2),
            Self::Composite { sub: Some(_), .. } => Some(3),
            Self::Other => None,
        }
    }

    pub fn is_main_number(&self) -> bool {
        matches!(self, Self::MainNumber(_))
    }
}

fn composite_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,3})\s*[(\[]?([a-z])[)\]]?(?:\s*[(\[](\d{1,2})[)\]])?\.?$")
            .expect("composite label regex must compile")
    })
}

/// Classify a scraped display label.
pub fn classify(label: &str) -> LabelKind {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return LabelKind::Empty;
    }
    let lower = trimmed.to_ascii_lowercase();

    let bare = lower.strip_suffix('.').unwrap_or(&lower);
    if !bare.is_empty() && bare.bytes().all(|b| b.is_ascii_digit()) {
        return bare
            .parse()
            .map(LabelKind::MainNumber)
            .unwrap_or(LabelKind::Other);
    }

    let inner = unwrap_marker(&lower);
    if inner.len() == 1 {
        let ch = inner.as_bytes()[0];
        if ch.is_ascii_lowercase() {
            return LabelKind::Letter(ch as char);
        }
    }
    if inner != bare && !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
        return inner
            .parse()
            .map(LabelKind::SubIndex)
            .unwrap_or(LabelKind::Other);
    }

    if let Some(caps) = composite_re().captures(&lower) {
        let main = caps[1].parse().ok();
        let letter = caps[2].chars().next();
        let sub = caps.get(3).and_then(|m| m.as_str().parse().ok());
        if let (Some(main), Some(letter)) = (main, letter) {
            return LabelKind::Composite { main, letter, sub };
        }
    }

    LabelKind::Other
}

/// Strip list-marker punctuation: `"(a)"` → `"a"`, `"a)"` → `"a"`, `"a."` → `"a"`.
fn unwrap_marker(s: &str) -> &str {
    let s = s.strip_suffix('.').unwrap_or(s);
    let s = s.strip_prefix('(').unwrap_or(s);
    s.strip_suffix(')').unwrap_or(s)
}

/// Whether a label is a bare main requirement number (`"4"`, `"4."`).
pub fn is_main_number(label: &str) -> bool {
    classify(label).is_main_number()
}
