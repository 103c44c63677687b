//! Pattern parser — compiles naming-pattern text into ordered segments.
//!
//! A pattern is a comma-separated list of clauses, each holding exactly one
//! placeholder token:
//!
//! ```text
//! eth{n}                 → eth1, eth2, eth3, ...
//! ge-0/0/{n:0}           → ge-0/0/0, ge-0/0/1, ...
//! Ethernet{n:1-48},Up{n} → Ethernet1 .. Ethernet48, Up1, Up2, ...
//! ```
//!
//! Parsing never fails: empty or malformed text compiles to [`DEFAULT_PATTERN`].

use serde::Serialize;

/// Pattern text substituted whenever a pattern is absent or unusable.
pub use portname_config::DEFAULT_PATTERN;

/// Opening of the placeholder token.
const TOKEN_OPEN: &str = "{n";

/// Largest start or end a clause may declare. Clauses past it are dropped.
pub const MAX_BOUND: usize = u32::MAX as usize;

/// One clause of a pattern: `prefix{n:start-end}suffix`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Segment {
    pub prefix: String,
    pub suffix: String,
    /// First value rendered by this segment.
    pub start: usize,
    /// Last value of a closed range. `None` means unbounded.
    pub end: Option<usize>,
}

impl Segment {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>, start: usize, end: Option<usize>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            start,
            end: end.map(|e| e.max(start)),
        }
    }

    /// Number of offsets this segment covers, `None` when unbounded.
    #[inline]
    pub fn len(&self) -> Option<usize> {
        self.end.map(|end| end.saturating_sub(self.start).saturating_add(1))
    }

    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.end.is_some()
    }

    /// Render `value` with this segment's literals.
    #[inline]
    pub fn render(&self, value: usize) -> String {
        format!("{}{}{}", self.prefix, value, self.suffix)
    }

    /// Literal-anchored match: exact prefix, exact suffix, digits in between.
    ///
    /// Returns the numeric middle without checking it against `start`/`end`.
    pub fn matcher(&self, name: &str) -> Option<usize> {
        let middle = name
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())?;
        if middle.is_empty() || !middle.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        middle.parse().ok()
    }
}

/// A compiled naming pattern. Never empty.
#[derive(Clone, Debug, Serialize)]
pub struct PatternSpec {
    original: String,
    segments: Vec<Segment>,
}

impl PatternSpec {
    /// The source text this spec was compiled from (diagnostics only).
    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The pattern used when nothing else applies (`eth{n}`).
    pub fn fallback(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            segments: vec![Segment::new("eth", "", 1, None)],
        }
    }

    /// Last segment. Exists because `segments` is never empty.
    #[inline]
    pub(crate) fn last(&self) -> &Segment {
        &self.segments[self.segments.len() - 1]
    }
}

impl Default for PatternSpec {
    fn default() -> Self {
        Self::fallback(DEFAULT_PATTERN)
    }
}

/// Two specs are equal when they render the same names.
impl PartialEq for PatternSpec {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for PatternSpec {}

impl std::fmt::Display for PatternSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.original)
    }
}

/// Compile pattern text. Absent, empty or malformed text yields the default.
pub fn parse_pattern(text: Option<&str>) -> PatternSpec {
    let Some(text) = text else {
        tracing::debug!("no pattern supplied, using default {DEFAULT_PATTERN}");
        return PatternSpec::default();
    };

    let segments: Vec<Segment> = text.split(',').filter_map(parse_clause).collect();

    if segments.is_empty() {
        tracing::debug!(pattern = text, "pattern has no usable clause, using default {DEFAULT_PATTERN}");
        return PatternSpec::fallback(text);
    }

    PatternSpec {
        original: text.to_string(),
        segments,
    }
}

/// Parse one clause. `None` drops the clause.
fn parse_clause(clause: &str) -> Option<Segment> {
    let clause = clause.trim();
    let open = clause.find(TOKEN_OPEN)?;
    let prefix = &clause[..open];
    let rest = &clause[open + TOKEN_OPEN.len()..];
    let close = rest.find('}')?;
    let (start, end) = parse_range(&rest[..close])?;
    let suffix = &rest[close + 1..];

    // Exactly one placeholder per clause.
    if suffix.contains(TOKEN_OPEN) {
        return None;
    }

    Some(Segment::new(prefix, suffix, start, end))
}

/// Parse the inside of the token after `{n`: empty, `:S` or `:S-E`.
fn parse_range(body: &str) -> Option<(usize, Option<usize>)> {
    if body.is_empty() {
        return Some((1, None));
    }
    let range = body.strip_prefix(':')?;
    match range.split_once('-') {
        None => Some((parse_number(range)?, None)),
        Some((start, end)) => {
            let start = parse_number(start)?;
            let end = parse_number(end)?;
            Some((start, Some(end.max(start))))
        }
    }
}

fn parse_number(s: &str) -> Option<usize> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().filter(|&n| n <= MAX_BOUND)
}
