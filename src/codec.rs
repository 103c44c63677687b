//! Name/index codec — offset ↔ rendered name under a [`PatternSpec`].
//!
//! Offsets are laid out segment after segment:
//!
//! ```text
//! pattern  eth{n:1-2},ethx{n}
//! offset   0     1     2      3      4
//! name     eth1  eth2  ethx1  ethx2  ethx3
//! ```
//!
//! When every segment is bounded, offsets past the declared ranges keep
//! counting in the last segment from `end + 1`.

use crate::pattern::PatternSpec;

/// Offset → name. Total for every offset.
pub fn name_for_offset(spec: &PatternSpec, offset: usize) -> String {
    let mut remaining = offset;
    for segment in spec.segments() {
        match segment.len() {
            None => return segment.render(segment.start.saturating_add(remaining)),
            Some(len) if remaining < len => return segment.render(segment.start + remaining),
            Some(len) => remaining -= len,
        }
    }

    // Past every bounded range: keep counting in the last segment.
    let last = spec.last();
    let rebased = last.end.map_or(last.start, |end| end.saturating_add(1));
    last.render(rebased.saturating_add(remaining))
}

/// Name → offset. `None` when the name was not produced by this pattern.
pub fn offset_for_name(spec: &PatternSpec, name: &str) -> Option<usize> {
    let segments = spec.segments();
    let last_idx = segments.len() - 1;
    let mut base = 0usize;

    for (idx, segment) in segments.iter().enumerate() {
        if let Some(value) = segment.matcher(name)
            && value >= segment.start
        {
            let in_range = match segment.end {
                Some(end) if idx != last_idx => value <= end,
                _ => true,
            };
            if in_range {
                // Hand-edited names can carry numbers no offset reaches.
                return base.checked_add(value - segment.start);
            }
        }

        match segment.len() {
            Some(len) => base = base.checked_add(len)?,
            // Nothing after an unbounded segment is ever rendered.
            None => return None,
        }
    }

    None
}

impl PatternSpec {
    /// See [`name_for_offset`].
    #[inline]
    pub fn name_for(&self, offset: usize) -> String {
        name_for_offset(self, offset)
    }

    /// See [`offset_for_name`].
    #[inline]
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        offset_for_name(self, name)
    }
}
