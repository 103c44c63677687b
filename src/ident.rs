//! Entity identifier allocator — process-wide unique node ids.
//!
//! Used when nodes are duplicated, pasted or renamed. The suffixing rule
//! depends on the shape of the base name and on the entity's category:
//!
//! ```text
//! dummy, {dummy1}                → dummy2      (dummy-style)
//! host:eth3, {host:eth3}         → host:eth4   (adapter-style)
//! cloud7, {}  [external]         → cloud1      (external)
//! spine2:1, {spine2:1}  [group]  → spine3:1    (group marker)
//! router2, {router1, router2}    → router3     (plain)
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Literal base of dummy-style names.
const DUMMY: &str = "dummy";

/// Marker every grouped entity id ends with.
pub const GROUP_MARKER: &str = ":1";

/// Entity category driving the identifier suffixing rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    #[default]
    Plain,
    Group,
    /// Special/externally-named entities (clouds, NAT, bridges, ...).
    External,
    /// `kind:adapter` style ids.
    Adapter,
}

impl EntityCategory {
    /// Classify a name the way hosts without an explicit tag do: by its
    /// shape and a list of special external kind prefixes.
    pub fn infer(name: &str, is_group: bool, external_prefixes: &[String]) -> Self {
        if is_group {
            Self::Group
        } else if let Some((_, label)) = name.split_once(':') {
            match split_trailing_digits(label) {
                (_, Some(_)) => Self::Adapter,
                _ => Self::External,
            }
        } else if external_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && name.starts_with(prefix.as_str()))
        {
            Self::External
        } else {
            Self::Plain
        }
    }
}

/// Split `s` into its leading text and trailing run of decimal digits.
///
/// The run is kept as text, so suffixes wider than any integer type still
/// split cleanly.
///
/// ```text
/// "router12" → ("router", Some("12"))
/// "router"   → ("router", None)
/// "42"       → ("", Some("42"))
/// ```
pub fn split_trailing_digits(s: &str) -> (&str, Option<&str>) {
    let cut = s.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if cut == s.len() {
        (s, None)
    } else {
        (&s[..cut], Some(&s[cut..]))
    }
}

/// Fresh identifier derived from `base`, never contained in `used`.
pub fn unique_id(base: &str, used: &HashSet<String>, category: EntityCategory) -> String {
    let id = match Rule::select(base, category) {
        Rule::Dummy(start) => probe(start, used, |n| format!("{DUMMY}{n}")),
        Rule::Adapter { kind, label } => {
            let (alpha, digits) = split_trailing_digits(label);
            match digits {
                Some(start) => probe(start, used, |n| format!("{kind}:{alpha}{n}")),
                None => probe("1", used, |n| format!("{kind}:{label}{n}")),
            }
        }
        Rule::External => {
            let (alpha, _) = split_trailing_digits(base);
            probe("1", used, |n| format!("{alpha}{n}"))
        }
        Rule::Group => {
            let stem = base.strip_suffix(GROUP_MARKER).unwrap_or(base);
            let (alpha, digits) = split_trailing_digits(stem);
            probe(digits.unwrap_or("1"), used, |n| format!("{alpha}{n}{GROUP_MARKER}"))
        }
        Rule::Plain => match split_trailing_digits(base) {
            (alpha, Some(start)) => probe(start, used, |n| format!("{alpha}{n}")),
            (_, None) => probe("1", used, |n| format!("{base}{n}")),
        },
    };
    tracing::debug!(base, ?category, id = %id, "minted entity id");
    id
}

/// Suffixing rule after shape checks.
#[derive(Debug, PartialEq, Eq)]
enum Rule<'a> {
    Dummy(&'a str),
    Adapter { kind: &'a str, label: &'a str },
    External,
    Group,
    Plain,
}

impl<'a> Rule<'a> {
    fn select(base: &'a str, category: EntityCategory) -> Self {
        if let Some(rest) = base.strip_prefix(DUMMY)
            && rest.bytes().all(|b| b.is_ascii_digit())
        {
            return Self::Dummy(if rest.is_empty() { "1" } else { rest });
        }

        if let Some((kind, label)) = base.split_once(':') {
            let numbered = split_trailing_digits(label).1.is_some();
            if category == EntityCategory::Adapter || (numbered && category != EntityCategory::Group) {
                return Self::Adapter { kind, label };
            }
            if category != EntityCategory::Group {
                return Self::External;
            }
        }

        match category {
            EntityCategory::External => Self::External,
            EntityCategory::Group => Self::Group,
            EntityCategory::Plain | EntityCategory::Adapter => Self::Plain,
        }
    }
}

/// First `render(n)` for `n = start, start + 1, ...` not in `used`.
fn probe(start: &str, used: &HashSet<String>, render: impl Fn(&str) -> String) -> String {
    let mut n = canonical(start).to_string();
    loop {
        let candidate = render(&n);
        if !used.contains(&candidate) {
            return candidate;
        }
        n = increment(&n);
    }
}

/// `digits` without leading zeros.
fn canonical(digits: &str) -> &str {
    match digits.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    }
}

/// Decimal successor of a digit string, at any width.
fn increment(digits: &str) -> String {
    let digits = canonical(digits);
    let kept = digits.trim_end_matches('9');
    let carried = digits.len() - kept.len();
    let head = match kept.as_bytes().last() {
        Some(&last) => format!("{}{}", &kept[..kept.len() - 1], char::from(last + 1)),
        None => "1".to_string(),
    };
    head + &"0".repeat(carried)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn split_trailing_digits_cases() {
        assert_eq!(split_trailing_digits("router12"), ("router", Some("12")));
        assert_eq!(split_trailing_digits("router"), ("router", None));
        assert_eq!(split_trailing_digits("42"), ("", Some("42")));
        assert_eq!(split_trailing_digits(""), ("", None));
        assert_eq!(split_trailing_digits("r2d2"), ("r2d", Some("2")));
        assert_eq!(
            split_trailing_digits("r99999999999999999999"),
            ("r", Some("99999999999999999999"))
        );
    }

    #[test]
    fn increment_carries_at_any_width() {
        assert_eq!(increment("0"), "1");
        assert_eq!(increment("9"), "10");
        assert_eq!(increment("129"), "130");
        assert_eq!(increment("007"), "8");
        assert_eq!(increment("18446744073709551615"), "18446744073709551616");
        assert_eq!(increment("99999999999999999999"), "100000000000000000000");
    }

    #[test]
    fn oversized_suffixes_keep_counting() {
        let max = u64::MAX.to_string();
        let base = format!("r{max}");
        assert_eq!(unique_id(&base, &used(&[base.as_str()]), EntityCategory::Plain), "r18446744073709551616");

        let wide = "r99999999999999999999";
        assert_eq!(unique_id(wide, &used(&[wide]), EntityCategory::Plain), "r100000000000000000000");

        let group = format!("spine{max}:1");
        assert_eq!(
            unique_id(&group, &used(&[group.as_str()]), EntityCategory::Group),
            "spine18446744073709551616:1"
        );
        let dummy = format!("dummy{max}");
        assert_eq!(unique_id(&dummy, &used(&[dummy.as_str()]), EntityCategory::Plain), "dummy18446744073709551616");
    }

    #[test]
    fn plain_increments_numeric_suffix() {
        assert_eq!(unique_id("router2", &used(&["router1", "router2"]), EntityCategory::Plain), "router3");
        assert_eq!(unique_id("router", &used(&["router"]), EntityCategory::Plain), "router1");
        assert_eq!(unique_id("router", &used(&["router", "router1"]), EntityCategory::Plain), "router2");
        // An unused numbered base comes back as is.
        assert_eq!(unique_id("router7", &used(&["router1"]), EntityCategory::Plain), "router7");
    }

    #[test]
    fn dummy_probes_from_parsed_digits() {
        assert_eq!(unique_id("dummy", &used(&["dummy1"]), EntityCategory::Plain), "dummy2");
        assert_eq!(unique_id("dummy", &used(&[]), EntityCategory::Plain), "dummy1");
        assert_eq!(unique_id("dummy4", &used(&["dummy4", "dummy5"]), EntityCategory::Group), "dummy6");
    }

    #[test]
    fn adapter_increments_label_number_only() {
        assert_eq!(unique_id("host:eth3", &used(&["host:eth3"]), EntityCategory::Adapter), "host:eth4");
        assert_eq!(
            unique_id("host2:eth3", &used(&["host2:eth3", "host2:eth4"]), EntityCategory::Plain),
            "host2:eth5"
        );
        assert_eq!(unique_id("host:mgmt", &used(&["host:mgmt1"]), EntityCategory::Adapter), "host:mgmt2");
    }

    #[test]
    fn external_restarts_numbering_at_one() {
        assert_eq!(unique_id("cloud7", &used(&[]), EntityCategory::External), "cloud1");
        assert_eq!(unique_id("cloud", &used(&["cloud1", "cloud2"]), EntityCategory::External), "cloud3");
        assert_eq!(unique_id("nat:wan", &used(&["nat:wan1"]), EntityCategory::Plain), "nat:wan2");
    }

    #[test]
    fn group_always_carries_marker() {
        assert_eq!(unique_id("spine", &used(&[]), EntityCategory::Group), "spine1:1");
        assert_eq!(unique_id("spine2:1", &used(&["spine2:1"]), EntityCategory::Group), "spine3:1");
        assert_eq!(unique_id("leaf", &used(&["leaf1:1", "leaf2:1"]), EntityCategory::Group), "leaf3:1");
    }

    #[test]
    fn never_returns_a_used_id() {
        let taken = used(&["r1", "r2", "r3", "dummy1", "x:eth1", "g1:1"]);
        for (base, category) in [
            ("r1", EntityCategory::Plain),
            ("r", EntityCategory::Plain),
            ("dummy1", EntityCategory::Plain),
            ("x:eth1", EntityCategory::Adapter),
            ("g", EntityCategory::Group),
            ("r", EntityCategory::External),
        ] {
            assert!(!taken.contains(&unique_id(base, &taken, category)), "{base}");
        }
    }

    #[test]
    fn infer_category_from_shape() {
        let external = vec!["cloud".to_string(), "nat".to_string()];
        assert_eq!(EntityCategory::infer("router1", false, &external), EntityCategory::Plain);
        assert_eq!(EntityCategory::infer("router1", true, &external), EntityCategory::Group);
        assert_eq!(EntityCategory::infer("host:eth3", false, &external), EntityCategory::Adapter);
        assert_eq!(EntityCategory::infer("host:mgmt", false, &external), EntityCategory::External);
        assert_eq!(EntityCategory::infer("cloud2", false, &external), EntityCategory::External);
    }

    #[test]
    fn category_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&EntityCategory::External).unwrap(), "\"external\"");
        let parsed: EntityCategory = serde_json::from_str("\"adapter\"").unwrap();
        assert_eq!(parsed, EntityCategory::Adapter);
    }
}
