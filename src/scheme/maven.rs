//! Maven versions and version ranges
//!
//! Ordering follows Maven's `ComparableVersion`:
//! - the string is split on `.`, `-` and digit/letter transitions
//! - `-` and transitions open a nested list, so `1-1` < `1.1`
//! - qualifiers order `alpha < beta < milestone < rc = cr < snapshot < "" = ga = final = release < sp`
//! - unknown qualifiers sort after `sp`, lexically among themselves
//! - trailing zero and release items are dropped, so `1.0 == 1`
//!
//! Requirements are either a soft version (`1.0`) or hard ranges
//! (`[1.0,2.0)`, `(,1.5]`, `[1.0]`, `[1,2),[3,4)`).

use super::{RequirementScheme, VersionScheme};
use crate::domain::Ecosystem;
use crate::error::VersionError;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

/// Segment value used when rendering an exclusive upper bound as the
/// largest version strictly below it (`(,2.0)` displays as `<= 1.999999`)
pub const UPPER_BOUND_SENTINEL: u64 = 999_999;

static VALID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z][0-9A-Za-z._+\-]*$").unwrap());

const QUALIFIERS: [&str; 7] = ["alpha", "beta", "milestone", "rc", "snapshot", "", "sp"];
const RELEASE_INDEX: &str = "5";

const PRERELEASE_MARKERS: [&str; 9] = [
    "alpha",
    "beta",
    "milestone",
    "rc",
    "cr",
    "snapshot",
    "preview",
    "dev",
    "ea",
];

#[derive(Debug, Clone)]
enum Item {
    /// Digits with leading zeros stripped, compared by length then lexically
    Int(String),
    Str(String),
    List(Vec<Item>),
}

impl Item {
    fn int(digits: &str) -> Self {
        let stripped = digits.trim_start_matches('0');
        Item::Int(stripped.to_string())
    }

    fn string(value: &str, followed_by_digit: bool) -> Self {
        let value = if followed_by_digit && value.len() == 1 {
            match value {
                "a" => "alpha",
                "b" => "beta",
                "m" => "milestone",
                other => other,
            }
        } else {
            value
        };
        let value = match value {
            "ga" | "final" | "release" => "",
            "cr" => "rc",
            other => other,
        };
        Item::Str(value.to_string())
    }

    fn is_null(&self) -> bool {
        match self {
            Item::Int(digits) => digits.is_empty(),
            Item::Str(value) => comparable_qualifier(value) == RELEASE_INDEX,
            Item::List(items) => items.is_empty(),
        }
    }

    /// Compares against another item, `None` standing for a missing item
    fn compare(&self, other: Option<&Item>) -> Ordering {
        match (self, other) {
            (Item::Int(digits), None) => {
                if digits.is_empty() {
                    Ordering::Equal
                } else {
                    Ordering::Greater
                }
            }
            (Item::Int(a), Some(Item::Int(b))) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Item::Int(_), Some(_)) => Ordering::Greater,

            (Item::Str(value), None) => {
                comparable_qualifier(value).cmp(&RELEASE_INDEX.to_string())
            }
            (Item::Str(_), Some(Item::Int(_))) => Ordering::Less,
            (Item::Str(a), Some(Item::Str(b))) => {
                comparable_qualifier(a).cmp(&comparable_qualifier(b))
            }
            (Item::Str(_), Some(Item::List(_))) => Ordering::Less,

            (Item::List(items), None) => match items.first() {
                Some(first) => first.compare(None),
                None => Ordering::Equal,
            },
            (Item::List(_), Some(Item::Int(_))) => Ordering::Less,
            (Item::List(_), Some(Item::Str(_))) => Ordering::Greater,
            (Item::List(a), Some(Item::List(b))) => compare_lists(a, b),
        }
    }
}

fn compare_lists(a: &[Item], b: &[Item]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let ordering = match (a.get(i), b.get(i)) {
            (Some(left), right) => left.compare(right),
            (None, Some(right)) => right.compare(None).reverse(),
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn comparable_qualifier(value: &str) -> String {
    match QUALIFIERS.iter().position(|q| *q == value) {
        Some(index) => index.to_string(),
        None => format!("{}-{}", QUALIFIERS.len(), value),
    }
}

/// Drops trailing null items, looking through non-null nested lists
fn normalize(items: &mut Vec<Item>) {
    let mut i = items.len();
    while i > 0 {
        i -= 1;
        if items[i].is_null() {
            items.remove(i);
        } else if !matches!(items[i], Item::List(_)) {
            break;
        }
    }
}

/// Builds the nested item list for a lowercased version string
fn parse_items(version: &str) -> Vec<Item> {
    // Stack of lists under construction; the last is the current one
    let mut stack: Vec<Vec<Item>> = vec![Vec::new()];
    let chars: Vec<char> = version.chars().collect();
    let mut is_digit = false;
    let mut start = 0;

    let push_item = |stack: &mut Vec<Vec<Item>>, item: Item| {
        if let Some(current) = stack.last_mut() {
            current.push(item);
        }
    };

    for i in 0..chars.len() {
        let c = chars[i];
        let token: String = chars[start..i].iter().collect();
        match c {
            '.' => {
                let item = if token.is_empty() {
                    Item::int("0")
                } else {
                    token_item(&token, is_digit, false)
                };
                push_item(&mut stack, item);
                start = i + 1;
            }
            '-' => {
                let item = if token.is_empty() {
                    Item::int("0")
                } else {
                    token_item(&token, is_digit, false)
                };
                push_item(&mut stack, item);
                start = i + 1;
                stack.push(Vec::new());
            }
            c if c.is_ascii_digit() => {
                if !is_digit && i > start {
                    push_item(&mut stack, Item::string(&token, true));
                    start = i;
                    stack.push(Vec::new());
                }
                is_digit = true;
            }
            _ => {
                if is_digit && i > start {
                    push_item(&mut stack, Item::int(&token));
                    start = i;
                    stack.push(Vec::new());
                }
                is_digit = false;
            }
        }
    }

    if chars.len() > start {
        let token: String = chars[start..].iter().collect();
        push_item(&mut stack, token_item(&token, is_digit, false));
    }

    // Fold nested lists back into their parents, normalizing each
    while stack.len() > 1 {
        let mut child = stack.pop().unwrap_or_default();
        normalize(&mut child);
        push_item(&mut stack, Item::List(child));
    }
    let mut root = stack.pop().unwrap_or_default();
    normalize(&mut root);
    root
}

fn token_item(token: &str, is_digit: bool, followed_by_digit: bool) -> Item {
    if is_digit {
        Item::int(token)
    } else {
        Item::string(token, followed_by_digit)
    }
}

/// A parsed Maven version
#[derive(Debug, Clone)]
pub struct MavenVersion {
    original: String,
    items: Vec<Item>,
}

impl MavenVersion {
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if !VALID_RE.is_match(trimmed) || !trimmed.chars().any(|c| c.is_ascii_digit()) {
            return Err(VersionError::InvalidVersion {
                version: input.to_string(),
                ecosystem: Ecosystem::Maven,
            });
        }

        Ok(Self {
            original: trimmed.to_string(),
            items: parse_items(&trimmed.to_ascii_lowercase()),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Returns true if the version carries a pre-release qualifier
    pub fn is_prerelease(&self) -> bool {
        let lower = self.original.to_ascii_lowercase();
        let chars: Vec<char> = lower.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if !chars[i].is_ascii_alphabetic() {
                i += 1;
                continue;
            }
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let followed_by_digit = chars.get(i).is_some_and(|c| c.is_ascii_digit());
            if PRERELEASE_MARKERS.contains(&word.as_str())
                || (followed_by_digit && matches!(word.as_str(), "a" | "b" | "m"))
            {
                return true;
            }
        }
        false
    }

    /// Leading numeric segments (`1.5.0-jre` gives `[1, 5, 0]`)
    fn numeric_prefix(&self) -> Vec<u64> {
        self.original
            .split(['.', '-'])
            .map_while(|segment| segment.parse::<u64>().ok())
            .collect()
    }

    /// Largest displayable version strictly below this one
    ///
    /// Decrements the last non-zero numeric segment and fills the rest with
    /// [`UPPER_BOUND_SENTINEL`]. Returns `None` below `0`.
    pub fn highest_below(&self) -> Option<String> {
        let mut segments = self.numeric_prefix();
        let index = segments.iter().rposition(|s| *s > 0)?;
        segments[index] -= 1;
        for segment in segments.iter_mut().skip(index + 1) {
            *segment = UPPER_BOUND_SENTINEL;
        }
        if segments.len() == index + 1 {
            segments.push(UPPER_BOUND_SENTINEL);
        }
        Some(
            segments
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join("."),
        )
    }
}

impl fmt::Display for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MavenVersion {}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_lists(&self.items, &other.items)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Bound {
    version: MavenVersion,
    inclusive: bool,
}

/// One bracketed interval of a hard requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl Range {
    fn contains(&self, version: &MavenVersion) -> bool {
        let above_lower = match &self.lower {
            Some(b) if b.inclusive => *version >= b.version,
            Some(b) => *version > b.version,
            None => true,
        };
        let below_upper = match &self.upper {
            Some(b) if b.inclusive => *version <= b.version,
            Some(b) => *version < b.version,
            None => true,
        };
        above_lower && below_upper
    }

    fn describe(&self) -> String {
        if let (Some(lower), Some(upper)) = (&self.lower, &self.upper) {
            if lower.inclusive && upper.inclusive && lower.version == upper.version {
                return format!("= {}", lower.version);
            }
        }

        let mut parts = Vec::new();
        if let Some(lower) = &self.lower {
            let op = if lower.inclusive { ">=" } else { ">" };
            parts.push(format!("{} {}", op, lower.version));
        }
        if let Some(upper) = &self.upper {
            if upper.inclusive {
                parts.push(format!("<= {}", upper.version));
            } else {
                match upper.version.highest_below() {
                    Some(below) => parts.push(format!("<= {}", below)),
                    None => parts.push(format!("< {}", upper.version)),
                }
            }
        }
        if parts.is_empty() {
            "any".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// A parsed Maven version requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MavenRequirement {
    /// A plain version; Maven treats it as a preference
    Soft(MavenVersion),
    /// One or more bracketed ranges, satisfied if any contains the version
    Ranges(Vec<Range>),
}

impl MavenRequirement {
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidRequirement {
            requirement: input.to_string(),
            ecosystem: Ecosystem::Maven,
        };

        let trimmed = input.trim();
        if !trimmed.starts_with(['[', '(']) {
            return MavenVersion::parse(trimmed)
                .map(MavenRequirement::Soft)
                .map_err(|_| invalid());
        }

        let mut ranges = Vec::new();
        let mut rest = trimmed;
        while !rest.is_empty() {
            let open = rest.chars().next().ok_or_else(invalid)?;
            let close_index = rest.find([']', ')']).ok_or_else(invalid)?;
            let close = rest[close_index..].chars().next().ok_or_else(invalid)?;
            let body = &rest[1..close_index];
            ranges.push(Self::parse_range(body, open == '[', close == ']').ok_or_else(invalid)?);

            rest = rest[close_index + 1..].trim_start();
            if let Some(next) = rest.strip_prefix(',') {
                rest = next.trim_start();
                if !rest.starts_with(['[', '(']) {
                    return Err(invalid());
                }
            } else if !rest.is_empty() {
                return Err(invalid());
            }
        }

        Ok(MavenRequirement::Ranges(ranges))
    }

    fn parse_range(body: &str, lower_inclusive: bool, upper_inclusive: bool) -> Option<Range> {
        let bound = |text: &str, inclusive: bool| -> Option<Option<Bound>> {
            let text = text.trim();
            if text.is_empty() {
                return Some(None);
            }
            let version = MavenVersion::parse(text).ok()?;
            Some(Some(Bound { version, inclusive }))
        };

        match body.split_once(',') {
            None => {
                // [1.0] pins exactly
                if !(lower_inclusive && upper_inclusive) {
                    return None;
                }
                let exact = bound(body, true)??;
                Some(Range {
                    lower: Some(exact.clone()),
                    upper: Some(exact),
                })
            }
            Some((low, high)) => {
                if high.contains(',') {
                    return None;
                }
                let lower = bound(low, lower_inclusive)?;
                let upper = bound(high, upper_inclusive)?;
                if let (Some(l), Some(u)) = (&lower, &upper) {
                    if l.version > u.version {
                        return None;
                    }
                }
                Some(Range { lower, upper })
            }
        }
    }

    pub fn satisfied_by(&self, version: &MavenVersion) -> bool {
        match self {
            MavenRequirement::Soft(v) => v == version,
            MavenRequirement::Ranges(ranges) => ranges.iter().any(|r| r.contains(version)),
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, MavenRequirement::Ranges(_))
    }

    pub fn describe(&self) -> String {
        match self {
            MavenRequirement::Soft(v) => format!("= {}", v),
            MavenRequirement::Ranges(ranges) => ranges
                .iter()
                .map(Range::describe)
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }
}

/// Maven version scheme
pub struct MavenVersionScheme;

impl VersionScheme for MavenVersionScheme {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    fn is_valid(&self, version: &str) -> bool {
        MavenVersion::parse(version).is_ok()
    }

    fn compare(&self, a: &str, b: &str) -> Result<Ordering, VersionError> {
        Ok(MavenVersion::parse(a)?.cmp(&MavenVersion::parse(b)?))
    }

    fn is_prerelease(&self, version: &str) -> bool {
        MavenVersion::parse(version).is_ok_and(|v| v.is_prerelease())
    }
}

/// Maven requirement scheme
pub struct MavenRequirementScheme;

impl RequirementScheme for MavenRequirementScheme {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    fn is_valid(&self, requirement: &str) -> bool {
        MavenRequirement::parse(requirement).is_ok()
    }

    fn satisfied_by(&self, requirement: &str, version: &str) -> Result<bool, VersionError> {
        let requirement = MavenRequirement::parse(requirement)?;
        Ok(requirement.satisfied_by(&MavenVersion::parse(version)?))
    }

    fn is_range(&self, requirement: &str) -> bool {
        MavenRequirement::parse(requirement).is_ok_and(|r| r.is_range())
    }

    fn describe(&self, requirement: &str) -> Result<String, VersionError> {
        Ok(MavenRequirement::parse(requirement)?.describe())
    }
}
