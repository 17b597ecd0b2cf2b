//! Type descriptors - the value type for program types
//!
//! A descriptor is `modifier name adjustment`, e.g. `const char*`:
//! - `name`: the core type name (`char`, `java.util.List`, `Map<K,V>`)
//! - `adjustment`: pointer/array decoration (`*`, `[]`, `*[]`, ...)
//! - `modifier`: a qualifier word (`const`, `final`, `unsigned`, ...)
//!
//! Identity is `(name, modifier, adjustment)`; `origin` only records where the
//! descriptor came from.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Name of the unknown sentinel type.
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

/// Raw type text containing one of these is treated as unknown.
const PLACEHOLDER_MARKERS: &[&str] = &["?", "ProblemType@"];

static STRUCT_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^struct ").unwrap());
static NAMESPACE_ARTIFACT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{.*\}::").unwrap());
static ARRAY_SIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[ \d]*\]").unwrap());
static SIGNATURE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*\)").unwrap());
static ONE_LEVEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\]|\*").unwrap());
static TYPE_FROM_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<modifier>[a-zA-Z]*) )?(?P<name>[a-zA-Z0-9_$.<>]*)(?P<adjustment>[\[\]*\s]*)$",
    )
    .unwrap()
});

/// Where a type came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Provided by a symbol solver
    Resolved,
    /// Inferred by following data flow
    DataflowInferred,
    /// Guessed, e.g. from imports or naming
    Guessed,
    /// Nothing is known about the type
    #[default]
    Unresolved,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Resolved => "resolved",
            Origin::DataflowInferred => "dataflow",
            Origin::Guessed => "guessed",
            Origin::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A program type.
///
/// Descriptors are minted, never mutated in place: [`reference`](Self::reference)
/// and [`dereference`](Self::dereference) return new values.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub name: String,
    pub adjustment: String,
    pub modifier: String,
    pub origin: Origin,
}

impl TypeDescriptor {
    /// Create a descriptor from already separated parts.
    pub fn new(name: impl Into<String>, adjustment: impl Into<String>, modifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            adjustment: adjustment.into(),
            modifier: modifier.into(),
            origin: Origin::Unresolved,
        }
    }

    /// The canonical unknown type.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_TYPE, "", "")
    }

    /// Set the origin
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Parse raw type text as emitted by a frontend.
    ///
    /// Never fails: text that does not look like a type becomes the name of the
    /// returned descriptor as a whole.
    pub fn parse(raw: &str) -> Self {
        let cleaned = clean(raw);

        match TYPE_FROM_STRING.captures(&cleaned) {
            Some(caps) => {
                let modifier = caps.name("modifier").map_or("", |m| m.as_str());
                let name = caps.name("name").map_or("", |m| m.as_str());
                let adjustment: String = caps
                    .name("adjustment")
                    .map_or("", |m| m.as_str())
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                Self::new(name, adjustment, modifier)
            }
            None => {
                tracing::warn!(
                    "Type pattern does not match for {} (cleaned version of {})",
                    cleaned,
                    raw
                );
                Self::new(cleaned, "", "")
            }
        }
    }

    /// Whether this is the unknown sentinel
    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_TYPE
    }

    pub fn has_modifier(&self) -> bool {
        !self.modifier.is_empty()
    }

    pub fn has_adjustment(&self) -> bool {
        !self.adjustment.is_empty()
    }

    /// One pointer level more.
    pub fn reference(&self) -> Self {
        Self {
            name: self.name.clone(),
            adjustment: format!("*{}", self.adjustment),
            modifier: self.modifier.clone(),
            origin: self.origin,
        }
    }

    /// One array or pointer level less. Dereferencing an array behaves like a pointer.
    pub fn dereference(&self) -> Self {
        Self {
            name: self.name.clone(),
            adjustment: ONE_LEVEL.replacen(&self.adjustment, 1, "").into_owned(),
            modifier: self.modifier.clone(),
            origin: self.origin,
        }
    }
}

/// Normalize raw type text before matching it.
///
/// Repeats until nothing changes, since stripping one artifact can expose
/// another. Every step only removes text, so this terminates.
fn clean(raw: &str) -> String {
    if PLACEHOLDER_MARKERS.iter().any(|marker| raw.contains(marker)) {
        return UNKNOWN_TYPE.to_string();
    }

    let mut current = clean_once(raw);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(raw: &str) -> String {
    let cleaned = STRUCT_PREFIX.replace(raw, "");
    let cleaned = NAMESPACE_ARTIFACT.replace_all(&cleaned, "");
    let cleaned = ARRAY_SIZE.replace_all(&cleaned, "[]");
    let cleaned = SIGNATURE.replace_all(&cleaned, "");
    let cleaned = cleaned.replace("::", ".");

    cleaned.trim().to_string()
}

impl Default for TypeDescriptor {
    fn default() -> Self {
        Self::unknown()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.modifier == other.modifier
            && self.adjustment == other.adjustment
    }
}

impl Eq for TypeDescriptor {}

impl std::hash::Hash for TypeDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.modifier.hash(state);
        self.adjustment.hash(state);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_modifier() {
            write!(f, "{} ", self.modifier)?;
        }
        write!(f, "{}{}", self.name, self.adjustment)
    }
}

impl FromStr for TypeDescriptor {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TypeDescriptor {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(TypeDescriptor::parse(&s))
    }
}
