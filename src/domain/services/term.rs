//! Academic term tokens such as `2022/2023 Ganjil`.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Half {
    First,
    Second,
}

impl Half {
    fn from_designator(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "ganjil" | "gasal" | "odd" | "first" | "fall" => Some(Half::First),
            "genap" | "even" | "second" | "spring" => Some(Half::Second),
            _ => None,
        }
    }
}

/// Field order matters: the derived `Ord` is the chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AcademicTerm {
    pub start_year: i32,
    pub half: Half,
    pub end_year: i32,
}

/// A term label as it appeared in the export, plus its parsed form when the
/// label follows the `YYYY/YYYY Half` pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermToken {
    raw: String,
    parsed: Option<AcademicTerm>,
}

/// Grouping identity: well-formed labels that spell the same term collapse,
/// malformed labels only group with identical text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermKey {
    Term(AcademicTerm),
    Malformed(String),
}

fn term_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})\s*/\s*(\d{4})\s+([[:alpha:]]+)$").expect("term pattern compiles")
    })
}

impl TermToken {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let parsed = term_pattern().captures(&raw).and_then(|caps| {
            let start_year = caps[1].parse().ok()?;
            let end_year = caps[2].parse().ok()?;
            let half = Half::from_designator(&caps[3])?;
            Some(AcademicTerm {
                start_year,
                half,
                end_year,
            })
        });
        Self { raw, parsed }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn academic_term(&self) -> Option<AcademicTerm> {
        self.parsed
    }

    pub fn is_malformed(&self) -> bool {
        self.parsed.is_none()
    }

    pub fn key(&self) -> TermKey {
        match self.parsed {
            Some(term) => TermKey::Term(term),
            None => TermKey::Malformed(self.raw.clone()),
        }
    }

    /// Chronological order; malformed tokens compare equal to each other and
    /// after every well-formed token, so a stable sort keeps them in input order.
    pub fn cmp_chronological(&self, other: &Self) -> Ordering {
        match (self.parsed, other.parsed) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for TermToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for TermToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}
