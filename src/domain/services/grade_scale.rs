//! Letter grade ↔ grade point bijection.

use crate::utils::error::{Result, TranscriptError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    AB,
    B,
    BC,
    C,
    D,
    E,
}

/// The full scale, best grade first.
pub const GRADE_SCALE: [(LetterGrade, f64); 7] = [
    (LetterGrade::A, 4.0),
    (LetterGrade::AB, 3.5),
    (LetterGrade::B, 3.0),
    (LetterGrade::BC, 2.5),
    (LetterGrade::C, 2.0),
    (LetterGrade::D, 1.0),
    (LetterGrade::E, 0.0),
];

impl LetterGrade {
    pub fn points(self) -> f64 {
        match self {
            LetterGrade::A => 4.0,
            LetterGrade::AB => 3.5,
            LetterGrade::B => 3.0,
            LetterGrade::BC => 2.5,
            LetterGrade::C => 2.0,
            LetterGrade::D => 1.0,
            LetterGrade::E => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::AB => "AB",
            LetterGrade::B => "B",
            LetterGrade::BC => "BC",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::E => "E",
        }
    }

    /// E is on the scale but never earns credit.
    pub fn is_failing(self) -> bool {
        self == LetterGrade::E
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LetterGrade {
    type Err = TranscriptError;

    fn from_str(s: &str) -> Result<Self> {
        let symbol = s.trim();
        GRADE_SCALE
            .iter()
            .map(|(letter, _)| *letter)
            .find(|letter| letter.as_str().eq_ignore_ascii_case(symbol))
            .ok_or_else(|| TranscriptError::InvalidGrade {
                grade: s.to_string(),
            })
    }
}

/// Point value for a letter symbol such as `"AB"`.
pub fn point_value(letter: &str) -> Result<f64> {
    letter.parse::<LetterGrade>().map(LetterGrade::points)
}
