//! Judgment is the user's self-reported recall outcome for one word.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Judgment {
    /// The word was not recalled
    Unknown,
    /// Recalled with difficulty
    Unsure,
    /// Recalled confidently
    Known,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid judgment '{0}', expected one of: unknown, unsure, known")]
pub struct ParseJudgmentError(pub String);

impl Judgment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Judgment::Unknown => "unknown",
            Judgment::Unsure => "unsure",
            Judgment::Known => "known",
        }
    }

    /// Only `known` counts as a correct answer in a review session.
    pub fn is_correct(&self) -> bool {
        matches!(self, Judgment::Known)
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Judgment {
    type Err = ParseJudgmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Judgment::Unknown),
            "unsure" => Ok(Judgment::Unsure),
            "known" => Ok(Judgment::Known),
            other => Err(ParseJudgmentError(other.to_string())),
        }
    }
}
