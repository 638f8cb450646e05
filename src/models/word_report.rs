//! User-submitted corrections to a word's text, moderated by admins.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Accepted => "accepted",
            ReportStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReportStatus::Pending),
            "accepted" => Ok(ReportStatus::Accepted),
            "rejected" => Ok(ReportStatus::Rejected),
            other => Err(format!("unknown report status '{other}'")),
        }
    }
}

/// Admin decision on a report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    /// Apply the reported text to the word
    Accept,
    Reject,
    Delete,
    /// Revert an accept or reject back to pending
    Undo,
}

impl FromStr for ModerationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(ModerationAction::Accept),
            "reject" => Ok(ModerationAction::Reject),
            "delete" => Ok(ModerationAction::Delete),
            "undo" => Ok(ModerationAction::Undo),
            other => Err(format!(
                "invalid action '{other}', expected accept, reject, delete or undo"
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordReport {
    pub id: i64,
    pub word_id: i64,
    pub wordbook_id: i64,
    pub day: u32,
    pub original_english: String,
    pub original_korean: String,
    pub reported_english: String,
    pub reported_korean: String,
    pub user_id: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}
