//! Wordbook is a named set of words grouped into numbered days
use super::NewWord;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

const MAX_NAME_LEN: usize = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wordbook {
    pub id: i64,
    pub name: String,
    pub total_days: u32,
    pub description: Option<String>,
}

/// Wordbook fields supplied when creating or editing one
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewWordbook {
    pub name: String,
    pub total_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewWordbook {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let len = self.name.trim().chars().count();
        if len == 0 {
            return Err(ValidationError::EmptyName);
        }
        if len > MAX_NAME_LEN {
            return Err(ValidationError::NameTooLong(len));
        }
        if self.total_days == 0 {
            return Err(ValidationError::NoDays);
        }
        Ok(())
    }

    /// Checks that a word fits into this wordbook
    pub fn validate_word(&self, word: &NewWord) -> Result<(), ValidationError> {
        word.validate()?;
        if word.day > self.total_days {
            return Err(ValidationError::DayOutOfRange {
                day: word.day,
                total_days: self.total_days,
            });
        }
        Ok(())
    }
}

impl From<&Wordbook> for NewWordbook {
    fn from(wordbook: &Wordbook) -> Self {
        Self {
            name: wordbook.name.clone(),
            total_days: wordbook.total_days,
            description: wordbook.description.clone(),
        }
    }
}

/// A wordbook together with all of its words, the unit of import and export
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordbookContents {
    #[serde(flatten)]
    pub wordbook: NewWordbook,
    pub words: Vec<NewWord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wordbook(name: &str, total_days: u32) -> NewWordbook {
        NewWordbook {
            name: name.to_string(),
            total_days,
            description: None,
        }
    }

    #[test]
    fn test_valid_wordbook() {
        assert_eq!(wordbook("TOEIC 900", 30).validate(), Ok(()));
    }

    #[test]
    fn test_name_rules() {
        assert_eq!(wordbook("   ", 30).validate(), Err(ValidationError::EmptyName));
        assert_eq!(
            wordbook(&"a".repeat(101), 30).validate(),
            Err(ValidationError::NameTooLong(101))
        );
        assert!(wordbook(&"단".repeat(100), 30).validate().is_ok());
    }

    #[test]
    fn test_total_days_must_be_positive() {
        assert_eq!(wordbook("Basics", 0).validate(), Err(ValidationError::NoDays));
    }

    #[test]
    fn test_word_day_must_fit() {
        let book = wordbook("Basics", 2);
        let word = NewWord {
            english: "apple".to_string(),
            korean: "사과".to_string(),
            day: 3,
        };
        assert_eq!(
            book.validate_word(&word),
            Err(ValidationError::DayOutOfRange {
                day: 3,
                total_days: 2
            })
        );
    }
}
