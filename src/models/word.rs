//! Word is a pair <english, korean> assigned to one day of a wordbook
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub wordbook_id: i64,
    pub english: String,
    pub korean: String,
    pub day: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewWord {
    pub english: String,
    pub korean: String,
    pub day: u32,
}

impl NewWord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.english.trim().is_empty() || self.korean.trim().is_empty() {
            return Err(ValidationError::EmptyWord);
        }
        if self.day == 0 {
            return Err(ValidationError::ZeroDay);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_requires_both_sides() {
        let word = NewWord {
            english: "hello".to_string(),
            korean: " ".to_string(),
            day: 1,
        };
        assert_eq!(word.validate(), Err(ValidationError::EmptyWord));
    }

    #[test]
    fn test_word_day_starts_at_one() {
        let word = NewWord {
            english: "hello".to_string(),
            korean: "안녕".to_string(),
            day: 0,
        };
        assert_eq!(word.validate(), Err(ValidationError::ZeroDay));
    }
}
