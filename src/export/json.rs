//! JSON import/export module for wordbooks.
//! Saves and loads a wordbook together with its words to/from JSON files.

use crate::models::WordbookContents;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum JsonFileError {
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid wordbook JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Exports a wordbook to a pretty-printed JSON file at `path`.
pub fn export_json_to_path(
    contents: &WordbookContents,
    path: &Path,
) -> Result<(), JsonFileError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, contents)?;
    writer.flush()?;
    debug!(path = %path.display(), wordbook = %contents.wordbook.name, "wordbook exported");
    Ok(())
}

/// Reads a wordbook from a JSON file.
/// The contents are not validated here; importing into the database does that.
pub fn import_json(path: &Path) -> Result<WordbookContents, JsonFileError> {
    let reader = BufReader::new(File::open(path)?);
    let contents: WordbookContents = serde_json::from_reader(reader)?;
    debug!(path = %path.display(), wordbook = %contents.wordbook.name, "wordbook read");
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewWord, NewWordbook};
    use std::fs;

    fn create_test_wordbook() -> WordbookContents {
        WordbookContents {
            wordbook: NewWordbook {
                name: "Test Wordbook".to_string(),
                total_days: 2,
                description: Some("greetings".to_string()),
            },
            words: vec![
                NewWord {
                    english: "hello".to_string(),
                    korean: "안녕하세요".to_string(),
                    day: 1,
                },
                NewWord {
                    english: "goodbye".to_string(),
                    korean: "안녕히 가세요".to_string(),
                    day: 2,
                },
            ],
        }
    }

    #[test]
    fn test_export_json_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        export_json_to_path(&create_test_wordbook(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"name\": \"Test Wordbook\""));
        assert!(written.contains("\"total_days\": 2"));
    }

    #[test]
    fn test_import_json() {
        let json_content = r#"{
  "name": "Import Test Wordbook",
  "total_days": 3,
  "words": [
    {
      "english": "test",
      "korean": "시험",
      "day": 3
    }
  ]
}"#;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.json");
        fs::write(&path, json_content).unwrap();

        let contents = import_json(&path).unwrap();
        assert_eq!(contents.wordbook.name, "Import Test Wordbook");
        assert_eq!(contents.wordbook.description, None);
        assert_eq!(contents.words.len(), 1);
        assert_eq!(contents.words[0].korean, "시험");
        assert_eq!(contents.words[0].day, 3);
    }

    #[test]
    fn test_export_and_import_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.json");
        let original = create_test_wordbook();

        export_json_to_path(&original, &path).unwrap();
        assert_eq!(import_json(&path).unwrap(), original);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_json(Path::new("nonexistent_file_xyz123.json"));
        assert!(matches!(result, Err(JsonFileError::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(matches!(import_json(&path), Err(JsonFileError::Json(_))));
    }
}
