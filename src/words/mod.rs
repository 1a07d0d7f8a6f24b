use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::game::GameError;
use crate::utils::letters::is_word_letter;

pub const DEFAULT_WORDS: [&str; 8] = ["REACT", "MYSQL", "CANVAS", "TEAM", "GAME", "CODE", "WEB", "APP"];

/// Ordered list of distinct uppercase words hidden in a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Normalize and validate. Blank entries are dropped; anything else
    /// outside A-Z, or a repeated word, is rejected.
    pub fn new<I, S>(words: I) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut list = Vec::new();

        for raw in words {
            let word = raw.as_ref().trim().to_uppercase();
            if word.is_empty() {
                continue;
            }
            if !word.chars().all(is_word_letter) {
                return Err(GameError::InvalidWordList(format!(
                    "{word} contains characters outside A-Z"
                )));
            }
            if !seen.insert(word.clone()) {
                return Err(GameError::InvalidWordList(format!("{word} is listed twice")));
            }
            list.push(word);
        }

        Ok(Self { words: list })
    }

    pub fn default_words() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Load a newline-separated word list from a file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read word list {}", path.display()))?;
        let list = Self::new(content.lines())?;

        tracing::info!("Loaded {} words from {}", list.len(), path.display());

        Ok(list)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Copy of this list without `skipped`, order preserved.
    pub fn without(&self, skipped: &[String]) -> Self {
        Self {
            words: self
                .words
                .iter()
                .filter(|w| !skipped.contains(w))
                .cloned()
                .collect(),
        }
    }
}

impl TryFrom<Vec<String>> for WordList {
    type Error = GameError;

    fn try_from(words: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(words)
    }
}

impl From<WordList> for Vec<String> {
    fn from(list: WordList) -> Self {
        list.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_words() {
        let list = WordList::new([" cat", "Dog ", "", "bird"]).unwrap();
        assert_eq!(list.as_slice(), ["CAT", "DOG", "BIRD"]);
    }

    #[test]
    fn test_rejects_duplicates_and_symbols() {
        assert!(matches!(
            WordList::new(["cat", "CAT"]),
            Err(GameError::InvalidWordList(_))
        ));
        assert!(WordList::new(["c-a-t"]).is_err());
    }

    #[test]
    fn test_without_keeps_order() {
        let list = WordList::default_words();
        let trimmed = list.without(&["MYSQL".to_string(), "WEB".to_string()]);
        assert_eq!(trimmed.len(), 6);
        assert_eq!(trimmed.iter().next(), Some("REACT"));
        assert!(!trimmed.contains("WEB"));
    }

    #[test]
    fn test_deserialize_validates() {
        let list: WordList = serde_json::from_str(r#"["tea", "pot"]"#).unwrap();
        assert_eq!(list.as_slice(), ["TEA", "POT"]);
        assert!(serde_json::from_str::<WordList>(r#"["tea", "TEA"]"#).is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        assert!(WordList::load("./does-not-exist.txt").await.is_err());
    }
}
