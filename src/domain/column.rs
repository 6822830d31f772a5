use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// One of the three fixed lanes of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKey {
    Todo,
    InProgress,
    Done,
}

impl ColumnKey {
    /// All columns in board order
    pub const ALL: [ColumnKey; 3] = [ColumnKey::Todo, ColumnKey::InProgress, ColumnKey::Done];

    /// Returns the key token used in storage keys and markup
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Done => "done",
        }
    }

    /// Storage key for this column, e.g. `cards:todo`
    pub fn storage_key(&self, prefix: &str) -> String {
        format!("{}:{}", prefix, self.as_str())
    }

    /// Picks the first known column key among an element's class names.
    ///
    /// Elements carrying none of the keys are treated as `todo`.
    pub fn from_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> Self {
        classes
            .into_iter()
            .find_map(|class| class.parse().ok())
            .unwrap_or(Self::Todo)
    }
}

impl FromStr for ColumnKey {
    type Err = crate::error::SwimlaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(crate::error::SwimlaneError::UnknownColumn(s.to_string())),
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys() {
        assert_eq!(ColumnKey::Todo.storage_key("cards"), "cards:todo");
        assert_eq!(ColumnKey::InProgress.storage_key("cards"), "cards:inprogress");
        assert_eq!(ColumnKey::Done.storage_key("cards"), "cards:done");
    }

    #[test]
    fn test_parsing() {
        assert_eq!("todo".parse::<ColumnKey>().unwrap(), ColumnKey::Todo);
        assert_eq!("inprogress".parse::<ColumnKey>().unwrap(), ColumnKey::InProgress);
        assert_eq!("done".parse::<ColumnKey>().unwrap(), ColumnKey::Done);
        assert!("Done".parse::<ColumnKey>().is_err());
        assert!("backlog".parse::<ColumnKey>().is_err());
    }

    #[test]
    fn test_from_classes() {
        assert_eq!(ColumnKey::from_classes(["column", "done"]), ColumnKey::Done);
        assert_eq!(
            ColumnKey::from_classes(["inprogress", "column"]),
            ColumnKey::InProgress
        );
        // No known key falls back to todo
        assert_eq!(ColumnKey::from_classes(["column"]), ColumnKey::Todo);
    }

    #[test]
    fn test_serde_tokens_match_storage_tokens() {
        for key in ColumnKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
    }
}
