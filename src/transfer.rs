//! Export and import of the whole tree as a JSON file.

use crate::models::AppData;
use chrono::NaiveDate;
use serde_json::Value;
use std::fmt;

const REQUIRED_KEYS: [&str; 3] = ["yearGoal", "logs", "weeklyGoals"];

#[derive(Debug)]
pub enum ImportError {
    Unreadable(String),
    MissingKey(&'static str),
    Malformed(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Unreadable(reason) => write!(f, "file is not valid JSON: {reason}"),
            ImportError::MissingKey(key) => write!(f, "missing required key `{key}`"),
            ImportError::Malformed(reason) => write!(f, "invalid data structure: {reason}"),
        }
    }
}

impl std::error::Error for ImportError {}

impl ImportError {
    /// Message shown to the user when an import is rejected.
    pub fn user_message(&self) -> String {
        format!("ファイルの読み込みに失敗しました。有効なJSONファイルか確認してください。({self})")
    }
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("study-sheet-data-{}.json", today.format("%Y-%m-%d"))
}

/// Pretty-printed JSON with two-space indentation.
pub fn export_json(data: &AppData) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}

/// Parses an import payload into a replacement tree.
pub fn parse_import(text: &str) -> Result<AppData, ImportError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| ImportError::Unreadable(err.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| ImportError::Malformed("top level is not an object".to_string()))?;
    for key in REQUIRED_KEYS {
        if !object.contains_key(key) {
            return Err(ImportError::MissingKey(key));
        }
    }
    serde_json::from_value(value).map_err(|err| ImportError::Malformed(err.to_string()))
}
