use crate::errors::AppError;
use crate::models::AppData;
use crate::sheet::generate;
use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, warn};

const DATA_KEY: &str = "studySheetData";
const SIDEBAR_KEY: &str = "sidebarOpen";

/// Local key-value store: one JSON file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn ensure_dir(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Reads the stored tree, or a fresh one anchored at `today` when the
    /// entry is missing or unreadable.
    pub async fn load_data(&self, today: NaiveDate) -> AppData {
        self.read(DATA_KEY).await.unwrap_or_else(|| generate(today))
    }

    pub async fn persist_data(&self, data: &AppData) -> Result<(), AppError> {
        self.write(DATA_KEY, data).await
    }

    /// Sidebar defaults to open.
    pub async fn load_sidebar(&self) -> bool {
        self.read(SIDEBAR_KEY).await.unwrap_or(true)
    }

    pub async fn persist_sidebar(&self, open: bool) -> Result<(), AppError> {
        self.write(SIDEBAR_KEY, &open).await
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path(key);
        match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(value) => Some(value),
                Err(err) => {
                    error!("failed to parse {}: {err}", path.display());
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("failed to read {}: {err}", path.display());
                None
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let payload = serde_json::to_vec(value)?;
        fs::write(self.path(key), payload).await?;
        Ok(())
    }
}
