// Copyright 2023 Remi Bernotavicius

use crate::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    /// Uploaded pictures live under `<media_root>/images/`.
    pub media_root: PathBuf,
}

/// This is where the database and other user-data lives on-disk. On Linux it should be like:
/// `~/.local/share/recipe_book/`
fn data_path() -> Result<PathBuf> {
    let dirs = directories::BaseDirs::new().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "failed to get user home directory",
        )
    })?;
    Ok(dirs.data_dir().join("recipe_book"))
}

impl Config {
    /// Fills in whatever wasn't given explicitly from the platform data directory.
    pub fn resolve(database_path: Option<PathBuf>, media_root: Option<PathBuf>) -> Result<Self> {
        let (database_path, media_root) = match (database_path, media_root) {
            (Some(database_path), Some(media_root)) => (database_path, media_root),
            (database_path, media_root) => {
                let data = data_path()?;
                (
                    database_path.unwrap_or_else(|| data.join("data.sqlite")),
                    media_root.unwrap_or_else(|| data.join("media")),
                )
            }
        };

        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::create_dir_all(&media_root)?;

        Ok(Self {
            database_path,
            media_root,
        })
    }
}

#[test]
fn resolve_explicit_paths() {
    use std::{env, fs};

    let root = env::temp_dir().join(format!("recipe_book_config_{}", std::process::id()));
    let config = Config::resolve(
        Some(root.join("db").join("data.sqlite")),
        Some(root.join("media")),
    )
    .unwrap();
    assert_eq!(config.database_path, root.join("db").join("data.sqlite"));
    assert!(root.join("db").is_dir());
    assert!(config.media_root.is_dir());

    fs::remove_dir_all(&root).unwrap();
}
