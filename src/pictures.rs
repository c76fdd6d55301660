// Copyright 2023 Remi Bernotavicius

use crate::database::models::PictureRef;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Somewhere uploaded images can be kept. Only the returned reference is stored in the database.
pub trait PictureStore {
    fn store(&self, file_name: &str, bytes: &[u8]) -> Result<PictureRef>;
}

const UPLOAD_DIR: &str = "images";

/// Keeps pictures as plain files under `<root>/images/`.
pub struct DirectoryPictureStore {
    root: PathBuf,
}

impl DirectoryPictureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, picture: &PictureRef) -> PathBuf {
        self.root.join(picture.as_str())
    }

    /// Reads the file at `path` and stores it under its own file name.
    pub fn upload(&self, path: impl AsRef<Path>) -> Result<PictureRef> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::validation("picture", "no file name"))?;
        let bytes = std::fs::read(path)?;
        self.store(file_name, &bytes)
    }

    fn available_name(dir: &Path, file_name: &str) -> String {
        if !dir.join(file_name).exists() {
            return file_name.into();
        }
        let (stem, extension) = match file_name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
            _ => (file_name, None),
        };
        let mut n = 1;
        loop {
            let candidate = match extension {
                Some(extension) => format!("{stem}_{n}.{extension}"),
                None => format!("{stem}_{n}"),
            };
            if !dir.join(&candidate).exists() {
                return candidate;
            }
            n += 1;
        }
    }
}

impl PictureStore for DirectoryPictureStore {
    fn store(&self, file_name: &str, bytes: &[u8]) -> Result<PictureRef> {
        let file_name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::validation("picture", "no file name"))?;

        let dir = self.root.join(UPLOAD_DIR);
        std::fs::create_dir_all(&dir)?;
        let name = Self::available_name(&dir, file_name);
        std::fs::write(dir.join(&name), bytes)?;
        log::debug!("stored picture {name} ({} bytes)", bytes.len());
        Ok(PictureRef::new(format!("{UPLOAD_DIR}/{name}")))
    }
}

#[test]
fn store_deduplicates_names() {
    use std::{env, fs};

    let root = env::temp_dir().join(format!("recipe_book_pictures_{}", std::process::id()));
    if root.exists() {
        fs::remove_dir_all(&root).unwrap();
    }

    let store = DirectoryPictureStore::new(&root);
    let first = store.store("salt.png", b"one").unwrap();
    let second = store.store("salt.png", b"two").unwrap();
    let third = store.store("../../salt.png", b"three").unwrap();
    assert_eq!(first.as_str(), "images/salt.png");
    assert_eq!(second.as_str(), "images/salt_1.png");
    assert_eq!(third.as_str(), "images/salt_2.png");
    assert_eq!(fs::read(store.path_for(&second)).unwrap(), b"two");

    assert!(store.store("..", b"").unwrap_err().is_validation());

    fs::remove_dir_all(&root).unwrap();
}
