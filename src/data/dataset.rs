use anyhow::{Context, Result};
use burn::data::dataset::Dataset;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Extensions the image decoder is built with
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// The image files of one dataset folder (e.g. `trainA`), sorted by path.
#[derive(Debug, Clone)]
pub struct ImageFolder {
    dir:   PathBuf,
    paths: Vec<PathBuf>,
}

impl ImageFolder {
    /// List the images in `dir`. Files with other extensions are ignored.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let mut paths = Vec::new();

        for entry in fs::read_dir(&dir)
            .with_context(|| format!("Cannot read image folder '{}'", dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        tracing::debug!("Found {} images in '{}'", paths.len(), dir.display());
        Ok(Self { dir, paths })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Dataset<PathBuf> for ImageFolder {
    fn get(&self, index: usize) -> Option<PathBuf> {
        self.paths.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.paths.len()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_only_images_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("b.png"),   b"x").unwrap();
        fs::write(tmp.path().join("a.JPG"),   b"x").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(tmp.path().join("nested.png")).unwrap();

        let folder = ImageFolder::open(tmp.path()).unwrap();
        assert_eq!(folder.len(), 2);
        assert_eq!(folder.get(0).unwrap().file_name().unwrap(), "a.JPG");
        assert!(folder.get(2).is_none());
    }

    #[test]
    fn test_missing_folder_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ImageFolder::open(tmp.path().join("trainA")).unwrap_err();
        assert!(err.to_string().contains("trainA"));
    }
}
