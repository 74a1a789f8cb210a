//! Cover image set: the ordered list of images forming one storage volume.

use crate::config::{StorageArguments, SUPPORTED_EXTENSIONS};
use crate::error::{Error, Result};
use image::ImageFormat;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lossless formats a cover image may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverFormat {
    Png,
    WebP,
}

impl CoverFormat {
    /// Determine the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(CoverFormat::Png),
            "webp" => Some(CoverFormat::WebP),
            _ => None,
        }
    }

    /// The matching `image` crate format.
    pub fn image_format(self) -> ImageFormat {
        match self {
            CoverFormat::Png => ImageFormat::Png,
            CoverFormat::WebP => ImageFormat::WebP,
        }
    }
}

/// Check whether a path has a supported lossless image extension.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// Ordered, validated set of cover images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImageSet {
    paths: Vec<PathBuf>,
}

impl CoverImageSet {
    /// Build a cover image set.
    ///
    /// Directory entries are expanded into the PNG and WebP files they
    /// directly contain, sorted by file name. Every resulting path must exist
    /// and carry a supported extension, and no path may appear twice.
    pub fn new(entries: Vec<PathBuf>) -> Result<Self> {
        let mut paths = Vec::with_capacity(entries.len());

        for entry in entries {
            if entry.is_dir() {
                paths.extend(Self::scan_dir(&entry));
                continue;
            }

            if !entry.exists() {
                return Err(Error::ImageNotFound(entry));
            }
            if !is_supported_image(&entry) {
                return Err(Error::UnsupportedFormat(entry));
            }
            paths.push(entry);
        }

        if paths.is_empty() {
            return Err(Error::NoCoverImages);
        }

        let mut seen = HashSet::new();
        for path in &paths {
            if !seen.insert(path.clone()) {
                return Err(Error::DuplicateCoverImage(path.clone()));
            }
        }

        Ok(Self { paths })
    }

    /// Build the set named by storage arguments.
    pub fn from_arguments(args: &StorageArguments) -> Result<Self> {
        args.validate()?;
        Self::new(args.cover_images.clone())
    }

    /// Find supported images directly inside a directory.
    fn scan_dir(dir: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_supported_image(p))
            .collect();
        found.dedup();
        found
    }

    /// Image paths in stream order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Always false; a set holds at least one image.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"x").unwrap();
        path
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(CoverFormat::from_path(Path::new("a.png")), Some(CoverFormat::Png));
        assert_eq!(CoverFormat::from_path(Path::new("a.PNG")), Some(CoverFormat::Png));
        assert_eq!(CoverFormat::from_path(Path::new("a.webp")), Some(CoverFormat::WebP));
        assert_eq!(CoverFormat::from_path(Path::new("a.jpg")), None);
        assert_eq!(CoverFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_preserves_order() {
        let dir = TempDir::new().unwrap();
        let b = touch(dir.path(), "b.png");
        let a = touch(dir.path(), "a.webp");

        let set = CoverImageSet::new(vec![b.clone(), a.clone()]).unwrap();
        assert_eq!(set.paths(), &[b, a]);
    }

    #[test]
    fn test_missing_image() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.png");

        let result = CoverImageSet::new(vec![missing]);
        assert!(matches!(result, Err(Error::ImageNotFound(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let dir = TempDir::new().unwrap();
        let jpeg = touch(dir.path(), "photo.jpg");

        let result = CoverImageSet::new(vec![jpeg]);
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_empty_set() {
        assert!(matches!(CoverImageSet::new(vec![]), Err(Error::NoCoverImages)));
    }

    #[test]
    fn test_duplicate_image() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.png");

        let result = CoverImageSet::new(vec![a.clone(), a]);
        assert!(matches!(result, Err(Error::DuplicateCoverImage(_))));
    }

    #[test]
    fn test_directory_expansion() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "2.png");
        touch(dir.path(), "1.webp");
        touch(dir.path(), "notes.txt");

        let set = CoverImageSet::new(vec![dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = set
            .paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["1.webp", "2.png"]);
    }
}
