//! Explicit session state for a notepad front end.
//!
//! A [`Session`] owns the selected cover images, the free-text settings, and
//! the note text. Operations borrow it mutably and return their results; the
//! caller decides what to show. Encode, decode, and clean each run on a
//! background thread while the session refuses to start another one.

use crate::config::{StorageArguments, DISPLAY_NAME_LIMIT};
use crate::encoding::PayloadCodec;
use crate::error::{Error, Result};
use crate::notepad::arguments::{form_cli_arguments, parse_cli_arguments, redact_password};
use crate::notepad::{clean_images, decode_text, encode_text};
use crate::storage::CoverImageSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info};

/// Direction to move a cover image within the ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDirection {
    Up,
    Down,
}

/// A selected cover image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub path: PathBuf,
    pub display_name: String,
}

impl CoverImage {
    /// Create an entry with a shortened display name.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display_name = display_name(&path);
        Self { path, display_name }
    }
}

/// Shorten long paths to their last [`DISPLAY_NAME_LIMIT`] characters.
pub fn display_name(path: &Path) -> String {
    let full = path.to_string_lossy();
    let count = full.chars().count();
    if count < DISPLAY_NAME_LIMIT {
        return full.into_owned();
    }
    let tail: String = full.chars().skip(count - DISPLAY_NAME_LIMIT).collect();
    format!("...{}", tail)
}

/// Settings as entered by the user, before parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsModel {
    pub password: String,
    pub random_seed: String,
    pub dummy_count: String,
    pub additional_hashes: String,
    pub compression_enabled: bool,
}

/// Clears the session's busy flag when the worker thread ends, even on panic.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// An encode, decode, or clean running on its own thread.
///
/// Dropping it detaches the thread; the session becomes available again once
/// the thread finishes.
pub struct PendingOperation<T> {
    handle: JoinHandle<Result<T>>,
}

impl<T: Send + 'static> PendingOperation<T> {
    fn spawn<F>(busy: &Arc<AtomicBool>, work: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        busy.store(true, Ordering::Release);
        let guard = BusyGuard(Arc::clone(busy));
        Self {
            handle: std::thread::spawn(move || {
                let _guard = guard;
                work()
            }),
        }
    }

    /// Whether the operation has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the operation completes.
    pub fn wait(self) -> Result<T> {
        self.handle.join().map_err(|_| Error::OperationPanicked)?
    }
}

/// Mutable state of one notepad session.
pub struct Session {
    codec: Arc<dyn PayloadCodec>,
    cover_images: Vec<CoverImage>,
    settings: SettingsModel,
    text_content: String,
    busy: Arc<AtomicBool>,
}

impl Session {
    /// Create an empty session that encodes with the given codec.
    pub fn new(codec: Arc<dyn PayloadCodec>) -> Self {
        Self {
            codec,
            cover_images: Vec::new(),
            settings: SettingsModel::default(),
            text_content: String::new(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Selected cover images in stream order.
    pub fn cover_images(&self) -> &[CoverImage] {
        &self.cover_images
    }

    /// Current settings.
    pub fn settings(&self) -> &SettingsModel {
        &self.settings
    }

    /// Mutable settings.
    pub fn settings_mut(&mut self) -> &mut SettingsModel {
        &mut self.settings
    }

    /// Current note text.
    pub fn text_content(&self) -> &str {
        &self.text_content
    }

    /// Replace the note text.
    pub fn set_text_content(&mut self, text: impl Into<String>) {
        self.text_content = text.into();
    }

    /// Whether save, load, and clean may be started.
    pub fn is_action_enabled(&self) -> bool {
        !self.is_busy() && !self.cover_images.is_empty()
    }

    /// Add newly selected images.
    ///
    /// Images already in the list are skipped. New images go in front of the
    /// existing ones, keeping their selection order.
    pub fn add_images<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut next: Vec<CoverImage> = Vec::new();
        for path in paths {
            let path = path.into();
            let known = self.cover_images.iter().any(|i| i.path == path)
                || next.iter().any(|i| i.path == path);
            if !known {
                next.push(CoverImage::new(path));
            }
        }

        info!(added = next.len(), "Selected cover images");
        next.append(&mut self.cover_images);
        self.cover_images = next;
    }

    /// Remove an image. Returns false if the path was not in the list.
    pub fn remove_image(&mut self, path: &Path) -> bool {
        let before = self.cover_images.len();
        self.cover_images.retain(|i| i.path != path);
        let removed = self.cover_images.len() != before;
        if !removed {
            debug!(path = %path.display(), "Could not find cover image to remove");
        }
        removed
    }

    /// Swap an image with its neighbour. Returns false if nothing moved.
    pub fn move_image(&mut self, path: &Path, direction: SwapDirection) -> bool {
        let Some(index) = self.cover_images.iter().position(|i| i.path == path) else {
            debug!(path = %path.display(), "Could not find cover image to move");
            return false;
        };

        let next = match direction {
            SwapDirection::Up => index.checked_sub(1),
            SwapDirection::Down => Some(index + 1).filter(|&n| n < self.cover_images.len()),
        };

        match next {
            Some(next) => {
                debug!(path = %path.display(), from = index, to = next, "Moving cover image");
                self.cover_images.swap(index, next);
                true
            }
            None => {
                debug!(path = %path.display(), index, "Cover image is already at the edge");
                false
            }
        }
    }

    /// The flag vector equivalent of the current settings.
    pub fn cli_arguments(&self) -> Vec<String> {
        form_cli_arguments(&self.settings, &self.cover_images)
    }

    /// Parse the current settings into storage arguments.
    pub fn to_arguments(&self) -> Result<StorageArguments> {
        let args = self.cli_arguments();
        debug!(args = ?redact_password(&args), "Forming storage arguments");
        let parsed = parse_cli_arguments(&args)?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn begin(&mut self) -> Result<()> {
        if self.is_busy() {
            return Err(Error::Busy);
        }
        if self.cover_images.is_empty() {
            return Err(Error::NoCoverImages);
        }
        Ok(())
    }

    /// Start saving the note text in the background.
    pub fn begin_save(&mut self) -> Result<PendingOperation<u64>> {
        self.begin()?;
        let args = self.to_arguments()?;
        let text = self.text_content.clone();
        let codec = Arc::clone(&self.codec);

        Ok(PendingOperation::spawn(&self.busy, move || {
            encode_text(&text, &args, codec.as_ref())
        }))
    }

    /// Start loading note text in the background.
    pub fn begin_load(&mut self) -> Result<PendingOperation<String>> {
        self.begin()?;
        let args = self.to_arguments()?;
        let codec = Arc::clone(&self.codec);

        Ok(PendingOperation::spawn(&self.busy, move || decode_text(&args, codec.as_ref())))
    }

    /// Start cleaning the cover images in the background.
    ///
    /// Only the cover images are needed; codec settings are ignored.
    pub fn begin_clean(&mut self) -> Result<PendingOperation<u64>> {
        self.begin()?;
        let paths: Vec<PathBuf> = self.cover_images.iter().map(|i| i.path.clone()).collect();
        let covers = CoverImageSet::new(paths)?;

        Ok(PendingOperation::spawn(&self.busy, move || clean_images(&covers)))
    }

    /// Wait for a pending operation. Actions are enabled again on success or failure.
    pub fn finish<T: Send + 'static>(&mut self, operation: PendingOperation<T>) -> Result<T> {
        operation.wait()
    }

    /// Save the note text and wait for completion.
    pub fn save_text(&mut self) -> Result<u64> {
        let operation = self.begin_save()?;
        self.finish(operation)
    }

    /// Load note text, store it in the session, and return it.
    pub fn load_text(&mut self) -> Result<&str> {
        let operation = self.begin_load()?;
        self.text_content = self.finish(operation)?;
        Ok(&self.text_content)
    }

    /// Clean the cover images and wait for completion.
    pub fn clean(&mut self) -> Result<u64> {
        let operation = self.begin_clean()?;
        self.finish(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::DataEncoder;

    fn session() -> Session {
        Session::new(Arc::new(DataEncoder))
    }

    fn paths(session: &Session) -> Vec<String> {
        session
            .cover_images()
            .iter()
            .map(|i| i.path.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_display_name_truncation() {
        assert_eq!(display_name(Path::new("short.png")), "short.png");

        let long = "/home/user/pictures/holiday/2024/beach-sunset.png";
        let shown = display_name(Path::new(long));
        assert!(shown.starts_with("..."));
        assert_eq!(shown.chars().count(), DISPLAY_NAME_LIMIT + 3);
        assert!(long.ends_with(&shown[3..]));
    }

    #[test]
    fn test_add_images_puts_new_first_and_skips_duplicates() {
        let mut s = session();
        s.add_images(["a.png", "b.png"]);
        s.add_images(["c.png", "a.png", "c.png"]);

        assert_eq!(paths(&s), vec!["c.png", "a.png", "b.png"]);
    }

    #[test]
    fn test_remove_image() {
        let mut s = session();
        s.add_images(["a.png", "b.png"]);

        assert!(s.remove_image(Path::new("a.png")));
        assert!(!s.remove_image(Path::new("missing.png")));
        assert_eq!(paths(&s), vec!["b.png"]);
    }

    #[test]
    fn test_move_image() {
        let mut s = session();
        s.add_images(["a.png", "b.png", "c.png"]);

        assert!(s.move_image(Path::new("c.png"), SwapDirection::Up));
        assert_eq!(paths(&s), vec!["a.png", "c.png", "b.png"]);

        assert!(s.move_image(Path::new("a.png"), SwapDirection::Down));
        assert_eq!(paths(&s), vec!["c.png", "a.png", "b.png"]);

        assert!(!s.move_image(Path::new("c.png"), SwapDirection::Up));
        assert!(!s.move_image(Path::new("b.png"), SwapDirection::Down));
        assert!(!s.move_image(Path::new("zzz.png"), SwapDirection::Up));
        assert_eq!(paths(&s), vec!["c.png", "a.png", "b.png"]);
    }

    #[test]
    fn test_action_enabled_requires_images() {
        let mut s = session();
        assert!(!s.is_action_enabled());

        s.add_images(["a.png"]);
        assert!(s.is_action_enabled());

        s.remove_image(Path::new("a.png"));
        assert!(!s.is_action_enabled());
    }

    #[test]
    fn test_to_arguments_parses_settings() {
        let mut s = session();
        s.add_images(["a.png"]);
        s.settings_mut().password = "pw".to_string();
        s.settings_mut().dummy_count = " 4 ".to_string();
        s.settings_mut().compression_enabled = true;

        let args = s.to_arguments().unwrap();
        assert_eq!(args.cover_images, vec![PathBuf::from("a.png")]);
        assert_eq!(args.encoding.password, "pw");
        assert_eq!(args.encoding.dummy_count, 4);
        assert_eq!(args.encoding.additional_hashes, 0);
        assert!(args.encoding.use_compression);
    }

    #[test]
    fn test_to_arguments_rejects_bad_numbers() {
        let mut s = session();
        s.add_images(["a.png"]);
        s.settings_mut().additional_hashes = "many".to_string();

        assert!(matches!(s.to_arguments(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_operations_need_images() {
        let mut s = session();
        assert!(matches!(s.save_text(), Err(Error::NoCoverImages)));
        assert!(matches!(s.load_text(), Err(Error::NoCoverImages)));
        assert!(matches!(s.clean(), Err(Error::NoCoverImages)));
    }

    #[test]
    fn test_dropped_operation_releases_session() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cover.png");
        image::RgbImage::from_pixel(16, 16, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let mut s = session();
        s.add_images([path]);
        s.set_text_content("left behind");

        let pending = s.begin_save().unwrap();
        assert!(matches!(s.begin_load(), Err(Error::Busy)));
        drop(pending);

        let mut waited = 0;
        while !s.is_action_enabled() && waited < 500 {
            std::thread::sleep(std::time::Duration::from_millis(10));
            waited += 1;
        }
        assert!(s.is_action_enabled());
        assert_eq!(s.load_text().unwrap(), "left behind");
    }

    #[test]
    fn test_failed_operation_reenables_actions() {
        let mut s = session();
        s.add_images(["does-not-exist.png"]);

        let result = s.load_text();
        assert!(matches!(result, Err(Error::ImageNotFound(_))));
        assert!(s.is_action_enabled());
    }
}
