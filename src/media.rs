//! Local storage for uploaded resumes

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, warn};

pub const RESUME_DIR: &str = "resumes";

const MAX_NAME_LEN: usize = 100;
/// Extension length kept on truncation, dot included
const MAX_EXT_LEN: usize = 10;
const SUFFIX_LEN: usize = 7;
const MAX_ATTEMPTS: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("failed to store upload at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no free file name for '{0}'")]
    NameExhausted(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> MediaError + '_ {
    move |source| MediaError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Reduce a client-supplied file name to a safe single path component.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return "resume".to_string();
    }
    if cleaned.len() <= MAX_NAME_LEN {
        return cleaned.to_string();
    }

    let (stem, ext) = split_extension(cleaned);
    let ext = &ext[..ext.len().min(MAX_EXT_LEN)];
    let keep = MAX_NAME_LEN - ext.len();
    format!("{}{}", &stem[..keep.min(stem.len())], ext)
}

/// `cv.final.pdf` -> (`cv.final`, `.pdf`)
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

fn with_random_suffix(name: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();
    let (stem, ext) = split_extension(name);
    format!("{stem}_{suffix}{ext}")
}

/// Files under a root directory, addressed by paths relative to that root
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_of(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Copy an uploaded file into `resumes/`, keyed by its sanitized name.
    /// A taken name gets a random suffix. Returns the path relative to the root.
    pub async fn save_resume(&self, source: &Path, original_name: &str) -> Result<String, MediaError> {
        let dir = self.root.join(RESUME_DIR);
        tokio::fs::create_dir_all(&dir).await.map_err(io_error(&dir))?;

        let name = sanitize_filename(original_name);
        let mut candidate = name.clone();
        for _ in 0..MAX_ATTEMPTS {
            let target = dir.join(&candidate);
            // Reserve the name first so concurrent uploads never share a file
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await
            {
                Ok(_) => {
                    if let Err(err) = tokio::fs::copy(source, &target).await {
                        if let Err(cleanup) = tokio::fs::remove_file(&target).await {
                            warn!("Failed to release {}: {}", target.display(), cleanup);
                        }
                        return Err(io_error(&target)(err));
                    }
                    debug!("Stored resume at {}", target.display());
                    return Ok(format!("{RESUME_DIR}/{candidate}"));
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    candidate = with_random_suffix(&name);
                }
                Err(err) => return Err(io_error(&target)(err)),
            }
        }
        Err(MediaError::NameExhausted(name))
    }

    /// Remove a stored file. A missing file is not an error.
    pub async fn remove(&self, relative: &str) -> Result<(), MediaError> {
        let path = self.path_of(relative);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("Tried to remove missing file {}", path.display());
                Ok(())
            }
            Err(err) => Err(io_error(&path)(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("cv.pdf"), "cv.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\bob\\my cv.pdf"), "my_cv.pdf");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename(""), "resume");
        assert_eq!(sanitize_filename("..."), "resume");
    }

    #[test]
    fn long_names_keep_their_extension() {
        let long = format!("{}.pdf", "a".repeat(300));
        let cleaned = sanitize_filename(&long);
        assert_eq!(cleaned.len(), MAX_NAME_LEN);
        assert!(cleaned.ends_with(".pdf"));
    }

    #[test]
    fn overlong_extensions_are_capped() {
        let cleaned = sanitize_filename(&format!("cv.{}", "x".repeat(300)));
        assert_eq!(cleaned, format!("cv.{}", "x".repeat(MAX_EXT_LEN - 1)));

        let cleaned = sanitize_filename(&format!("{}.{}", "a".repeat(200), "x".repeat(200)));
        assert_eq!(cleaned.len(), MAX_NAME_LEN);
        assert!(cleaned.starts_with('a'));
        assert!(cleaned.ends_with(&format!(".{}", "x".repeat(MAX_EXT_LEN - 1))));

        let stored = format!("{RESUME_DIR}/{}", with_random_suffix(&cleaned));
        assert!(stored.len() < 255);
    }

    #[tokio::test]
    async fn long_upload_names_are_stored() {
        let root = tempfile::tempdir().unwrap();
        let upload = root.path().join("upload.tmp");
        std::fs::write(&upload, b"resume body").unwrap();
        let storage = MediaStorage::new(root.path().join("media"));

        let stored = storage
            .save_resume(&upload, &format!("cv.{}", "x".repeat(300)))
            .await
            .unwrap();
        assert!(stored.starts_with("resumes/cv."));
        assert_eq!(std::fs::read(storage.path_of(&stored)).unwrap(), b"resume body");
    }

    #[tokio::test]
    async fn failed_copy_releases_the_reserved_name() {
        let root = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(root.path().join("media"));

        let missing = root.path().join("gone.tmp");
        let err = storage.save_resume(&missing, "cv.pdf").await.unwrap_err();
        assert!(matches!(err, MediaError::Io { .. }));
        assert!(!storage.path_of("resumes/cv.pdf").exists());

        let upload = root.path().join("upload.tmp");
        std::fs::write(&upload, b"resume body").unwrap();
        let stored = storage.save_resume(&upload, "cv.pdf").await.unwrap();
        assert_eq!(stored, "resumes/cv.pdf");
    }

    #[test]
    fn suffix_goes_before_the_extension() {
        let renamed = with_random_suffix("cv.pdf");
        assert!(renamed.starts_with("cv_"));
        assert!(renamed.ends_with(".pdf"));
        assert_eq!(renamed.len(), "cv_.pdf".len() + SUFFIX_LEN);
    }

    #[tokio::test]
    async fn colliding_names_are_kept_apart() {
        let root = tempfile::tempdir().unwrap();
        let upload = root.path().join("upload.tmp");
        std::fs::write(&upload, b"resume body").unwrap();
        let storage = MediaStorage::new(root.path().join("media"));

        let first = storage.save_resume(&upload, "cv.pdf").await.unwrap();
        let second = storage.save_resume(&upload, "cv.pdf").await.unwrap();

        assert_eq!(first, "resumes/cv.pdf");
        assert_ne!(first, second);
        assert!(second.starts_with("resumes/cv_"));
        assert_eq!(std::fs::read(storage.path_of(&second)).unwrap(), b"resume body");

        storage.remove(&second).await.unwrap();
        assert!(!storage.path_of(&second).exists());
        storage.remove(&second).await.unwrap();
    }
}
