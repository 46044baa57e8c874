//! Ownership and release of a job's transient files.
//!
//! Every path a job creates (uploads, downloads, intermediates, list files,
//! the final artifact) is registered here at creation time. Release is
//! idempotent: a path that is already gone, or no longer owned, is a no-op.
//! Dropping the janitor releases whatever is still owned, so cleanup holds on
//! every exit path including panics and cancelled requests.
//!
//! The final artifact is detached into an [`Artifact`] before the bulk
//! release and is only removed once delivery reports completion.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Tracks every transient path owned by one job.
#[derive(Debug)]
pub struct Janitor {
    work_dir: PathBuf,
    owned: Mutex<Vec<PathBuf>>,
}

impl Janitor {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            owned: Mutex::new(Vec::new()),
        }
    }

    fn owned(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.owned.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reserve a unique path in the work directory and take ownership of it.
    ///
    /// An empty extension yields a path without one.
    pub fn allocate(&self, extension: &str) -> PathBuf {
        let name = if extension.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            format!("{}.{}", Uuid::new_v4(), extension)
        };
        let path = self.work_dir.join(name);
        self.register(path.clone());
        path
    }

    /// Take ownership of an existing (or about to exist) path.
    pub fn register(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let mut owned = self.owned();
        if !owned.contains(&path) {
            debug!(path = %path.display(), "Registered transient file");
            owned.push(path);
        }
    }

    pub fn owns(&self, path: &Path) -> bool {
        self.owned().iter().any(|p| p == path)
    }

    /// Paths currently owned, in registration order.
    pub fn owned_paths(&self) -> Vec<PathBuf> {
        self.owned().clone()
    }

    /// Release one owned path. Never fails; unknown or missing paths are ignored.
    pub fn release(&self, path: &Path) {
        let was_owned = {
            let mut owned = self.owned();
            match owned.iter().position(|p| p == path) {
                Some(idx) => {
                    owned.remove(idx);
                    true
                }
                None => false,
            }
        };

        if was_owned {
            remove_quietly(path);
        }
    }

    /// Release every owned path. Returns how many were owned.
    pub fn release_all(&self) -> usize {
        let paths = std::mem::take(&mut *self.owned());
        for path in &paths {
            remove_quietly(path);
        }
        if !paths.is_empty() {
            debug!(count = paths.len(), "Released transient files");
        }
        paths.len()
    }

    /// Hand the final artifact over to delivery, excluding it from bulk release.
    pub fn detach(&self, path: &Path) -> Artifact {
        {
            let mut owned = self.owned();
            owned.retain(|p| p != path);
        }
        Artifact::new(path.to_path_buf())
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        let leftover = self.release_all();
        if leftover > 0 {
            warn!(count = leftover, "Janitor dropped with owned files; released them");
        }
    }
}

/// How delivery of an artifact ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
}

/// A finalized output awaiting delivery. Removed on completion or drop.
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
    released: bool,
}

impl Artifact {
    pub fn new(path: PathBuf) -> Self {
        Self { path, released: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Completion callback from the delivery layer. Always releases the file.
    pub fn complete(mut self, outcome: DeliveryOutcome) {
        match &outcome {
            DeliveryOutcome::Delivered => {
                info!(file = %self.path.display(), "Artifact delivered");
            }
            DeliveryOutcome::Failed(reason) => {
                error!(file = %self.path.display(), error = %reason, "Artifact delivery failed");
            }
        }
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        remove_quietly(&self.path);
        info!(file = %self.path.display(), "Deleted artifact");
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        self.release();
    }
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed transient file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove transient file"),
    }
}
