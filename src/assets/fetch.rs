use std::{
    collections::{HashMap, HashSet},
    path::{Component, Path, PathBuf},
    sync::{Condvar, Mutex, MutexGuard},
};

use anyhow::Context as _;

use crate::foundation::error::{FilmrollError, FilmrollResult};

/// Source of encoded frame bytes, addressed by asset path (`/frames/frame-001.jpg`).
///
/// Fetches may run on worker threads, so implementations must be `Send + Sync`. A fetch
/// that never returns only ever stalls its own slot.
pub trait FrameFetcher: Send + Sync {
    fn fetch(&self, asset_path: &str) -> FilmrollResult<Vec<u8>>;
}

/// Serve asset paths from a directory on disk.
#[derive(Clone, Debug)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an asset path onto the root. Absolute and parent components are rejected.
    pub fn resolve(&self, asset_path: &str) -> FilmrollResult<PathBuf> {
        let rel = Path::new(asset_path.trim_start_matches('/'));
        let mut out = self.root.clone();
        for comp in rel.components() {
            match comp {
                Component::Normal(seg) => out.push(seg),
                Component::CurDir => {}
                _ => {
                    return Err(FilmrollError::asset(format!(
                        "asset path '{asset_path}' escapes the asset root"
                    )));
                }
            }
        }
        Ok(out)
    }
}

impl FrameFetcher for DirFetcher {
    fn fetch(&self, asset_path: &str) -> FilmrollResult<Vec<u8>> {
        let path = self.resolve(asset_path)?;
        let bytes =
            std::fs::read(&path).with_context(|| format!("read frame '{}'", path.display()))?;
        Ok(bytes)
    }
}

#[derive(Default)]
struct MemoryState {
    files: HashMap<String, Vec<u8>>,
    gated: HashSet<String>,
    log: Vec<String>,
}

/// In-memory fetcher with a request log.
///
/// A gated path blocks its fetch until [`MemoryFetcher::release`] is called, which is
/// how a slow network response is modelled.
#[derive(Default)]
pub struct MemoryFetcher {
    state: Mutex<MemoryState>,
    released: Condvar,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking fetch must not wedge every other slot.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert(&self, asset_path: impl Into<String>, bytes: Vec<u8>) {
        self.lock().files.insert(asset_path.into(), bytes);
    }

    pub fn remove(&self, asset_path: &str) -> Option<Vec<u8>> {
        self.lock().files.remove(asset_path)
    }

    /// Hold fetches of `asset_path` until released.
    pub fn gate(&self, asset_path: impl Into<String>) {
        self.lock().gated.insert(asset_path.into());
    }

    pub fn release(&self, asset_path: &str) {
        self.lock().gated.remove(asset_path);
        self.released.notify_all();
    }

    /// Every path requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    pub fn request_count(&self, asset_path: &str) -> usize {
        self.lock().log.iter().filter(|p| *p == asset_path).count()
    }

    pub fn clear_requests(&self) {
        self.lock().log.clear();
    }
}

impl FrameFetcher for MemoryFetcher {
    fn fetch(&self, asset_path: &str) -> FilmrollResult<Vec<u8>> {
        let mut state = self.lock();
        state.log.push(asset_path.to_string());
        while state.gated.contains(asset_path) {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
        state
            .files
            .get(asset_path)
            .cloned()
            .ok_or_else(|| FilmrollError::asset(format!("no such frame '{asset_path}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
