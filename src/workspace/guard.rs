use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::{CoreError, CoreResult};

/// Paths with an operation in progress.
#[derive(Debug, Default)]
pub struct InFlight {
    paths: Mutex<HashSet<String>>,
}

impl InFlight {
    /// Claim `path` until the returned guard drops.
    pub fn acquire(&self, path: &str) -> CoreResult<PathGuard<'_>> {
        let mut paths = self.paths.lock().unwrap_or_else(|e| e.into_inner());
        if !paths.insert(path.to_string()) {
            return Err(CoreError::PathBusy(path.to_string()));
        }
        Ok(PathGuard {
            owner: self,
            path: path.to_string(),
        })
    }

    pub fn is_busy(&self, path: &str) -> bool {
        self.paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(path)
    }
}

#[derive(Debug)]
pub struct PathGuard<'a> {
    owner: &'a InFlight,
    path: String,
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.path);
    }
}
