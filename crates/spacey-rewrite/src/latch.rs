// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Per-destination write latch.
//!
//! Destinations are written at most once at a time. A copy never replaces a
//! destination that is already claimed, while a write waits for the current
//! claimant and then proceeds.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Claims on destination paths, shared by all tasks of a batch
#[derive(Debug, Default)]
pub struct WriteLatch {
    claims: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl WriteLatch {
    /// Create an empty latch
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim an unclaimed destination. Returns `None` if anyone has
    /// claimed it before, whether or not they are done.
    pub fn try_claim(&self, path: &Path) -> Option<OwnedMutexGuard<()>> {
        match self.claims.entry(path.to_path_buf()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(entry) => {
                let lock = Arc::new(Mutex::new(()));
                let guard = lock.clone().try_lock_owned().ok()?;
                entry.insert(lock);
                Some(guard)
            }
        }
    }

    /// Claim a destination, waiting for any current holder to finish
    pub async fn claim(&self, path: &Path) -> OwnedMutexGuard<()> {
        let lock = self
            .claims
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn is_claimed(&self, path: &Path) -> bool {
        self.claims.contains_key(path)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.claims.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_try_claim_once() {
        let latch = WriteLatch::new();
        let path = Path::new("/out/index.mjs");
        let guard = latch.try_claim(path);
        assert!(guard.is_some());
        drop(guard);
        assert!(latch.try_claim(path).is_none());
        assert!(latch.is_claimed(path));
        assert_eq!(latch.len(), 1);
    }

    #[tokio::test]
    async fn test_write_waits_for_copy() {
        let latch = Arc::new(WriteLatch::new());
        let path = PathBuf::from("/out/index.mjs");
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let copy_guard = latch.try_claim(&path).unwrap();

        let writer = {
            let latch = latch.clone();
            let order = order.clone();
            let path = path.clone();
            tokio::spawn(async move {
                let _guard = latch.claim(&path).await;
                order.lock().push("write");
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        order.lock().push("copy");
        drop(copy_guard);

        writer.await.unwrap();
        assert_eq!(*order.lock(), vec!["copy", "write"]);
    }

    #[tokio::test]
    async fn test_copy_skips_after_write() {
        let latch = WriteLatch::new();
        let path = Path::new("/out/index.mjs");
        {
            let _guard = latch.claim(path).await;
        }
        assert!(latch.try_claim(path).is_none());
    }
}
