use std::sync::Arc;

use tracing::{debug, warn};

use crate::storage::FileStore;

/// Outcome of a best-effort release. Reported to tracing; never turned into a
/// request failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released { path: String },
    Failed { path: String, reason: String },
}

/// Ties uploaded files to their single owning record. A record that replaces
/// or drops its image hands the stale path here; the file is removed in the
/// background and a failed removal only costs disk space, never the request.
#[derive(Clone)]
pub struct Attachments {
    files: Arc<dyn FileStore>,
}

impl Attachments {
    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self { files }
    }

    /// Fire-and-forget release. The caller's response does not wait for the
    /// file to disappear.
    pub fn release(&self, path: String) {
        let this = self.clone();
        tokio::spawn(async move {
            this.release_and_wait(path).await;
        });
    }

    /// Awaitable variant; used directly by the delete-then-save sequences in
    /// tests. The outcome is logged either way.
    pub async fn release_and_wait(&self, path: String) -> ReleaseOutcome {
        let outcome = match self.files.delete(&path).await {
            Ok(()) => ReleaseOutcome::Released { path },
            Err(e) => ReleaseOutcome::Failed {
                path,
                reason: e.to_string(),
            },
        };
        match &outcome {
            ReleaseOutcome::Released { path } => {
                debug!(%path, "attachment released");
            }
            ReleaseOutcome::Failed { path, reason } => {
                warn!(%path, %reason, "failed to release attachment");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory store: remembers saved paths, can be poisoned to fail deletes.
    struct FakeStore {
        saved: Mutex<HashSet<String>>,
        fail_deletes: bool,
    }

    impl FakeStore {
        fn new(fail_deletes: bool) -> Self {
            Self {
                saved: Mutex::new(HashSet::new()),
                fail_deletes,
            }
        }
    }

    #[async_trait]
    impl FileStore for FakeStore {
        async fn save(&self, _body: Bytes, _ct: &str) -> anyhow::Result<String> {
            let path = format!("fake/{}", uuid::Uuid::new_v4());
            self.saved.lock().unwrap().insert(path.clone());
            Ok(path)
        }

        async fn delete(&self, path: &str) -> anyhow::Result<()> {
            if self.fail_deletes {
                anyhow::bail!("disk on fire");
            }
            self.saved.lock().unwrap().remove(path);
            Ok(())
        }

        async fn exists(&self, path: &str) -> bool {
            self.saved.lock().unwrap().contains(path)
        }
    }

    #[tokio::test]
    async fn release_removes_the_file() {
        let store = Arc::new(FakeStore::new(false));
        let path = store
            .save(Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap();
        let attachments = Attachments::new(store.clone());

        let outcome = attachments.release_and_wait(path.clone()).await;
        assert_eq!(outcome, ReleaseOutcome::Released { path: path.clone() });
        assert!(!store.exists(&path).await);
    }

    #[tokio::test]
    async fn release_failure_is_reported_not_raised() {
        let store = Arc::new(FakeStore::new(true));
        let attachments = Attachments::new(store);

        // No panic, no Err: the failure is a value.
        let outcome = attachments
            .release_and_wait("fake/gone.png".into())
            .await;
        match outcome {
            ReleaseOutcome::Failed { path, reason } => {
                assert_eq!(path, "fake/gone.png");
                assert!(reason.contains("disk on fire"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fire_and_forget_does_not_block_caller() {
        let store = Arc::new(FakeStore::new(false));
        let path = store
            .save(Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap();
        let attachments = Attachments::new(store.clone());

        attachments.release(path.clone());

        // Bounded wait for the background task to run.
        for _ in 0..50 {
            if !store.exists(&path).await {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("background release never completed");
    }
}
