use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sic_pipeline::{Archiver, ContentStore, Error, Result};

/// In-memory store with git-like update semantics: a blind create over an
/// existing object, or an update with a stale sha, is a conflict.
#[derive(Default)]
struct MemoryStore {
    objects: Mutex<HashMap<String, (String, String)>>, // path -> (sha, content)
    revision: Mutex<u64>,
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn content_sha(&self, path: &str) -> Result<Option<String>> {
        let objects = self.objects.lock().unwrap();
        Ok(objects.get(path).map(|(sha, _)| sha.clone()))
    }

    async fn put(
        &self,
        path: &str,
        content: String,
        _message: &str,
        sha: Option<String>,
    ) -> Result<()> {
        let mut objects = self.objects.lock().unwrap();
        let current = objects.get(path).map(|(sha, _)| sha.clone());
        if current != sha {
            return Err(Error::Upload {
                path: path.to_string(),
                reason: format!("sha conflict: expected {current:?}, got {sha:?}"),
            });
        }
        let mut revision = self.revision.lock().unwrap();
        *revision += 1;
        objects.insert(path.to_string(), (format!("sha-{revision}"), content));
        Ok(())
    }

    fn archive_url(&self, path: &str) -> String {
        format!("memory://{path}")
    }
}

/// Store whose lookups always fail for a reason other than "not found".
struct BrokenLookupStore(MemoryStore);

#[async_trait]
impl ContentStore for BrokenLookupStore {
    async fn content_sha(&self, path: &str) -> Result<Option<String>> {
        Err(Error::StorageLookup {
            path: path.to_string(),
            reason: "boom".into(),
        })
    }

    async fn put(&self, path: &str, content: String, message: &str, sha: Option<String>) -> Result<()> {
        self.0.put(path, content, message, sha).await
    }

    fn archive_url(&self, path: &str) -> String {
        self.0.archive_url(path)
    }
}

fn archiver<S: ContentStore>(store: S) -> Archiver<S> {
    Archiver::new(store, reqwest::Client::new())
}

#[tokio::test]
async fn repeated_writes_update_in_place() {
    let archiver = archiver(MemoryStore::default());
    let path = "domains/hotel/_home/abc123.png/data.json";

    archiver
        .store_object(path, "Zmlyc3Q=".into(), "Data")
        .await
        .unwrap();
    archiver
        .store_object(path, "c2Vjb25k".into(), "Data")
        .await
        .unwrap();

    // one logical object, holding the latest content
    let sha = archiver.store().content_sha(path).await.unwrap();
    assert_eq!(sha.as_deref(), Some("sha-2"));
    assert_eq!(archiver.store().object_count(), 1);
    assert_eq!(archiver.store().content(path).as_deref(), Some("c2Vjb25k"));
}

#[tokio::test]
async fn lookup_failure_falls_back_to_create() {
    let archiver = archiver(BrokenLookupStore(MemoryStore::default()));
    let path = "domains/hotel/rooms/abc123.png/image-original.png";

    // the broken lookup is logged and ignored, the write lands as a create
    archiver
        .store_object(path, "Zmlyc3Q=".into(), "Original image")
        .await
        .unwrap();
    assert_eq!(archiver.store().0.object_count(), 1);

    // a second pass now hits the conflict the lookup would have avoided
    let err = archiver
        .store_object(path, "c2Vjb25k".into(), "Original image")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Upload { .. }));
}

impl MemoryStore {
    fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn content(&self, path: &str) -> Option<String> {
        let objects = self.objects.lock().unwrap();
        objects.get(path).map(|(_, content)| content.clone())
    }
}
