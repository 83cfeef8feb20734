use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures::try_join;
use serde::Deserialize;

use crate::compress::CompressionResult;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::fetch;
use crate::metadata::Metadata;

pub const ORIGINAL_FILE: &str = "image-original.png";
pub const COMPRESSED_FILE: &str = "image-compressed.png";
pub const DATA_FILE: &str = "data.json";

/// Storage segment standing in for the site root, since `/` is not a
/// legal folder name in the store.
const HOME_SEGMENT: &str = "/_home";

/// A version-controlled remote object store addressed by path.
#[async_trait]
pub trait ContentStore {
    /// Content identity of the object at `path`, or `None` when absent.
    async fn content_sha(&self, path: &str) -> Result<Option<String>>;

    /// Creates the object, or updates it when `sha` names its current
    /// content identity.
    async fn put(
        &self,
        path: &str,
        content: String,
        message: &str,
        sha: Option<String>,
    ) -> Result<()>;

    /// Browsable URL for `path`.
    fn archive_url(&self, path: &str) -> String;
}

/// Folder holding the three objects of one archived image.
pub fn storage_folder(domain_code: &str, page_path: &str, image_file_name: &str) -> String {
    let page_path = if page_path == "/" || page_path.is_empty() {
        HOME_SEGMENT
    } else {
        page_path.trim_end_matches('/')
    };
    format!("domains/{domain_code}{page_path}/{image_file_name}")
}

/// The service's own identifier for the compressed asset, i.e. the last
/// segment of its output URL.
pub fn image_file_name(output_url: &str) -> String {
    output_url
        .rsplit('/')
        .next()
        .unwrap_or(output_url)
        .to_string()
}

pub struct Archiver<S> {
    store: S,
    http: reqwest::Client,
}

impl<S: ContentStore> Archiver<S> {
    pub fn new(store: S, http: reqwest::Client) -> Self {
        Self { store, http }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Archives one compressed image: downloads both payloads, then writes
    /// the original, the compressed copy and the metadata document
    /// together. Returns the browsable folder URL.
    pub async fn archive(&self, domain_code: &str, result: &CompressionResult) -> Result<String> {
        let folder = storage_folder(
            domain_code,
            &result.image.page_path,
            &image_file_name(&result.output_url),
        );
        let archive_folder = self.store.archive_url(&folder);

        let (original, compressed) = try_join!(
            fetch::fetch_bytes(&self.http, &result.image.url),
            fetch::fetch_bytes(&self.http, &result.output_url),
        )?;

        let metadata = Metadata::new(result, &archive_folder);
        let data = serde_json::to_vec_pretty(&metadata).map_err(|e| Error::Upload {
            path: format!("{folder}/{DATA_FILE}"),
            reason: e.to_string(),
        })?;

        let original_path = format!("{folder}/{ORIGINAL_FILE}");
        let compressed_path = format!("{folder}/{COMPRESSED_FILE}");
        let data_path = format!("{folder}/{DATA_FILE}");
        try_join!(
            self.store_object(&original_path, BASE64.encode(&original), "Original image"),
            self.store_object(
                &compressed_path,
                BASE64.encode(&compressed),
                "Compressed image",
            ),
            self.store_object(&data_path, BASE64.encode(&data), "Data"),
        )?;

        Ok(archive_folder)
    }

    /// Create-or-update write: an existing object's sha turns the write
    /// into an update. A failed sha lookup is logged and treated as "no
    /// prior version", which may then surface as an upload conflict.
    pub async fn store_object(&self, path: &str, content: String, message: &str) -> Result<()> {
        let sha = match self.store.content_sha(path).await {
            Ok(sha) => sha,
            Err(e) => {
                log::warn!("Assuming no prior version at {path}: {e}");
                None
            }
        };
        self.store.put(path, content, message, sha).await
    }
}

/// `ContentStore` backed by the GitHub contents API.
pub struct GitHubStore {
    http: reqwest::Client,
    conf: StoreConfig,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ContentInfo {
    sha: String,
}

impl GitHubStore {
    pub fn new(http: reqwest::Client, conf: StoreConfig, token: String) -> Self {
        Self { http, conf, token }
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "https://api.github.com/repos/{}/{}/contents/{}",
            self.conf.owner, self.conf.repo, path
        )
    }
}

#[async_trait]
impl ContentStore for GitHubStore {
    async fn content_sha(&self, path: &str) -> Result<Option<String>> {
        let lookup_err = |reason: String| Error::StorageLookup {
            path: path.to_string(),
            reason,
        };

        let resp = self
            .http
            .get(self.contents_url(path))
            .query(&[("ref", self.conf.branch.as_str())])
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| lookup_err(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(lookup_err(format!("status {}", resp.status())));
        }

        let info: ContentInfo = resp.json().await.map_err(|e| lookup_err(e.to_string()))?;
        Ok(Some(info.sha))
    }

    async fn put(
        &self,
        path: &str,
        content: String,
        message: &str,
        sha: Option<String>,
    ) -> Result<()> {
        let identity = serde_json::json!({
            "name": self.conf.committer.name,
            "email": self.conf.committer.email,
        });
        let mut body = serde_json::json!({
            "message": message,
            "content": content,
            "branch": self.conf.branch,
            "committer": identity.clone(),
            "author": identity,
        });
        if let Some(sha) = sha {
            body["sha"] = serde_json::Value::String(sha);
        }

        let resp = self
            .http
            .put(self.contents_url(path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upload {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let reason = resp
                .text()
                .await
                .unwrap_or_else(|_| format!("status {status}"));
            return Err(Error::Upload {
                path: path.to_string(),
                reason,
            });
        }
        Ok(())
    }

    fn archive_url(&self, path: &str) -> String {
        format!(
            "https://github.com/{}/{}/blob/{}/{}",
            self.conf.owner, self.conf.repo, self.conf.branch, path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_path_maps_to_the_home_sentinel() {
        assert_eq!(
            storage_folder("hotel", "/", "abc123.png"),
            "domains/hotel/_home/abc123.png"
        );
        assert_eq!(
            storage_folder("hotel", "", "abc123.png"),
            "domains/hotel/_home/abc123.png"
        );
    }

    #[test]
    fn nested_paths_keep_their_segments() {
        assert_eq!(
            storage_folder("hotel", "/rooms/suite/", "abc123.png"),
            "domains/hotel/rooms/suite/abc123.png"
        );
        assert_eq!(
            storage_folder("hotel", "/rooms", "abc123.png"),
            "domains/hotel/rooms/abc123.png"
        );
    }

    #[test]
    fn file_name_is_the_service_output_identifier() {
        assert_eq!(
            image_file_name("https://api.tinify.com/output/abc123.png"),
            "abc123.png"
        );
    }
}
