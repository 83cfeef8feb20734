use std::time::Duration;

use url::Url;

use crate::archive::{Archiver, ContentStore, GitHubStore};
use crate::compress::Compressor;
use crate::config::{Credentials, PipelineConfig, SiteConfig, StoreConfig};
use crate::error::{Error, Result};
use crate::{extract, sitemap};

#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub pages: usize,
    pub images_found: usize,
    pub images_compressed: usize,
    pub images_archived: usize,
}

/// The four-stage batch pipeline for one site. Constructing it performs
/// no I/O, everything happens in [`Pipeline::run`].
pub struct Pipeline<S> {
    site: SiteConfig,
    http: reqwest::Client,
    compressor: Compressor,
    archiver: Archiver<S>,
}

impl Pipeline<GitHubStore> {
    pub fn new(
        site: SiteConfig,
        conf: &PipelineConfig,
        store: StoreConfig,
        creds: &Credentials,
    ) -> anyhow::Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .gzip(true)
            .deflate(true)
            .user_agent(&conf.user_agent)
            .timeout(Duration::from_secs(conf.timeout_secs))
            .build()?;
        let compressor = Compressor::new(
            http.clone(),
            creds.tinify_key.clone(),
            Duration::from_millis(conf.shrink_delay_ms),
        );
        let store = GitHubStore::new(http.clone(), store, creds.github_token.clone());
        let archiver = Archiver::new(store, http.clone());
        Ok(Self {
            site,
            http,
            compressor,
            archiver,
        })
    }
}

impl<S: ContentStore> Pipeline<S> {
    /// Reader -> Extractor -> Compressor -> Archiver, strictly in order.
    /// Only the sitemap stage can fail the whole run; anything later is
    /// logged and skipped element by element.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        let urls = sitemap::page_urls(&self.http, &self.site.sitemap_url).await?;
        summary.pages = urls.len();

        let origin = Url::parse(&self.site.sitemap_url)
            .map_err(|e| Error::parse(&self.site.sitemap_url, e))?
            .origin()
            .ascii_serialization();

        let max_images = self.site.max_images.unwrap_or(usize::MAX);
        let images = extract::collect_images(&self.http, &origin, &urls, max_images).await;
        summary.images_found = images.len();

        let results = self.compressor.compress_all(images).await;
        summary.images_compressed = results.len();

        for result in &results {
            match self.archiver.archive(&self.site.domain_code, result).await {
                Ok(folder) => {
                    log::info!("Upload success to {folder}");
                    summary.images_archived += 1;
                }
                Err(e) => log::error!("Skipping archive of {}: {e}", result.output_url),
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Committer;

    #[test]
    fn construction_performs_no_io() {
        let site = SiteConfig {
            domain_code: "hotel".into(),
            sitemap_url: "https://example.com/sitemap.xml".into(),
            max_images: Some(1),
        };
        let store = StoreConfig {
            owner: "acme".into(),
            repo: "image-archive".into(),
            branch: "main".into(),
            committer: Committer {
                name: "Image Bot".into(),
                email: "bot@example.com".into(),
            },
        };
        let creds = Credentials {
            tinify_key: "dummy".into(),
            github_token: "dummy".into(),
        };
        // no network, no tokio runtime: building must always succeed
        Pipeline::new(site, &PipelineConfig::default(), store, &creds).unwrap();
    }
}
