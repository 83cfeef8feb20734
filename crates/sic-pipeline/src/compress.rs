use std::time::Duration;

use serde::Deserialize;
use tokio::time::sleep;

use crate::error::{Error, Result};
use crate::extract::ImageRef;

const SHRINK_URL: &str = "https://api.tinify.com/shrink";

/// Response of the compression service's `/shrink` endpoint.
#[derive(Debug, Deserialize)]
pub struct ShrinkResponse {
    pub input: ShrinkInput,
    pub output: ShrinkOutput,
}

#[derive(Debug, Deserialize)]
pub struct ShrinkInput {
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ShrinkOutput {
    pub url: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub ratio: f64,
    pub width: u64,
    pub height: u64,
}

/// One compressed image: the original reference plus the service's size,
/// location and ratio data, with the byte savings derived up front.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub image: ImageRef,
    pub input_size: u64,
    pub input_type: String,
    pub output_url: String,
    pub output_size: u64,
    pub output_type: String,
    pub output_width: u64,
    pub output_height: u64,
    pub saved_bytes: u64,
    pub saved_percent: f64,
}

impl CompressionResult {
    pub fn new(image: ImageRef, resp: ShrinkResponse) -> Self {
        Self {
            saved_bytes: resp.input.size.saturating_sub(resp.output.size),
            saved_percent: 100.0 - resp.output.ratio * 100.0,
            input_size: resp.input.size,
            input_type: resp.input.mime_type,
            output_url: resp.output.url,
            output_size: resp.output.size,
            output_type: resp.output.mime_type,
            output_width: resp.output.width,
            output_height: resp.output.height,
            image,
        }
    }
}

pub struct Compressor {
    http: reqwest::Client,
    api_key: String,
    delay: Duration,
}

impl Compressor {
    pub fn new(http: reqwest::Client, api_key: String, delay: Duration) -> Self {
        Self {
            http,
            api_key,
            delay,
        }
    }

    /// Submits one image URL to the service. The service fetches the bytes
    /// itself, the request only carries the URL.
    pub async fn shrink(&self, image: ImageRef) -> Result<CompressionResult> {
        let resp = self
            .http
            .post(SHRINK_URL)
            .basic_auth("api", Some(&self.api_key))
            .json(&serde_json::json!({ "source": { "url": image.url.as_str() } }))
            .send()
            .await
            .map_err(|e| Error::fetch(&image.url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::Service {
                url: image.url,
                status: status.as_u16(),
                message,
            });
        }

        let shrunk: ShrinkResponse = resp
            .json()
            .await
            .map_err(|e| Error::parse(&image.url, e))?;
        Ok(CompressionResult::new(image, shrunk))
    }

    /// Compresses images one at a time, with the configured delay between
    /// consecutive submissions. Failed images are logged and omitted from
    /// the output, order is otherwise preserved.
    pub async fn compress_all(&self, images: Vec<ImageRef>) -> Vec<CompressionResult> {
        let mut results = Vec::with_capacity(images.len());
        let mut first = true;
        for image in images {
            if !first {
                sleep(self.delay).await;
            }
            first = false;

            let url = image.url.clone();
            match self.shrink(image).await {
                Ok(result) => results.push(result),
                Err(e) => log::warn!("Skipping image {url}: {e}"),
            }
        }
        results
    }
}
