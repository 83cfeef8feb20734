use std::io::prelude::*;

use flate2::read::GzDecoder;
use reqwest::header::CONTENT_TYPE;

use crate::error::{Error, Result};

pub(crate) async fn fetch_text(http: &reqwest::Client, url: &str) -> Result<String> {
    let resp = http
        .get(url)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|e| Error::fetch(url, e))?;

    match resp.headers().get(CONTENT_TYPE) {
        Some(c) if c == "application/x-gzip" || c == "application/gzip" => {
            let compressed = resp.bytes().await.map_err(|e| Error::fetch(url, e))?;
            let mut gz = GzDecoder::new(&compressed[..]);
            let mut body = String::new();
            gz.read_to_string(&mut body)
                .map_err(|e| Error::parse(url, e))?;
            Ok(body)
        }
        _ => resp.text().await.map_err(|e| Error::fetch(url, e)),
    }
}

pub(crate) async fn fetch_bytes(http: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let resp = http
        .get(url)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|e| Error::fetch(url, e))?;

    let bytes = resp.bytes().await.map_err(|e| Error::fetch(url, e))?;
    Ok(bytes.to_vec())
}
