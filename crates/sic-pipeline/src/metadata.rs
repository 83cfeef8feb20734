use serde::Serialize;

use crate::archive::{COMPRESSED_FILE, ORIGINAL_FILE};
use crate::compress::CompressionResult;

/// The `data.json` document stored next to each archived image pair.
#[derive(Debug, Serialize)]
pub struct Metadata {
    pub original_image: OriginalImage,
    pub compressed_image: CompressedImage,
    pub info: Info,
}

#[derive(Debug, Serialize)]
pub struct OriginalImage {
    pub website_file: String,
    pub archive_file: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub attributes: Attributes,
}

#[derive(Debug, Serialize)]
pub struct CompressedImage {
    pub archive_file: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attributes {
    pub title: String,
    pub alt: String,
    pub width: String,
    pub height: String,
    pub loading: String,
}

#[derive(Debug, Serialize)]
pub struct Info {
    pub archive_folder: String,
    pub saved_bytes: u64,
    pub saved_percent: f64,
    pub saved_milliseconds: SavedMilliseconds,
    pub image_width: u64,
    pub image_height: u64,
}

/// Transfer time saved at common connection speeds.
#[derive(Debug, Serialize)]
pub struct SavedMilliseconds {
    #[serde(rename = "25_mbps")]
    pub mbps_25: u64,
    #[serde(rename = "50_mbps")]
    pub mbps_50: u64,
    #[serde(rename = "75_mbps")]
    pub mbps_75: u64,
    #[serde(rename = "100_mbps")]
    pub mbps_100: u64,
    #[serde(rename = "125_mbps")]
    pub mbps_125: u64,
    #[serde(rename = "150_mbps")]
    pub mbps_150: u64,
}

impl SavedMilliseconds {
    pub fn new(saved_bytes: u64) -> Self {
        Self {
            mbps_25: milliseconds_saved(saved_bytes, 25),
            mbps_50: milliseconds_saved(saved_bytes, 50),
            mbps_75: milliseconds_saved(saved_bytes, 75),
            mbps_100: milliseconds_saved(saved_bytes, 100),
            mbps_125: milliseconds_saved(saved_bytes, 125),
            mbps_150: milliseconds_saved(saved_bytes, 150),
        }
    }
}

/// Milliseconds needed to transfer `saved_bytes` at `mbps` (1 Mbps =
/// 125000 bytes/s), rounded to the nearest integer.
pub fn milliseconds_saved(saved_bytes: u64, mbps: u64) -> u64 {
    let speed_bytes_per_second = (mbps * 125_000) as f64;
    (saved_bytes as f64 / speed_bytes_per_second * 1000.0).round() as u64
}

impl Metadata {
    pub fn new(result: &CompressionResult, archive_folder: &str) -> Self {
        let attributes = Attributes {
            title: result.image.title.clone(),
            alt: result.image.alt.clone(),
            width: result.image.width.clone(),
            height: result.image.height.clone(),
            loading: result.image.loading.clone(),
        };
        Self {
            original_image: OriginalImage {
                website_file: result.image.url.clone(),
                archive_file: format!("{archive_folder}/{ORIGINAL_FILE}"),
                size: result.input_size,
                mime_type: result.input_type.clone(),
                attributes: attributes.clone(),
            },
            compressed_image: CompressedImage {
                archive_file: format!("{archive_folder}/{COMPRESSED_FILE}"),
                size: result.output_size,
                mime_type: result.output_type.clone(),
                attributes,
            },
            info: Info {
                archive_folder: archive_folder.to_string(),
                saved_bytes: result.saved_bytes,
                saved_percent: result.saved_percent,
                saved_milliseconds: SavedMilliseconds::new(result.saved_bytes),
                image_width: result.output_width,
                image_height: result.output_height,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ImageRef;

    #[test]
    fn milliseconds_follow_connection_speed() {
        // 25 Mbps = 3_125_000 bytes/s
        assert_eq!(milliseconds_saved(1_000_000, 25), 320);
        assert_eq!(milliseconds_saved(1_000_000, 50), 160);
        assert_eq!(milliseconds_saved(1_000_000, 150), 53);
        assert_eq!(milliseconds_saved(0, 25), 0);
    }

    fn sample_result() -> CompressionResult {
        CompressionResult {
            image: ImageRef {
                url: "https://example.com/logo.png".into(),
                page_path: "/".into(),
                alt: "Logo".into(),
                title: String::new(),
                width: "120".into(),
                height: "40".into(),
                loading: "lazy".into(),
            },
            input_size: 1000,
            input_type: "image/png".into(),
            output_url: "https://api.tinify.com/output/abc123.png".into(),
            output_size: 400,
            output_type: "image/png".into(),
            output_width: 100,
            output_height: 60,
            saved_bytes: 600,
            saved_percent: 60.0,
        }
    }

    #[test]
    fn document_uses_the_wire_field_names() {
        let folder = "https://github.com/acme/image-archive/blob/main/domains/d/_home/abc123.png";
        let metadata = Metadata::new(&sample_result(), folder);
        let value = serde_json::to_value(&metadata).unwrap();

        assert_eq!(value["original_image"]["type"], "image/png");
        assert_eq!(
            value["original_image"]["website_file"],
            "https://example.com/logo.png"
        );
        assert_eq!(
            value["original_image"]["archive_file"],
            format!("{folder}/image-original.png")
        );
        assert_eq!(
            value["compressed_image"]["archive_file"],
            format!("{folder}/image-compressed.png")
        );
        assert_eq!(value["compressed_image"]["attributes"]["alt"], "Logo");
        assert_eq!(value["compressed_image"]["attributes"]["loading"], "lazy");
        assert_eq!(value["info"]["archive_folder"], folder);
        assert_eq!(value["info"]["saved_bytes"], 600);
        assert_eq!(value["info"]["saved_milliseconds"]["25_mbps"], 0);
        assert_eq!(value["info"]["image_width"], 100);
    }
}
