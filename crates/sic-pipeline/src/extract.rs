use lazy_static::lazy_static;
use scraper::{Html, Selector};
use url::Url;

use crate::fetch;

lazy_static! {
    static ref IMG_SELECTOR: Selector = Selector::parse("img").unwrap();
}

/// One discovered `<img>` element, with its source resolved to an absolute
/// URL and its display attributes defaulted to `""` when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    pub page_path: String,
    pub alt: String,
    pub title: String,
    pub width: String,
    pub height: String,
    pub loading: String,
}

/// Fetches every page in order and returns the flattened image sequence,
/// capped at `max_images`. A page that fails to download is logged and
/// skipped, it never aborts the batch.
pub async fn collect_images(
    http: &reqwest::Client,
    origin: &str,
    page_urls: &[String],
    max_images: usize,
) -> Vec<ImageRef> {
    let mut images = Vec::new();
    for page_url in page_urls {
        if images.len() >= max_images {
            break;
        }
        let html = match fetch::fetch_text(http, page_url).await {
            Ok(html) => html,
            Err(e) => {
                log::warn!("Skipping page {page_url}: {e}");
                continue;
            }
        };
        let page_path = match Url::parse(page_url) {
            Ok(url) => url.path().to_string(),
            Err(e) => {
                log::warn!("Skipping page {page_url}: {e}");
                continue;
            }
        };
        append_images(&html, &page_path, origin, max_images, &mut images);
    }
    images
}

/// Appends the page's raster images to `out`, in element order, stopping
/// once `out` holds `max_images` entries.
pub(crate) fn append_images(
    html: &str,
    page_path: &str,
    origin: &str,
    max_images: usize,
    out: &mut Vec<ImageRef>,
) {
    let doc = Html::parse_document(html);
    for el in doc.select(&IMG_SELECTOR) {
        if out.len() >= max_images {
            return;
        }
        let src = el.value().attr("src").unwrap_or_default();
        if src.is_empty() || is_vector(src) {
            continue;
        }
        let attr = |name| el.value().attr(name).unwrap_or_default().to_string();
        out.push(ImageRef {
            url: resolve_src(origin, src),
            page_path: page_path.to_string(),
            alt: attr("alt"),
            title: attr("title"),
            width: attr("width"),
            height: attr("height"),
            loading: attr("loading"),
        });
    }
}

/// Resolves an `img` source against the sitemap origin and removes any
/// embedded whitespace from the result.
pub fn resolve_src(origin: &str, src: &str) -> String {
    let resolved = if src.starts_with('/') {
        format!("{origin}{src}")
    } else if src.starts_with("http://") || src.starts_with("https://") {
        src.to_string()
    } else {
        format!("{origin}/{src}")
    };
    resolved.split_whitespace().collect()
}

fn is_vector(src: &str) -> bool {
    src.trim_end().to_ascii_lowercase().ends_with(".svg")
}
