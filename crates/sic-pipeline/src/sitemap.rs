use lazy_static::lazy_static;
use sxd_document::parser;

use crate::error::{Error, Result};
use crate::fetch;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

lazy_static! {
    static ref XP_FACTORY: sxd_xpath::Factory = sxd_xpath::Factory::new();
}

/// Downloads a sitemap and returns its page URLs in document order.
///
/// Any failure here is fatal to the run, there is no skip policy at the
/// sitemap level.
pub async fn page_urls(http: &reqwest::Client, sitemap_url: &str) -> Result<Vec<String>> {
    let xml = fetch::fetch_text(http, sitemap_url).await?;
    parse_urlset(sitemap_url, &xml)
}

/// Extracts the trimmed `<loc>` values of a `<urlset>` document.
pub fn parse_urlset(sitemap_url: &str, xml: &str) -> Result<Vec<String>> {
    let package = parser::parse(xml).map_err(|e| Error::parse(sitemap_url, e))?;
    let document = package.as_document();

    let root_kind = document
        .root()
        .children()
        .into_iter()
        .find_map(|c| c.element())
        .map(|el| el.name().local_part().to_string());
    match root_kind.as_deref() {
        Some("urlset") => (),
        Some(other) => {
            return Err(Error::parse(
                sitemap_url,
                format!("expected a urlset root, got {other}"),
            ))
        }
        None => return Err(Error::parse(sitemap_url, "document has no root element")),
    }

    let mut context = sxd_xpath::Context::new();
    context.set_namespace("sm", SITEMAP_NS);
    let xpath = XP_FACTORY
        .build("//sm:loc")
        .map_err(|e| Error::parse(sitemap_url, e))?
        .ok_or_else(|| Error::parse(sitemap_url, "missing XPath"))?;
    let value = xpath
        .evaluate(&context, document.root())
        .map_err(|e| Error::parse(sitemap_url, e))?;

    let mut urls = Vec::new();
    if let sxd_xpath::Value::Nodeset(nodes) = value {
        for node in nodes.document_order() {
            urls.push(node.string_value().trim().to_string());
        }
    }
    Ok(urls)
}
