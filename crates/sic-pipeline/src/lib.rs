mod archive;
mod compress;
mod config;
mod error;
mod extract;
mod fetch;
mod metadata;
mod pipeline;
mod sitemap;

pub use archive::{
    image_file_name, storage_folder, Archiver, ContentStore, GitHubStore, COMPRESSED_FILE,
    DATA_FILE, ORIGINAL_FILE,
};
pub use compress::{CompressionResult, Compressor, ShrinkInput, ShrinkOutput, ShrinkResponse};
pub use config::{Committer, Credentials, PipelineConfig, SiteConfig, StoreConfig};
pub use error::{Error, Result};
pub use extract::{collect_images, resolve_src, ImageRef};
pub use metadata::{milliseconds_saved, Metadata};
pub use pipeline::{Pipeline, RunSummary};
pub use sitemap::{page_urls, parse_urlset};
