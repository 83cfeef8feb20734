/// Pipeline failures, each carrying the URL or storage path it relates to.
///
/// Only sitemap-level `Fetch`/`Parse` errors abort a run; every other kind
/// is logged at its stage boundary and the offending element is skipped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("couldn't fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("couldn't parse {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("compression service failed on {url}: {status} {message}")]
    Service {
        url: String,
        status: u16,
        message: String,
    },

    #[error("couldn't look up content at {path}: {reason}")]
    StorageLookup { path: String, reason: String },

    #[error("couldn't upload {path}: {reason}")]
    Upload { path: String, reason: String },
}

impl Error {
    pub(crate) fn fetch(url: &str, source: reqwest::Error) -> Self {
        Self::Fetch {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn parse(url: &str, reason: impl ToString) -> Self {
        Self::Parse {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
