//! Feed error types.

/// Errors produced while fetching or decoding one of the upstream feeds.
///
/// None of these are fatal: the session turns them into a message on the
/// panel that owns the feed and keeps polling.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The configured station name matched no known site.
    #[error("hittade ingen hållplats som heter {0:?}")]
    StationNotFound(String),

    /// Upstream answered with a non-success status.
    #[error("{feed}: {status}")]
    Status { feed: &'static str, status: u16 },

    /// Request failed before a response arrived.
    #[error("{feed}: {source}")]
    Http {
        feed: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Response body was not the JSON we expected.
    #[error("{feed}: oväntat svar ({message})")]
    Decode { feed: &'static str, message: String },

    /// Calendar document was not recognisable.
    #[error("{0}")]
    Parse(String),

    /// Calendar host could not be reached at all.
    #[error("Kalendern kunde inte nås. Kontrollera adressen eller kör via reläet.")]
    Unreachable(#[source] reqwest::Error),
}

impl FeedError {
    pub fn http(feed: &'static str, source: reqwest::Error) -> Self {
        FeedError::Http { feed, source }
    }

    pub fn decode(feed: &'static str, err: impl std::fmt::Display) -> Self {
        FeedError::Decode {
            feed,
            message: err.to_string(),
        }
    }
}
