//! The capability contract every probed adapter implements.

use crate::Result;
use conform_types::{AdapterInfo, Capabilities, Query, ResultItem};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Body of a downloaded link.
///
/// The stream is released when this value is dropped.
pub struct Download {
    pub body: Pin<Box<dyn AsyncRead + Send>>,

    /// Expected length in bytes, if the adapter knows it
    pub size_hint: Option<u64>,
}

impl Download {
    pub fn new(body: impl AsyncRead + Send + 'static) -> Self {
        Self {
            body: Box::pin(body),
            size_hint: None,
        }
    }

    #[must_use]
    pub fn with_size_hint(mut self, size: u64) -> Self {
        self.size_hint = Some(size);
        self
    }
}

impl fmt::Debug for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Download")
            .field("size_hint", &self.size_hint)
            .finish_non_exhaustive()
    }
}

/// A search provider adapter.
///
/// The conformance engine only ever reads and invokes an adapter; it never
/// reassigns it. Operations are awaited one at a time.
pub trait Adapter {
    fn info(&self) -> &AdapterInfo;

    fn capabilities(&self) -> Capabilities;

    /// Whether the adapter needs credentials and a login before searching
    fn requires_login(&self) -> bool;

    /// Check that every setting needed to log in is present.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ConfigMissing`] naming the absent settings.
    fn check_has_config(&self) -> Result<()>;

    /// Log in with the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LoginFailed`] on bad or missing credentials.
    fn login(&self) -> impl Future<Output = Result<()>> + Send;

    /// Run a search.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SearchFailed`] on transport or parsing errors.
    fn search(&self, query: &Query) -> impl Future<Output = Result<Vec<ResultItem>>> + Send;

    /// Open the content behind a result link.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DownloadFailed`] if the link cannot be fetched.
    fn download(&self, link: &str) -> impl Future<Output = Result<Download>> + Send;

    /// Report the account ratio.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RatioFailed`] if the ratio cannot be read.
    fn ratio(&self) -> impl Future<Output = Result<String>> + Send;
}
