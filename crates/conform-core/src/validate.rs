//! Structural checks on search results returned by an adapter.

use crate::adapter::Adapter;
use crate::{Error, Result};
use conform_types::ResultItem;
use tracing::debug;
use url::{ParseError, Url};

/// Link schemes that are presumed valid without being fetched
const NO_FETCH_SCHEMES: &[&str] = &["magnet"];

/// Check a single result's required fields. `index` is 1-based.
///
/// # Errors
///
/// Returns [`Error::InvalidResult`] for the first empty or zero field.
pub fn check_result(index: usize, result: &ResultItem) -> Result<()> {
    match result.missing_field() {
        Some(field) => {
            debug!("Result row {index} ({:?}) failed the {field} check", result.title);
            Err(Error::InvalidResult { index, field })
        }
        None => Ok(()),
    }
}

/// Check the required fields of every result, without any network access.
///
/// # Errors
///
/// Returns [`Error::InvalidResult`] for the first offending result.
pub fn check_results(results: &[ResultItem]) -> Result<()> {
    results
        .iter()
        .enumerate()
        .try_for_each(|(idx, result)| check_result(idx + 1, result))
}

/// Whether a link has to be fetched to be verified. Relative links carry no
/// scheme and are always fetched; resolving them is up to the adapter.
///
/// # Errors
///
/// Returns [`Error::DownloadFailed`] if the link cannot be parsed at all.
pub fn needs_fetch(link: &str) -> Result<bool> {
    match Url::parse(link) {
        Ok(url) => Ok(!NO_FETCH_SCHEMES.contains(&url.scheme())),
        Err(ParseError::RelativeUrlWithoutBase) => Ok(true),
        Err(e) => Err(Error::download(link, e)),
    }
}

/// Fetch a link through the adapter and drain the body, returning the
/// number of bytes read. The body is dropped before returning, also on
/// read errors.
///
/// # Errors
///
/// Returns the adapter's error if the fetch fails, or
/// [`Error::DownloadFailed`] if the body cannot be read to the end.
pub async fn drain_download<A: Adapter>(adapter: &A, link: &str) -> Result<u64> {
    let mut download = adapter.download(link).await?;
    let read = tokio::io::copy(&mut download.body, &mut tokio::io::sink())
        .await
        .map_err(|e| Error::download(link, e));

    if let (Ok(bytes), Some(hint)) = (&read, download.size_hint)
        && *bytes != hint
    {
        debug!("Download of {link} returned {bytes} bytes, size hint was {hint}");
    }
    drop(download);
    read
}

/// Validate a page of results returned for a probe.
///
/// Each result is checked in turn; when `download_check` is set its link is
/// fetched and drained before the next result is looked at.
///
/// # Errors
///
/// Returns [`Error::InvalidResult`] or a download failure for the first bad
/// result.
pub async fn validate_results<A: Adapter>(
    adapter: &A,
    results: &[ResultItem],
    download_check: bool,
) -> Result<()> {
    for (idx, result) in results.iter().enumerate() {
        check_result(idx + 1, result)?;

        if download_check && needs_fetch(&result.link)? {
            let bytes = drain_download(adapter, &result.link).await?;
            debug!("Downloaded {bytes} bytes from {}", result.link);
        }
    }
    Ok(())
}
