//! Test fixtures and helpers

use crate::adapter::{Adapter, Download};
use crate::{Error, Result, TesterOptions};
use conform_types::{AdapterInfo, Capabilities, Query, ResultItem, SearchMode};
use std::collections::HashMap;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Create a valid result pointing at an http link
pub fn make_result(n: usize) -> ResultItem {
    ResultItem {
        site: "fake".to_string(),
        title: format!("Some.Show.S01E0{n}.720p.HDTV"),
        link: format!("https://fake.example/download/{n}"),
        size: 1_048_576,
        ..Default::default()
    }
}

/// Create a valid result with a magnet link
pub fn make_magnet_result(n: usize) -> ResultItem {
    ResultItem {
        link: format!("magnet:?xt=urn:btih:{n:040}"),
        ..make_result(n)
    }
}

/// Options with colour disabled so output can be compared as plain text
pub fn plain_options() -> TesterOptions {
    TesterOptions::default()
}

/// How a fake download behaves
#[derive(Debug, Clone)]
pub enum FakeBody {
    Bytes(Vec<u8>),
    /// The fetch itself fails
    FetchError,
    /// The fetch succeeds but reading the body fails
    ReadError,
}

/// Reader that fails on first read
pub struct FailingReader;

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::other("connection reset")))
    }
}

/// Scriptable in-memory adapter that records every call it receives
pub struct FakeAdapter {
    pub info: AdapterInfo,
    pub caps: Capabilities,
    pub login_required: bool,
    pub config_present: bool,
    pub login_error: Option<String>,
    /// Returned for search mode probes
    pub results: Vec<ResultItem>,
    /// Returned for queries with a series filter
    pub series_results: Vec<ResultItem>,
    pub search_error: Option<String>,
    pub ratio: std::result::Result<String, String>,
    /// Download behaviour per link, links not listed return a small body
    pub downloads: HashMap<String, FakeBody>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub queries: Arc<Mutex<Vec<Query>>>,
}

impl FakeAdapter {
    /// No login, one "search" mode, three valid results, empty series search
    pub fn new(id: &str) -> Self {
        Self {
            info: AdapterInfo::new(id, format!("https://{id}.example/")),
            caps: Capabilities {
                search_modes: vec![SearchMode::new("search")],
                categories: Vec::new(),
            },
            login_required: false,
            config_present: true,
            login_error: None,
            results: (1..=3).map(make_result).collect(),
            series_results: Vec::new(),
            search_error: None,
            ratio: Ok("1.5".to_string()),
            downloads: HashMap::new(),
            calls: Arc::default(),
            queries: Arc::default(),
        }
    }

    pub fn with_modes(mut self, modes: Vec<SearchMode>) -> Self {
        self.caps.search_modes = modes;
        self
    }

    pub fn with_login(mut self) -> Self {
        self.login_required = true;
        self
    }

    pub fn with_results(mut self, results: Vec<ResultItem>) -> Self {
        self.results = results;
        self
    }

    pub fn with_download(mut self, link: &str, body: FakeBody) -> Self {
        self.downloads.insert(link.to_string(), body);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }

    pub fn download_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("download:"))
            .collect()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl Adapter for FakeAdapter {
    fn info(&self) -> &AdapterInfo {
        &self.info
    }

    fn capabilities(&self) -> Capabilities {
        self.caps.clone()
    }

    fn requires_login(&self) -> bool {
        self.login_required
    }

    fn check_has_config(&self) -> Result<()> {
        self.record("check_has_config");
        if self.config_present {
            Ok(())
        } else {
            Err(Error::ConfigMissing("username, password".to_string()))
        }
    }

    async fn login(&self) -> Result<()> {
        self.record("login");
        match &self.login_error {
            Some(message) => Err(Error::LoginFailed(message.clone())),
            None => Ok(()),
        }
    }

    async fn search(&self, query: &Query) -> Result<Vec<ResultItem>> {
        let label = query
            .mode
            .clone()
            .or_else(|| query.series.clone())
            .unwrap_or_default();
        self.record(format!("search:{label}"));
        self.queries.lock().unwrap().push(query.clone());

        if let Some(message) = &self.search_error {
            return Err(Error::SearchFailed(message.clone()));
        }
        if query.series.is_some() {
            Ok(self.series_results.clone())
        } else {
            Ok(self.results.clone())
        }
    }

    async fn download(&self, link: &str) -> Result<Download> {
        self.record(format!("download:{link}"));
        match self.downloads.get(link) {
            Some(FakeBody::Bytes(bytes)) => {
                let size = bytes.len() as u64;
                Ok(Download::new(io::Cursor::new(bytes.clone())).with_size_hint(size))
            }
            Some(FakeBody::FetchError) => Err(Error::DownloadFailed {
                link: link.to_string(),
                reason: "404 Not Found".to_string(),
            }),
            Some(FakeBody::ReadError) => Ok(Download::new(FailingReader)),
            None => Ok(Download::new(io::Cursor::new(b"d8:announce".to_vec()))),
        }
    }

    async fn ratio(&self) -> Result<String> {
        self.record("ratio");
        self.ratio.clone().map_err(Error::RatioFailed)
    }
}

/// Writer that appends into a shared buffer, for capturing log output
#[derive(Clone, Default)]
pub struct CaptureWriter(pub Arc<Mutex<Vec<u8>>>);

impl CaptureWriter {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
