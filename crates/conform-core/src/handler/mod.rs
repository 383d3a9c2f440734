//! Adapters backed by an external handler executable.
//!
//! An adapter directory holds a `manifest.json` describing the adapter and a
//! handler program. Every operation runs the handler once: one JSON request
//! line on stdin, one JSON response line on stdout. Downloads stream the raw
//! body on stdout instead.

mod manifest;
mod process;
mod protocol;

pub use manifest::{LoginConfig, Manifest};
pub use process::{HandlerStream, invoke, open_stream};
pub use protocol::{HandlerInput, HandlerResponse, Step};

use crate::adapter::{Adapter, Download};
use crate::config::{AdapterSettings, Config};
use crate::{Error, Result};
use conform_types::{AdapterInfo, Capabilities, Query, ResultItem};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

const MANIFEST_FILENAME: &str = "manifest.json";
const DEFAULT_HANDLER_FILENAME: &str = "handler";

/// Operations answered with a single JSON response line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Login,
    Search,
    Ratio,
}

impl Reply {
    fn step(self) -> Step {
        match self {
            Self::Login => Step::Login,
            Self::Search => Step::Search,
            Self::Ratio => Step::Ratio,
        }
    }

    /// Error of the kind that matches this operation failing
    fn failure(self, message: impl Into<String>) -> Error {
        let message = message.into();
        match self {
            Self::Login => Error::LoginFailed(message),
            Self::Search => Error::SearchFailed(message),
            Self::Ratio => Error::RatioFailed(message),
        }
    }

    fn unexpected(self, response: &HandlerResponse) -> Error {
        self.failure(format!("unexpected {} response", response.kind()))
    }
}

/// A loaded adapter directory
#[derive(Debug)]
pub struct HandlerAdapter {
    info: AdapterInfo,
    path: PathBuf,
    manifest: Manifest,
    handler_path: PathBuf,
    settings: AdapterSettings,
    /// Session token returned by the last successful login
    session: Mutex<Option<String>>,
}

impl HandlerAdapter {
    /// Load an adapter from a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or invalid, or the
    /// handler is missing.
    pub fn load(path: PathBuf) -> Result<Self> {
        let manifest_path = path.join(MANIFEST_FILENAME);
        if !manifest_path.exists() {
            return Err(Error::Adapter(format!(
                "{} not found in {}",
                MANIFEST_FILENAME,
                path.display()
            )));
        }

        let manifest_content = std::fs::read_to_string(&manifest_path)?;
        let manifest: Manifest = serde_json::from_str(&manifest_content).map_err(|e| {
            Error::Adapter(format!(
                "Failed to parse manifest at {}: {}",
                manifest_path.display(),
                e
            ))
        })?;

        let id = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Adapter(format!("Invalid adapter directory: {}", path.display())))?
            .to_string();

        let handler_path = path.join(
            manifest
                .handler
                .as_deref()
                .unwrap_or(DEFAULT_HANDLER_FILENAME),
        );
        if !handler_path.exists() {
            return Err(Error::Adapter(format!(
                "{} not found in {}",
                handler_path.display(),
                path.display()
            )));
        }

        let info = AdapterInfo {
            id,
            name: manifest.name.clone(),
            description: manifest.description.clone(),
            link: manifest.base_link().to_string(),
            language: manifest.language.clone(),
        };

        Ok(Self {
            info,
            path,
            manifest,
            handler_path,
            settings: AdapterSettings::new(),
            session: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn with_settings(mut self, settings: AdapterSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.info.id
    }

    #[must_use]
    pub fn session(&self) -> Option<String> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Attach settings and the current session to a request
    fn prepare(&self, input: HandlerInput) -> HandlerInput {
        input
            .with_config(self.settings.clone())
            .with_session(self.session())
    }

    /// Invoke the handler, turning transport failures and error responses
    /// into the error kind of the requested operation.
    async fn request(&self, reply: Reply, input: HandlerInput) -> Result<HandlerResponse> {
        debug_assert_eq!(input.step, reply.step());
        let input = self.prepare(input);

        match invoke(self.id(), &self.handler_path, &self.path, &input).await {
            Ok(HandlerResponse::Error { message, details }) => {
                if let Some(details) = details {
                    debug!("[{}] {:?} error details: {}", self.id(), reply, details);
                }
                Err(reply.failure(message))
            }
            Ok(response) => Ok(response),
            Err(e) => Err(reply.failure(e.to_string())),
        }
    }
}

impl Adapter for HandlerAdapter {
    fn info(&self) -> &AdapterInfo {
        &self.info
    }

    fn capabilities(&self) -> Capabilities {
        self.manifest.caps.clone()
    }

    fn requires_login(&self) -> bool {
        self.manifest.requires_login()
    }

    fn check_has_config(&self) -> Result<()> {
        let missing = self.manifest.missing_settings(&self.settings);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigMissing(format!(
                "{} needs {}",
                self.id(),
                missing.join(", ")
            )))
        }
    }

    async fn login(&self) -> Result<()> {
        match self.request(Reply::Login, HandlerInput::login()).await? {
            HandlerResponse::Ok { session } => {
                if session.is_some() {
                    debug!("[{}] Login returned a session", self.id());
                    *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session;
                }
                Ok(())
            }
            other => Err(Reply::Login.unexpected(&other)),
        }
    }

    async fn search(&self, query: &Query) -> Result<Vec<ResultItem>> {
        let input = HandlerInput::search(query.clone());
        match self.request(Reply::Search, input).await? {
            HandlerResponse::Results { items } => Ok(items),
            other => Err(Reply::Search.unexpected(&other)),
        }
    }

    async fn download(&self, link: &str) -> Result<Download> {
        let input = self.prepare(HandlerInput::download(link));
        let stream = open_stream(self.id(), &self.handler_path, &self.path, &input)
            .await
            .map_err(|e| Error::download(link, e))?;
        Ok(Download::new(stream))
    }

    async fn ratio(&self) -> Result<String> {
        match self.request(Reply::Ratio, HandlerInput::ratio()).await? {
            HandlerResponse::Ratio { ratio } => Ok(ratio),
            other => Err(Reply::Ratio.unexpected(&other)),
        }
    }
}

/// Load every adapter directory under `dir`, sorted by id. Directories that
/// fail to load are logged and skipped.
///
/// # Errors
///
/// Returns an error if `dir` cannot be read.
pub fn discover(dir: &Path, config: &Config) -> Result<Vec<HandlerAdapter>> {
    let mut adapters = Vec::new();

    if !dir.exists() {
        debug!("Adapters directory {} does not exist", dir.display());
        return Ok(adapters);
    }

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_dir() || !path.join(MANIFEST_FILENAME).exists() {
            continue;
        }

        match HandlerAdapter::load(path.clone()) {
            Ok(adapter) => {
                let settings = config.settings_for(adapter.id());
                adapters.push(adapter.with_settings(settings));
            }
            Err(e) => warn!("Skipping adapter at {}: {}", path.display(), e),
        }
    }

    adapters.sort_by(|a, b| a.id().cmp(b.id()));
    info!(
        "Loaded {} adapters from {}",
        adapters.len(),
        dir.display()
    );
    Ok(adapters)
}

/// Resolve an adapter by path, or by id inside `dir`.
///
/// # Errors
///
/// Returns [`Error::AdapterNotFound`] if neither exists, or the load error.
pub fn resolve(name: &str, dir: &Path, config: &Config) -> Result<HandlerAdapter> {
    let as_path = PathBuf::from(name);
    let path = if as_path.join(MANIFEST_FILENAME).exists() {
        as_path
    } else {
        let in_dir = dir.join(name);
        if !in_dir.join(MANIFEST_FILENAME).exists() {
            return Err(Error::AdapterNotFound(name.to_string()));
        }
        in_dir
    };

    let adapter = HandlerAdapter::load(path)?;
    let settings = config.settings_for(adapter.id());
    Ok(adapter.with_settings(settings))
}
