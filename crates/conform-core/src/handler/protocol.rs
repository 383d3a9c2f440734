use crate::config::AdapterSettings;
use conform_types::{Query, ResultItem};
use serde::{Deserialize, Serialize};

/// Operation requested from a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Login,
    Search,
    Download,
    Ratio,
}

/// Input sent to adapter handler (stdin)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerInput {
    pub step: Step,

    #[serde(skip_serializing_if = "AdapterSettings::is_empty")]
    pub config: AdapterSettings,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl HandlerInput {
    fn new(step: Step) -> Self {
        Self {
            step,
            config: AdapterSettings::new(),
            session: None,
            query: None,
            link: None,
        }
    }

    #[must_use]
    pub fn login() -> Self {
        Self::new(Step::Login)
    }

    #[must_use]
    pub fn search(query: Query) -> Self {
        Self {
            query: Some(query),
            ..Self::new(Step::Search)
        }
    }

    #[must_use]
    pub fn download(link: impl Into<String>) -> Self {
        Self {
            link: Some(link.into()),
            ..Self::new(Step::Download)
        }
    }

    #[must_use]
    pub fn ratio() -> Self {
        Self::new(Step::Ratio)
    }

    #[must_use]
    pub fn with_config(mut self, config: AdapterSettings) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: Option<String>) -> Self {
        self.session = session;
        self
    }
}

/// Response from adapter handler (stdout)
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HandlerResponse {
    Results {
        #[serde(default, alias = "results")]
        items: Vec<ResultItem>,
    },

    Ok {
        #[serde(default)]
        session: Option<String>,
    },

    Ratio {
        ratio: String,
    },

    Error {
        message: String,

        #[serde(default)]
        details: Option<String>,
    },
}

impl HandlerResponse {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Results { .. } => "results",
            Self::Ok { .. } => "ok",
            Self::Ratio { .. } => "ratio",
            Self::Error { .. } => "error",
        }
    }
}
