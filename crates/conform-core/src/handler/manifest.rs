use crate::config::AdapterSettings;
use conform_types::Capabilities;
use serde::{Deserialize, Serialize};

/// Adapter manifest (manifest.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Site links, the first one is the base link
    #[serde(default)]
    pub links: Vec<String>,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub login: Option<LoginConfig>,

    #[serde(default)]
    pub caps: Capabilities,

    /// Handler executable, relative to the adapter directory
    #[serde(default)]
    pub handler: Option<String>,
}

/// Login requirements of an adapter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginConfig {
    /// Settings that must be configured before logging in
    #[serde(default)]
    pub fields: Vec<String>,

    /// Login page, informational only
    #[serde(default)]
    pub path: Option<String>,
}

impl LoginConfig {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.path.is_none()
    }
}

impl Manifest {
    #[must_use]
    pub fn requires_login(&self) -> bool {
        self.login.as_ref().is_some_and(|login| !login.is_empty())
    }

    #[must_use]
    pub fn base_link(&self) -> &str {
        self.links.first().map_or("", String::as_str)
    }

    /// Required login settings that are absent or blank in `settings`
    #[must_use]
    pub fn missing_settings<'a>(&'a self, settings: &AdapterSettings) -> Vec<&'a str> {
        let Some(login) = &self.login else {
            return Vec::new();
        };

        login
            .fields
            .iter()
            .filter(|field| settings.get(*field).is_none_or(|v| v.trim().is_empty()))
            .map(String::as_str)
            .collect()
    }
}
