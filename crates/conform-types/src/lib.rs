//! Shared types for conform components.
//!
//! This crate provides the data model exchanged between the conformance
//! engine and the adapters it probes. All types are serializable so that
//! process-backed adapters can send them over stdio.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Deserialize a Vec that may be null or missing (both become empty vec)
fn deserialize_null_as_empty_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Deserialize a size that may be null or missing (both become zero)
fn deserialize_null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<u64> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Descriptive metadata about an adapter, used for reporting only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterInfo {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Base link of the site the adapter talks to
    #[serde(default)]
    pub link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl AdapterInfo {
    #[must_use]
    pub fn new(id: impl Into<String>, link: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            link: link.into(),
            ..Default::default()
        }
    }
}

/// Numeric content category, as used by torznab-style search APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub u32);

impl Category {
    pub const OTHER: Self = Self(0);
    pub const CONSOLE: Self = Self(1000);
    pub const MOVIES: Self = Self(2000);
    pub const MOVIES_FOREIGN: Self = Self(2010);
    pub const MOVIES_SD: Self = Self(2030);
    pub const MOVIES_HD: Self = Self(2040);
    pub const MOVIES_BLURAY: Self = Self(2050);
    pub const MOVIES_3D: Self = Self(2060);
    pub const AUDIO: Self = Self(3000);
    pub const AUDIO_MP3: Self = Self(3010);
    pub const AUDIO_LOSSLESS: Self = Self(3040);
    pub const PC: Self = Self(4000);
    pub const TV: Self = Self(5000);
    pub const TV_FOREIGN: Self = Self(5020);
    pub const TV_SD: Self = Self(5030);
    pub const TV_HD: Self = Self(5040);
    pub const TV_ANIME: Self = Self(5070);
    pub const TV_DOCUMENTARY: Self = Self(5080);
    pub const XXX: Self = Self(6000);
    pub const BOOKS: Self = Self(7000);
    pub const BOOKS_EBOOK: Self = Self(7020);

    /// Human readable name, `None` for ids outside the standard table
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "Other",
            1000 => "Console",
            2000 => "Movies",
            2010 => "Movies/Foreign",
            2030 => "Movies/SD",
            2040 => "Movies/HD",
            2050 => "Movies/BluRay",
            2060 => "Movies/3D",
            3000 => "Audio",
            3010 => "Audio/MP3",
            3040 => "Audio/Lossless",
            4000 => "PC",
            5000 => "TV",
            5020 => "TV/Foreign",
            5030 => "TV/SD",
            5040 => "TV/HD",
            5070 => "TV/Anime",
            5080 => "TV/Documentary",
            6000 => "XXX",
            7000 => "Books",
            7020 => "Books/Ebook",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Key of the TV-oriented search mode
pub const TV_SEARCH_MODE: &str = "tv-search";

/// One kind of query an adapter supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMode {
    pub key: String,

    #[serde(
        default,
        alias = "params",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_null_as_empty_vec"
    )]
    pub supported_params: Vec<String>,

    /// Categories applicable when probing this mode
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_null_as_empty_vec"
    )]
    pub categories: Vec<Category>,
}

impl SearchMode {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            supported_params: vec!["q".to_string()],
            categories: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    #[must_use]
    pub fn is_tv(&self) -> bool {
        self.key == TV_SEARCH_MODE
    }
}

/// What an adapter declares it can do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    #[serde(
        default,
        alias = "modes",
        deserialize_with = "deserialize_null_as_empty_vec"
    )]
    pub search_modes: Vec<SearchMode>,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_null_as_empty_vec"
    )]
    pub categories: Vec<Category>,
}

/// A search request sent to an adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Search mode key (e.g. "search", "tv-search")
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Free text
    #[serde(default, rename = "q", skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,

    #[serde(default, rename = "ep", skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,

    /// Maximum number of results, 0 means no limit
    #[serde(default, skip_serializing_if = "is_zero")]
    pub limit: usize,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub offset: usize,

    #[serde(
        default,
        rename = "cat",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_null_as_empty_vec"
    )]
    pub categories: Vec<Category>,
}

// Serde skip_serializing_if requires &usize signature
#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl Query {
    /// Query for a given search mode
    #[must_use]
    pub fn for_mode(mode: impl Into<String>) -> Self {
        Self {
            mode: Some(mode.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }
}

/// One search hit returned by an adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    /// Identifier of the site the result came from
    #[serde(default)]
    pub site: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,

    /// Download link, may be a `magnet:` URI
    #[serde(default)]
    pub link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    /// Size in bytes
    #[serde(default, deserialize_with = "deserialize_null_as_zero")]
    pub size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeders: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peers: Option<u32>,

    /// RFC 3339 publish timestamp as reported by the site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
}

/// Required fields of a [`ResultItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultField {
    Title,
    Size,
    Link,
    Site,
}

impl ResultField {
    /// All required fields, in the order they are checked
    pub const ALL: [Self; 4] = [Self::Title, Self::Size, Self::Link, Self::Site];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Size => "size",
            Self::Link => "link",
            Self::Site => "site",
        }
    }

    /// How a missing value of this field is described in diagnostics
    #[must_use]
    pub fn problem(self) -> &'static str {
        match self {
            Self::Title => "empty title",
            Self::Size => "zero size",
            Self::Link => "blank link",
            Self::Site => "blank site",
        }
    }
}

impl fmt::Display for ResultField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ResultItem {
    /// Whether the given required field holds a usable value
    #[must_use]
    pub fn has(&self, field: ResultField) -> bool {
        match field {
            ResultField::Title => !self.title.is_empty(),
            ResultField::Size => self.size > 0,
            ResultField::Link => !self.link.is_empty(),
            ResultField::Site => !self.site.is_empty(),
        }
    }

    /// First required field that is empty or zero, in check order
    #[must_use]
    pub fn missing_field(&self) -> Option<ResultField> {
        ResultField::ALL.into_iter().find(|field| !self.has(*field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_item() -> ResultItem {
        ResultItem {
            site: "example".to_string(),
            title: "Some.Show.S01E01.720p".to_string(),
            link: "https://example.org/dl/1".to_string(),
            size: 1024,
            ..Default::default()
        }
    }

    #[test]
    fn category_names() {
        assert_eq!(Category::TV_HD.name(), Some("TV/HD"));
        assert_eq!(Category::TV_SD.name(), Some("TV/SD"));
        assert_eq!(Category(9999).name(), None);
        assert_eq!(Category::TV_HD.to_string(), "TV/HD (5040)");
        assert_eq!(Category(9999).to_string(), "9999");
    }

    #[test]
    fn search_mode_defaults() {
        let mode: SearchMode = serde_json::from_value(json!({"key": "search"})).unwrap();
        assert_eq!(mode.key, "search");
        assert!(mode.supported_params.is_empty());
        assert!(mode.categories.is_empty());
        assert!(!mode.is_tv());
    }

    #[test]
    fn search_mode_with_params_alias_and_categories() {
        let mode: SearchMode = serde_json::from_value(json!({
            "key": "tv-search",
            "params": ["q", "season", "ep"],
            "categories": [5030, 5040]
        }))
        .unwrap();
        assert!(mode.is_tv());
        assert_eq!(mode.supported_params, vec!["q", "season", "ep"]);
        assert_eq!(mode.categories, vec![Category::TV_SD, Category::TV_HD]);
    }

    #[test]
    fn capabilities_accept_modes_alias_and_null() {
        let caps: Capabilities = serde_json::from_value(json!({
            "modes": [{"key": "search"}, {"key": "tv-search"}],
            "categories": null
        }))
        .unwrap();
        assert_eq!(caps.search_modes.len(), 2);
        assert!(caps.categories.is_empty());
    }

    #[test]
    fn query_builder() {
        let query = Query::for_mode("tv-search")
            .with_limit(3)
            .with_categories(vec![Category::TV_HD, Category::TV_SD]);
        assert_eq!(query.mode.as_deref(), Some("tv-search"));
        assert_eq!(query.limit, 3);
        assert_eq!(query.categories, vec![Category::TV_HD, Category::TV_SD]);
        assert!(query.series.is_none());
    }

    #[test]
    fn query_wire_names() {
        let query = Query::default()
            .with_series("nothing")
            .with_categories(vec![Category::TV]);
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value, json!({"series": "nothing", "cat": [5000]}));

        let query: Query = serde_json::from_value(json!({"type": "search", "q": "abc", "ep": "2"})).unwrap();
        assert_eq!(query.keywords.as_deref(), Some("abc"));
        assert_eq!(query.episode.as_deref(), Some("2"));
    }

    #[test]
    fn result_item_missing_fields_default() {
        let item: ResultItem = serde_json::from_value(json!({"title": "x", "size": null})).unwrap();
        assert_eq!(item.size, 0);
        assert_eq!(item.missing_field(), Some(ResultField::Size));
    }

    #[test]
    fn result_item_missing_field_order() {
        assert_eq!(valid_item().missing_field(), None);
        assert_eq!(
            ResultItem::default().missing_field(),
            Some(ResultField::Title)
        );

        let mut item = valid_item();
        item.link.clear();
        item.site.clear();
        assert_eq!(item.missing_field(), Some(ResultField::Link));

        let mut item = valid_item();
        item.site.clear();
        assert_eq!(item.missing_field(), Some(ResultField::Site));
    }

    #[test]
    fn result_field_problem_text() {
        assert_eq!(ResultField::Title.problem(), "empty title");
        assert_eq!(ResultField::Size.problem(), "zero size");
        assert_eq!(ResultField::Link.problem(), "blank link");
        assert_eq!(ResultField::Site.problem(), "blank site");
        assert_eq!(ResultField::Size.to_string(), "size");
    }

    #[test]
    fn adapter_info_new_uses_id_as_name() {
        let info = AdapterInfo::new("example", "https://example.org/");
        assert_eq!(info.name, "example");
        assert_eq!(info.link, "https://example.org/");
    }
}
