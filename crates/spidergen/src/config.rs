use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// Proxy mode value that requests the downloader middleware block in `settings.py`.
pub const HTTP_PROXY_MODE: &str = "http";

/// Declarative description of a multi-stage crawl.
///
/// The first stage is the crawl entry point. Stages reference each other by
/// name through [`Field::next_stage`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, alias = "goose")]
    pub content_extraction_mode: bool,
    #[serde(default, alias = "proxy")]
    pub proxy_mode: String,
    #[serde(default, alias = "start_url")]
    pub entry_url: String,
    #[serde(default)]
    pub dedup_scope: DedupScope,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, rename = "list", skip_serializing_if = "Option::is_none")]
    pub list_locator: Option<Locator>,
    #[serde(default, rename = "page", skip_serializing_if = "Option::is_none")]
    pub page_locator: Option<Locator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_attr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub locator: Locator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_stage: Option<String>,
}

/// A CSS or XPath expression plus an optional attribute name.
///
/// Empty strings are treated the same as unset values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind<'a> {
    Css(&'a str),
    XPath(&'a str),
}

/// Where the generated dedup guard looks up already seen URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupScope {
    /// Lookup against the item store, so URLs stay seen across runs.
    #[default]
    Persisted,
    /// In-memory set living as long as the crawler process.
    Process,
}

impl DedupScope {
    /// Name of the collaborator function the generated spider calls.
    pub fn check_function(&self) -> &'static str {
        match self {
            DedupScope::Persisted => "unique_url",
            DedupScope::Process => "seen_url",
        }
    }
}

impl Config {
    /// Loads a configuration from a JSON or YAML file, picked by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let parsed = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        };

        parsed.map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    pub fn wants_proxy_middleware(&self) -> bool {
        self.proxy_mode == HTTP_PROXY_MODE
    }

    pub fn entry_stage(&self) -> Option<&Stage> {
        self.stages.first()
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.name == name)
    }

    /// All configured fields in stage order, then field order.
    pub fn all_fields(&self) -> impl Iterator<Item = &Field> {
        self.stages.iter().flat_map(|stage| stage.fields.iter())
    }
}

impl Stage {
    /// Callback name of the generated parser function for this stage.
    pub fn callback(&self) -> String {
        callback_name(&self.name)
    }

    /// Fields carrying a `next_stage` reference.
    pub fn chain_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|field| field.next_stage().is_some())
    }

    pub fn page_attr(&self) -> Option<&str> {
        non_empty(self.page_attr.as_deref())
    }
}

impl Field {
    pub fn next_stage(&self) -> Option<&str> {
        non_empty(self.next_stage.as_deref())
    }
}

impl Locator {
    pub fn css(css: impl Into<String>) -> Self {
        Self {
            css: Some(css.into()),
            ..Default::default()
        }
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self {
            xpath: Some(xpath.into()),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, attr: impl Into<String>) -> Self {
        self.attr = Some(attr.into());
        self
    }

    /// The selector form in effect. CSS wins when both are set.
    pub fn kind(&self) -> Option<SelectorKind<'_>> {
        non_empty(self.css.as_deref())
            .map(SelectorKind::Css)
            .or_else(|| non_empty(self.xpath.as_deref()).map(SelectorKind::XPath))
    }

    pub fn attr(&self) -> Option<&str> {
        non_empty(self.attr.as_deref())
    }
}

pub fn callback_name(stage_name: &str) -> String {
    format!("parse_{}", stage_name)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
