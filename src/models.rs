use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use url::Url;

use crate::error::{AppError, Result};

/// One item extracted by a scrape job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub source_url: String,
    // Free-form attributes such as "Year" or "Genre"
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metadata: BTreeMap<String, String>,
}

// Producers may write `"metadata": null` for an absent map
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ScrapedRecord {
    pub fn new(id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            image_url: None,
            source_url: source_url.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_metadata_map(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata.extend(metadata);
        self
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            AppError::SerializeError(format!("record '{}': {}", self.id, e))
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Execution strategy a job asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// Static HTTP fetch and parse.
    Colly,
    /// Headless browser rendering.
    Chromedp,
}

impl Driver {
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Colly => "colly",
            Driver::Chromedp => "chromedp",
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Driver {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "colly" => Ok(Driver::Colly),
            "chromedp" => Ok(Driver::Chromedp),
            other => Err(AppError::ConfigParseError(format!(
                "unknown driver '{}', expected 'colly' or 'chromedp'",
                other
            ))),
        }
    }
}

/// Declarative description of a scrape job, loaded from YAML.
///
/// `item_container` and the selector values are kept as opaque strings; whatever
/// runs the job decides what selector language they are written in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeJobSpec {
    pub name: String,
    pub url: String,
    pub driver: Driver,
    pub item_container: String,
    pub selectors: BTreeMap<String, String>,
}

impl ScrapeJobSpec {
    /// Parses a single YAML document. Every key is required.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| AppError::IoError(format!("{}: {}", path.display(), e)))?;

        Self::from_yaml_str(&contents).map_err(|e| match e {
            AppError::ConfigParseError(msg) => {
                AppError::ConfigParseError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            AppError::SerializeError(format!("job '{}': {}", self.name, e))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::ValidationError("job name must not be empty".to_string()));
        }

        let invalid = |field: &str, reason: String| {
            AppError::ValidationError(format!("job '{}': {} {}", self.name, field, reason))
        };

        let url = Url::parse(&self.url).map_err(|e| invalid("url", format!("is not a valid URL ({})", e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid("url", format!("has unsupported scheme '{}'", url.scheme())));
        }

        if self.item_container.trim().is_empty() {
            return Err(invalid("item_container", "must not be empty".to_string()));
        }

        if self.selectors.is_empty() {
            return Err(invalid("selectors", "must define at least one field".to_string()));
        }

        for (field, selector) in &self.selectors {
            if field.trim().is_empty() {
                return Err(invalid("selectors", "contain an empty field name".to_string()));
            }
            if selector.trim().is_empty() {
                return Err(invalid("selectors", format!("field '{}' has an empty selector", field)));
            }
        }

        Ok(())
    }
}
