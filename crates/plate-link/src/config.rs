use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Protocol prepended on submit to URLs typed without one, e.g. `https://`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_protocol: Option<String>,
    #[serde(default)]
    pub add_target_to_external_links: bool,
    /// Attributes a run must not carry to receive a link.
    #[serde(default)]
    pub forbidden_with: Vec<String>,
    #[serde(default)]
    pub decorators: Vec<DecoratorConfig>,
}

impl LinkConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DecoratorConfig {
    Manual {
        id: String,
        label: String,
        #[serde(default)]
        default_value: bool,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
    },
    Automatic {
        id: String,
        predicate: UrlPredicate,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
    },
}

impl DecoratorConfig {
    pub fn id(&self) -> &str {
        match self {
            DecoratorConfig::Manual { id, .. } | DecoratorConfig::Automatic { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UrlPredicate {
    /// `http://`, `https://` or protocol-relative `//` URLs.
    External,
    StartsWith { prefix: String },
    Matches { pattern: String },
}

static PROTOCOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((\w+:(/{2,})?)|(\W))").expect("valid protocol pattern"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\S+@(?:[-\w]{1,63}\.)+[a-z]{2,}$").expect("valid email pattern")
});

pub fn link_has_protocol(link: &str) -> bool {
    PROTOCOL_RE.is_match(link)
}

/// Prefixes `mailto:` to e-mail addresses and `default_protocol` to other
/// links typed without a protocol. Empty links are returned unchanged.
pub fn add_protocol_if_applicable(link: &str, default_protocol: Option<&str>) -> String {
    let protocol = if EMAIL_RE.is_match(link) {
        Some("mailto:")
    } else {
        default_protocol.filter(|p| !p.is_empty())
    };

    match protocol {
        Some(protocol) if !link.is_empty() && !link_has_protocol(link) => {
            format!("{protocol}{link}")
        }
        _ => link.to_string(),
    }
}
