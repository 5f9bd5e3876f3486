use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use manos_plate_core::{AttrValue, Attrs};
use regex::Regex;

use crate::attribute::{LINK_HREF, decorator_attribute_key};
use crate::config::{DecoratorConfig, LinkConfig, UrlPredicate};
use crate::error::ConfigError;

static EXTERNAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?:)?//").expect("valid external url pattern"));

const EXTERNAL_DECORATOR_ID: &str = "isExternal";

#[derive(Debug, Clone, PartialEq)]
pub struct ManualDecoratorSpec {
    pub id: String,
    pub attribute_key: String,
    pub label: String,
    pub default_value: bool,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct AutomaticDecoratorSpec {
    pub id: String,
    pub attribute_key: String,
    pub attributes: BTreeMap<String, String>,
    predicate: CompiledPredicate,
}

impl AutomaticDecoratorSpec {
    pub fn matches(&self, href: &str) -> bool {
        match &self.predicate {
            CompiledPredicate::External => EXTERNAL_RE.is_match(href),
            CompiledPredicate::StartsWith(prefix) => href.starts_with(prefix.as_str()),
            CompiledPredicate::Matches(re) => re.is_match(href),
        }
    }
}

#[derive(Debug, Clone)]
enum CompiledPredicate {
    External,
    StartsWith(String),
    Matches(Regex),
}

/// The link attribute family: the href key plus every decorator key,
/// resolved once from configuration.
#[derive(Debug, Clone)]
pub struct LinkSchema {
    manual: Vec<ManualDecoratorSpec>,
    automatic: Vec<AutomaticDecoratorSpec>,
    forbidden_with: Vec<String>,
    default_protocol: Option<String>,
}

impl LinkSchema {
    pub fn from_config(config: &LinkConfig) -> Result<Self, ConfigError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut manual = Vec::new();
        let mut automatic = Vec::new();

        let external = config.add_target_to_external_links.then(|| DecoratorConfig::Automatic {
            id: EXTERNAL_DECORATOR_ID.to_string(),
            predicate: UrlPredicate::External,
            attributes: BTreeMap::from([
                ("target".to_string(), "_blank".to_string()),
                ("rel".to_string(), "noopener noreferrer".to_string()),
            ]),
        });

        for decorator in config.decorators.iter().chain(external.as_ref()) {
            let id = decorator.id();
            validate_id(id)?;
            if !seen.insert(id.to_string()) {
                return Err(ConfigError::DuplicateDecorator(id.to_string()));
            }

            match decorator {
                DecoratorConfig::Manual {
                    id,
                    label,
                    default_value,
                    attributes,
                } => manual.push(ManualDecoratorSpec {
                    id: id.clone(),
                    attribute_key: decorator_attribute_key(id),
                    label: label.clone(),
                    default_value: *default_value,
                    attributes: attributes.clone(),
                }),
                DecoratorConfig::Automatic {
                    id,
                    predicate,
                    attributes,
                } => automatic.push(AutomaticDecoratorSpec {
                    id: id.clone(),
                    attribute_key: decorator_attribute_key(id),
                    attributes: attributes.clone(),
                    predicate: compile(id, predicate)?,
                }),
            }
        }

        tracing::debug!(
            manual = manual.len(),
            automatic = automatic.len(),
            "link schema built"
        );

        Ok(Self {
            manual,
            automatic,
            forbidden_with: config.forbidden_with.clone(),
            default_protocol: config.default_protocol.clone(),
        })
    }

    pub fn href_key(&self) -> &'static str {
        LINK_HREF
    }

    pub fn manual_decorators(&self) -> &[ManualDecoratorSpec] {
        &self.manual
    }

    pub fn automatic_decorators(&self) -> &[AutomaticDecoratorSpec] {
        &self.automatic
    }

    pub fn forbidden_with(&self) -> &[String] {
        &self.forbidden_with
    }

    pub fn default_protocol(&self) -> Option<&str> {
        self.default_protocol.as_deref()
    }

    pub fn decorator_keys(&self) -> impl Iterator<Item = &str> {
        self.manual
            .iter()
            .map(|d| d.attribute_key.as_str())
            .chain(self.automatic.iter().map(|d| d.attribute_key.as_str()))
    }

    /// Every key written or cleared together with the href.
    pub fn family_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(LINK_HREF).chain(self.decorator_keys())
    }

    pub fn belongs_to_family(&self, key: &str) -> bool {
        self.family_keys().any(|k| k == key)
    }

    /// Automatic decorator keys paired with whether `href` switches them on.
    pub fn automatic_attributes<'a>(
        &'a self,
        href: &'a str,
    ) -> impl Iterator<Item = (&'a str, bool)> + 'a {
        self.automatic
            .iter()
            .map(move |d| (d.attribute_key.as_str(), d.matches(href)))
    }

    /// Output attributes for a linked run: `href` plus the attribute maps of
    /// every decorator active on it. `class` values accumulate.
    pub fn view_attributes(&self, run_attrs: &Attrs) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        let Some(href) = run_attrs.get(LINK_HREF).and_then(AttrValue::as_str) else {
            return out;
        };
        out.insert("href".to_string(), href.to_string());

        let active = |key: &str| run_attrs.get(key).and_then(AttrValue::as_bool) == Some(true);
        let decorators = self
            .manual
            .iter()
            .filter(|d| active(&d.attribute_key))
            .map(|d| &d.attributes)
            .chain(
                self.automatic
                    .iter()
                    .filter(|d| active(&d.attribute_key))
                    .map(|d| &d.attributes),
            );

        for attributes in decorators {
            for (name, value) in attributes {
                if name == "class" {
                    if let Some(existing) = out.get_mut(name) {
                        existing.push(' ');
                        existing.push_str(value);
                        continue;
                    }
                }
                out.insert(name.clone(), value.clone());
            }
        }
        out
    }
}

fn validate_id(id: &str) -> Result<(), ConfigError> {
    let Some(first) = id.chars().next() else {
        return Err(ConfigError::EmptyDecoratorId);
    };
    if !first.is_lowercase() {
        return Err(ConfigError::InvalidDecoratorId(id.to_string()));
    }
    if decorator_attribute_key(id) == LINK_HREF {
        return Err(ConfigError::ReservedDecoratorId(id.to_string()));
    }
    Ok(())
}

fn compile(id: &str, predicate: &UrlPredicate) -> Result<CompiledPredicate, ConfigError> {
    Ok(match predicate {
        UrlPredicate::External => CompiledPredicate::External,
        UrlPredicate::StartsWith { prefix } => CompiledPredicate::StartsWith(prefix.clone()),
        UrlPredicate::Matches { pattern } => {
            CompiledPredicate::Matches(Regex::new(pattern).map_err(|source| {
                ConfigError::InvalidPattern {
                    id: id.to_string(),
                    source,
                }
            })?)
        }
    })
}
