//! Rebuilds a composite, section-labeled description from a registry graph
//! document by following the main entity's references.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::schema::{GraphDocument, GraphEntity};

pub const NO_DESCRIPTION: &str = "No description available";

const ITEM_TITLE: &str = "ksam:itemTitle";
const ITEM_CLASS_NAME: &str = "ksam:itemClassName";
const ITEM_DESCRIPTION: &str = "ksam:itemDescription";
const ITEM_SPECIFICATION: &str = "ksam:itemSpecification";
const ITEM_NUMBER: &str = "ksam:itemNumber";
const ITEM_KEYWORD: &str = "ksam:itemKeyword";
const CONTEXT: &str = "ksam:context";
const TYPE: &str = "ksam:type";
const DESC: &str = "ksam:desc";
const SPEC: &str = "ksam:spec";
const NUMBER: &str = "ksam:number";
const SERVICE_ORGANIZATION: &str = "ksam:serviceOrganization";
const BUILD_DATE: &str = "ksam:buildDate";
const LAST_CHANGED: &str = "ksam:lastChangedDate";
const URL: &str = "ksam:url";

const GEOGRAPHY: [(&str, &str); 4] = [
    ("ksam:provinceName", "Province"),
    ("ksam:countyName", "County"),
    ("ksam:municipalityName", "Municipality"),
    ("ksam:parishName", "Parish"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("document has no graph structure")]
    NoGraph,
    #[error("no entity under primary-resource prefix {0}")]
    MainEntityNotFound(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Identifier prefix of the primary heritage-site resource.
    pub primary_prefix: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            primary_prefix: "http://kulturarvsdata.se/raa/lamning/".to_string(),
        }
    }
}

/// How many times each semantic field type was resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldTally(BTreeMap<String, usize>);

impl FieldTally {
    pub fn record(&mut self, field: &str) {
        *self.0.entry(field.to_string()).or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: &FieldTally) {
        for (field, count) in &other.0 {
            *self.0.entry(field.clone()).or_insert(0) += count;
        }
    }

    pub fn get(&self, field: &str) -> usize {
        self.0.get(field).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields by count, highest first; ties by name.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<_> = self.0.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ranked
    }
}

/// Successful resolution of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// One part per line group, parts separated by a blank line.
    pub description: String,
    pub title: Option<String>,
    pub keywords: Vec<String>,
    pub found: FieldTally,
}

pub struct GraphResolver {
    config: ResolverConfig,
}

impl GraphResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn resolve_json(&self, payload: &Value) -> Result<Resolution, ResolveError> {
        let document = GraphDocument::from_json(payload)?;
        self.resolve(&document)
    }

    pub fn resolve(&self, document: &GraphDocument) -> Result<Resolution, ResolveError> {
        if document.entities.is_empty() {
            return Err(ResolveError::NoGraph);
        }

        let mut index: HashMap<&str, &GraphEntity> = HashMap::new();
        for entity in &document.entities {
            index.entry(entity.id.as_str()).or_insert(entity);
        }

        let main = document
            .entities
            .iter()
            .find(|e| e.id.starts_with(&self.config.primary_prefix))
            .ok_or_else(|| ResolveError::MainEntityNotFound(self.config.primary_prefix.clone()))?;

        let mut parts = Vec::new();
        let mut found = FieldTally::default();

        let title = first_scalar(main, ITEM_TITLE);
        if let Some(title) = &title {
            parts.push(format!("Title: {title}"));
        }
        if let Some(class) = first_scalar(main, ITEM_CLASS_NAME) {
            parts.push(format!("Class: {class}"));
        }

        typed_references(main, ITEM_DESCRIPTION, DESC, &index, &mut parts, &mut found);

        if let Some(line) = geographic_line(main, &index) {
            parts.push(line);
            found.record("geographic");
        }

        typed_references(main, ITEM_SPECIFICATION, SPEC, &index, &mut parts, &mut found);
        typed_references(main, ITEM_NUMBER, NUMBER, &index, &mut parts, &mut found);

        for (attribute, label, tally) in [
            (SERVICE_ORGANIZATION, "Organization", "organization"),
            (BUILD_DATE, "Build Date", "buildDate"),
            (LAST_CHANGED, "Last Changed", "lastChanged"),
            (URL, "URL", "url"),
        ] {
            if let Some(value) = first_scalar(main, attribute) {
                parts.push(format!("{label}: {value}"));
                found.record(tally);
            }
        }

        let keywords = main
            .attribute(ITEM_KEYWORD)
            .map(|v| v.scalars().into_iter().map(str::to_string).collect())
            .unwrap_or_default();

        let description = if parts.is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            parts.join("\n\n")
        };

        Ok(Resolution {
            description,
            title,
            keywords,
            found,
        })
    }
}

impl Default for GraphResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

fn first_scalar(entity: &GraphEntity, attribute: &str) -> Option<String> {
    entity
        .attribute(attribute)?
        .scalars()
        .into_iter()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// `{type}: {content}` for each resolvable reference under `attribute`.
fn typed_references(
    main: &GraphEntity,
    attribute: &str,
    leaf: &str,
    index: &HashMap<&str, &GraphEntity>,
    parts: &mut Vec<String>,
    found: &mut FieldTally,
) {
    for id in main.references(attribute) {
        let Some(target) = index.get(id) else {
            continue;
        };
        let Some(content) = first_scalar(target, leaf) else {
            continue;
        };
        let kind = first_scalar(target, TYPE).unwrap_or_else(|| "Unknown".to_string());
        parts.push(format!("{kind}: {content}"));
        found.record(&kind);
    }
}

fn geographic_line(main: &GraphEntity, index: &HashMap<&str, &GraphEntity>) -> Option<String> {
    let context = main
        .references(CONTEXT)
        .into_iter()
        .find_map(|id| index.get(id))?;

    let names: Vec<String> = GEOGRAPHY
        .iter()
        .filter_map(|(attribute, label)| {
            first_scalar(context, attribute).map(|name| format!("{label}: {name}"))
        })
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names.join(" | "))
    }
}
