//! Section-labeled free text -> canonical fields.
//!
//! A line `Label: value` whose label is in the vocabulary opens a section;
//! following lines continue it until the next recognized label. Text before
//! the first recognized label is dropped. Repeated sections are appended
//! after a line break in order of appearance.

use std::sync::Arc;

use crate::normalizer::strip_urls;
use crate::schema::{CanonicalField, ParsedFields};
use crate::vocabulary::{FieldVocabulary, GEOGRAPHIC_PARTS, Section};

#[derive(Debug, Clone)]
pub struct FieldParser {
    vocabulary: Arc<FieldVocabulary>,
}

impl FieldParser {
    pub fn new(vocabulary: Arc<FieldVocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &FieldVocabulary {
        &self.vocabulary
    }

    /// Never fails; text without any recognized label yields an empty map.
    pub fn parse(&self, text: &str) -> ParsedFields {
        let mut fields = ParsedFields::new();
        let mut geographic = String::new();
        let mut current: Option<Section> = None;
        let mut buffer: Vec<String> = Vec::new();

        for raw in text.lines() {
            let line = raw.trim();

            if line.is_empty() {
                if current.is_some() {
                    buffer.push(String::new());
                }
                continue;
            }

            if let Some((section, line)) = self.section_line(line) {
                flush(current, &buffer, &mut fields, &mut geographic);
                buffer.clear();
                current = Some(section);
                buffer.push(match section {
                    // the sub-field label is part of the composite value
                    Section::Geographic => line,
                    Section::Field(_) => line
                        .split_once(':')
                        .map(|(_, rest)| rest.trim_start().to_string())
                        .unwrap_or_default(),
                });
                continue;
            }

            if current.is_some() {
                buffer.push(line.to_string());
            }
        }
        flush(current, &buffer, &mut fields, &mut geographic);

        split_geographic(&geographic, &mut fields);

        for field in CanonicalField::ALL.into_iter().filter(|f| f.is_free_text()) {
            if let Some(value) = fields.remove(field) {
                let cleaned = strip_prose_urls(&value);
                if !cleaned.is_empty() {
                    fields.insert(field, cleaned);
                }
            }
        }

        fields
    }

    /// Inverse of [`parse`](Self::parse) for already-parsed fields, using the
    /// first vocabulary label of each field.
    pub fn render(&self, fields: &ParsedFields) -> String {
        let mut out = String::new();
        let mut geographic_done = false;

        for field in CanonicalField::ALL {
            if field.is_geographic() {
                if geographic_done {
                    continue;
                }
                geographic_done = true;
                let parts: Vec<String> = GEOGRAPHIC_PARTS
                    .iter()
                    .filter_map(|(f, label)| fields.get(*f).map(|v| format!("{label}: {v}")))
                    .collect();
                if !parts.is_empty() {
                    out.push_str(&parts.join(" | "));
                    out.push('\n');
                }
                continue;
            }

            let (Some(value), Some(label)) = (fields.get(field), self.vocabulary.label_for(field))
            else {
                continue;
            };
            out.push_str(label);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }

        out
    }

    fn opens_section(&self, line: &str) -> Option<Section> {
        let (label, _) = line.split_once(':')?;
        self.vocabulary.lookup(label.trim())
    }

    /// A line opens a section if it starts with a known label, either as
    /// written or once leading URLs are removed.
    fn section_line(&self, line: &str) -> Option<(Section, String)> {
        if let Some(section) = self.opens_section(line) {
            return Some((section, line.to_string()));
        }
        if !line.contains("://") {
            return None;
        }
        let cleaned = strip_urls(line);
        self.opens_section(&cleaned).map(|section| (section, cleaned))
    }
}

impl Default for FieldParser {
    fn default() -> Self {
        Self::new(Arc::new(FieldVocabulary::default()))
    }
}

fn flush(
    section: Option<Section>,
    buffer: &[String],
    fields: &mut ParsedFields,
    geographic: &mut String,
) {
    let Some(section) = section else {
        return;
    };
    let value = buffer.join("\n");
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    match section {
        Section::Field(field) => fields.append(field, value),
        Section::Geographic => {
            if !geographic.is_empty() {
                geographic.push('\n');
            }
            geographic.push_str(value);
        }
    }
}

/// URLs are removed line by line so no line keeps the whitespace around them.
fn strip_prose_urls(value: &str) -> String {
    value
        .lines()
        .map(strip_urls)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// `Province: A | County: B` -> province/county. Keys match case-insensitively;
/// a later occurrence of a sub-field replaces an earlier one.
fn split_geographic(composite: &str, fields: &mut ParsedFields) {
    for part in composite.split(['|', '\n']) {
        let Some((key, value)) = part.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if let Some((field, _)) = GEOGRAPHIC_PARTS.iter().find(|(f, _)| f.as_str() == key) {
            fields.insert(*field, value);
        }
    }
}
