//! Turning registry documents into canonical fields and summarizer input.

pub mod class_labels;
pub mod llm;
pub mod normalizer;
pub mod parser;
pub mod prompt;
pub mod resolver;
pub mod schema;
pub mod vocabulary;

pub use class_labels::ClassLabels;
pub use llm::{OllamaSummarizer, Summarizer, SummarizerConfig, SummarizerError};
pub use normalizer::{DisclaimerSet, STANDARD_DISCLAIMERS, strip_urls};
pub use parser::FieldParser;
pub use prompt::{build_description_input, build_summary_prompt};
pub use resolver::{
    FieldTally, GraphResolver, NO_DESCRIPTION, Resolution, ResolveError, ResolverConfig,
};
pub use schema::{AttributeValue, CanonicalField, GraphDocument, GraphEntity, ParsedFields};
pub use vocabulary::{FieldVocabulary, GEOGRAPHIC_PARTS, Section};
