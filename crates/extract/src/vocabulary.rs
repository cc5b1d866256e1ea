use crate::schema::CanonicalField;

/// What a recognized label opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Field(CanonicalField),
    /// The pipe-separated `Province: .. | County: ..` line. Split into its
    /// sub-fields after parsing and never kept as a field of its own.
    Geographic,
}

/// Sub-field keys on the geographic line, in output order.
pub const GEOGRAPHIC_PARTS: [(CanonicalField, &str); 4] = [
    (CanonicalField::Province, "Province"),
    (CanonicalField::County, "County"),
    (CanonicalField::Municipality, "Municipality"),
    (CanonicalField::Parish, "Parish"),
];

/// Section labels (Swedish and English) and the canonical section each opens.
///
/// Several labels may open the same section. The first label listed for a
/// field is the one used when rendering fields back to text.
#[derive(Debug, Clone)]
pub struct FieldVocabulary {
    labels: Vec<(String, Section)>,
}

impl FieldVocabulary {
    pub fn new<L: Into<String>>(labels: impl IntoIterator<Item = (L, Section)>) -> Self {
        Self {
            labels: labels
                .into_iter()
                .map(|(label, section)| (label.into(), section))
                .collect(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>, section: Section) -> Self {
        self.labels.push((label.into(), section));
        self
    }

    /// Exact, case-sensitive label match.
    pub fn lookup(&self, label: &str) -> Option<Section> {
        self.labels
            .iter()
            .find(|(known, _)| known == label)
            .map(|(_, section)| *section)
    }

    pub fn label_for(&self, field: CanonicalField) -> Option<&str> {
        self.labels
            .iter()
            .find(|(_, section)| *section == Section::Field(field))
            .map(|(label, _)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for FieldVocabulary {
    fn default() -> Self {
        use CanonicalField::*;

        Self::new([
            ("Class", Section::Field(Class)),
            ("Klass", Section::Field(Class)),
            ("Skadestatus", Section::Field(DamageStatus)),
            ("Undersökningsstatus", Section::Field(ExamStatus)),
            ("Beskrivning", Section::Field(DescriptionSv)),
            ("Placering", Section::Field(Placement)),
            ("Terräng", Section::Field(Terrain)),
            ("Orientering", Section::Field(Orientation)),
            ("Province", Section::Geographic),
            ("County", Section::Geographic),
            ("Municipality", Section::Geographic),
            ("Parish", Section::Geographic),
            ("Aktualitetsstatus", Section::Field(ActualityStatus)),
            ("Antikvarisk bedömning", Section::Field(AntiquarianAssessment)),
            ("Lämningsnummer", Section::Field(Lamningsnummer)),
            ("RAÄ-nummer", Section::Field(RaaNumber)),
            ("Organization", Section::Field(Organization)),
            ("Build Date", Section::Field(BuildDate)),
            ("Last Changed", Section::Field(LastChanged)),
            ("URL", Section::Field(Url)),
            ("Title", Section::Field(Title)),
            ("Tradition", Section::Field(Tradition)),
            ("Referens", Section::Field(Reference)),
            ("References", Section::Field(Reference)),
        ])
    }
}
