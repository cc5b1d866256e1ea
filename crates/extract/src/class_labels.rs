use std::collections::HashMap;

/// Swedish site class -> English label, used to annotate summarizer input.
#[derive(Debug, Clone)]
pub struct ClassLabels {
    labels: HashMap<String, String>,
}

const STANDARD_LABELS: &[(&str, &str)] = &[
    ("Fornlämning", "Ancient monument"),
    ("Möjlig fornlämning", "Possible ancient monument"),
    ("Potentiell fornlämning", "Potential ancient monument"),
    ("Övrig kulturhistorisk lämning", "Other cultural-historical remain"),
    ("Ingen antikvarisk bedömning", "No antiquarian assessment"),
    ("Stensättning", "Stone setting"),
    ("Röse", "Cairn"),
    ("Hög", "Burial mound"),
    ("Gravfält", "Burial ground"),
    ("Grav markerad av sten/block", "Grave marked by stone or boulder"),
    ("Domarring", "Stone circle"),
    ("Rest sten", "Standing stone"),
    ("Resta stenar", "Standing stones"),
    ("Skeppssättning", "Ship setting"),
    ("Hällristning", "Rock carving"),
    ("Skålgropsförekomst", "Cup-mark site"),
    ("Runristning", "Runic inscription"),
    ("Fornborg", "Hillfort"),
    ("Boplats", "Settlement site"),
    ("Husgrund, historisk tid", "House foundation, historical period"),
    ("Bytomt/gårdstomt", "Village or farm site"),
    ("Lägenhetsbebyggelse", "Cottage settlement"),
    ("Tomtning", "Hut foundation"),
    ("Fossil åkermark", "Relict field system"),
    ("Röjningsröse", "Clearance cairn"),
    ("Fångstgrop", "Trapping pit"),
    ("Kolningsanläggning", "Charcoal production site"),
    ("Kvarn", "Mill remains"),
    ("Färdväg", "Ancient route"),
    ("Vägmärke", "Road marker"),
    ("Gränsmärke", "Boundary marker"),
    ("Skyttevärn", "Rifle pit"),
    ("Labyrint", "Stone labyrinth"),
    ("Fyndplats", "Find spot"),
];

impl ClassLabels {
    pub fn new<K: Into<String>, V: Into<String>>(labels: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            labels: labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn english(&self, class_sv: &str) -> Option<&str> {
        self.labels.get(class_sv.trim()).map(String::as_str)
    }

    /// `Native (English)` when the class is known, otherwise the native label.
    pub fn display(&self, class_sv: &str) -> String {
        let native = class_sv.trim();
        match self.english(native) {
            Some(english) => format!("{native} ({english})"),
            None => native.to_string(),
        }
    }
}

impl Default for ClassLabels {
    fn default() -> Self {
        Self::new(STANDARD_LABELS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_classes_get_an_english_label() {
        let labels = ClassLabels::default();
        assert_eq!(labels.display("Stensättning"), "Stensättning (Stone setting)");
        assert_eq!(labels.display(" Röse "), "Röse (Cairn)");
    }

    #[test]
    fn unknown_classes_keep_the_native_label() {
        let labels = ClassLabels::default();
        assert_eq!(labels.english("Okänd typ"), None);
        assert_eq!(labels.display("Okänd typ"), "Okänd typ");
        assert_eq!(labels.display(""), "");
    }
}
