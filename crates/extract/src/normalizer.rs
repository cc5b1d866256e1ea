use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"https?://\S+")
        .case_insensitive(true)
        .build()
        .expect("url pattern")
});

/// Boilerplate the registry appends to unverified descriptions.
pub const STANDARD_DISCLAIMERS: [&str; 3] = [
    r"Beskrivningen är inte kvalitetssäkrad\.?",
    r"Information kan saknas, vara felaktig eller inaktuell\.?",
    r"Se även\s+Inventeringsbok\.?",
];

/// Remove embedded URLs and surrounding whitespace.
pub fn strip_urls(text: &str) -> String {
    URL_RE.replace_all(text, "").trim().to_string()
}

/// A fixed set of disclaimer phrases, matched case-insensitively anywhere in a block.
#[derive(Debug, Clone)]
pub struct DisclaimerSet {
    pattern: Regex,
}

impl DisclaimerSet {
    pub fn new<S: AsRef<str>>(phrases: &[S]) -> Result<Self, regex::Error> {
        let alternation = phrases
            .iter()
            .map(|p| format!("(?:{})", p.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()?;
        Ok(Self { pattern })
    }

    pub fn is_present(&self, text: &str) -> bool {
        !text.is_empty() && self.pattern.is_match(text)
    }

    pub fn strip(&self, text: &str) -> String {
        self.pattern.replace_all(text, "").trim().to_string()
    }
}

impl Default for DisclaimerSet {
    fn default() -> Self {
        Self::new(&STANDARD_DISCLAIMERS).expect("built-in disclaimer patterns")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_urls_and_whitespace() {
        assert_eq!(
            strip_urls("  Se https://app.raa.se/open/x?id=1 för mer  "),
            "Se  för mer"
        );
        assert_eq!(strip_urls("HTTP://EXAMPLE.ORG"), "");
        assert_eq!(strip_urls("Ingen länk här."), "Ingen länk här.");
    }

    #[test]
    fn detects_disclaimers_case_insensitively() {
        let disclaimers = DisclaimerSet::default();
        assert!(disclaimers.is_present("Rund. BESKRIVNINGEN ÄR INTE KVALITETSSÄKRAD."));
        assert!(disclaimers.is_present("Se även  Inventeringsbok"));
        assert!(!disclaimers.is_present("Rund stensättning."));
        assert!(!disclaimers.is_present(""));
    }

    #[test]
    fn strips_every_disclaimer() {
        let disclaimers = DisclaimerSet::default();
        let text = "Rund stensättning. Beskrivningen är inte kvalitetssäkrad. \
                    Information kan saknas, vara felaktig eller inaktuell.";
        assert_eq!(disclaimers.strip(text), "Rund stensättning.");
    }

    #[test]
    fn custom_phrases_compile() {
        let disclaimers = DisclaimerSet::new(&["Ej kontrollerad"]).unwrap();
        assert!(disclaimers.is_present("ej kontrollerad"));
        assert!(DisclaimerSet::new(&["(unclosed"]).is_err());
    }
}
