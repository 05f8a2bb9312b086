use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelLanguage {
    Es,
    Fr,
    De,
    It,
    En,
}

impl LabelLanguage {
    pub fn code(&self) -> &'static str {
        match self {
            LabelLanguage::Es => "es",
            LabelLanguage::Fr => "fr",
            LabelLanguage::De => "de",
            LabelLanguage::It => "it",
            LabelLanguage::En => "en",
        }
    }
}

impl fmt::Display for LabelLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Header keywords per language, in detection priority order.
const HEADER_KEYWORDS: &[(LabelLanguage, &[&str])] = &[
    (LabelLanguage::Es, &["ingredientes", "puede contener", "contiene"]),
    (LabelLanguage::Fr, &["ingrédients", "peut contenir", "contient"]),
    (LabelLanguage::De, &["zutaten", "kann enthalten", "enthält"]),
    (LabelLanguage::It, &["ingredienti", "può contenere", "contiene"]),
    (LabelLanguage::En, &["ingredients", "may contain", "contains"]),
];

pub struct LanguageDetector;

impl LanguageDetector {
    /// Language hint from the ingredient and advisory headers of a label.
    /// Spanish wins over French, then German, Italian and English.
    pub fn detect_from_headers(text: &str) -> Option<LabelLanguage> {
        let text = text.to_lowercase();

        HEADER_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
            .map(|(language, _)| *language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spanish_detection() {
        assert_eq!(
            LanguageDetector::detect_from_headers("Ingredientes: azúcar, cacao"),
            Some(LabelLanguage::Es)
        );
        assert_eq!(
            LanguageDetector::detect_from_headers("Puede contener leche"),
            Some(LabelLanguage::Es)
        );
    }

    #[test]
    fn test_french_detection() {
        assert_eq!(
            LanguageDetector::detect_from_headers("INGRÉDIENTS : sucre, beurre"),
            Some(LabelLanguage::Fr)
        );
    }

    #[test]
    fn test_german_detection() {
        assert_eq!(
            LanguageDetector::detect_from_headers("Zutaten: Zucker. Kann Spuren enthalten"),
            Some(LabelLanguage::De)
        );
    }

    #[test]
    fn test_italian_detection() {
        assert_eq!(
            LanguageDetector::detect_from_headers("Ingredienti: zucchero"),
            Some(LabelLanguage::It)
        );
    }

    #[test]
    fn test_english_detection() {
        assert_eq!(
            LanguageDetector::detect_from_headers("Ingredients: sugar. May contain nuts."),
            Some(LabelLanguage::En)
        );
        assert_eq!(LanguageDetector::detect_from_headers("sugar, salt"), None);
    }

    #[test]
    fn test_spanish_priority_over_italian() {
        // "contiene" is shared; Spanish is checked first
        assert_eq!(
            LanguageDetector::detect_from_headers("Contiene latte"),
            Some(LabelLanguage::Es)
        );
    }
}
