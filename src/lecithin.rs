//! Lecithin source resolution.
//!
//! Translation tends to turn an unqualified "lecithin" into "soy lecithin",
//! so when the original label text is available its qualifier wins.

use crate::text::{contains_e_number, normalize};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const LECITHIN_TERMS: &[&str] = &["lecithin", "lécithine", "lecitina", "lezithin", "e322"];

const LECITHIN_STEM: &str = r"(?:l[eé]cithin[aes]?|lecitina|lezithin|e\s*-?\s*322)";

/// Source qualifiers in priority order.
const SOURCE_QUALIFIERS: &[(&str, LecithinSource)] = &[
    (r"sunflower|tournesol|sonnenblumen?|girasole?", LecithinSource::Sunflower),
    (r"soy(?:a|bean)?|soja|soia", LecithinSource::Soy),
    (r"rapeseed|canola|colza|raps", LecithinSource::Rapeseed),
    (r"egg|oeuf|œuf|ei|huevo|uovo", LecithinSource::Egg),
];

lazy_static! {
    /// A qualifier only names the source when it sits next to the lecithin
    /// mention: "soy lecithin", "sojalecithin", "lecithin (sunflower)",
    /// "lécithine de tournesol", "lecithin from rapeseed".
    static ref SOURCE_PATTERNS: Vec<(Regex, LecithinSource)> = SOURCE_QUALIFIERS
        .iter()
        .map(|(qualifier, source)| {
            let pattern = format!(
                r"\b(?:{q})\s*-?\s*{stem}|{stem}\s*(?:\(\s*)?(?:(?:de|d'|du|di|aus|from|of)\s*)?(?:{q})\b",
                q = qualifier,
                stem = LECITHIN_STEM
            );
            (Regex::new(&pattern).unwrap(), *source)
        })
        .collect();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LecithinSource {
    Soy,
    Sunflower,
    Rapeseed,
    Egg,
    Unspecified,
}

impl LecithinSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LecithinSource::Soy => "soy",
            LecithinSource::Sunflower => "sunflower",
            LecithinSource::Rapeseed => "rapeseed",
            LecithinSource::Egg => "egg",
            LecithinSource::Unspecified => "unspecified",
        }
    }

    /// Allergens carried by the source. Unspecified carries none here;
    /// callers apply the "possible soy" policy themselves.
    pub fn allergens(&self) -> &'static [&'static str] {
        match self {
            LecithinSource::Soy => &["soy"],
            LecithinSource::Egg => &["egg"],
            LecithinSource::Sunflower | LecithinSource::Rapeseed | LecithinSource::Unspecified => {
                &[]
            }
        }
    }

    /// Corrected ingredient name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            LecithinSource::Soy => "soy lecithin",
            LecithinSource::Sunflower => "sunflower lecithin",
            LecithinSource::Rapeseed => "rapeseed lecithin",
            LecithinSource::Egg => "egg lecithin",
            LecithinSource::Unspecified => "lecithin (source unspecified)",
        }
    }

    fn explanation(&self) -> &'static str {
        match self {
            LecithinSource::Soy => "Soy lecithin detected",
            LecithinSource::Sunflower => "Sunflower lecithin detected",
            LecithinSource::Rapeseed => "Rapeseed/canola lecithin detected",
            LecithinSource::Egg => "Egg lecithin detected",
            LecithinSource::Unspecified => "Lecithin with unspecified source",
        }
    }
}

impl fmt::Display for LecithinSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LecithinMatch {
    pub source: LecithinSource,
    pub explanation: String,
}

pub fn is_lecithin(text: &str) -> bool {
    let text = normalize(text);
    LECITHIN_TERMS.iter().any(|term| text.contains(term)) || contains_e_number(&text, "322")
}

/// Lecithin source named in `text`, or `None` when the text is not lecithin.
pub fn detect_source(text: &str) -> Option<LecithinMatch> {
    if !is_lecithin(text) {
        return None;
    }

    let text = normalize(text);
    let source = SOURCE_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(&text))
        .map(|(_, source)| *source)
        .unwrap_or(LecithinSource::Unspecified);

    log::debug!("Lecithin source resolved to {} in '{}'", source, text);

    Some(LecithinMatch {
        source,
        explanation: source.explanation().to_string(),
    })
}

/// Resolve the source from the original-language text first, then from the
/// normalized/translated text.
pub fn detect_source_combined(original: &str, normalized: &str) -> Option<LecithinMatch> {
    let from_original = detect_source(original);
    if let Some(found) = &from_original {
        if found.source != LecithinSource::Unspecified {
            return Some(LecithinMatch {
                source: found.source,
                explanation: format!("{} (from original text)", found.explanation),
            });
        }
    }

    let from_normalized = detect_source(normalized);
    if let Some(found) = &from_normalized {
        if found.source != LecithinSource::Unspecified {
            return Some(LecithinMatch {
                source: found.source,
                explanation: format!("{} (from normalized text)", found.explanation),
            });
        }
    }

    from_original.or(from_normalized)
}

pub fn allergens_for(source: LecithinSource) -> Vec<&'static str> {
    source.allergens().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_lecithin_mentions() {
        assert!(is_lecithin("Soy Lecithin"));
        assert!(is_lecithin("lécithine de tournesol"));
        assert!(is_lecithin("emulsionante (lecitina)"));
        assert!(is_lecithin("Emulsifier: E322"));
        assert!(is_lecithin("emulsifier (E-322)"));
        assert!(!is_lecithin("sugar"));
    }

    #[test]
    fn test_source_detection() {
        assert_eq!(detect_source("sunflower lecithin").unwrap().source, LecithinSource::Sunflower);
        assert_eq!(detect_source("lecitina de girasol").unwrap().source, LecithinSource::Sunflower);
        assert_eq!(detect_source("soya lecithin").unwrap().source, LecithinSource::Soy);
        assert_eq!(detect_source("lecitina de soja").unwrap().source, LecithinSource::Soy);
        assert_eq!(detect_source("canola lecithin").unwrap().source, LecithinSource::Rapeseed);
        assert_eq!(detect_source("Lecithin (Ei)").unwrap().source, LecithinSource::Egg);
        assert_eq!(detect_source("lecithin").unwrap().source, LecithinSource::Unspecified);
        assert!(detect_source("cocoa butter").is_none());
    }

    #[test]
    fn test_two_letter_qualifier_needs_word_boundary() {
        // "ei" appears inside "protein" but is not a qualifier there
        let found = detect_source("lecithin, protein").unwrap();
        assert_eq!(found.source, LecithinSource::Unspecified);
    }

    #[test]
    fn test_qualifier_must_sit_next_to_lecithin() {
        let found = detect_source("sunflower oil, sugar, cocoa mass, soy lecithin, salt").unwrap();
        assert_eq!(found.source, LecithinSource::Soy);

        let found = detect_source("sunflower oil, lecithin, salt").unwrap();
        assert_eq!(found.source, LecithinSource::Unspecified);

        assert_eq!(detect_source("Sojalecithin").unwrap().source, LecithinSource::Soy);
        assert_eq!(detect_source("lecithin (from rapeseed)").unwrap().source, LecithinSource::Rapeseed);
        assert_eq!(detect_source("lécithine d'œuf").unwrap().source, LecithinSource::Egg);
        assert_eq!(detect_source("emulsifier: E322 (sunflower)").unwrap().source, LecithinSource::Sunflower);
    }

    #[test]
    fn test_original_text_takes_priority() {
        let found = detect_source_combined("lécithine de tournesol", "lecithin").unwrap();
        assert_eq!(found.source, LecithinSource::Sunflower);
        assert!(found.explanation.ends_with("(from original text)"));

        let found = detect_source_combined("lécithine de tournesol", "soy lecithin").unwrap();
        assert_eq!(found.source, LecithinSource::Sunflower);
    }

    #[test]
    fn test_combined_falls_back_to_normalized() {
        let found = detect_source_combined("lécithine", "soy lecithin").unwrap();
        assert_eq!(found.source, LecithinSource::Soy);
        assert!(found.explanation.ends_with("(from normalized text)"));

        let found = detect_source_combined("lécithine", "lecithin").unwrap();
        assert_eq!(found.source, LecithinSource::Unspecified);
        assert!(detect_source_combined("sucre", "sugar").is_none());
    }

    #[test]
    fn test_allergens_for_source() {
        assert_eq!(allergens_for(LecithinSource::Soy), vec!["soy"]);
        assert_eq!(allergens_for(LecithinSource::Egg), vec!["egg"]);
        assert!(allergens_for(LecithinSource::Sunflower).is_empty());
        assert!(allergens_for(LecithinSource::Unspecified).is_empty());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(LecithinSource::Sunflower.display_name(), "sunflower lecithin");
        assert_eq!(
            LecithinSource::Unspecified.display_name(),
            "lecithin (source unspecified)"
        );
    }
}
