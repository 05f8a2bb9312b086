//! Allergy matching against user-declared allergies, plus "may contain"
//! advisory extraction.

use crate::lecithin::{detect_source, is_lecithin, LecithinSource};
use crate::lexicon::Lexicon;
use crate::text::{normalize, word_in_text};
use crate::zones::ALLERGEN_ADVISORY_HEADERS;
use serde::Serialize;
use std::collections::BTreeSet;

/// Advisory vocabulary mapped to canonical allergen names.
const ADVISORY_TERMS: &[(&str, &[&str])] = &[
    ("tree nuts", &["nueces", "nuts", "noix", "nüsse", "frutos secos"]),
    ("almonds", &["almendras", "almonds", "amandes"]),
    ("hazelnuts", &["avellanas", "hazelnuts", "noisettes"]),
    (
        "peanuts",
        &["cacahuetes", "peanuts", "cacahuètes", "arachides", "erdnüsse", "mani"],
    ),
    ("pistachios", &["pistachos", "pistachios", "pistaches"]),
    ("cashews", &["anacardos", "cashews", "noix de cajou"]),
    ("milk", &["leche", "milk", "lait", "milch"]),
    ("lactose", &["lactosa", "lactose"]),
    ("dairy", &["lácteos", "dairy", "laitiers"]),
    ("gluten", &["gluten"]),
    ("wheat", &["trigo", "wheat", "blé", "weizen"]),
    ("barley", &["cebada", "barley"]),
    ("rye", &["centeno", "rye", "seigle"]),
    ("oats", &["avena", "oats", "avoine"]),
    ("soy", &["soja", "soy", "soya"]),
    (
        "egg",
        &["huevo", "huevos", "egg", "eggs", "oeuf", "oeufs", "ei", "eier"],
    ),
    ("fish", &["pescado", "fish", "poisson", "fisch"]),
    ("shellfish", &["mariscos", "shellfish"]),
    ("crustaceans", &["crustáceos", "crustaceans"]),
    ("mollusks", &["moluscos", "mollusks"]),
    ("sesame", &["sésamo", "sesame", "sésame"]),
    ("sulfites", &["sulfitos", "sulfites", "sulphites"]),
    ("celery", &["apio", "celery", "céleri"]),
    ("mustard", &["mostaza", "mustard", "moutarde"]),
    ("lupin", &["altramuces", "lupin", "lupine"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllergyCheck {
    pub is_allergen: bool,
    pub allergen_type: Option<String>,
    /// False when the match rests on an assumption ("possible soy").
    pub is_confirmed: bool,
    pub explanation: Option<String>,
}

impl AllergyCheck {
    fn clear(explanation: Option<String>) -> Self {
        Self {
            is_allergen: false,
            allergen_type: None,
            is_confirmed: false,
            explanation,
        }
    }
}

pub fn check_allergy<S: AsRef<str>>(ingredient: &str, allergies: &[S], lexicon: &Lexicon) -> bool {
    check_allergy_detailed(ingredient, allergies, lexicon).is_allergen
}

/// Lecithin is resolved through its source; unspecified lecithin is treated
/// as possible soy. Everything else is matched against the expanded terms of
/// each declared allergy.
pub fn check_allergy_detailed<S: AsRef<str>>(
    ingredient: &str,
    allergies: &[S],
    lexicon: &Lexicon,
) -> AllergyCheck {
    if allergies.is_empty() {
        return AllergyCheck::clear(None);
    }

    if is_lecithin(ingredient) {
        return check_lecithin(ingredient, allergies, lexicon);
    }

    for allergy in allergies {
        let allergy = allergy.as_ref();
        if lexicon
            .allergens
            .expand(allergy)
            .iter()
            .any(|term| word_in_text(ingredient, term))
        {
            return AllergyCheck {
                is_allergen: true,
                allergen_type: Some(allergy.to_string()),
                is_confirmed: true,
                explanation: Some(format!("Contains {}", allergy)),
            };
        }
    }

    AllergyCheck::clear(None)
}

fn check_lecithin<S: AsRef<str>>(
    ingredient: &str,
    allergies: &[S],
    lexicon: &Lexicon,
) -> AllergyCheck {
    let Some(found) = detect_source(ingredient) else {
        return AllergyCheck::clear(None);
    };

    for allergy in allergies {
        let canonical = lexicon.allergens.canonical(allergy.as_ref());

        if found.source.allergens().contains(&canonical.as_str()) {
            return AllergyCheck {
                is_allergen: true,
                allergen_type: Some(canonical.clone()),
                is_confirmed: true,
                explanation: Some(format!(
                    "{} contains {}",
                    capitalize(found.source.display_name()),
                    canonical
                )),
            };
        }

        if found.source == LecithinSource::Unspecified && canonical == "soy" {
            return AllergyCheck {
                is_allergen: true,
                allergen_type: Some("soy".to_string()),
                is_confirmed: false,
                explanation: Some("Lecithin source unspecified - may contain soy".to_string()),
            };
        }
    }

    AllergyCheck::clear(Some(format!("{} - no allergen match", found.explanation)))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Canonical allergens named in a "may contain" style advisory, sorted.
pub fn extract_from_advisory(advisory: &str) -> Vec<String> {
    let mut text = normalize(advisory);
    if text.is_empty() {
        return Vec::new();
    }

    // longest headers first so "may contain traces" is removed whole
    let mut headers: Vec<&str> = ALLERGEN_ADVISORY_HEADERS.to_vec();
    headers.sort_by_key(|h| std::cmp::Reverse(h.len()));
    for header in headers {
        text = text.replace(header, " ");
    }

    ADVISORY_TERMS
        .iter()
        .filter(|(_, terms)| terms.iter().any(|term| word_in_text(&text, term)))
        .map(|(allergen, _)| allergen.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Display names of every lexicon allergen whose terms appear in `text`.
pub fn detect_allergens(text: &str, lexicon: &Lexicon) -> Vec<String> {
    lexicon
        .allergens
        .allergens
        .values()
        .filter(|entry| entry.terms().any(|term| word_in_text(text, term)))
        .map(|entry| entry.display.clone())
        .collect()
}
