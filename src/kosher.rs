use crate::certification::is_strong_kosher_signal;
use crate::lexicon::Lexicon;
use crate::text::{any_word_in_text, contains_e_number, normalize};
use crate::verdict::{Confidence, KosherStatus, KosherVerdict};

/// Kosher verdict for one ingredient. Each check below is terminal.
pub fn evaluate_kosher_with(ingredient: &str, lexicon: &Lexicon) -> KosherVerdict {
    let text = normalize(ingredient);
    let terms = &lexicon.kosher;
    let certified = is_strong_kosher_signal(&text, lexicon);

    let not_kosher = |code: &str, evidence: &str| {
        KosherVerdict::new(ingredient, KosherStatus::NotKosher, Confidence::High)
            .with_reason(code, evidence)
    };
    let requires = |code: &str, evidence: &str| {
        KosherVerdict::new(
            ingredient,
            KosherStatus::RequiresKosherCertification,
            Confidence::Low,
        )
        .with_reason(code, evidence)
    };
    let confirmed = |code: &str, evidence: &str| {
        KosherVerdict::new(ingredient, KosherStatus::KosherConfirmed, Confidence::High)
            .with_reason(code, evidence)
    };

    if any_word_in_text(&text, &terms.forbidden_land_animals) {
        return not_kosher("forbidden_land_animal", "Non-kosher land animal detected");
    }

    if any_word_in_text(&text, &terms.forbidden_seafood) {
        return not_kosher(
            "forbidden_seafood_no_fins_scales",
            "Seafood without fins and scales detected",
        );
    }

    if any_word_in_text(&text, &terms.insects)
        || terms
            .insect_e_numbers
            .iter()
            .any(|code| contains_e_number(&text, code))
    {
        return not_kosher(
            "insect_derived_not_kosher",
            "Carmine / E120 insect-derived colorant detected",
        );
    }

    if any_word_in_text(&text, &terms.blood) {
        return not_kosher("blood_not_kosher", "Blood-derived ingredient detected");
    }

    if !certified && any_word_in_text(&text, &terms.grape_products) {
        return requires(
            "grape_product_requires_supervision",
            "Grape-derived product requires kosher supervision",
        );
    }

    if any_word_in_text(&text, &terms.source_dependent) {
        log::debug!("Kosher source-dependent term in '{}'", text);
        return if certified {
            confirmed(
                "kosher_certified_source_dependent",
                "Strong kosher certification detected",
            )
        } else {
            requires(
                "source_dependent_requires_certification",
                "Ingredient requires kosher-certified source",
            )
        };
    }

    if certified {
        confirmed("kosher_certified", "Strong kosher certification detected")
    } else {
        requires(
            "no_kosher_certification",
            "No evidence of kosher certification",
        )
    }
}

pub fn evaluate_kosher(ingredient: &str) -> KosherVerdict {
    evaluate_kosher_with(ingredient, Lexicon::global())
}

/// Display tags for the per-ingredient kosher view.
pub fn kosher_tags(verdict: &KosherVerdict) -> Vec<String> {
    let mut tags = Vec::new();

    match verdict.status {
        KosherStatus::NotKosher => tags.push("Not Kosher".to_string()),
        KosherStatus::RequiresKosherCertification => {
            tags.push("Requires Kosher Certification".to_string())
        }
        KosherStatus::KosherConfirmed => {}
    }
    if verdict.has_reason_containing("grape") {
        tags.push("Grape Product".to_string());
    }
    if verdict.has_reason_containing("source_dependent") {
        tags.push("Source Dependent".to_string());
    }

    tags
}

impl KosherVerdict {
    pub fn violations(&self) -> Vec<String> {
        match self.status {
            KosherStatus::NotKosher => self.reason_codes.iter().cloned().collect(),
            KosherStatus::RequiresKosherCertification => {
                vec!["requires_kosher_certification".to_string()]
            }
            KosherStatus::KosherConfirmed => Vec::new(),
        }
    }
}
