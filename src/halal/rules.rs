use super::{Findings, HalalContext, HalalRule, Lean};
use crate::lecithin::{detect_source, detect_source_combined, LecithinSource};
use crate::lexicon::{ENumberTier, RuleStatus};
use crate::text::{any_word_in_text, contains_e_number, extract_e_numbers, word_in_text};
use crate::verdict::{Confidence, HalalStatus};
use regex::Regex;

type Outcome = Option<(HalalStatus, Confidence)>;

const HARAM: Outcome = Some((HalalStatus::Haram, Confidence::High));
const HALAL: Outcome = Some((HalalStatus::HalalConfirmed, Confidence::High));

/// Animal-derivative categories. Forbidden animals end the chain.
pub struct AnimalDerivativeRule;

impl HalalRule for AnimalDerivativeRule {
    fn name(&self) -> &str {
        "animal_derivatives"
    }

    fn check(&self, ctx: &HalalContext, findings: &mut Findings) -> Outcome {
        let hit = ctx.lexicon.animal.classify(&ctx.text)?;

        match hit.status {
            RuleStatus::Haram => {
                findings.record(hit.reason_code, hit.reason, Lean::Forbidden);
                HARAM
            }
            RuleStatus::Mushbooh if ctx.certification.is_strong() => {
                findings.record(
                    format!("{}_but_certified", hit.reason_code),
                    format!("{}; but strong halal certification detected", hit.reason),
                    Lean::Neutral,
                );
                None
            }
            RuleStatus::Mushbooh => {
                findings.record(hit.reason_code, hit.reason, Lean::Doubtful);
                None
            }
            RuleStatus::Halal => {
                findings.record(hit.reason_code, hit.reason, Lean::Favorable);
                None
            }
        }
    }
}

/// Carmine and cochineal by name, for texts the animal categories missed.
pub struct ColorantRule;

impl HalalRule for ColorantRule {
    fn name(&self) -> &str {
        "haram_colorants"
    }

    fn check(&self, ctx: &HalalContext, findings: &mut Findings) -> Outcome {
        if findings.has_code_containing("insect") {
            return None;
        }
        if !ctx.lexicon.plant_based.has_haram_colorant(&ctx.text) {
            return None;
        }

        findings.record(
            "haram_carmine_cochineal",
            "Detected carmine/cochineal (commonly E120)",
            Lean::Forbidden,
        );
        HARAM
    }
}

pub struct ENumberRule;

impl HalalRule for ENumberRule {
    fn name(&self) -> &str {
        "e_numbers"
    }

    fn check(&self, ctx: &HalalContext, findings: &mut Findings) -> Outcome {
        for code in extract_e_numbers(&ctx.text) {
            let Some(hit) = ctx.lexicon.e_numbers.lookup(&code) else {
                log::debug!("Unknown E-number E{}", code);
                continue;
            };

            let evidence = format!(
                "Detected E{} ({}) - {}",
                code.to_uppercase(),
                hit.entry.name,
                hit.entry.reason
            );

            match hit.tier {
                ENumberTier::AlwaysHaram => {
                    findings.record(hit.entry.reason_code.as_str(), evidence, Lean::Forbidden);
                    return HARAM;
                }
                ENumberTier::SourceDependent => {
                    findings.record(hit.entry.reason_code.as_str(), evidence, Lean::Doubtful);
                }
                ENumberTier::Halal => {}
            }
        }

        None
    }
}

/// Alcohol categories. Beverages never yield to certification.
pub struct AlcoholRule;

impl HalalRule for AlcoholRule {
    fn name(&self) -> &str {
        "alcohol"
    }

    fn check(&self, ctx: &HalalContext, findings: &mut Findings) -> Outcome {
        let category = ctx.lexicon.alcohol.classify(&ctx.text)?;

        match category.status {
            RuleStatus::Halal => {
                findings.record(
                    category.reason_code.as_str(),
                    category.reason.as_str(),
                    Lean::Favorable,
                );
                None
            }
            _ if category.yields_to_certification && ctx.certification.is_strong() => {
                findings.record(
                    "alcohol_related_term_present_but_halal_cert_claim",
                    format!(
                        "{}; but strong halal certification phrase detected",
                        category.reason
                    ),
                    Lean::Neutral,
                );
                None
            }
            _ => {
                findings.record(
                    category.reason_code.as_str(),
                    category.reason.as_str(),
                    Lean::Forbidden,
                );
                HARAM
            }
        }
    }
}

/// Finer gelatin source resolution than the generic animal category.
pub struct GelatinRule {
    explicit_halal: Regex,
}

impl GelatinRule {
    pub fn new() -> Self {
        Self {
            explicit_halal: Regex::new(r"gelatine?\s*\(halal\)|halal\s+gelatine?").unwrap(),
        }
    }
}

impl Default for GelatinRule {
    fn default() -> Self {
        Self::new()
    }
}

impl HalalRule for GelatinRule {
    fn name(&self) -> &str {
        "gelatin"
    }

    fn check(&self, ctx: &HalalContext, findings: &mut Findings) -> Outcome {
        let text = &ctx.text;
        if !any_word_in_text(text, &["gelatin", "gelatine"]) && !contains_e_number(text, "441") {
            return None;
        }

        if any_word_in_text(text, &["porcine", "pig", "swine", "pork"]) {
            findings.record("haram_porcine_gelatin", "Porcine gelatin detected", Lean::Forbidden);
            return HARAM;
        }

        if self.explicit_halal.is_match(text) {
            findings.record(
                "halal_gelatin_explicit",
                "Gelatin explicitly labeled halal",
                Lean::Favorable,
            );
            return HALAL;
        }

        if any_word_in_text(text, &["fish", "marine"]) {
            findings.record("fish_gelatin", "Fish-derived gelatin", Lean::Favorable);
            return HALAL;
        }

        if any_word_in_text(text, &["bovine", "beef"]) {
            findings.record(
                "bovine_gelatin_unverified",
                "Bovine gelatin without explicit halal certification",
                Lean::Doubtful,
            );
        }

        None
    }
}

/// Lecithin source resolution, preferring the original-language text.
pub struct LecithinRule;

impl HalalRule for LecithinRule {
    fn name(&self) -> &str {
        "lecithin"
    }

    fn check(&self, ctx: &HalalContext, findings: &mut Findings) -> Outcome {
        let found = match ctx.original {
            Some(original) => detect_source_combined(original, &ctx.text),
            None => detect_source(&ctx.text),
        }?;
        let certified = ctx.certification.is_strong();

        match found.source {
            LecithinSource::Sunflower => {
                findings.record(
                    "sunflower_lecithin_halal",
                    "Sunflower lecithin detected - plant-based, halal",
                    Lean::Favorable,
                );
                HALAL
            }
            LecithinSource::Soy if certified => {
                findings.record(
                    "soy_lecithin_certified_halal",
                    "Soy lecithin with strong halal certification",
                    Lean::Favorable,
                );
                HALAL
            }
            LecithinSource::Soy => {
                findings.record(
                    "soy_lecithin_unverified_mushbooh",
                    "Soy lecithin detected - processing may involve alcohol; requires halal certification",
                    Lean::Doubtful,
                );
                Some((HalalStatus::NotHalalUnverified, Confidence::Medium))
            }
            LecithinSource::Rapeseed => {
                findings.record(
                    "rapeseed_lecithin_halal",
                    "Rapeseed/canola lecithin detected - plant-based, halal",
                    Lean::Favorable,
                );
                HALAL
            }
            LecithinSource::Egg => {
                findings.record(
                    "egg_lecithin_halal",
                    "Egg lecithin detected - halal (note: egg allergen)",
                    Lean::Favorable,
                );
                HALAL
            }
            LecithinSource::Unspecified if certified => {
                findings.record(
                    "lecithin_unspecified_but_certified",
                    "Lecithin source not specified; but strong halal certification detected",
                    Lean::Neutral,
                );
                None
            }
            LecithinSource::Unspecified => {
                findings.record(
                    "lecithin_source_unspecified_mushbooh",
                    "Lecithin detected but source not specified - possible soy, egg, or plant origin",
                    Lean::Doubtful,
                );
                None
            }
        }
    }
}

pub struct FlavouringRule;

impl HalalRule for FlavouringRule {
    fn name(&self) -> &str {
        "flavourings"
    }

    fn check(&self, ctx: &HalalContext, findings: &mut Findings) -> Outcome {
        if any_word_in_text(&ctx.text, &["natural flavor", "natural flavour"]) {
            findings.record(
                "natural_flavour_source_unknown_mushbooh",
                "Natural flavours have undisclosed sources",
                Lean::Doubtful,
            );
        } else if word_in_text(&ctx.text, "artificial") {
            findings.record(
                "artificial_flavour",
                "Artificial flavouring (no alcohol indicated)",
                Lean::Favorable,
            );
        }

        None
    }
}
