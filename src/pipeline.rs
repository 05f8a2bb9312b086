//! Scan analysis: joins zone segmentation, the externally parsed ingredient
//! records and the evaluators into the report returned to clients.

use crate::aggregate::{aggregate_halal, aggregate_kosher};
use crate::allergens::{check_allergy, extract_from_advisory};
use crate::config::{Config, PipelineSettings};
use crate::halal::HalalEvaluator;
use crate::kosher::{evaluate_kosher_with, kosher_tags};
use crate::lecithin::{detect_source, is_lecithin, LecithinSource};
use crate::lexicon::Lexicon;
use crate::text::dedupe;
use crate::verdict::{Confidence, KosherStatus, ProductHalalStatus, ProductVerdict};
use crate::zones::{segment_ocr_text, ParseStatus, ZoneSegmentation};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

lazy_static! {
    static ref WORD_TOKEN: Regex = Regex::new(r"\w+").unwrap();
}

const ADVISORY_ONLY_MIN_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Diet {
    Halal,
    Kosher,
}

impl Diet {
    /// Violation codes for one ingredient under this diet. Halal is strict.
    pub fn check_violations(&self, ingredient: &str, lexicon: &Lexicon) -> Vec<String> {
        match self {
            Diet::Halal => HalalEvaluator::new(lexicon)
                .evaluate(ingredient, true, None)
                .violations(),
            Diet::Kosher => evaluate_kosher_with(ingredient, lexicon).violations(),
        }
    }
}

/// One ingredient record from the external label parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub normalized: String,
}

impl ParsedIngredient {
    /// Text used for rule matching: normalized, then English, then original.
    pub fn matching_key(&self) -> String {
        [&self.normalized, &self.english, &self.original]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLabel {
    #[serde(default)]
    pub ingredients: Vec<ParsedIngredient>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub detected_language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub diet: Option<Diet>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub raw_text: String,
    #[serde(default)]
    pub parsed: ParsedLabel,
    #[serde(default)]
    pub profile: UserProfile,
}

/// Rejections surfaced to the user as "retake or recrop" guidance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("Could not extract text from image. Please take a clearer photo of the ingredients list.")]
    OcrFailed,
    #[error("No ingredient list found. Please crop to show 'Ingredientes:' or 'Ingredients:' section.")]
    NoIngredients,
    #[error("Ingredient list could not be verified. Please crop closer to the ingredient section.")]
    Unverified,
    #[error("Only allergen warnings were detected, but no ingredients. Please crop to include the full ingredient list (usually starts with 'Ingredientes:' or 'Ingredients:').")]
    AdvisoryOnly,
    #[error("Could not read ingredient list clearly. Please: 1) Zoom in more on the ingredient text, 2) Ensure good lighting, 3) Include the 'Ingredientes:' header if visible.")]
    UnclearList,
    #[error("Very few ingredients detected. The text may be too small or blurry. Try zooming in closer to the ingredient list.")]
    TooFewIngredients,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HalalView {
    /// "HALAL" for confirmed ingredients.
    pub status: String,
    pub confidence: Confidence,
    pub reason_codes: Vec<String>,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KosherView {
    pub status: KosherStatus,
    pub confidence: Confidence,
    pub reason_codes: Vec<String>,
    pub evidence: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientAnalysis {
    pub name: String,
    pub original: String,
    pub english: String,
    pub halal: Option<HalalView>,
    pub kosher: Option<KosherView>,
    pub allergy_flag: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DietVerdict {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halal: Option<ProductVerdict<ProductHalalStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kosher: Option<ProductVerdict<KosherStatus>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub detected_language: String,
    pub diet_verdict: Option<DietVerdict>,
    /// Display names after lecithin correction.
    pub ingredients: Vec<String>,
    pub analysis: Vec<IngredientAnalysis>,
    pub allergens: Vec<String>,
}

/// Token guardrail and zone segmentation, run before the label parser.
pub fn segment(raw_text: &str, settings: &PipelineSettings) -> Result<ZoneSegmentation, ScanError> {
    let tokens = WORD_TOKEN.find_iter(raw_text).count();
    if tokens < settings.min_ocr_tokens {
        log::debug!("OCR guardrail: {} tokens", tokens);
        return Err(ScanError::OcrFailed);
    }

    let zones = segment_ocr_text(raw_text);
    for note in &zones.parse_notes {
        log::debug!("Segmentation: {}", note);
    }

    match zones.parse_status {
        ParseStatus::NoIngredients => Err(ScanError::NoIngredients),
        ParseStatus::Unverified
            if zones.ingredient_zone.chars().count() < settings.min_unverified_zone_chars =>
        {
            Err(ScanError::Unverified)
        }
        _ => Ok(zones),
    }
}

/// Evaluate the parsed ingredients of an already segmented label.
pub fn analyze(
    request: &ScanRequest,
    zones: &ZoneSegmentation,
    lexicon: &Lexicon,
    config: &Config,
) -> Result<ScanReport, ScanError> {
    let parsed = &request.parsed;
    let settings = &config.pipeline;

    if parsed.ingredients.len() < settings.min_ingredients {
        return Err(
            if zones.allergen_advisory_zone.chars().count() > ADVISORY_ONLY_MIN_CHARS {
                ScanError::AdvisoryOnly
            } else if zones.parse_status == ParseStatus::Unverified {
                ScanError::UnclearList
            } else {
                ScanError::TooFewIngredients
            },
        );
    }

    let allergens = correct_allergens(parsed, zones);
    let diet = request.profile.diet;
    // scans always resolve doubtful ingredients as failures
    let strict = true;
    let halal_evaluator = HalalEvaluator::new(lexicon);

    let mut halal_verdicts = Vec::new();
    let mut kosher_verdicts = Vec::new();
    let mut names = Vec::new();
    let mut analysis = Vec::new();

    for ingredient in &parsed.ingredients {
        let key = ingredient.matching_key();
        let lecithin = is_lecithin(&key) || is_lecithin(&ingredient.original);

        let name = if lecithin {
            lecithin_display_name(&request.raw_text, ingredient, &key).to_string()
        } else if ingredient.english.trim().is_empty() {
            ingredient.original.clone()
        } else {
            ingredient.english.clone()
        };

        let halal = (diet == Some(Diet::Halal)).then(|| {
            let hint = lecithin.then_some(request.raw_text.as_str());
            let verdict = halal_evaluator.evaluate(&key, strict, hint);
            let view = HalalView {
                status: verdict.status.display_label().to_string(),
                confidence: verdict.confidence,
                reason_codes: verdict.reason_codes.as_slice().to_vec(),
                evidence: verdict.evidence.as_slice().to_vec(),
            };
            halal_verdicts.push(verdict);
            view
        });

        let kosher = (diet == Some(Diet::Kosher)).then(|| {
            let verdict = evaluate_kosher_with(&key, lexicon);
            let view = KosherView {
                status: verdict.status,
                confidence: verdict.confidence,
                reason_codes: verdict.reason_codes.as_slice().to_vec(),
                evidence: verdict.evidence.as_slice().to_vec(),
                tags: kosher_tags(&verdict),
            };
            kosher_verdicts.push(verdict);
            view
        });

        let allergy_text = if lecithin {
            request.raw_text.as_str()
        } else if ingredient.original.trim().is_empty() {
            key.as_str()
        } else {
            ingredient.original.as_str()
        };
        let allergy_flag = check_allergy(allergy_text, &request.profile.allergies, lexicon);

        names.push(name.clone());
        analysis.push(IngredientAnalysis {
            name,
            original: ingredient.original.clone(),
            english: ingredient.english.clone(),
            halal,
            kosher,
            allergy_flag,
        });
    }

    let diet_verdict = diet.map(|diet| match diet {
        Diet::Halal => DietVerdict {
            halal: Some(aggregate_halal(&halal_verdicts, strict)),
            kosher: None,
        },
        Diet::Kosher => DietVerdict {
            halal: None,
            kosher: Some(aggregate_kosher(&kosher_verdicts)),
        },
    });

    let detected_language = parsed
        .detected_language
        .clone()
        .filter(|l| !l.trim().is_empty())
        .or_else(|| zones.detected_language.map(|l| l.code().to_string()))
        .unwrap_or_else(|| "unknown".to_string());

    Ok(ScanReport {
        detected_language,
        diet_verdict,
        ingredients: names,
        analysis,
        allergens,
    })
}

/// Segment, then analyze.
pub fn analyze_scan(
    request: &ScanRequest,
    lexicon: &Lexicon,
    config: &Config,
) -> Result<ScanReport, ScanError> {
    let zones = segment(&request.raw_text, &config.pipeline)?;
    analyze(request, &zones, lexicon, config)
}

/// Source named by the raw label text first, then the original-language
/// record, then the normalized key.
fn lecithin_display_name(raw_text: &str, ingredient: &ParsedIngredient, key: &str) -> &'static str {
    [raw_text, ingredient.original.as_str(), key]
        .into_iter()
        .filter_map(detect_source)
        .map(|found| found.source)
        .find(|source| *source != LecithinSource::Unspecified)
        .unwrap_or(LecithinSource::Unspecified)
        .display_name()
}

/// Replace translated lecithin allergens with the label's actual lecithin
/// source, then append advisory allergens as "may contain".
fn correct_allergens(parsed: &ParsedLabel, zones: &ZoneSegmentation) -> Vec<String> {
    let joined_originals = parsed
        .ingredients
        .iter()
        .map(|i| i.original.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let source = [zones.ingredient_zone.as_str(), joined_originals.as_str()]
        .into_iter()
        .filter_map(detect_source)
        .map(|found| found.source)
        .find(|source| *source != LecithinSource::Unspecified)
        .unwrap_or(LecithinSource::Unspecified);

    let mut allergens = Vec::new();
    for allergen in &parsed.allergens {
        if !allergen.to_lowercase().contains("lecithin") && !is_lecithin(allergen) {
            allergens.push(allergen.clone());
            continue;
        }

        log::debug!("Correcting lecithin allergen '{}' to source {}", allergen, source);
        match source {
            LecithinSource::Soy => allergens.push("soy".to_string()),
            LecithinSource::Egg => allergens.push("egg".to_string()),
            LecithinSource::Unspecified => allergens.push("soy (possible)".to_string()),
            LecithinSource::Sunflower | LecithinSource::Rapeseed => {}
        }
    }

    for advisory in extract_from_advisory(&zones.allergen_advisory_zone) {
        let present = allergens
            .iter()
            .any(|a| a.to_lowercase().starts_with(&advisory));
        if !present {
            allergens.push(format!("{} (may contain)", advisory));
        }
    }

    dedupe(&allergens)
}
