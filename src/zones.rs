//! Zone segmentation of raw OCR label text.
//!
//! Splits a label into the header (product name, marketing copy), the
//! ingredient list and the allergen advisory. Only the ingredient zone is
//! handed to the parser; nutrition facts and product names must not leak in.

use crate::language::{LabelLanguage, LanguageDetector};
use crate::normalization::{normalize_for_matching, FoldedText};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const INGREDIENT_HEADERS: &[&str] = &[
    // es
    "ingredientes:",
    "ingredientes",
    "ingredientes :",
    // en
    "ingredients:",
    "ingredients",
    "ingredients :",
    // fr
    "ingrédients:",
    "ingrédients",
    // de
    "zutaten:",
    "zutaten",
    "zutaten :",
    // it
    "ingredienti:",
    "ingredienti",
    "ingredienti :",
    // nl, pl
    "ingrediënten:",
    "ingredienten:",
    "składniki:",
    "skladniki:",
    // OCR misreads
    "ingredlentes:",
    "ingredlentes",
    "lngredientes:",
    "lngredients:",
];

pub const ALLERGEN_ADVISORY_HEADERS: &[&str] = &[
    // es
    "puede contener",
    "puede contener:",
    "puede contener trazas",
    "contiene:",
    "contiene",
    "alérgenos:",
    // en
    "may contain",
    "may contain:",
    "may contain traces",
    "contains:",
    "contains",
    "allergens:",
    "allergy advice:",
    "for allergens",
    "for allergens,",
    "allergen information",
    // fr
    "peut contenir",
    "peut contenir:",
    "peut contenir des traces",
    "contient:",
    "contient",
    "allergènes:",
    // de
    "kann enthalten",
    "kann enthalten:",
    "kann spuren enthalten",
    "enthält:",
    "enthält",
    "allergene:",
    // it
    "può contenere",
    "puo contenere",
    "può contenere:",
    "allergeni:",
    // pt
    "pode conter",
    "pode conter:",
    // merged OCR tokens
    "puedecontener",
    "maycontain",
    "peutcontenir",
    "kannenthalten",
];

/// Multilingual ingredient vocabulary for the headerless fallback.
/// The first `PREFIX_TERM_COUNT` entries confirm a stripped product-name prefix.
pub const COMMON_INGREDIENT_TERMS: &[&str] = &[
    "sugar", "azúcar", "azucar", "sucre", "zucker", "zucchero", "glucose", "glucosa", "fructose",
    "fructosa", "oil", "aceite", "huile", "öl", "olio", "butter", "mantequilla", "beurre",
    "manteca", "fat", "grasa", "graisse", "fett", "cocoa", "cacao", "kakao", "chocolate", "milk",
    "leche", "lait", "milch", "latte", "cream", "crema", "crème", "lactose", "lactosa", "flour",
    "harina", "farine", "mehl", "wheat", "trigo", "blé", "weizen", "starch", "almidón", "amidon",
    "egg", "huevo", "oeuf", "ei", "uovo", "lecithin", "lecitina", "lécithine", "lezithin",
    "emulsifier", "emulsionante", "émulsifiant", "emulgator", "salt", "sal", "sel", "salz",
    "vanilla", "vainilla", "vanille", "aroma", "flavor", "flavour", "e322", "e471", "e500", "e330",
];

const PREFIX_TERM_COUNT: usize = 20;
const MIN_RAW_CHARS: usize = 5;
const MIN_ZONE_CHARS: usize = 5;
const MERGED_HEADER_MIN_CHARS: usize = 8;

lazy_static! {
    static ref SEGMENTER: ZoneSegmenter = ZoneSegmenter::new();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParseStatus {
    Ok,
    Unverified,
    NoIngredients,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSegmentation {
    pub raw_text: String,
    pub header_zone: String,
    pub ingredient_zone: String,
    pub allergen_advisory_zone: String,
    pub detected_language: Option<LabelLanguage>,
    pub parse_status: ParseStatus,
    pub parse_notes: Vec<String>,
}

/// Header occurrence with byte offsets into the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMatch {
    pub start: usize,
    pub end: usize,
    pub header: &'static str,
}

/// Earliest occurrence of any header, tried per header as an exact lowercase
/// match, then accent-folded, then with all spaces removed. Ties keep the
/// header listed first.
pub fn find_header_position(text: &str, headers: &[&'static str]) -> Option<HeaderMatch> {
    let lowered = FoldedText::lowercase(text);
    let folded = FoldedText::for_matching(text);
    let merged = FoldedText::without_spaces(text);

    let mut best: Option<HeaderMatch> = None;

    for &header in headers {
        let header_lower = header.to_lowercase();
        let header_folded = normalize_for_matching(header);
        let header_merged = header_folded.replace(' ', "");

        let found = if let Some(pos) = lowered.text.find(&header_lower) {
            Some(lowered.source_span(pos, header_lower.len()))
        } else if let Some(pos) = folded.text.find(&header_folded) {
            Some(folded.source_span(pos, header_folded.len()))
        } else if header_merged.chars().count() >= MERGED_HEADER_MIN_CHARS {
            merged
                .text
                .find(&header_merged)
                .map(|pos| merged.source_span(pos, header_merged.len()))
        } else {
            None
        };

        if let Some((start, end)) = found {
            if best.map_or(true, |b| start < b.start) {
                best = Some(HeaderMatch { start, end, header });
            }
        }
    }

    best
}

pub struct ZoneSegmenter {
    non_ingredient_patterns: Vec<Regex>,
    pure_numeric: Regex,
    product_prefix: Regex,
    repeated_separator: Regex,
    whitespace: Regex,
}

impl ZoneSegmenter {
    pub fn new() -> Self {
        let non_ingredient_patterns = [
            r"\b\d+\s*%\s*(mínimo|minimo|minimum|min|máximo|maximo|maximum|max)?\b",
            r"\bcacao\s*:?\s*\d+\s*%",
            r"\bgrasa\s*:?\s*\d+\s*%",
            r"\bfat\s*:?\s*\d+\s*%",
            r"\b\d+\s*(g|kg|ml|l|oz|lb)\b",
            r"\b\d{8,13}\b",
            r"\b(ean|upc|gtin)\s*:?\s*\d+",
            r"\b\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4}\b",
            r"\b(best before|consumir antes|à consommer avant|mindestens haltbar)\b",
            r"\b(lote?|batch|lot)\s*:?\s*[a-z0-9]+\b",
            r"\b(conservar|store|conserver|aufbewahren|keep)\s+(en|in|au|im|at)\b",
            r"\b(nutrition|información nutricional|valeurs nutritionnelles|nährwerte)\b",
            r"\b(calories|calorías|kcal|kj)\b",
            r"\b(made in|fabricado en|fabriqué|hergestellt in|hecho en)\b",
            r"\b(product of|producto de|produit de)\b",
        ]
        .iter()
        .map(|pattern| Regex::new(&format!("(?i){}", pattern)).unwrap())
        .collect();

        Self {
            non_ingredient_patterns,
            pure_numeric: Regex::new(r"^[\d\s.,]+$").unwrap(),
            product_prefix: Regex::new(r"\d+\s*%[^:]*:\s*").unwrap(),
            repeated_separator: Regex::new(r"[,;]\s*[,;]").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Percentages, weights, barcodes, dates, lot numbers, storage and
    /// nutrition lines, origin statements, near-empty and pure-numeric lines.
    pub fn is_non_ingredient_line(&self, line: &str) -> bool {
        let line = line.trim().to_lowercase();

        if line.chars().count() < 2 {
            return true;
        }

        if self.non_ingredient_patterns.iter().any(|re| re.is_match(&line)) {
            return true;
        }

        self.pure_numeric.is_match(&line)
    }

    pub fn clean_ingredient_zone(&self, text: &str) -> String {
        let kept: Vec<&str> = text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty() && !self.is_non_ingredient_line(line))
            .collect();

        let joined = kept.join(" ");
        let collapsed = self.whitespace.replace_all(&joined, " ");
        self.repeated_separator
            .replace_all(&collapsed, ",")
            .trim()
            .to_string()
    }

    /// Strip a leading "<name> NN% <name>:" product prefix, or salvage the list
    /// when a percentage-bearing product name runs into the first comma.
    pub fn remove_product_name_prefix(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        if let Some(m) = self.product_prefix.find(text) {
            let remaining = &text[m.end()..];
            if has_prefix_term(&remaining.to_lowercase()) && remaining.chars().count() > 20 {
                return remaining.to_string();
            }
        }

        if let Some(first_comma) = text.find(',') {
            let before = &text[..first_comma];
            let after = text[first_comma..].to_lowercase();
            if first_comma > 0
                && before.chars().count() < 50
                && before.contains('%')
                && has_prefix_term(&after)
            {
                let lowered = FoldedText::lowercase(text);
                for term in COMMON_INGREDIENT_TERMS {
                    let Some(pos) = lowered.text.find(term) else {
                        continue;
                    };
                    let source_pos = lowered.source_offset(pos);
                    if text[..source_pos].chars().count() >= 100 {
                        continue;
                    }
                    let start = text[..source_pos]
                        .rfind([',', ';', ':'])
                        .map_or(0, |idx| idx + 1);
                    return text[start..].trim().to_string();
                }
            }
        }

        text.to_string()
    }

    /// Ingredient-like text without a header: at least two ingredient terms
    /// and either (two commas and five words) or two semicolons.
    pub fn attempt_fallback_extraction(
        &self,
        raw_text: &str,
        advisory: Option<HeaderMatch>,
    ) -> Option<String> {
        if raw_text.is_empty() {
            return None;
        }

        let lowered = raw_text.to_lowercase();
        let term_hits = COMMON_INGREDIENT_TERMS
            .iter()
            .filter(|term| lowered.contains(*term))
            .count();
        let commas = raw_text.matches(',').count();
        let semicolons = raw_text.matches(';').count();
        let words = raw_text.split_whitespace().count();

        let likely_ingredients =
            term_hits >= 2 && ((commas >= 2 && words >= 5) || semicolons >= 2);
        if !likely_ingredients {
            return None;
        }

        let zone = match advisory {
            Some(found) if raw_text[..found.start].chars().count() > 10 => {
                raw_text[..found.start].trim()
            }
            _ => raw_text.trim(),
        };

        let cleaned = self.remove_product_name_prefix(zone);
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }

    pub fn segment(&self, raw_text: &str) -> ZoneSegmentation {
        let mut notes = Vec::new();

        if raw_text.trim().chars().count() < MIN_RAW_CHARS {
            return ZoneSegmentation {
                raw_text: raw_text.to_string(),
                header_zone: String::new(),
                ingredient_zone: String::new(),
                allergen_advisory_zone: String::new(),
                detected_language: None,
                parse_status: ParseStatus::NoIngredients,
                parse_notes: vec!["Raw text too short or empty".to_string()],
            };
        }

        let language = LanguageDetector::detect_from_headers(raw_text);
        notes.push(format!(
            "Detected language: {}",
            language.map_or("unknown", |l| l.code())
        ));

        let ingredient_header = find_header_position(raw_text, INGREDIENT_HEADERS);
        let advisory_header = find_header_position(raw_text, ALLERGEN_ADVISORY_HEADERS);
        notes.push(describe_header("Ingredient", ingredient_header));
        notes.push(describe_header("Allergen", advisory_header));

        let result = |header_zone: String,
                      ingredient_zone: String,
                      advisory_zone: String,
                      status: ParseStatus,
                      notes: Vec<String>| ZoneSegmentation {
            raw_text: raw_text.to_string(),
            header_zone,
            ingredient_zone,
            allergen_advisory_zone: advisory_zone,
            detected_language: language,
            parse_status: status,
            parse_notes: notes,
        };

        let Some(header) = ingredient_header else {
            notes.push("WARNING: No ingredient header found".to_string());

            let advisory_zone = advisory_header
                .map(|a| raw_text[a.start..].trim().to_string())
                .unwrap_or_default();

            if let Some(zone) = self.attempt_fallback_extraction(raw_text, advisory_header) {
                notes.push(format!(
                    "FALLBACK: Extracted {} chars as potential ingredients",
                    zone.chars().count()
                ));
                log::debug!("Fallback ingredient zone: {}", zone);
                return result(String::new(), zone, advisory_zone, ParseStatus::Unverified, notes);
            }

            notes.push("No ingredient-like content detected in fallback".to_string());
            let header_zone = match advisory_header {
                Some(a) => raw_text[..a.start].trim().to_string(),
                None => raw_text.to_string(),
            };
            return result(
                header_zone,
                String::new(),
                advisory_zone,
                ParseStatus::NoIngredients,
                notes,
            );
        };

        let header_zone = raw_text[..header.start].trim().to_string();

        let ingredient_start = raw_text[header.end..]
            .char_indices()
            .find(|(_, c)| !matches!(c, ':' | ' ' | '\t' | '\r' | '\n'))
            .map_or(raw_text.len(), |(idx, _)| header.end + idx);

        let (zone, advisory_zone) = match advisory_header {
            Some(a) if a.start > ingredient_start => {
                notes.push(format!("Ingredient zone: chars {}-{}", ingredient_start, a.start));
                (
                    raw_text[ingredient_start..a.start].trim(),
                    raw_text[a.start..].trim().to_string(),
                )
            }
            _ => {
                notes.push(format!("Ingredient zone: chars {}-end", ingredient_start));
                (raw_text[ingredient_start..].trim(), String::new())
            }
        };

        let zone = self.clean_ingredient_zone(zone);

        if zone.trim().chars().count() < MIN_ZONE_CHARS {
            notes.push("WARNING: Ingredient zone too short after extraction".to_string());
            return result(header_zone, zone, advisory_zone, ParseStatus::Unverified, notes);
        }

        result(header_zone, zone, advisory_zone, ParseStatus::Ok, notes)
    }
}

impl Default for ZoneSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

fn has_prefix_term(lowered: &str) -> bool {
    COMMON_INGREDIENT_TERMS[..PREFIX_TERM_COUNT]
        .iter()
        .any(|term| lowered.contains(term))
}

fn describe_header(kind: &str, found: Option<HeaderMatch>) -> String {
    match found {
        Some(m) => format!("{} header '{}' at position {}", kind, m.header, m.start),
        None => format!("{} header not found", kind),
    }
}

/// Segment raw OCR text with the shared segmenter.
pub fn segment_ocr_text(raw_text: &str) -> ZoneSegmentation {
    SEGMENTER.segment(raw_text)
}

pub fn is_non_ingredient_line(line: &str) -> bool {
    SEGMENTER.is_non_ingredient_line(line)
}
