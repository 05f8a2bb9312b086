pub mod aggregate;
pub mod allergens;
pub mod certification;
pub mod config;
pub mod halal;
pub mod kosher;
pub mod language;
pub mod lecithin;
pub mod lexicon;
pub mod normalization;
pub mod pipeline;
pub mod text;
pub mod verdict;
pub mod zones;

pub use aggregate::{aggregate_halal, aggregate_kosher};
pub use allergens::{check_allergy, check_allergy_detailed, AllergyCheck};
pub use config::Config;
pub use halal::{evaluate_halal, HalalEvaluator};
pub use kosher::{evaluate_kosher, kosher_tags};
pub use language::{LabelLanguage, LanguageDetector};
pub use lexicon::Lexicon;
pub use pipeline::{analyze_scan, Diet, ScanError, ScanReport, ScanRequest};
pub use verdict::{
    Confidence, HalalStatus, HalalVerdict, KosherStatus, KosherVerdict, ProductHalalStatus,
    ProductVerdict,
};
pub use zones::{segment_ocr_text, ParseStatus, ZoneSegmentation};
