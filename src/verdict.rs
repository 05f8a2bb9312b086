//! Verdict types shared by the halal and kosher evaluators
//!
//! Statuses are closed enums so the precedence logic in the evaluators and the
//! product aggregator is checked exhaustively. Reason codes and evidence are
//! kept in insertion-ordered sets: the first cause recorded stays first.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HalalStatus {
    HalalConfirmed,
    Haram,
    Mushbooh,
    NotHalalUnverified,
}

impl HalalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HalalStatus::HalalConfirmed => "HALAL_CONFIRMED",
            HalalStatus::Haram => "HARAM",
            HalalStatus::Mushbooh => "MUSHBOOH",
            HalalStatus::NotHalalUnverified => "NOT_HALAL_UNVERIFIED",
        }
    }

    /// Label shown to end users; a confirmed ingredient is simply "HALAL".
    pub fn display_label(&self) -> &'static str {
        match self {
            HalalStatus::HalalConfirmed => "HALAL",
            other => other.as_str(),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, HalalStatus::Mushbooh | HalalStatus::NotHalalUnverified)
    }
}

impl fmt::Display for HalalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KosherStatus {
    KosherConfirmed,
    NotKosher,
    RequiresKosherCertification,
}

impl KosherStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KosherStatus::KosherConfirmed => "KOSHER_CONFIRMED",
            KosherStatus::NotKosher => "NOT_KOSHER",
            KosherStatus::RequiresKosherCertification => "REQUIRES_KOSHER_CERTIFICATION",
        }
    }
}

impl fmt::Display for KosherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product-level halal outcome. The product reports plain "HALAL" rather than
/// the per-ingredient "HALAL_CONFIRMED", and never reports MUSHBOOH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductHalalStatus {
    Halal,
    Haram,
    NotHalalUnverified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        };
        f.write_str(label)
    }
}

/// Strength of a halal certification claim found in the ingredient text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificationStrength {
    High,
    Medium,
    Weak,
    None,
}

/// Insertion-ordered set of strings. Empty strings are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedSet {
    items: Vec<String>,
}

impl OrderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the value was not present before.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.is_empty() || self.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    pub fn contains(&self, value: &str) -> bool {
        self.items.iter().any(|item| item == value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

impl<S: Into<String>> FromIterator<S> for OrderedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = OrderedSet::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl<'a> IntoIterator for &'a OrderedSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Reason codes paired with the evidence that explains them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReasonTrail {
    pub reason_codes: OrderedSet,
    pub evidence: OrderedSet,
}

impl ReasonTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the reason code is new.
    pub fn push(&mut self, code: impl Into<String>, evidence: impl Into<String>) -> bool {
        let added = self.reason_codes.insert(code);
        self.evidence.insert(evidence);
        added
    }

    pub fn has_code_containing(&self, fragment: &str) -> bool {
        self.reason_codes.iter().any(|code| code.contains(fragment))
    }

    pub fn into_verdict<S>(
        self,
        ingredient: impl Into<String>,
        status: S,
        confidence: Confidence,
    ) -> IngredientVerdict<S> {
        IngredientVerdict {
            ingredient: ingredient.into(),
            status,
            confidence,
            reason_codes: self.reason_codes,
            evidence: self.evidence,
        }
    }
}

/// Verdict for one ingredient under one diet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientVerdict<S> {
    pub ingredient: String,
    pub status: S,
    pub confidence: Confidence,
    pub reason_codes: OrderedSet,
    pub evidence: OrderedSet,
}

pub type HalalVerdict = IngredientVerdict<HalalStatus>;
pub type KosherVerdict = IngredientVerdict<KosherStatus>;

impl<S> IngredientVerdict<S> {
    pub fn new(ingredient: impl Into<String>, status: S, confidence: Confidence) -> Self {
        Self {
            ingredient: ingredient.into(),
            status,
            confidence,
            reason_codes: OrderedSet::new(),
            evidence: OrderedSet::new(),
        }
    }

    pub fn with_reason(mut self, code: &str, evidence: &str) -> Self {
        self.reason_codes.insert(code);
        self.evidence.insert(evidence);
        self
    }

    pub fn has_reason_containing(&self, fragment: &str) -> bool {
        self.reason_codes.iter().any(|code| code.contains(fragment))
    }
}

/// Product-level verdict, derived from the ingredient verdicts on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVerdict<S> {
    pub status: S,
    pub confidence: Confidence,
    pub reason: String,
    pub failing_ingredients: Vec<String>,
    pub reason_codes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_set_keeps_first_seen_order() {
        let mut set = OrderedSet::new();
        assert!(set.insert("pork_haram"));
        assert!(set.insert("e471_mono_diglycerides_source_unknown"));
        assert!(!set.insert("pork_haram"));
        assert!(!set.insert(""));

        assert_eq!(
            set.as_slice(),
            &["pork_haram", "e471_mono_diglycerides_source_unknown"]
        );
    }

    #[test]
    fn test_reason_trail_into_verdict() {
        let mut trail = ReasonTrail::new();
        assert!(trail.push("fatty_acid_source_unknown", "Fatty acid source not specified"));
        assert!(!trail.push("fatty_acid_source_unknown", "Fatty acid source not specified"));
        assert!(trail.has_code_containing("source_unknown"));

        let verdict = trail.into_verdict("e471", HalalStatus::Mushbooh, Confidence::Low);
        assert_eq!(verdict.reason_codes.len(), 1);
        assert_eq!(verdict.evidence.len(), 1);
        assert_eq!(verdict.ingredient, "e471");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&HalalStatus::NotHalalUnverified).unwrap();
        assert_eq!(json, "\"NOT_HALAL_UNVERIFIED\"");

        let json = serde_json::to_string(&KosherStatus::RequiresKosherCertification).unwrap();
        assert_eq!(json, "\"REQUIRES_KOSHER_CERTIFICATION\"");

        let json = serde_json::to_string(&ProductHalalStatus::Halal).unwrap();
        assert_eq!(json, "\"HALAL\"");
    }

    #[test]
    fn test_display_label() {
        assert_eq!(HalalStatus::HalalConfirmed.display_label(), "HALAL");
        assert_eq!(HalalStatus::Haram.display_label(), "HARAM");
        assert!(HalalStatus::Mushbooh.is_unresolved());
        assert!(!HalalStatus::Haram.is_unresolved());
    }

    #[test]
    fn test_reason_sets_serialize_as_arrays() {
        let verdict = HalalVerdict::new("gelatin", HalalStatus::Mushbooh, Confidence::Low)
            .with_reason("gelatin_source_unknown", "Gelatin source not specified");
        let value = serde_json::to_value(&verdict).unwrap();
        assert_eq!(value["reason_codes"][0], "gelatin_source_unknown");
        assert_eq!(value["confidence"], "LOW");
    }
}
