use super::{ensure_reason_code, ensure_terms, RuleStatus};
use crate::text::{any_word_in_text, normalize};
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AlcoholCategory {
    pub name: String,
    pub status: RuleStatus,
    /// Whether a strong halal certification downgrades a hit to evidence.
    #[serde(default)]
    pub yields_to_certification: bool,
    pub terms: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    pub reason: String,
    pub reason_code: String,
}

impl AlcoholCategory {
    pub fn matches(&self, text: &str) -> bool {
        let mut scrubbed = normalize(text);
        for exclude in &self.excludes {
            let exclude = normalize(exclude);
            if !exclude.is_empty() {
                scrubbed = scrubbed.replace(&exclude, " ");
            }
        }
        any_word_in_text(&scrubbed, &self.terms)
    }
}

/// Alcohol categories in evaluation order. The first matching category wins.
#[derive(Debug, Clone, Deserialize)]
pub struct AlcoholLexicon {
    pub categories: Vec<AlcoholCategory>,
}

impl AlcoholLexicon {
    pub fn classify(&self, text: &str) -> Option<&AlcoholCategory> {
        let hit = self.categories.iter().find(|c| c.matches(text));
        if let Some(category) = hit {
            log::debug!("Alcohol category '{}' matched: {}", category.name, text);
        }
        hit
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            anyhow::bail!("no alcohol categories defined");
        }
        for category in &self.categories {
            ensure_reason_code(&category.reason_code, &category.name)?;
            ensure_terms(&category.terms, &category.name)?;
            if category.status == RuleStatus::Mushbooh {
                anyhow::bail!("{} must be halal or haram", category.name);
            }
        }
        Ok(())
    }
}
