use super::ensure_terms;
use crate::text::normalize;
use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct AllergenEntry {
    pub display: String,
    pub direct_terms: Vec<String>,
    #[serde(default)]
    pub derived_ingredients: Vec<String>,
}

impl AllergenEntry {
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.direct_terms
            .iter()
            .chain(&self.derived_ingredients)
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllergenLexicon {
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    pub allergens: BTreeMap<String, AllergenEntry>,
}

impl AllergenLexicon {
    /// Canonical allergen key for a user-declared allergy ("Soya" -> "soy").
    pub fn canonical(&self, allergy: &str) -> String {
        let key = normalize(allergy);
        if let Some(target) = self.aliases.get(&key) {
            return target.clone();
        }
        let underscored = key.replace(' ', "_");
        if self.allergens.contains_key(&underscored) {
            return underscored;
        }
        key
    }

    pub fn entry(&self, allergy: &str) -> Option<&AllergenEntry> {
        self.allergens.get(&self.canonical(allergy))
    }

    /// Every term that signals `allergy`. Unknown allergies expand to themselves.
    pub fn expand(&self, allergy: &str) -> Vec<String> {
        match self.entry(allergy) {
            Some(entry) => entry.terms().map(str::to_string).collect(),
            None => {
                let term = normalize(allergy);
                if term.is_empty() {
                    Vec::new()
                } else {
                    vec![term]
                }
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (name, entry) in &self.allergens {
            ensure_terms(&entry.direct_terms, name)?;
        }
        for (alias, target) in &self.aliases {
            if !self.allergens.contains_key(target) {
                anyhow::bail!("allergen alias '{}' points to unknown allergen '{}'", alias, target);
            }
        }
        Ok(())
    }
}
