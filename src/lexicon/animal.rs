use super::{ensure_reason_code, ensure_terms, RuleStatus};
use crate::text::{any_word_in_text, normalize};
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct FixedCategory {
    pub name: String,
    pub terms: Vec<String>,
    #[serde(default = "haram")]
    pub status: RuleStatus,
    pub reason: String,
    pub reason_code: String,
}

fn haram() -> RuleStatus {
    RuleStatus::Haram
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceOption {
    pub name: String,
    pub terms: Vec<String>,
    pub status: RuleStatus,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceDependentCategory {
    pub name: String,
    pub generic_terms: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceOption>,
    pub default_status: RuleStatus,
    pub default_reason: String,
    pub reason_code: String,
}

/// Term group with an optional set of halal qualifiers ("vegetarian cheese").
#[derive(Debug, Clone, Deserialize)]
pub struct QualifiedGroup {
    pub terms: Vec<String>,
    #[serde(default)]
    pub halal_qualifiers: Vec<String>,
    pub default_status: RuleStatus,
    pub reason: String,
    pub reason_code: String,
    #[serde(default)]
    pub qualified_reason: String,
    #[serde(default)]
    pub qualified_reason_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalHit {
    pub category: String,
    pub status: RuleStatus,
    pub reason_code: String,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimalLexicon {
    pub always_haram: Vec<FixedCategory>,
    pub source_dependent: Vec<SourceDependentCategory>,
    pub processed_dairy: QualifiedGroup,
    pub starter_cultures: QualifiedGroup,
    pub gelatin_products: QualifiedGroup,
    pub other_animal_derived: Vec<FixedCategory>,
}

impl AnimalLexicon {
    /// Sections in order: always-haram, source-dependent (specific source
    /// first, then the category default), processed dairy, starter cultures,
    /// gelatin products, other animal-derived. First hit wins.
    pub fn classify(&self, text: &str) -> Option<AnimalHit> {
        let text = normalize(text);

        if let Some(category) = self
            .always_haram
            .iter()
            .find(|c| any_word_in_text(&text, &c.terms))
        {
            return Some(AnimalHit {
                category: category.name.clone(),
                status: RuleStatus::Haram,
                reason_code: category.reason_code.clone(),
                reason: category.reason.clone(),
            });
        }

        for category in &self.source_dependent {
            if !any_word_in_text(&text, &category.generic_terms) {
                continue;
            }

            if let Some(source) = category
                .sources
                .iter()
                .find(|s| any_word_in_text(&text, &s.terms))
            {
                return Some(AnimalHit {
                    category: category.name.clone(),
                    status: source.status,
                    reason_code: format!(
                        "{}_{}_{}",
                        category.name,
                        source.name,
                        source.status.as_str()
                    ),
                    reason: source.reason.clone(),
                });
            }

            return Some(AnimalHit {
                category: category.name.clone(),
                status: category.default_status,
                reason_code: category.reason_code.clone(),
                reason: category.default_reason.clone(),
            });
        }

        for (name, group) in [
            ("processed_dairy", &self.processed_dairy),
            ("starter_cultures", &self.starter_cultures),
            ("gelatin_products", &self.gelatin_products),
        ] {
            if let Some(hit) = group.classify(name, &text) {
                return Some(hit);
            }
        }

        self.other_animal_derived
            .iter()
            .find(|c| any_word_in_text(&text, &c.terms))
            .map(|category| AnimalHit {
                category: category.name.clone(),
                status: category.status,
                reason_code: category.reason_code.clone(),
                reason: category.reason.clone(),
            })
    }

    pub fn category_count(&self) -> usize {
        self.always_haram.len() + self.source_dependent.len() + 3 + self.other_animal_derived.len()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for category in self.always_haram.iter().chain(&self.other_animal_derived) {
            ensure_reason_code(&category.reason_code, &category.name)?;
            ensure_terms(&category.terms, &category.name)?;
        }
        for category in &self.source_dependent {
            ensure_reason_code(&category.reason_code, &category.name)?;
            ensure_terms(&category.generic_terms, &category.name)?;
            for source in &category.sources {
                ensure_terms(&source.terms, &format!("{}.{}", category.name, source.name))?;
            }
        }
        for (name, group) in [
            ("processed_dairy", &self.processed_dairy),
            ("starter_cultures", &self.starter_cultures),
            ("gelatin_products", &self.gelatin_products),
        ] {
            ensure_reason_code(&group.reason_code, name)?;
            ensure_terms(&group.terms, name)?;
            if !group.halal_qualifiers.is_empty() {
                ensure_reason_code(&group.qualified_reason_code, name)?;
            }
        }
        Ok(())
    }
}

impl QualifiedGroup {
    fn classify(&self, name: &str, text: &str) -> Option<AnimalHit> {
        if !any_word_in_text(text, &self.terms) {
            return None;
        }

        if any_word_in_text(text, &self.halal_qualifiers) {
            return Some(AnimalHit {
                category: name.to_string(),
                status: RuleStatus::Halal,
                reason_code: self.qualified_reason_code.clone(),
                reason: self.qualified_reason.clone(),
            });
        }

        Some(AnimalHit {
            category: name.to_string(),
            status: self.default_status,
            reason_code: self.reason_code.clone(),
            reason: self.reason.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;

    fn classify(text: &str) -> Option<AnimalHit> {
        Lexicon::global().animal.classify(text)
    }

    fn status(text: &str) -> Option<RuleStatus> {
        classify(text).map(|hit| hit.status)
    }

    #[test]
    fn test_always_haram() {
        assert_eq!(status("pork"), Some(RuleStatus::Haram));
        assert_eq!(status("lard"), Some(RuleStatus::Haram));
        assert_eq!(status("bacon bits"), Some(RuleStatus::Haram));
        assert_eq!(status("dried blood"), Some(RuleStatus::Haram));
        assert_eq!(status("carmine"), Some(RuleStatus::Haram));
        assert_eq!(status("shellac"), Some(RuleStatus::Haram));
        assert_eq!(
            classify("gelatin (porcine)").unwrap().reason_code,
            "pork_haram"
        );
    }

    #[test]
    fn test_source_unknown_defaults_to_mushbooh() {
        for text in ["gelatin", "glycerin", "enzymes", "rennet", "collagen", "l-cysteine"] {
            assert_eq!(status(text), Some(RuleStatus::Mushbooh), "{}", text);
        }
        assert_eq!(classify("gelatin").unwrap().reason_code, "gelatin_source_unknown");
    }

    #[test]
    fn test_specific_source_wins() {
        let hit = classify("fish gelatin").unwrap();
        assert_eq!(hit.status, RuleStatus::Halal);
        assert_eq!(hit.reason_code, "gelatin_fish_halal");

        assert_eq!(classify("halal gelatin").unwrap().reason_code, "gelatin_halal_halal");
        assert_eq!(status("vegetable glycerin"), Some(RuleStatus::Halal));
        assert_eq!(status("microbial rennet"), Some(RuleStatus::Halal));
        assert_eq!(status("microbial enzyme"), Some(RuleStatus::Halal));
        assert_eq!(status("marine collagen"), Some(RuleStatus::Halal));
        assert_eq!(
            classify("bovine gelatin").unwrap().reason_code,
            "gelatin_bovine_mushbooh"
        );
    }

    #[test]
    fn test_vitamins_default_halal() {
        assert_eq!(status("vitamin d3"), Some(RuleStatus::Halal));
        assert_eq!(status("vitamin a"), Some(RuleStatus::Halal));
        assert_eq!(status("fish oil"), Some(RuleStatus::Halal));
    }

    #[test]
    fn test_dairy_and_qualifiers() {
        assert_eq!(classify("whey powder").unwrap().reason_code, "dairy_rennet_unknown");
        assert_eq!(
            classify("vegetarian cheese").unwrap().reason_code,
            "dairy_halal_qualified"
        );
        assert_eq!(status("starter culture"), Some(RuleStatus::Mushbooh));
    }

    #[test]
    fn test_gelatin_products() {
        assert_eq!(classify("marshmallows").unwrap().reason_code, "gelatin_product_check");
        assert_eq!(status("vegan marshmallow"), Some(RuleStatus::Halal));
    }

    #[test]
    fn test_other_animal_derived() {
        assert_eq!(status("honey"), Some(RuleStatus::Halal));
        assert_eq!(status("beeswax"), Some(RuleStatus::Halal));
        assert_eq!(status("bone char"), Some(RuleStatus::Mushbooh));
        assert_eq!(status("egg yolk"), Some(RuleStatus::Halal));
        assert_eq!(status("lanolin"), Some(RuleStatus::Halal));
    }

    #[test]
    fn test_plain_plant_ingredient() {
        assert!(classify("sugar").is_none());
        assert!(classify("graham flour").is_none());
    }
}
