//! Immutable knowledge base for the classification engine.
//!
//! The tables ship as YAML documents under `lexicon/` and are embedded into
//! the binary. A directory override can replace any of them at startup.

pub mod alcohol;
pub mod allergens;
pub mod animal;
pub mod certifiers;
pub mod e_numbers;
pub mod kosher;
pub mod plant_based;

pub use alcohol::{AlcoholCategory, AlcoholLexicon};
pub use allergens::{AllergenEntry, AllergenLexicon};
pub use animal::{AnimalHit, AnimalLexicon};
pub use certifiers::{Certifier, CertifierRegistry};
pub use e_numbers::{ENumberEntry, ENumberHit, ENumberTable, ENumberTier};
pub use kosher::KosherLexicon;
pub use plant_based::PlantLexicon;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const E_NUMBERS_FILE: &str = "e_numbers.yaml";
const ALCOHOL_FILE: &str = "alcohol.yaml";
const ANIMAL_FILE: &str = "animal_derivatives.yaml";
const CERTIFIERS_FILE: &str = "certifiers.yaml";
const ALLERGENS_FILE: &str = "allergens.yaml";
const KOSHER_FILE: &str = "kosher.yaml";
const PLANT_FILE: &str = "plant_based.yaml";

const EMBEDDED: [(&str, &str); 7] = [
    (E_NUMBERS_FILE, include_str!("../../lexicon/e_numbers.yaml")),
    (ALCOHOL_FILE, include_str!("../../lexicon/alcohol.yaml")),
    (ANIMAL_FILE, include_str!("../../lexicon/animal_derivatives.yaml")),
    (CERTIFIERS_FILE, include_str!("../../lexicon/certifiers.yaml")),
    (ALLERGENS_FILE, include_str!("../../lexicon/allergens.yaml")),
    (KOSHER_FILE, include_str!("../../lexicon/kosher.yaml")),
    (PLANT_FILE, include_str!("../../lexicon/plant_based.yaml")),
];

lazy_static! {
    static ref GLOBAL_LEXICON: Lexicon =
        Lexicon::embedded().expect("embedded lexicon must parse and validate");
}

/// Halal classification attached to a lexicon entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Halal,
    Mushbooh,
    Haram,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Halal => "halal",
            RuleStatus::Mushbooh => "mushbooh",
            RuleStatus::Haram => "haram",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    pub e_numbers: ENumberTable,
    pub alcohol: AlcoholLexicon,
    pub animal: AnimalLexicon,
    pub certifiers: CertifierRegistry,
    pub allergens: AllergenLexicon,
    pub kosher: KosherLexicon,
    pub plant_based: PlantLexicon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LexiconStats {
    pub e_numbers_always_haram: usize,
    pub e_numbers_source_dependent: usize,
    pub e_numbers_halal: usize,
    pub alcohol_categories: usize,
    pub alcohol_terms: usize,
    pub animal_categories: usize,
    pub strong_certifiers: usize,
    pub allergens: usize,
    pub kosher_terms: usize,
    pub inherently_halal_terms: usize,
}

impl Lexicon {
    /// Parse the copy compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::assemble(|name| Ok(embedded_document(name).to_string()))
    }

    /// Load the lexicon files from `dir`. A file that does not exist there
    /// falls back to the embedded copy.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            anyhow::bail!("Lexicon directory not found: {}", dir.display());
        }

        Self::assemble(|name| {
            let path = dir.join(name);
            if path.exists() {
                log::info!("Loading lexicon file: {}", path.display());
                fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read lexicon file: {}", path.display()))
            } else {
                log::debug!("{} not in {}, using embedded copy", name, dir.display());
                Ok(embedded_document(name).to_string())
            }
        })
    }

    /// Directory override when configured, otherwise the shared embedded lexicon.
    pub fn load_or_global(dir: Option<&Path>) -> Result<std::borrow::Cow<'static, Lexicon>> {
        match dir {
            Some(dir) => Ok(std::borrow::Cow::Owned(Self::from_dir(dir)?)),
            None => Ok(std::borrow::Cow::Borrowed(Self::global())),
        }
    }

    /// Process-wide lexicon built once from the embedded data.
    pub fn global() -> &'static Lexicon {
        &GLOBAL_LEXICON
    }

    fn assemble<F>(mut read: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<String>,
    {
        let mut e_numbers: ENumberTable = parse_document(E_NUMBERS_FILE, &read(E_NUMBERS_FILE)?)?;
        e_numbers.derive_halal_reason_codes();

        let lexicon = Lexicon {
            e_numbers,
            alcohol: parse_document(ALCOHOL_FILE, &read(ALCOHOL_FILE)?)?,
            animal: parse_document(ANIMAL_FILE, &read(ANIMAL_FILE)?)?,
            certifiers: parse_document(CERTIFIERS_FILE, &read(CERTIFIERS_FILE)?)?,
            allergens: parse_document(ALLERGENS_FILE, &read(ALLERGENS_FILE)?)?,
            kosher: parse_document(KOSHER_FILE, &read(KOSHER_FILE)?)?,
            plant_based: parse_document(PLANT_FILE, &read(PLANT_FILE)?)?,
        };

        lexicon.validate()?;
        Ok(lexicon)
    }

    /// Every classification must carry a reason code and at least one term.
    pub fn validate(&self) -> Result<()> {
        self.e_numbers.validate().context("Invalid E-number table")?;
        self.alcohol.validate().context("Invalid alcohol lexicon")?;
        self.animal.validate().context("Invalid animal-derivative lexicon")?;
        self.certifiers.validate().context("Invalid certifier registry")?;
        self.allergens.validate().context("Invalid allergen lexicon")?;
        Ok(())
    }

    pub fn stats(&self) -> LexiconStats {
        LexiconStats {
            e_numbers_always_haram: self.e_numbers.tier_len(ENumberTier::AlwaysHaram),
            e_numbers_source_dependent: self.e_numbers.tier_len(ENumberTier::SourceDependent),
            e_numbers_halal: self.e_numbers.tier_len(ENumberTier::Halal),
            alcohol_categories: self.alcohol.categories.len(),
            alcohol_terms: self.alcohol.categories.iter().map(|c| c.terms.len()).sum(),
            animal_categories: self.animal.category_count(),
            strong_certifiers: self.certifiers.strong_certifiers.len(),
            allergens: self.allergens.allergens.len(),
            kosher_terms: self.kosher.term_count(),
            inherently_halal_terms: self.plant_based.inherently_halal.len(),
        }
    }
}

fn embedded_document(name: &str) -> &'static str {
    EMBEDDED
        .iter()
        .find(|(file, _)| *file == name)
        .map(|(_, content)| *content)
        .unwrap_or_default()
}

fn parse_document<T: DeserializeOwned>(name: &str, content: &str) -> Result<T> {
    serde_yaml::from_str(content).with_context(|| format!("Failed to parse lexicon file: {}", name))
}

pub(crate) fn ensure_reason_code(code: &str, owner: &str) -> Result<()> {
    if code.trim().is_empty() {
        anyhow::bail!("{} has an empty reason code", owner);
    }
    Ok(())
}

pub(crate) fn ensure_terms<S: AsRef<str>>(terms: &[S], owner: &str) -> Result<()> {
    if terms.is_empty() || terms.iter().any(|t| t.as_ref().trim().is_empty()) {
        anyhow::bail!("{} has an empty term list or blank term", owner);
    }
    Ok(())
}
