use super::{ensure_reason_code, RuleStatus};
use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct ENumberEntry {
    pub name: String,
    pub reason: String,
    #[serde(default)]
    pub reason_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ENumberTier {
    AlwaysHaram,
    SourceDependent,
    Halal,
}

impl ENumberTier {
    pub fn status(&self) -> RuleStatus {
        match self {
            ENumberTier::AlwaysHaram => RuleStatus::Haram,
            ENumberTier::SourceDependent => RuleStatus::Mushbooh,
            ENumberTier::Halal => RuleStatus::Halal,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ENumberHit<'a> {
    pub tier: ENumberTier,
    pub entry: &'a ENumberEntry,
}

/// Three-tier E-number table keyed by the numeric code ("471", "150a").
#[derive(Debug, Clone, Deserialize)]
pub struct ENumberTable {
    always_haram: BTreeMap<String, ENumberEntry>,
    source_dependent: BTreeMap<String, ENumberEntry>,
    halal: BTreeMap<String, ENumberEntry>,
}

impl ENumberTable {
    /// Tiers are consulted in order: always-haram, source-dependent, halal.
    pub fn lookup(&self, code: &str) -> Option<ENumberHit<'_>> {
        let code = code.trim().trim_start_matches(['e', 'E']).to_lowercase();

        [
            (ENumberTier::AlwaysHaram, &self.always_haram),
            (ENumberTier::SourceDependent, &self.source_dependent),
            (ENumberTier::Halal, &self.halal),
        ]
        .into_iter()
        .find_map(|(tier, table)| table.get(&code).map(|entry| ENumberHit { tier, entry }))
    }

    pub fn tier_len(&self, tier: ENumberTier) -> usize {
        match tier {
            ENumberTier::AlwaysHaram => self.always_haram.len(),
            ENumberTier::SourceDependent => self.source_dependent.len(),
            ENumberTier::Halal => self.halal.len(),
        }
    }

    /// Halal entries may omit a reason code; give them `e<code>_<name>_halal`.
    pub(crate) fn derive_halal_reason_codes(&mut self) {
        for (code, entry) in self.halal.iter_mut() {
            if entry.reason_code.trim().is_empty() {
                entry.reason_code = format!("e{}_{}_halal", code, snake_case(&entry.name));
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (tier, table) in [
            ("always_haram", &self.always_haram),
            ("source_dependent", &self.source_dependent),
            ("halal", &self.halal),
        ] {
            for (code, entry) in table {
                ensure_reason_code(&entry.reason_code, &format!("E{} ({})", code, tier))?;
            }
        }
        Ok(())
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use crate::lexicon::Lexicon;

    use super::*;

    #[test]
    fn test_always_haram_lookup() {
        let table = &Lexicon::global().e_numbers;

        let hit = table.lookup("120").unwrap();
        assert_eq!(hit.tier, ENumberTier::AlwaysHaram);
        assert_eq!(hit.entry.reason_code, "e120_carmine_cochineal_haram");

        let hit = table.lookup("E904").unwrap();
        assert_eq!(hit.tier.status(), RuleStatus::Haram);
    }

    #[test]
    fn test_source_dependent_lookup() {
        let table = &Lexicon::global().e_numbers;

        assert_eq!(table.lookup("471").unwrap().tier, ENumberTier::SourceDependent);
        assert_eq!(table.lookup("920").unwrap().tier, ENumberTier::SourceDependent);
        assert_eq!(table.lookup("441").unwrap().tier.status(), RuleStatus::Mushbooh);
    }

    #[test]
    fn test_halal_lookup_derives_reason_code() {
        let table = &Lexicon::global().e_numbers;

        let hit = table.lookup("330").unwrap();
        assert_eq!(hit.tier, ENumberTier::Halal);
        assert!(hit.entry.reason_code.starts_with("e330_"));
        assert!(hit.entry.reason_code.ends_with("_halal"));

        assert_eq!(table.lookup("322").unwrap().tier, ENumberTier::Halal);
        assert_eq!(table.lookup("150a").unwrap().tier, ENumberTier::Halal);
    }

    #[test]
    fn test_unknown_code() {
        assert!(Lexicon::global().e_numbers.lookup("777").is_none());
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("Citric Acid"), "citric_acid");
        assert_eq!(snake_case("Mono- and Diglycerides"), "mono_and_diglycerides");
        assert_eq!(snake_case("Caramel (plain)"), "caramel_plain");
    }
}
