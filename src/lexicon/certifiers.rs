use super::ensure_terms;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Certifier {
    pub code: String,
    pub full_name: String,
    pub region: String,
    pub terms: Vec<String>,
}

/// Halal certification vocabulary, strongest first.
#[derive(Debug, Clone, Deserialize)]
pub struct CertifierRegistry {
    pub strong_certifiers: Vec<Certifier>,
    pub generic_strong_terms: Vec<String>,
    pub certification_phrases: Vec<String>,
    pub weak_signals: Vec<String>,
}

impl CertifierRegistry {
    pub fn find(&self, code: &str) -> Option<&Certifier> {
        self.strong_certifiers
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for certifier in &self.strong_certifiers {
            ensure_terms(&certifier.terms, &certifier.code)?;
            if certifier.full_name.trim().is_empty() {
                anyhow::bail!("certifier {} has no full name", certifier.code);
            }
        }
        ensure_terms(&self.generic_strong_terms, "generic_strong_terms")?;
        ensure_terms(&self.weak_signals, "weak_signals")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::lexicon::Lexicon;

    #[test]
    fn test_find_certifier() {
        let registry = &Lexicon::global().certifiers;
        let jakim = registry.find("JAKIM").unwrap();
        assert!(jakim.full_name.contains("Malaysia"));
        assert_eq!(jakim.region, "malaysia");
        assert!(registry.find("unknown").is_none());
    }
}
