use crate::lexicon::Lexicon;
use crate::text::{any_word_in_text, normalize};
use crate::verdict::CertificationStrength;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificationSignal {
    pub strength: CertificationStrength,
    pub certifier: Option<String>,
    pub region: Option<String>,
}

impl CertificationSignal {
    pub fn none() -> Self {
        Self {
            strength: CertificationStrength::None,
            certifier: None,
            region: None,
        }
    }

    /// Named certifier, generic "halal certified" claim or a certification phrase.
    pub fn is_strong(&self) -> bool {
        matches!(
            self.strength,
            CertificationStrength::High | CertificationStrength::Medium
        )
    }

    pub fn is_weak(&self) -> bool {
        self.strength == CertificationStrength::Weak
    }
}

impl Default for CertificationSignal {
    fn default() -> Self {
        Self::none()
    }
}

/// Strongest halal certification claim present in `text`.
pub fn halal_signal(text: &str, lexicon: &Lexicon) -> CertificationSignal {
    let text = normalize(text);
    let registry = &lexicon.certifiers;

    if let Some(certifier) = registry
        .strong_certifiers
        .iter()
        .find(|c| any_word_in_text(&text, &c.terms))
    {
        return CertificationSignal {
            strength: CertificationStrength::High,
            certifier: Some(certifier.full_name.clone()),
            region: Some(certifier.region.clone()),
        };
    }

    if any_word_in_text(&text, &registry.generic_strong_terms) {
        return CertificationSignal {
            strength: CertificationStrength::High,
            certifier: Some("Generic halal certification".to_string()),
            region: None,
        };
    }

    if any_word_in_text(&text, &registry.certification_phrases) {
        return CertificationSignal {
            strength: CertificationStrength::Medium,
            certifier: Some("Certification phrase detected".to_string()),
            region: None,
        };
    }

    if any_word_in_text(&text, &registry.weak_signals) {
        return CertificationSignal {
            strength: CertificationStrength::Weak,
            certifier: None,
            region: None,
        };
    }

    CertificationSignal::none()
}

pub fn is_strong_kosher_signal(text: &str, lexicon: &Lexicon) -> bool {
    any_word_in_text(text, &lexicon.kosher.strong_certification)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(text: &str) -> CertificationSignal {
        halal_signal(text, Lexicon::global())
    }

    #[test]
    fn test_named_certifiers() {
        let jakim = signal("Gelatin (JAKIM Halal)");
        assert_eq!(jakim.strength, CertificationStrength::High);
        assert!(jakim.certifier.unwrap().contains("Malaysia"));
        assert_eq!(jakim.region.as_deref(), Some("malaysia"));

        for text in ["muis halal", "mui certified", "ifanca", "hmc approved", "sanha"] {
            assert_eq!(signal(text).strength, CertificationStrength::High, "{}", text);
        }
    }

    #[test]
    fn test_generic_and_phrases() {
        let generic = signal("Halal certified gelatin");
        assert_eq!(generic.strength, CertificationStrength::High);
        assert_eq!(generic.certifier.as_deref(), Some("Generic halal certification"));

        let phrase = signal("100% halal");
        assert_eq!(phrase.strength, CertificationStrength::Medium);
        assert!(phrase.is_strong());
    }

    #[test]
    fn test_weak_and_none() {
        let weak = signal("halal");
        assert_eq!(weak.strength, CertificationStrength::Weak);
        assert!(weak.is_weak());
        assert!(!weak.is_strong());

        assert_eq!(signal("sugar").strength, CertificationStrength::None);
        assert_eq!(signal(""), CertificationSignal::none());
    }

    #[test]
    fn test_kosher_signal() {
        let lexicon = Lexicon::global();
        assert!(is_strong_kosher_signal("OU Kosher gelatin", lexicon));
        assert!(is_strong_kosher_signal("Star-K certified", lexicon));
        assert!(!is_strong_kosher_signal("kosher style pickles", lexicon));
        assert!(!is_strong_kosher_signal("flour", lexicon));
    }
}
