//! Halal evaluation as an ordered chain of rules.
//!
//! Each rule inspects the ingredient and either records findings and lets the
//! chain continue, or returns a terminal status. When no rule terminates, the
//! accumulated findings are resolved into a final status.

pub mod rules;

use crate::certification::{halal_signal, CertificationSignal};
use crate::lexicon::Lexicon;
use crate::text::{normalize, word_in_text};
use crate::verdict::{Confidence, HalalStatus, HalalVerdict, ReasonTrail};

pub use rules::{
    AlcoholRule, AnimalDerivativeRule, ColorantRule, ENumberRule, FlavouringRule, GelatinRule,
    LecithinRule,
};

/// Which way a recorded reason pushes the final status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lean {
    Forbidden,
    Doubtful,
    Favorable,
    Neutral,
}

/// Reason trail plus a tally of how each recorded code leans.
#[derive(Debug, Clone, Default)]
pub struct Findings {
    pub trail: ReasonTrail,
    forbidden: usize,
    doubtful: usize,
    favorable: usize,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duplicate codes are ignored and do not change the tally.
    pub fn record(&mut self, code: impl Into<String>, evidence: impl Into<String>, lean: Lean) {
        let code = code.into();
        if !self.trail.push(code.clone(), evidence) {
            return;
        }
        log::debug!("Halal finding: {} ({:?})", code, lean);
        match lean {
            Lean::Forbidden => self.forbidden += 1,
            Lean::Doubtful => self.doubtful += 1,
            Lean::Favorable => self.favorable += 1,
            Lean::Neutral => {}
        }
    }

    pub fn has_code_containing(&self, fragment: &str) -> bool {
        self.trail.has_code_containing(fragment)
    }

    pub fn forbidden(&self) -> usize {
        self.forbidden
    }

    pub fn doubtful(&self) -> usize {
        self.doubtful
    }

    pub fn favorable(&self) -> usize {
        self.favorable
    }
}

/// Inputs shared by every rule for one ingredient.
pub struct HalalContext<'a> {
    /// Normalized ingredient text.
    pub text: String,
    /// Original-language text, used for lecithin source resolution.
    pub original: Option<&'a str>,
    pub certification: CertificationSignal,
    pub lexicon: &'a Lexicon,
}

pub trait HalalRule: Send + Sync {
    fn name(&self) -> &str;

    /// Record findings; return a status to stop the chain.
    fn check(&self, ctx: &HalalContext, findings: &mut Findings)
        -> Option<(HalalStatus, Confidence)>;
}

pub struct HalalEvaluator<'a> {
    lexicon: &'a Lexicon,
    rules: Vec<Box<dyn HalalRule>>,
}

impl<'a> HalalEvaluator<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        let rules: Vec<Box<dyn HalalRule>> = vec![
            Box::new(AnimalDerivativeRule),
            Box::new(ColorantRule),
            Box::new(ENumberRule),
            Box::new(AlcoholRule),
            Box::new(GelatinRule::new()),
            Box::new(LecithinRule),
            Box::new(FlavouringRule),
        ];

        Self { lexicon, rules }
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Evaluate one ingredient. With `strict` set, MUSHBOOH resolves to
    /// NOT_HALAL_UNVERIFIED; terminal rule outcomes are never rewritten.
    pub fn evaluate(&self, ingredient: &str, strict: bool, original: Option<&str>) -> HalalVerdict {
        let ctx = HalalContext {
            text: normalize(ingredient),
            original,
            certification: halal_signal(ingredient, self.lexicon),
            lexicon: self.lexicon,
        };
        let mut findings = Findings::new();

        for rule in &self.rules {
            if let Some((status, confidence)) = rule.check(&ctx, &mut findings) {
                log::debug!(
                    "Rule '{}' decided {} for '{}'",
                    rule.name(),
                    status,
                    ingredient
                );
                return findings.trail.into_verdict(ingredient, status, confidence);
            }
        }

        let (status, confidence) = resolve(&ctx, &mut findings);
        let status = if strict && status == HalalStatus::Mushbooh {
            HalalStatus::NotHalalUnverified
        } else {
            status
        };

        findings.trail.into_verdict(ingredient, status, confidence)
    }
}

/// Final status when no rule terminated the chain.
fn resolve(ctx: &HalalContext, findings: &mut Findings) -> (HalalStatus, Confidence) {
    if ctx.certification.is_strong() {
        return (HalalStatus::HalalConfirmed, Confidence::High);
    }

    if findings.forbidden() > 0 {
        return (HalalStatus::Haram, Confidence::High);
    }

    if findings.doubtful() > 0 {
        if findings.favorable() > 0 && findings.favorable() >= findings.doubtful() {
            return (HalalStatus::HalalConfirmed, Confidence::High);
        }
        let confidence = if ctx.certification.is_weak() {
            Confidence::Medium
        } else {
            Confidence::Low
        };
        return (HalalStatus::Mushbooh, confidence);
    }

    if findings.favorable() > 0 {
        return (HalalStatus::HalalConfirmed, Confidence::High);
    }

    if ctx.lexicon.plant_based.is_inherently_halal(&ctx.text) {
        findings.record(
            "inherently_halal_by_nature",
            "Plant-based ingredient; halal by default",
            Lean::Neutral,
        );
        return (HalalStatus::HalalConfirmed, Confidence::High);
    }

    findings.record(
        "no_haram_indicators_detected",
        "No haram indicators detected; default halal",
        Lean::Neutral,
    );
    (HalalStatus::HalalConfirmed, Confidence::Medium)
}

/// Evaluate against the process-wide lexicon.
pub fn evaluate_halal(ingredient: &str, strict: bool, original: Option<&str>) -> HalalVerdict {
    HalalEvaluator::new(Lexicon::global()).evaluate(ingredient, strict, original)
}

impl HalalVerdict {
    /// Violation codes for the diet check.
    pub fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.status == HalalStatus::Haram {
            violations.push("haram_ingredient_source_forbidden".to_string());
        }
        if self.has_reason_containing("alcohol") {
            violations.push("alcohol_not_halal".to_string());
        }
        if self.status.is_unresolved() {
            violations.push("source_unverified_mushbooh".to_string());
        }
        if word_in_text(&self.ingredient, "vanilla extract") {
            violations.push("vanilla_extract_may_contain_alcohol".to_string());
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halal(text: &str) -> HalalVerdict {
        evaluate_halal(text, false, None)
    }

    fn codes(verdict: &HalalVerdict) -> Vec<&str> {
        verdict.reason_codes.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_rule_order() {
        let evaluator = HalalEvaluator::new(Lexicon::global());
        assert_eq!(
            evaluator.rule_names(),
            vec![
                "animal_derivatives",
                "haram_colorants",
                "e_numbers",
                "alcohol",
                "gelatin",
                "lecithin",
                "flavourings"
            ]
        );
    }

    #[test]
    fn test_pork_is_haram_despite_certification() {
        for text in ["pork", "pork fat, halal certified", "gelatin (porcine)", "JAKIM halal lard"] {
            let verdict = halal(text);
            assert_eq!(verdict.status, HalalStatus::Haram, "{}", text);
            assert_eq!(verdict.confidence, Confidence::High);
        }
        assert_eq!(codes(&halal("gelatin (porcine)")), vec!["pork_haram"]);
    }

    #[test]
    fn test_wine_not_overridden_by_certification() {
        let verdict = halal("contains wine, certified halal");
        assert_eq!(verdict.status, HalalStatus::Haram);
        assert_eq!(codes(&verdict), vec!["alcoholic_beverage_haram"]);
    }

    #[test]
    fn test_alcohol_processing_yields_to_certification() {
        let verdict = halal("flavouring extracted with alcohol");
        assert_eq!(verdict.status, HalalStatus::Haram);
        assert_eq!(codes(&verdict), vec!["explicit_alcohol_haram"]);

        let verdict = halal("vanilla extract, halal certified");
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert_eq!(
            codes(&verdict),
            vec!["alcohol_related_term_present_but_halal_cert_claim"]
        );
        assert!(verdict
            .evidence
            .contains("Extract may contain alcohol as solvent; but strong halal certification phrase detected"));
    }

    #[test]
    fn test_fatty_alcohols_are_not_intoxicants() {
        let verdict = halal("cetyl alcohol");
        assert_ne!(verdict.status, HalalStatus::Haram);
    }

    #[test]
    fn test_e_numbers() {
        let verdict = halal("colour (E-120)");
        assert_eq!(verdict.status, HalalStatus::Haram);
        assert_eq!(codes(&verdict), vec!["e120_carmine_cochineal_haram"]);
        assert_eq!(
            verdict.evidence.as_slice(),
            &["Detected E120 (Carmine/Cochineal) - Insect-derived colorant"]
        );

        let verdict = halal("emulsifier (E 471)");
        assert_eq!(verdict.status, HalalStatus::Mushbooh);
        assert_eq!(verdict.confidence, Confidence::Low);
        assert!(verdict.reason_codes.contains("e471_mono_diglycerides_source_unknown"));

        // halal-tier codes do not record anything
        let verdict = halal("acid (E330)");
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert_eq!(codes(&verdict), vec!["no_haram_indicators_detected"]);
    }

    #[test]
    fn test_carmine_by_name() {
        let verdict = halal("Colour: crimson lake");
        assert_eq!(verdict.status, HalalStatus::Haram);
        assert_eq!(codes(&verdict), vec!["insect_derived_haram"]);
    }

    #[test]
    fn test_gelatin_sources() {
        let verdict = halal("fish gelatin");
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert_eq!(verdict.confidence, Confidence::High);
        assert_eq!(codes(&verdict), vec!["gelatin_fish_halal", "fish_gelatin"]);

        let verdict = halal("gelatine (halal)");
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert!(verdict.reason_codes.contains("halal_gelatin_explicit"));

        let verdict = halal("beef gelatin");
        assert_eq!(verdict.status, HalalStatus::Mushbooh);
        assert_eq!(
            codes(&verdict),
            vec!["gelatin_bovine_mushbooh", "bovine_gelatin_unverified"]
        );

        let verdict = halal("gelatin");
        assert_eq!(verdict.status, HalalStatus::Mushbooh);
        assert_eq!(codes(&verdict), vec!["gelatin_source_unknown"]);
    }

    #[test]
    fn test_certified_gelatin() {
        let verdict = halal("gelatin (JAKIM)");
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert_eq!(verdict.confidence, Confidence::High);
        assert_eq!(codes(&verdict), vec!["gelatin_source_unknown_but_certified"]);
    }

    #[test]
    fn test_lecithin_sources() {
        let verdict = halal("sunflower lecithin");
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert_eq!(codes(&verdict), vec!["sunflower_lecithin_halal"]);

        let verdict = halal("soy lecithin");
        assert_eq!(verdict.status, HalalStatus::NotHalalUnverified);
        assert_eq!(verdict.confidence, Confidence::Medium);
        assert_eq!(codes(&verdict), vec!["soy_lecithin_unverified_mushbooh"]);

        let verdict = halal("soy lecithin, halal certified");
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert_eq!(codes(&verdict), vec!["soy_lecithin_certified_halal"]);

        let verdict = halal("egg lecithin");
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert_eq!(codes(&verdict), vec!["eggs_halal", "egg_lecithin_halal"]);

        let verdict = halal("lecithin");
        assert_eq!(verdict.status, HalalStatus::Mushbooh);
        assert_eq!(codes(&verdict), vec!["lecithin_source_unspecified_mushbooh"]);
    }

    #[test]
    fn test_lecithin_prefers_original_text() {
        let verdict = evaluate_halal("soy lecithin", false, Some("lécithine de tournesol"));
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert_eq!(codes(&verdict), vec!["sunflower_lecithin_halal"]);
    }

    #[test]
    fn test_flavourings() {
        let verdict = halal("natural flavour");
        assert_eq!(verdict.status, HalalStatus::Mushbooh);
        assert_eq!(
            codes(&verdict),
            vec![
                "natural_flavor_source_unknown",
                "natural_flavour_source_unknown_mushbooh"
            ]
        );

        let verdict = halal("artificial flavouring");
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert_eq!(verdict.confidence, Confidence::High);
        assert_eq!(codes(&verdict), vec!["artificial_flavour"]);
    }

    #[test]
    fn test_weak_certification_raises_confidence() {
        let verdict = halal("natural flavour (halal)");
        assert_eq!(verdict.status, HalalStatus::Mushbooh);
        assert_eq!(verdict.confidence, Confidence::Medium);
    }

    #[test]
    fn test_favorable_majority_confirms() {
        // plant glycerin is favorable, the unlabeled flavour is doubtful
        let verdict = halal("vegetable glycerin, natural flavor");
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert_eq!(verdict.confidence, Confidence::High);
    }

    #[test]
    fn test_default_fallbacks() {
        let verdict = halal("sugar");
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert_eq!(verdict.confidence, Confidence::High);
        assert_eq!(codes(&verdict), vec!["inherently_halal_by_nature"]);

        let verdict = halal("xanthan thickener");
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert_eq!(verdict.confidence, Confidence::Medium);
        assert_eq!(codes(&verdict), vec!["no_haram_indicators_detected"]);

        let verdict = halal("");
        assert_eq!(verdict.status, HalalStatus::HalalConfirmed);
        assert_eq!(verdict.confidence, Confidence::Medium);
    }

    #[test]
    fn test_strict_mode_keeps_reasons() {
        for text in ["gelatin", "lecithin", "natural flavour", "E471"] {
            let lenient = evaluate_halal(text, false, None);
            let strict = evaluate_halal(text, true, None);
            assert_eq!(lenient.status, HalalStatus::Mushbooh, "{}", text);
            assert_eq!(strict.status, HalalStatus::NotHalalUnverified, "{}", text);
            assert_eq!(lenient.reason_codes, strict.reason_codes);
            assert_eq!(lenient.evidence, strict.evidence);
            assert_eq!(lenient.confidence, strict.confidence);
        }
    }

    #[test]
    fn test_determinism() {
        for text in ["gelatin", "soy lecithin", "wine vinegar", "E120", "vanilla extract"] {
            assert_eq!(halal(text), halal(text));
        }
    }

    #[test]
    fn test_violations() {
        assert_eq!(halal("lard").violations(), vec!["haram_ingredient_source_forbidden"]);
        assert_eq!(
            halal("ethanol").violations(),
            vec!["haram_ingredient_source_forbidden", "alcohol_not_halal"]
        );
        assert_eq!(
            evaluate_halal("gelatin", true, None).violations(),
            vec!["source_unverified_mushbooh"]
        );
        assert!(halal("vanilla extract")
            .violations()
            .contains(&"vanilla_extract_may_contain_alcohol".to_string()));
        assert!(halal("sugar").violations().is_empty());
    }
}
