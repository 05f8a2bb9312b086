//! Product-level verdicts derived from the per-ingredient verdicts.
//!
//! Failing ingredients keep label order, duplicates included. Reason codes
//! are a sorted union and do not depend on ingredient order.

use crate::verdict::{
    Confidence, HalalStatus, HalalVerdict, IngredientVerdict, KosherStatus, KosherVerdict,
    ProductHalalStatus, ProductVerdict,
};
use std::collections::BTreeSet;

fn collect_failing<S, F>(verdicts: &[IngredientVerdict<S>], failing: F) -> (Vec<String>, Vec<String>)
where
    F: Fn(&IngredientVerdict<S>) -> bool,
{
    let mut ingredients = Vec::new();
    let mut codes = BTreeSet::new();

    for verdict in verdicts.iter().filter(|v| failing(v)) {
        ingredients.push(verdict.ingredient.clone());
        codes.extend(verdict.reason_codes.iter().cloned());
    }

    (ingredients, codes.into_iter().collect())
}

pub fn aggregate_halal(verdicts: &[HalalVerdict], strict: bool) -> ProductVerdict<ProductHalalStatus> {
    let (haram, codes) = collect_failing(verdicts, |v| v.status == HalalStatus::Haram);
    if !haram.is_empty() {
        return ProductVerdict {
            status: ProductHalalStatus::Haram,
            confidence: Confidence::High,
            reason: "Contains explicitly haram ingredient(s).".to_string(),
            failing_ingredients: haram,
            reason_codes: codes,
        };
    }

    if strict {
        let (unresolved, codes) = collect_failing(verdicts, |v| v.status.is_unresolved());
        if !unresolved.is_empty() {
            return ProductVerdict {
                status: ProductHalalStatus::NotHalalUnverified,
                confidence: Confidence::Low,
                reason: "Contains ingredient(s) with unverified halal source or processing."
                    .to_string(),
                failing_ingredients: unresolved,
                reason_codes: codes,
            };
        }
    }

    ProductVerdict {
        status: ProductHalalStatus::Halal,
        confidence: Confidence::Medium,
        reason: "All detected ingredients are verified halal at ingredient level.".to_string(),
        failing_ingredients: Vec::new(),
        reason_codes: Vec::new(),
    }
}

pub fn aggregate_kosher(verdicts: &[KosherVerdict]) -> ProductVerdict<KosherStatus> {
    let (forbidden, codes) = collect_failing(verdicts, |v| v.status == KosherStatus::NotKosher);
    if !forbidden.is_empty() {
        return ProductVerdict {
            status: KosherStatus::NotKosher,
            confidence: Confidence::High,
            reason: "Contains explicitly non-kosher ingredient(s).".to_string(),
            failing_ingredients: forbidden,
            reason_codes: codes,
        };
    }

    let (unresolved, codes) = collect_failing(verdicts, |v| {
        v.status == KosherStatus::RequiresKosherCertification
    });
    if !unresolved.is_empty() {
        return ProductVerdict {
            status: KosherStatus::RequiresKosherCertification,
            confidence: Confidence::Low,
            reason: "All ingredients may be kosher, but kosher certification is required."
                .to_string(),
            failing_ingredients: unresolved,
            reason_codes: codes,
        };
    }

    ProductVerdict {
        status: KosherStatus::KosherConfirmed,
        confidence: Confidence::High,
        reason: "All detected ingredients are kosher at ingredient level.".to_string(),
        failing_ingredients: Vec::new(),
        reason_codes: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::halal::evaluate_halal;
    use crate::kosher::evaluate_kosher;

    fn halal_all(texts: &[&str], strict: bool) -> Vec<HalalVerdict> {
        texts.iter().map(|t| evaluate_halal(t, strict, None)).collect()
    }

    #[test]
    fn test_single_haram_fails_product() {
        let mut texts = vec!["sugar"; 19];
        texts.push("pork gelatin");
        let verdicts = halal_all(&texts, true);

        let product = aggregate_halal(&verdicts, true);
        assert_eq!(product.status, ProductHalalStatus::Haram);
        assert_eq!(product.confidence, Confidence::High);
        assert_eq!(product.failing_ingredients, vec!["pork gelatin"]);
        assert_eq!(product.reason_codes, vec!["pork_haram"]);
    }

    #[test]
    fn test_strict_unresolved() {
        let verdicts = halal_all(&["sugar", "gelatin", "E471"], true);
        let product = aggregate_halal(&verdicts, true);
        assert_eq!(product.status, ProductHalalStatus::NotHalalUnverified);
        assert_eq!(product.confidence, Confidence::Low);
        assert_eq!(product.failing_ingredients, vec!["gelatin", "E471"]);
        assert!(product
            .reason_codes
            .contains(&"gelatin_source_unknown".to_string()));
    }

    #[test]
    fn test_lenient_ignores_unresolved() {
        let verdicts = halal_all(&["sugar", "gelatin"], false);
        let product = aggregate_halal(&verdicts, false);
        assert_eq!(product.status, ProductHalalStatus::Halal);
        assert_eq!(product.confidence, Confidence::Medium);
        assert!(product.failing_ingredients.is_empty());
        assert_eq!(
            product.reason,
            "All detected ingredients are verified halal at ingredient level."
        );
    }

    #[test]
    fn test_order_independence() {
        let forward = halal_all(&["gelatin", "E471", "soy lecithin", "lard", "wine"], true);
        let mut backward = forward.clone();
        backward.reverse();

        let a = aggregate_halal(&forward, true);
        let b = aggregate_halal(&backward, true);
        assert_eq!(a.status, b.status);
        assert_eq!(a.reason_codes, b.reason_codes);

        let mut a_failing = a.failing_ingredients.clone();
        let mut b_failing = b.failing_ingredients.clone();
        a_failing.sort();
        b_failing.sort();
        assert_eq!(a_failing, b_failing);
    }

    #[test]
    fn test_failing_ingredients_keep_label_order() {
        let verdicts = halal_all(&["lard", "sugar", "wine", "lard"], true);
        let product = aggregate_halal(&verdicts, true);
        assert_eq!(product.status, ProductHalalStatus::Haram);
        assert_eq!(product.failing_ingredients, vec!["lard", "wine", "lard"]);
    }

    #[test]
    fn test_kosher_aggregation() {
        let verdicts: Vec<_> = ["sugar", "shrimp"].iter().map(|t| evaluate_kosher(t)).collect();
        let product = aggregate_kosher(&verdicts);
        assert_eq!(product.status, KosherStatus::NotKosher);
        assert_eq!(product.failing_ingredients, vec!["shrimp"]);

        let verdicts: Vec<_> = ["sugar", "wine"].iter().map(|t| evaluate_kosher(t)).collect();
        let product = aggregate_kosher(&verdicts);
        assert_eq!(product.status, KosherStatus::RequiresKosherCertification);
        assert_eq!(product.confidence, Confidence::Low);
        assert_eq!(product.failing_ingredients, vec!["sugar", "wine"]);

        let verdicts: Vec<_> = ["sugar (OU)", "water, OU kosher"]
            .iter()
            .map(|t| evaluate_kosher(t))
            .collect();
        let product = aggregate_kosher(&verdicts);
        assert_eq!(product.status, KosherStatus::KosherConfirmed);
        assert_eq!(product.confidence, Confidence::High);
    }

    #[test]
    fn test_empty_product() {
        assert_eq!(aggregate_halal(&[], true).status, ProductHalalStatus::Halal);
        assert_eq!(aggregate_kosher(&[]).status, KosherStatus::KosherConfirmed);
    }
}
