use serde::Deserialize;

/// Kosher term lists, consulted in field order by the kosher evaluator.
#[derive(Debug, Clone, Deserialize)]
pub struct KosherLexicon {
    pub forbidden_land_animals: Vec<String>,
    pub forbidden_seafood: Vec<String>,
    pub insects: Vec<String>,
    #[serde(default)]
    pub insect_e_numbers: Vec<String>,
    pub blood: Vec<String>,
    pub grape_products: Vec<String>,
    pub source_dependent: Vec<String>,
    pub strong_certification: Vec<String>,
}

impl KosherLexicon {
    pub fn term_count(&self) -> usize {
        [
            &self.forbidden_land_animals,
            &self.forbidden_seafood,
            &self.insects,
            &self.insect_e_numbers,
            &self.blood,
            &self.grape_products,
            &self.source_dependent,
            &self.strong_certification,
        ]
        .iter()
        .map(|list| list.len())
        .sum()
    }
}
