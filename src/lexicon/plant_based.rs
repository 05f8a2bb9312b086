use crate::text::any_word_in_text;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PlantLexicon {
    pub inherently_halal: Vec<String>,
    pub haram_colorants: Vec<String>,
}

impl PlantLexicon {
    pub fn is_inherently_halal(&self, text: &str) -> bool {
        any_word_in_text(text, &self.inherently_halal)
    }

    pub fn has_haram_colorant(&self, text: &str) -> bool {
        any_word_in_text(text, &self.haram_colorants)
    }
}

#[cfg(test)]
mod tests {
    use crate::lexicon::Lexicon;

    #[test]
    fn test_inherently_halal() {
        let plants = &Lexicon::global().plant_based;
        assert!(plants.is_inherently_halal("Sugar"));
        assert!(plants.is_inherently_halal("sunflower oil"));
        assert!(!plants.is_inherently_halal("gelatin"));
    }

    #[test]
    fn test_haram_colorants() {
        let plants = &Lexicon::global().plant_based;
        assert!(plants.has_haram_colorant("Colour: Carmine"));
        assert!(!plants.has_haram_colorant("paprika extract"));
    }
}
