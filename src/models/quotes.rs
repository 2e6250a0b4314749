use serde::{Deserialize, Serialize};

/// a single quote. two quotes are the same quote when both fields match exactly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Quote {
    pub text: String,
    pub category: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    /// builds a quote from user input, trimming both fields.
    ///
    /// returns `None` when either field is blank after trimming.
    pub fn from_input(text: &str, category: &str) -> Option<Self> {
        let text = text.trim();
        let category = category.trim();

        if text.is_empty() || category.is_empty() {
            return None;
        }

        Some(Self::new(text, category))
    }
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" - {}", self.text, self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_input_trims_fields() {
        let quote = Quote::from_input("  Stay curious.  ", "\tLearning\n").unwrap();

        assert_eq!(quote, Quote::new("Stay curious.", "Learning"));
    }

    #[test]
    fn from_input_rejects_blank_fields() {
        assert!(Quote::from_input("", "Motivation").is_none());
        assert!(Quote::from_input("   ", "Motivation").is_none());
        assert!(Quote::from_input("Keep going.", " ").is_none());
    }

    #[test]
    fn equality_is_case_sensitive() {
        assert_ne!(
            Quote::new("Believe in yourself!", "Motivation"),
            Quote::new("Believe in yourself!", "motivation"),
        );
    }

    #[test]
    fn serializes_as_text_and_category() {
        let json = serde_json::to_value(Quote::new("New one", "Server")).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "text": "New one", "category": "Server" })
        );
    }
}
