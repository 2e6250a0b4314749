use crate::models::quotes::Quote;

/// distinct categories of a quote collection, in first-seen order.
///
/// purely derived: rebuild it from the collection after every mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    categories: Vec<String>,
}

impl CategoryIndex {
    pub fn derive(quotes: &[Quote]) -> Self {
        let mut categories: Vec<String> = vec![];

        for quote in quotes {
            if !categories.iter().any(|c| c == &quote.category) {
                categories.push(quote.category.clone());
            }
        }

        Self { categories }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }
}
