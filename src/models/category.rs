//! Internal category taxonomy.

use serde::{Deserialize, Serialize};

/// An internal category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl Category {
    /// The fixed taxonomy seeded into a fresh store.
    ///
    /// Order matters: fuzzy category matching iterates in load order.
    pub fn defaults() -> Vec<Category> {
        let names = [
            "Business",
            "Technology",
            "Entertainment",
            "Health",
            "Science",
            "Sports",
            "Politics",
            "World",
            "Environment",
            "Education",
        ];

        names
            .iter()
            .enumerate()
            .map(|(i, name)| Category {
                id: i as i64 + 1,
                name: name.to_string(),
                slug: name.to_lowercase(),
            })
            .collect()
    }
}
