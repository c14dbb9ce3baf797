use serde::{Deserialize, Serialize};

/// Known shape count for one logo in a fixed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub key: String,
    pub expected_count: usize,
}

/// Closed-world table of logos with hand-counted shapes.
///
/// A match only tells us the answer for a logo someone has already counted;
/// it says nothing about unseen logos, which always fall back to the
/// heuristic count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn insert(&mut self, key: impl Into<String>, expected_count: usize) {
        self.entries.push(CatalogEntry { key: key.into(), expected_count });
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// First entry, in declaration order, whose key occurs in `name` (case-insensitive).
    pub fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        let name = name.to_lowercase();
        self.entries
            .iter()
            .find(|entry| !entry.key.is_empty() && name.contains(&entry.key.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.insert("core & main", 18);
        catalog.insert("bc", 5);
        catalog.insert("hands", 1);
        catalog
    }

    #[test]
    fn test_lookup_is_case_insensitive_substring() {
        let catalog = catalog();
        let entry = catalog.lookup("Core & Main Logo FINAL.png").expect("should match");
        assert_eq!(entry.expected_count, 18);
        assert_eq!(catalog.lookup("helping_HANDS.jpg").map(|e| e.expected_count), Some(1));
    }

    #[test]
    fn test_first_declared_entry_wins() {
        let mut catalog = catalog();
        catalog.insert("abc", 99);
        assert_eq!(catalog.lookup("abc.png").map(|e| e.key.as_str()), Some("bc"));
    }

    #[test]
    fn test_unknown_name_misses() {
        assert!(catalog().lookup("unseen.png").is_none());
        assert!(Catalog::default().lookup("anything").is_none());
    }

    #[test]
    fn test_deserializes_from_list() {
        let catalog: Catalog =
            serde_json::from_str(r#"[{ "key": "sitka", "expected_count": 12 }]"#).expect("parse");
        assert_eq!(catalog.entries().len(), 1);
        assert_eq!(catalog.lookup("sitka_gold.png").map(|e| e.expected_count), Some(12));
    }
}
