use std::collections::HashSet;

use serde::Serialize;

const ID_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One discovered paper. Only `selected` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperRecord {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub year: i32,
    pub citations: u64,
    pub publisher: String,
    pub url: String,
    pub selected: bool,
}

impl PaperRecord {
    pub fn is_pdf(&self) -> bool {
        self.url.to_ascii_lowercase().ends_with(".pdf")
    }
}

/// Hands out random base-36 tokens, never repeating one within a result set.
#[derive(Debug, Default)]
pub struct IdGenerator {
    issued: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        loop {
            let id: String = (0..ID_LEN)
                .map(|_| char::from(ID_ALPHABET[fastrand::usize(..ID_ALPHABET.len())]))
                .collect();
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str) -> PaperRecord {
        PaperRecord {
            id: "abc".into(),
            title: "T".into(),
            authors: vec!["A".into()],
            year: 2020,
            citations: 0,
            publisher: "Web".into(),
            url: url.into(),
            selected: true,
        }
    }

    #[test]
    fn ids_are_base36_and_fixed_length() {
        let mut ids = IdGenerator::new();
        let id = ids.next_id();
        assert_eq!(id.len(), ID_LEN);
        assert!(id.bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn ids_are_unique_within_generator() {
        let mut ids = IdGenerator::new();
        let issued: HashSet<String> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(issued.len(), 1000);
    }

    #[test]
    fn pdf_detection_ignores_case() {
        assert!(record("https://a.org/x.pdf").is_pdf());
        assert!(record("https://a.org/X.PDF").is_pdf());
        assert!(!record("https://a.org/abs/1").is_pdf());
        assert!(!record("#").is_pdf());
    }

    #[test]
    fn serializes_with_field_names() {
        let json = serde_json::to_value(record("#")).unwrap();
        assert_eq!(json["year"], 2020);
        assert_eq!(json["selected"], true);
        assert_eq!(json["authors"][0], "A");
    }
}
