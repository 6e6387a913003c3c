//! Ordered list of short texts persisted as a JSON array in a text column.
//!
//! Book quotes and reviews are stored this way. Decoding happens at the
//! storage boundary so a malformed column surfaces as an error on read instead
//! of leaking an untyped string into the rest of the application.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextList(Vec<String>);

impl TextList {
    pub fn new(items: Vec<String>) -> Self {
        Self(items)
    }

    /// Decode the persisted representation.
    ///
    /// A blank column is an empty list; anything else must be a JSON array of
    /// strings.
    pub fn decode(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str::<Vec<String>>(trimmed)
            .map(Self)
            .map_err(|err| DomainError::MalformedTextList(err.to_string()))
    }

    /// Encode for persistence. Blank entries are dropped.
    pub fn encode(&self) -> String {
        let items: Vec<&str> = self
            .0
            .iter()
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .collect();
        serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn items(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for TextList {
    fn from(items: Vec<String>) -> Self {
        Self(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_column_decodes_to_empty_list() {
        assert!(TextList::decode("").expect("blank").is_empty());
        assert!(TextList::decode("   ").expect("whitespace").is_empty());
    }

    #[test]
    fn decode_preserves_order() {
        let list = TextList::decode(r#"["« Superbe »", "Gripping"]"#).expect("valid");
        assert_eq!(list.items(), ["« Superbe »", "Gripping"]);
    }

    #[test]
    fn decode_rejects_non_string_items() {
        let err = TextList::decode("[1, 2]").expect_err("numbers are not texts");
        assert!(matches!(err, DomainError::MalformedTextList(_)));
    }

    #[test]
    fn decode_rejects_plain_text() {
        assert!(TextList::decode("just a quote").is_err());
    }

    #[test]
    fn encode_drops_blank_entries() {
        let list = TextList::new(vec![
            "first".to_string(),
            "  ".to_string(),
            " second ".to_string(),
        ]);
        assert_eq!(list.encode(), r#"["first","second"]"#);
    }
}
