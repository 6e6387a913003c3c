//! Shared domain enumerations aligned with persisted columns.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Language partition for every piece of content.
///
/// Persisted as a lowercase two-letter tag in a `TEXT` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Fr,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Fr];

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }

    /// The sibling language of a bilingual pair.
    pub fn other(self) -> Locale {
        match self {
            Locale::En => Locale::Fr,
            Locale::Fr => Locale::En,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            other => Err(DomainError::UnknownLocale(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_locales_case_insensitively() {
        assert_eq!("en".parse::<Locale>().expect("en"), Locale::En);
        assert_eq!(" FR ".parse::<Locale>().expect("fr"), Locale::Fr);
    }

    #[test]
    fn rejects_unknown_locale() {
        let err = "de".parse::<Locale>().expect_err("de is not supported");
        assert!(matches!(err, DomainError::UnknownLocale(tag) if tag == "de"));
    }

    #[test]
    fn other_is_an_involution() {
        for locale in Locale::ALL {
            assert_ne!(locale.other(), locale);
            assert_eq!(locale.other().other(), locale);
        }
    }

    #[test]
    fn serializes_as_lowercase_tag() {
        let json = serde_json::to_string(&Locale::Fr).expect("serialize");
        assert_eq!(json, "\"fr\"");
    }
}
