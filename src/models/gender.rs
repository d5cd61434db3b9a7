use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParseLabelError;

/// Canonical gender category used domain-wide.
///
/// The legacy API accepted several casings and Indonesian synonyms for the
/// same two values; input is normalized here and only the canonical labels
/// `Ikhwan`/`Akhwat` ever leave the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Ikhwan,
    Akhwat,
}

impl Gender {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ikhwan => "Ikhwan",
            Self::Akhwat => "Akhwat",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Translation table for every variant the old validators accepted.
        match s.trim().to_lowercase().as_str() {
            "ikhwan" | "laki-laki" | "laki laki" | "pria" | "male" | "l" => Ok(Self::Ikhwan),
            "akhwat" | "perempuan" | "wanita" | "female" | "p" => Ok(Self::Akhwat),
            _ => Err(ParseLabelError::new("gender", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_labels() {
        assert_eq!("Ikhwan".parse::<Gender>().unwrap(), Gender::Ikhwan);
        assert_eq!("Akhwat".parse::<Gender>().unwrap(), Gender::Akhwat);
        assert_eq!(Gender::Ikhwan.as_str(), "Ikhwan");
    }

    #[test]
    fn test_legacy_aliases() {
        assert_eq!("ikhwan".parse::<Gender>().unwrap(), Gender::Ikhwan);
        assert_eq!("Laki-laki".parse::<Gender>().unwrap(), Gender::Ikhwan);
        assert_eq!("PEREMPUAN".parse::<Gender>().unwrap(), Gender::Akhwat);
        assert_eq!("wanita".parse::<Gender>().unwrap(), Gender::Akhwat);
    }

    #[test]
    fn test_unknown_label_rejected() {
        let err = "unknown".parse::<Gender>().unwrap_err();
        assert_eq!(err.field, "gender");
    }
}
