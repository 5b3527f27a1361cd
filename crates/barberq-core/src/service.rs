//! Service catalogue: what a client can ask for and how fast it is done.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Kind of service requested by a client.
///
/// `CutSeal` is a composite: it has no base of its own and is derived from
/// the plain-cut base plus a speed-dependent seal delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Cut,
    CutSeal,
    CutBeard,
    CutBeardSeal,
    Color,
    Perm,
}

impl ServiceType {
    pub const ALL: [ServiceType; 6] = [
        ServiceType::Cut,
        ServiceType::CutSeal,
        ServiceType::CutBeard,
        ServiceType::CutBeardSeal,
        ServiceType::Color,
        ServiceType::Perm,
    ];

    /// Stable key used in persisted data and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            ServiceType::Cut => "cut",
            ServiceType::CutSeal => "cut_seal",
            ServiceType::CutBeard => "cut_beard",
            ServiceType::CutBeardSeal => "cut_beard_seal",
            ServiceType::Color => "color",
            ServiceType::Perm => "perm",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceType::Cut => "Cut",
            ServiceType::CutSeal => "Cut + seal",
            ServiceType::CutBeard => "Cut + beard",
            ServiceType::CutBeardSeal => "Cut + beard + seal",
            ServiceType::Color => "Color",
            ServiceType::Perm => "Perm",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ServiceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '+', ' '], "_");
        ServiceType::ALL
            .into_iter()
            .find(|t| t.key() == normalized)
            .ok_or_else(|| ValidationError::UnknownService(s.to_string()))
    }
}

/// Qualitative throughput modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Fast,
    #[default]
    Normal,
    Slow,
}

impl Speed {
    pub const ALL: [Speed; 3] = [Speed::Fast, Speed::Normal, Speed::Slow];

    pub fn key(self) -> &'static str {
        match self {
            Speed::Fast => "fast",
            Speed::Normal => "normal",
            Speed::Slow => "slow",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Speed::Fast => "Fast",
            Speed::Normal => "Normal",
            Speed::Slow => "Slow",
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Speed {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Speed::ALL
            .into_iter()
            .find(|sp| sp.key() == normalized)
            .ok_or_else(|| ValidationError::UnknownSpeed(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_loose_spellings() {
        assert_eq!("cut".parse::<ServiceType>().unwrap(), ServiceType::Cut);
        assert_eq!("cut+seal".parse::<ServiceType>().unwrap(), ServiceType::CutSeal);
        assert_eq!(
            "Cut-Beard-Seal".parse::<ServiceType>().unwrap(),
            ServiceType::CutBeardSeal
        );
        assert_eq!("SLOW".parse::<Speed>().unwrap(), Speed::Slow);
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(matches!(
            "shave".parse::<ServiceType>(),
            Err(ValidationError::UnknownService(_))
        ));
        assert!(matches!(
            "turbo".parse::<Speed>(),
            Err(ValidationError::UnknownSpeed(_))
        ));
    }

    #[test]
    fn serde_uses_stable_keys() {
        assert_eq!(
            serde_json::to_string(&ServiceType::CutBeardSeal).unwrap(),
            "\"cut_beard_seal\""
        );
        assert_eq!(serde_json::to_string(&Speed::Fast).unwrap(), "\"fast\"");
    }
}
