//! Scale tiers and their participant-count ranges.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utilities::RandomSource;

/// Participant count used for an unrecognised tier name.
pub const DEFAULT_PARTICIPANTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Nano,
    Micro,
    Standard,
    Mega,
    Ultra,
    Cosmic,
}

impl Tier {
    pub const ALL: [Tier; 6] = [
        Self::Nano,
        Self::Micro,
        Self::Standard,
        Self::Mega,
        Self::Ultra,
        Self::Cosmic,
    ];

    /// Inclusive participant-count range.
    pub fn range(&self) -> RangeInclusive<usize> {
        match self {
            Self::Nano => 5..=5,
            Self::Micro => 51..=250,
            Self::Standard => 251..=1000,
            Self::Mega => 1001..=5000,
            Self::Ultra => 5001..=10000,
            Self::Cosmic => 10001..=15000,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nano => "nano",
            Self::Micro => "micro",
            Self::Standard => "standard",
            Self::Mega => "mega",
            Self::Ultra => "ultra",
            Self::Cosmic => "cosmic",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTier(pub String);

impl fmt::Display for UnknownTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown scale tier: {}", self.0)
    }
}

impl std::error::Error for UnknownTier {}

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTier(s.to_string()))
    }
}

/// Turns a tier name into a concrete participant count.
#[derive(Debug, Clone)]
pub struct ScaleResolver {
    rng: RandomSource,
}

impl ScaleResolver {
    pub fn new(rng: RandomSource) -> Self {
        Self { rng }
    }

    /// Uniform draw from the tier's range, or [`DEFAULT_PARTICIPANTS`] when
    /// the name is not a known tier. Never fails.
    pub fn resolve(&self, tier: &str) -> usize {
        match tier.parse::<Tier>() {
            Ok(tier) => self.resolve_tier(tier),
            Err(_) => {
                tracing::debug!(tier, default = DEFAULT_PARTICIPANTS, "unknown tier, using default");
                DEFAULT_PARTICIPANTS
            }
        }
    }

    pub fn resolve_tier(&self, tier: Tier) -> usize {
        let range = tier.range();
        self.rng.range_inclusive(*range.start(), *range.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nano_is_always_five() {
        let resolver = ScaleResolver::new(RandomSource::seeded(1));
        for _ in 0..10_000 {
            assert_eq!(resolver.resolve("nano"), 5);
        }
    }

    #[test]
    fn test_every_tier_stays_in_range() {
        let resolver = ScaleResolver::new(RandomSource::seeded(2));
        for tier in Tier::ALL {
            let range = tier.range();
            for _ in 0..2_000 {
                let n = resolver.resolve(tier.as_str());
                assert!(range.contains(&n), "{tier}: {n} outside {range:?}");
            }
        }
    }

    #[test]
    fn test_cosmic_spans_its_range() {
        let resolver = ScaleResolver::new(RandomSource::seeded(3));
        let draws: Vec<usize> = (0..10_000).map(|_| resolver.resolve("cosmic")).collect();
        assert!(draws.iter().all(|n| (10_001..=15_000).contains(n)));
        // Spread check: both halves of the range are hit.
        assert!(draws.iter().any(|&n| n < 12_500));
        assert!(draws.iter().any(|&n| n > 12_500));
    }

    #[test]
    fn test_unknown_tier_defaults_to_ten() {
        let resolver = ScaleResolver::new(RandomSource::seeded(4));
        assert_eq!(resolver.resolve("galactic"), DEFAULT_PARTICIPANTS);
        assert_eq!(resolver.resolve(""), 10);
        assert_eq!(resolver.resolve("Nano"), 10);
    }

    #[test]
    fn test_parse_roundtrip() {
        for tier in Tier::ALL {
            assert_eq!(tier.as_str().parse::<Tier>().unwrap(), tier);
        }
        assert_eq!(
            "huge".parse::<Tier>().unwrap_err().to_string(),
            "unknown scale tier: huge"
        );
    }
}
