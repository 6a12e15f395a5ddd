//! # Affinity
//!
//! A per-contact closeness rating. Each rating fixes how many days may pass
//! without a shared calendar event before the contact counts as overdue.

use crate::errors::CoreError;
use crate::identifiers::ContactId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Affinity ratings keyed by contact.
///
/// Contacts missing from the map are [`Affinity::Undefined`]; use
/// [`affinity_of`] rather than indexing.
pub type AffinityMap = BTreeMap<ContactId, Affinity>;

/// Look up the affinity for `id`, defaulting to [`Affinity::Undefined`].
pub fn affinity_of(map: &AffinityMap, id: &ContactId) -> Affinity {
    map.get(id).copied().unwrap_or_default()
}

/// Closeness rating of a contact.
///
/// Ordering follows [`Affinity::rank`]: closer ratings sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affinity {
    /// Closest people, reach out weekly
    Best,
    /// Close friends and family, monthly
    Close,
    /// Friends seen every few months
    Loose,
    /// People worth keeping in touch with twice a year
    Keep,
    /// Not yet rated
    #[default]
    Undefined,
}

impl Affinity {
    /// All ratings, closest first.
    pub const ALL: [Affinity; 5] = [
        Affinity::Best,
        Affinity::Close,
        Affinity::Loose,
        Affinity::Keep,
        Affinity::Undefined,
    ];

    /// Sort rank; ascending is closer.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Best => 1,
            Self::Close => 2,
            Self::Loose => 3,
            Self::Keep => 4,
            Self::Undefined => 10,
        }
    }

    /// Days without contact before the person is overdue.
    pub fn days(&self) -> i64 {
        match self {
            Self::Best => 7,
            Self::Close => 30,
            Self::Loose => 90,
            Self::Keep => 180,
            Self::Undefined => 36_500,
        }
    }

    /// Raw value used in persisted stores.
    pub fn raw_value(&self) -> &'static str {
        match self {
            Self::Best => "best",
            Self::Close => "close",
            Self::Loose => "loose",
            Self::Keep => "keep",
            Self::Undefined => "undefined",
        }
    }

    /// Short display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Best => "Best friends",
            Self::Close => "Close friends",
            Self::Loose => "Friends",
            Self::Keep => "Keep in touch",
            Self::Undefined => "Everyone else",
        }
    }

    /// One-line description of the cadence.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Best => "Every week",
            Self::Close => "Every month",
            Self::Loose => "Every few months",
            Self::Keep => "Twice a year",
            Self::Undefined => "No reminders",
        }
    }

    /// Symbol name for the platform icon set.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Best => "heart.fill",
            Self::Close => "star.fill",
            Self::Loose => "person.2.fill",
            Self::Keep => "leaf.fill",
            Self::Undefined => "circle.dashed",
        }
    }
}

impl PartialOrd for Affinity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Affinity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Affinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw_value())
    }
}

impl FromStr for Affinity {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.raw_value().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| CoreError::UnknownAffinity {
                raw: raw.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_rank() {
        let mut all = vec![
            Affinity::Undefined,
            Affinity::Keep,
            Affinity::Best,
            Affinity::Loose,
            Affinity::Close,
        ];
        all.sort();
        assert_eq!(all, Affinity::ALL.to_vec());
    }

    #[test]
    fn raw_values_round_trip_through_from_str() {
        for affinity in Affinity::ALL {
            assert_eq!(affinity.raw_value().parse::<Affinity>(), Ok(affinity));
        }
        assert!(matches!(
            "bestie".parse::<Affinity>(),
            Err(CoreError::UnknownAffinity { .. })
        ));
    }

    #[test]
    fn unknown_contact_defaults_to_undefined() {
        let mut map = AffinityMap::new();
        map.insert(ContactId::new("a"), Affinity::Best);
        assert_eq!(affinity_of(&map, &ContactId::new("a")), Affinity::Best);
        assert_eq!(affinity_of(&map, &ContactId::new("b")), Affinity::Undefined);
    }

    #[test]
    fn serializes_as_lowercase_raw_value() {
        let json = serde_json::to_string(&Affinity::Keep).unwrap();
        assert_eq!(json, "\"keep\"");
    }
}
