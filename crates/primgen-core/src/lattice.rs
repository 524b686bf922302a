//! The three-valued enablement lattice.
//!
//! A slot starts `Unknown` and may rise to `Enabled` or `Disabled`. For
//! merging, values are ranked `Unknown(0) < Enabled(1) < Disabled(2)`, so
//! an explicit disable always wins a plain merge.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Enablement of one capability for one axis combination.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Lattice {
    #[default]
    Unknown,
    Enabled,
    Disabled,
}

impl Lattice {
    /// `true` maps to `Enabled`, `false` to `Disabled`.
    pub fn of(enabled: bool) -> Self {
        if enabled {
            Lattice::Enabled
        } else {
            Lattice::Disabled
        }
    }

    /// Fixed merge rank.
    pub fn rank(self) -> u8 {
        match self {
            Lattice::Unknown => 0,
            Lattice::Enabled => 1,
            Lattice::Disabled => 2,
        }
    }

    pub fn is_defined(self) -> bool {
        self != Lattice::Unknown
    }

    /// Whichever value has the higher rank.
    pub fn merge(self, other: Lattice) -> Lattice {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    /// `other` if it is defined, otherwise `self`.
    ///
    /// Lets a more specific settings scope override a broader one.
    pub fn replace_if_defined(self, other: Lattice) -> Lattice {
        if other == Lattice::Unknown {
            self
        } else {
            other
        }
    }

    /// Fold step for aggregating children.
    ///
    /// A disabled candidate is ignored; otherwise the candidate replaces
    /// `self` unless `self` already outranks it.
    pub fn merge_down(self, candidate: Lattice) -> Lattice {
        if candidate == Lattice::Disabled || self.rank() > candidate.rank() {
            self
        } else {
            candidate
        }
    }

    /// Fold step for aggregating parents.
    ///
    /// An enabled candidate is ignored; anything else replaces `self`.
    pub fn merge_up(self, candidate: Lattice) -> Lattice {
        if candidate == Lattice::Enabled {
            self
        } else {
            candidate
        }
    }
}

impl From<bool> for Lattice {
    fn from(enabled: bool) -> Self {
        Lattice::of(enabled)
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lattice::Unknown => write!(f, "unknown"),
            Lattice::Enabled => write!(f, "enabled"),
            Lattice::Disabled => write!(f, "disabled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Lattice::*;

    const ALL: [Lattice; 3] = [Unknown, Enabled, Disabled];

    #[test]
    fn of_bool() {
        assert_eq!(Lattice::of(true), Enabled);
        assert_eq!(Lattice::of(false), Disabled);
        assert_eq!(Lattice::from(false), Disabled);
    }

    #[test]
    fn merge_picks_higher_rank() {
        assert_eq!(Unknown.merge(Unknown), Unknown);
        assert_eq!(Unknown.merge(Enabled), Enabled);
        assert_eq!(Enabled.merge(Unknown), Enabled);
        assert_eq!(Enabled.merge(Disabled), Disabled);
        assert_eq!(Disabled.merge(Enabled), Disabled);
        assert_eq!(Unknown.merge(Disabled), Disabled);
    }

    #[test]
    fn merge_is_commutative_and_idempotent() {
        for a in ALL {
            assert_eq!(a.merge(a), a);
            for b in ALL {
                assert_eq!(a.merge(b), b.merge(a));
                assert!(a.merge(b).rank() >= a.rank());
            }
        }
    }

    #[test]
    fn replace_if_defined() {
        assert_eq!(Enabled.replace_if_defined(Unknown), Enabled);
        assert_eq!(Enabled.replace_if_defined(Disabled), Disabled);
        assert_eq!(Disabled.replace_if_defined(Enabled), Enabled);
        assert_eq!(Unknown.replace_if_defined(Unknown), Unknown);
    }

    #[test]
    fn merge_down_ignores_disabled() {
        assert_eq!(Unknown.merge_down(Disabled), Unknown);
        assert_eq!(Enabled.merge_down(Disabled), Enabled);
        assert_eq!(Unknown.merge_down(Enabled), Enabled);
        assert_eq!(Enabled.merge_down(Unknown), Enabled);
        assert_eq!(Disabled.merge_down(Enabled), Disabled);
    }

    #[test]
    fn merge_up_ignores_enabled() {
        assert_eq!(Unknown.merge_up(Enabled), Unknown);
        assert_eq!(Disabled.merge_up(Enabled), Disabled);
        assert_eq!(Unknown.merge_up(Disabled), Disabled);
        assert_eq!(Enabled.merge_up(Disabled), Disabled);
        // Anything that is not `Enabled` replaces the accumulator
        assert_eq!(Disabled.merge_up(Unknown), Unknown);
    }

    #[test]
    fn display() {
        assert_eq!(Unknown.to_string(), "unknown");
        assert_eq!(Enabled.to_string(), "enabled");
        assert_eq!(Disabled.to_string(), "disabled");
    }

    #[test]
    fn serde_lowercase() {
        assert_eq!(serde_json::to_string(&Disabled).unwrap(), "\"disabled\"");
        let parsed: Lattice = serde_json::from_str("\"enabled\"").unwrap();
        assert_eq!(parsed, Enabled);
    }
}
