/// Session state definitions for the scrape lifecycle
///
/// A session moves `Initializing -> Active -> {Committing, Aborting} -> Closed`.
use std::fmt;

/// Represents the current state of a scrape session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Configuration is being checked and the ledger loaded
    Initializing,

    /// The script is collecting items
    Active,

    /// Clean exit: the report is written and the ledger persisted
    Committing,

    /// Failed or dry exit: resources are released, nothing is written
    Aborting,

    /// Terminal; the session must not be reused
    Closed,
}

impl SessionState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns true while the script may still add items
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns true for the two exit states
    pub fn is_exiting(&self) -> bool {
        matches!(self, Self::Committing | Self::Aborting)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (Self::Initializing, Self::Active)
                | (Self::Active, Self::Committing)
                | (Self::Active, Self::Aborting)
                | (Self::Committing, Self::Closed)
                | (Self::Aborting, Self::Closed)
        )
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Active => "active",
            Self::Committing => "committing",
            Self::Aborting => "aborting",
            Self::Closed => "closed",
        }
    }

    /// Returns all possible session states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Initializing,
            Self::Active,
            Self::Committing,
            Self::Aborting,
            Self::Closed,
        ]
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
