//! Session lifecycle state.
//!
//! The session moves `Unknown -> Validating -> {Valid, Invalid}` during
//! boot. `Valid` and `Invalid` are terminal for a boot cycle and decide the
//! initial route; mid-session, a 401 on any authenticated call transitions
//! a `Valid` session to `Invalid`.

use serde::{Deserialize, Serialize};

use crate::user::UserProfile;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Process start; nothing known yet.
    #[default]
    Unknown,
    /// A whoami call is in flight.
    Validating,
    /// The stored token authenticates.
    Valid,
    /// No token, rejected token, or validation failure/timeout.
    Invalid,
}

impl SessionPhase {
    /// True once validation has settled either way.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Valid | Self::Invalid)
    }
}

/// Which area of the app the user should land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialRoute {
    /// Authenticated area (home, reports, profile).
    Authenticated,
    /// Unauthenticated area (login).
    Login,
}

impl From<SessionPhase> for InitialRoute {
    fn from(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::Valid => InitialRoute::Authenticated,
            _ => InitialRoute::Login,
        }
    }
}

/// Read-only view of the session published to screens.
///
/// The session context is the single writer; everything else observes
/// snapshots through a watch channel and never mutates session state
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    /// Profile returned by the whoami call, cached for the session's life.
    pub profile: Option<UserProfile>,
}

impl SessionSnapshot {
    pub fn route(&self) -> InitialRoute {
        self.phase.into()
    }
}
