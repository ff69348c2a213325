//! Transit route domain model.

use serde::{Deserialize, Serialize};

/// A transit line, identified to riders by its code (e.g. "12", "F").
///
/// Read-only reference data with the same lifecycle as [`crate::stop::Stop`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLine {
    pub id: i64,
    pub code: String,
}
