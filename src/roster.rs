//! Roster records: barns and workers.
//!
//! The roster exists to resolve display names for the calendar and to supply
//! the viewing user's role. Tasks keep denormalised name copies, so roster
//! lookups happen at assignment time, not at render time.

use serde::{Deserialize, Serialize};

use crate::fields::Role;

/// A physical pen or barn that tasks are scheduled against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barn {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub capacity: Option<u32>,
}

/// A member of the farm staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// The identity the calendar is being viewed as.
///
/// Carries only what the role filter needs; derived from a `Worker`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id: String,
    pub role: Role,
}

impl Viewer {
    pub fn new(id: &str, role: Role) -> Self {
        Viewer { id: id.to_string(), role }
    }
}

impl From<&Worker> for Viewer {
    fn from(w: &Worker) -> Self {
        Viewer { id: w.id.clone(), role: w.role }
    }
}
