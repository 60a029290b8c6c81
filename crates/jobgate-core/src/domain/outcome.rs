//! Outcome of a launch or stop request, as seen by the caller.
//!
//! Only an unknown timestamp is reported back. Ineligible statuses and
//! upstream failures still yield `Accepted`: the request was well-formed, and
//! failures are signalled through logs and `task-status-update` events.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestOutcome {
    Accepted,
    NotFound,
}

impl RequestOutcome {
    pub fn is_accepted(self) -> bool {
        self == RequestOutcome::Accepted
    }
}
