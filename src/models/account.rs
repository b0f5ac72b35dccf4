use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Typed confirmation phrase required to erase an account.
pub const DELETE_CONFIRMATION: &str = "DELETE";

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub confirmation: String,
}

impl DeleteAccountRequest {
    pub fn is_confirmed(&self) -> bool {
        self.confirmation == DELETE_CONFIRMATION
    }
}

/// What an account erasure removed. Repeating the erasure yields zero counts
/// and the original `deleted_at`.
#[derive(Debug, Clone, Serialize)]
pub struct AccountErasure {
    pub entries_deleted: u64,
    pub metrics_deleted: u64,
    pub goals_deleted: u64,
    pub deleted_at: DateTime<Utc>,
    pub sign_out: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_is_exact_match() {
        let ok = DeleteAccountRequest {
            confirmation: "DELETE".into(),
        };
        assert!(ok.is_confirmed());

        for attempt in ["delete", "DELETE ", "", "Delete"] {
            let req = DeleteAccountRequest {
                confirmation: attempt.into(),
            };
            assert!(!req.is_confirmed(), "{attempt:?} must not confirm");
        }
    }
}
