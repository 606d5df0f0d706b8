//! Audit trail helpers.
//!
//! Action taxonomy for privileged bulk operations, target-set validation, and
//! the integrity hash chain that makes tampering with the append-only trail
//! detectable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::types::DbId;

/// Seed value standing in for the previous hash of the first chain entry.
const CHAIN_SEED: &str = "lectra-audit-v1";

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A privileged bulk action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    Activate,
    Deactivate,
    Delete,
    SetRole,
    ResetPassword,
}

impl AdminAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AdminAction::Activate => "activate",
            AdminAction::Deactivate => "deactivate",
            AdminAction::Delete => "delete",
            AdminAction::SetRole => "set_role",
            AdminAction::ResetPassword => "reset_password",
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activate" => Ok(AdminAction::Activate),
            "deactivate" => Ok(AdminAction::Deactivate),
            "delete" => Ok(AdminAction::Delete),
            "set_role" => Ok(AdminAction::SetRole),
            "reset_password" => Ok(AdminAction::ResetPassword),
            other => Err(CoreError::Validation(format!(
                "Unknown admin action '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Target handling
// ---------------------------------------------------------------------------

/// Drop the acting user's own id from a bulk target set, preserving order and
/// removing duplicates.
///
/// Self-exclusion is the caller's policy, applied before the ledger append;
/// the ledger itself only rejects empty target sets.
pub fn filter_self_targets(actor_id: DbId, target_ids: &[DbId]) -> Vec<DbId> {
    let mut seen = std::collections::HashSet::new();
    target_ids
        .iter()
        .copied()
        .filter(|id| *id != actor_id && seen.insert(*id))
        .collect()
}

/// Reject an empty target id set.
pub fn check_targets(target_ids: &[DbId]) -> Result<(), CoreError> {
    if target_ids.is_empty() {
        return Err(CoreError::Validation(
            "Audit entry requires at least one target id".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Integrity hash chain
// ---------------------------------------------------------------------------

/// Compute the integrity hash for an audit entry.
///
/// Each entry's hash covers its canonical data plus the previous entry's
/// hash, forming a chain; the first entry uses a fixed seed.
pub fn compute_integrity_hash(prev_hash: Option<&str>, entry_data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prev_hash.unwrap_or(CHAIN_SEED).as_bytes());
    hasher.update(b"|");
    hasher.update(entry_data.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_drops_actor_and_duplicates_keeps_order() {
        assert_eq!(filter_self_targets(7, &[5, 7, 9]), vec![5, 9]);
        assert_eq!(filter_self_targets(7, &[5, 5, 9, 9, 7]), vec![5, 9]);
        assert_eq!(filter_self_targets(1, &[2, 3]), vec![2, 3]);
    }

    #[test]
    fn filter_can_empty_the_set() {
        let remaining = filter_self_targets(7, &[7, 7]);
        assert!(remaining.is_empty());
        assert!(matches!(
            check_targets(&remaining).unwrap_err(),
            CoreError::Validation(_)
        ));
    }

    #[test]
    fn non_empty_targets_pass() {
        check_targets(&[1]).unwrap();
    }

    #[test]
    fn hash_chain_is_deterministic_and_link_sensitive() {
        let first = compute_integrity_hash(None, "entry-1");
        assert_eq!(first, compute_integrity_hash(None, "entry-1"));
        assert_eq!(first.len(), 64);

        let second = compute_integrity_hash(Some(&first), "entry-2");
        // Same data, different predecessor: different hash.
        assert_ne!(second, compute_integrity_hash(None, "entry-2"));
    }

    #[test]
    fn action_round_trips_through_string_form() {
        for action in [
            AdminAction::Activate,
            AdminAction::Deactivate,
            AdminAction::Delete,
            AdminAction::SetRole,
            AdminAction::ResetPassword,
        ] {
            assert_eq!(action.as_str().parse::<AdminAction>().unwrap(), action);
        }
        assert!("promote".parse::<AdminAction>().is_err());
    }
}
