//! Administrator roles.
//!
//! The owner grants and revokes the HR role; HR members (and the owner
//! itself) may create, pause, resume and cancel streams.

use std::collections::HashSet;

use paystream_core::error::StreamError;
use paystream_core::traits::Authorizer;
use paystream_core::types::AccountId;
use parking_lot::RwLock;
use tracing::info;

#[derive(Debug)]
pub struct RoleRegistry {
    owner: AccountId,
    hr: RwLock<HashSet<AccountId>>,
}

impl RoleRegistry {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            hr: RwLock::new(HashSet::new()),
        }
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    /// Whether `who` holds the HR role. The owner always does.
    pub fn is_hr(&self, who: &AccountId) -> bool {
        *who == self.owner || self.hr.read().contains(who)
    }

    /// Grant HR to `who`. Returns whether the role was newly granted.
    pub fn grant_hr(&self, caller: &AccountId, who: AccountId) -> Result<bool, StreamError> {
        self.require_owner(caller)?;
        let added = self.hr.write().insert(who);
        if added {
            info!(%who, "HR role granted");
        }
        Ok(added)
    }

    /// Revoke HR from `who`. Returns whether the role was held.
    pub fn revoke_hr(&self, caller: &AccountId, who: &AccountId) -> Result<bool, StreamError> {
        self.require_owner(caller)?;
        let removed = self.hr.write().remove(who);
        if removed {
            info!(%who, "HR role revoked");
        }
        Ok(removed)
    }

    fn require_owner(&self, caller: &AccountId) -> Result<(), StreamError> {
        if *caller != self.owner {
            return Err(StreamError::Unauthorized(*caller));
        }
        Ok(())
    }
}

impl Authorizer for RoleRegistry {
    fn is_authorized(&self, caller: &AccountId) -> bool {
        self.is_hr(caller)
    }
}
