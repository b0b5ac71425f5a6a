//! Per-user access control for owned resources.
//!
//! Route handlers resolve the row first (404 when it is missing or
//! soft-deleted) and then ask the guard whether the acting user may touch it.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::budgets::{Budget, BudgetWithCategory};
use crate::models::categories::Category;
use crate::models::transactions::{Transaction, TransactionWithCategory};

/// A resource that belongs to exactly one user.
pub trait Owned {
    /// Owning user, or `None` when it cannot be determined.
    fn owner_id(&self) -> Option<Uuid>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotOwner,
    OwnershipIndeterminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny(DenyReason),
}

/// Decides whether `acting_user_id` may read, update or delete `resource`.
pub fn authorize<R: Owned + ?Sized>(acting_user_id: Uuid, resource: &R) -> Access {
    match resource.owner_id() {
        Some(owner) if owner == acting_user_id => Access::Allow,
        Some(_) => Access::Deny(DenyReason::NotOwner),
        None => Access::Deny(DenyReason::OwnershipIndeterminate),
    }
}

/// Same as [`authorize`], surfacing a denial as `Error::Forbidden`.
pub fn ensure_owner<R: Owned + ?Sized>(acting_user_id: Uuid, resource: &R) -> Result<()> {
    match authorize(acting_user_id, resource) {
        Access::Allow => Ok(()),
        Access::Deny(reason) => {
            tracing::debug!(user_id = %acting_user_id, ?reason, "ownership check denied");
            Err(Error::Forbidden(
                "You do not have permission to access this resource".to_string(),
            ))
        }
    }
}

impl Owned for Category {
    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}

impl Owned for Transaction {
    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}

impl Owned for TransactionWithCategory {
    fn owner_id(&self) -> Option<Uuid> {
        self.transaction.owner_id()
    }
}

impl Owned for Budget {
    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}

impl Owned for BudgetWithCategory {
    fn owner_id(&self) -> Option<Uuid> {
        self.budget.owner_id()
    }
}
