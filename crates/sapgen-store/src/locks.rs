//! Per-customer mutual exclusion.
//!
//! Two generations for the same customer write into the same directory and
//! commit it, so they must not overlap. `CustomerLocks` hands out one async
//! mutex per customer; a generation holds the guard from before staging until
//! after the store commit. Different customers never wait on each other.
//!
//! Idle entries are cleaned up lazily on each acquisition.

use sapgen_core::CustomerName;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-customer locks.
///
/// Cloning is cheap and clones share the same registry.
///
/// # Examples
///
/// ```
/// use sapgen_core::CustomerName;
/// use sapgen_store::CustomerLocks;
///
/// # async fn example() {
/// let locks = CustomerLocks::new();
/// let acme = CustomerName::new("acme").unwrap();
///
/// let guard = locks.acquire(&acme).await;
/// assert_eq!(guard.customer(), &acme);
/// drop(guard);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CustomerLocks {
    locks: Arc<Mutex<HashMap<CustomerName, Arc<Mutex<()>>>>>,
}

impl CustomerLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other holder has the customer's lock, then takes it.
    ///
    /// The lock is released when the returned guard is dropped.
    pub async fn acquire(&self, customer: &CustomerName) -> CustomerGuard {
        let lock = {
            let mut locks = self.locks.lock().await;

            // Only the registry itself references idle entries
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);

            Arc::clone(locks.entry(customer.clone()).or_default())
        };

        let guard = lock.lock_owned().await;
        CustomerGuard {
            customer: customer.clone(),
            _guard: guard,
        }
    }

    /// Returns the number of customers with a held or awaited lock.
    pub async fn active_count(&self) -> usize {
        let locks = self.locks.lock().await;
        locks
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}

/// Proof that the holder has exclusive access to one customer's directory.
#[derive(Debug)]
pub struct CustomerGuard {
    customer: CustomerName,
    _guard: OwnedMutexGuard<()>,
}

impl CustomerGuard {
    /// Customer this guard protects.
    #[must_use]
    pub const fn customer(&self) -> &CustomerName {
        &self.customer
    }
}
