use super::transfer::{TransferOutcome, TransferRequest};
use crate::error::{LedgerError, Result};

/// A fixed-size sequence of integer account balances, indexed `0..len()`.
///
/// The ledger itself is not synchronized. It is meant to be owned by exactly one
/// task (see [`crate::application::actor::LedgerActor`]) which applies transfers one
/// at a time, so the sum of all balances never changes and no balance goes negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    balances: Vec<i64>,
}

impl Ledger {
    /// Creates a ledger of `accounts` accounts, each holding `initial_balance`.
    pub fn new(accounts: usize, initial_balance: i64) -> Result<Self> {
        if initial_balance < 0 {
            return Err(LedgerError::InvalidConfig(format!(
                "initial balance must not be negative, got {initial_balance}"
            )));
        }
        i64::try_from(accounts)
            .ok()
            .and_then(|n| n.checked_mul(initial_balance))
            .ok_or_else(|| {
                LedgerError::InvalidConfig(format!(
                    "{accounts} accounts of {initial_balance} overflow the ledger total"
                ))
            })?;

        Ok(Self {
            balances: vec![initial_balance; accounts],
        })
    }

    /// Validates `request` against the current balances and applies it if valid.
    ///
    /// A request is applied iff `source != destination`, `amount > 0` and the source
    /// holds at least `amount`. Rejected requests leave the ledger untouched.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range. Callers going through a
    /// [`crate::application::actor::LedgerHandle`] are checked before enqueue.
    pub fn apply(&mut self, request: &TransferRequest) -> TransferOutcome {
        let TransferRequest {
            source,
            destination,
            amount,
        } = *request;
        assert!(
            source < self.balances.len() && destination < self.balances.len(),
            "transfer {request} addresses an account outside 0..{}",
            self.balances.len()
        );

        if source == destination {
            return TransferOutcome::SameAccount;
        }
        if amount <= 0 {
            return TransferOutcome::NonPositiveAmount;
        }
        if self.balances[source] < amount {
            return TransferOutcome::InsufficientFunds;
        }

        self.balances[source] -= amount;
        self.balances[destination] += amount;
        TransferOutcome::Applied
    }

    pub fn balance(&self, index: usize) -> Option<i64> {
        self.balances.get(index).copied()
    }

    pub fn balances(&self) -> &[i64] {
        &self.balances
    }

    pub fn into_balances(self) -> Vec<i64> {
        self.balances
    }

    /// Sum of all balances.
    pub fn total_balance(&self) -> i64 {
        self.balances.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Returns an error naming the first index in `request` that falls outside the ledger.
    pub fn check_indices(accounts: usize, request: &TransferRequest) -> Result<()> {
        [request.source, request.destination]
            .into_iter()
            .find(|index| *index >= accounts)
            .map_or(Ok(()), |index| {
                Err(LedgerError::AccountOutOfRange { index, accounts })
            })
    }
}
