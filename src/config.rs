use crate::error::{LedgerError, Result};

pub const DEFAULT_ACCOUNTS: usize = 1_000;
pub const DEFAULT_OPERATIONS: usize = 100_000;
pub const DEFAULT_INITIAL_BALANCE: i64 = 1_000;
pub const DEFAULT_MIN_AMOUNT: i64 = 1;
pub const DEFAULT_MAX_AMOUNT: i64 = 50;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Parameters of a transfer simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Number of accounts in the ledger.
    pub accounts: usize,
    /// Number of concurrent producers, each trying to land one transfer.
    pub operations: usize,
    /// Starting balance of every account.
    pub initial_balance: i64,
    /// Smallest generated amount (inclusive).
    pub min_amount: i64,
    /// Largest generated amount (exclusive).
    pub max_amount: i64,
    /// Attempts per producer before it gives up.
    pub max_attempts: u32,
    /// Seed for reproducible request streams. Entropy is used when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            accounts: DEFAULT_ACCOUNTS,
            operations: DEFAULT_OPERATIONS,
            initial_balance: DEFAULT_INITIAL_BALANCE,
            min_amount: DEFAULT_MIN_AMOUNT,
            max_amount: DEFAULT_MAX_AMOUNT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.accounts < 2 {
            return Err(LedgerError::InvalidConfig(format!(
                "at least 2 accounts are needed to pick distinct pairs, got {}",
                self.accounts
            )));
        }
        if self.initial_balance < 0 {
            return Err(LedgerError::InvalidConfig(format!(
                "initial balance must not be negative, got {}",
                self.initial_balance
            )));
        }
        if self.min_amount >= self.max_amount {
            return Err(LedgerError::InvalidConfig(format!(
                "amount range [{}, {}) is empty",
                self.min_amount, self.max_amount
            )));
        }
        if self.max_attempts == 0 {
            return Err(LedgerError::InvalidConfig(
                "max attempts must be at least 1".to_string(),
            ));
        }
        self.initial_total().map(|_| ())
    }

    /// Sum of all starting balances.
    pub fn initial_total(&self) -> Result<i64> {
        i64::try_from(self.accounts)
            .ok()
            .and_then(|n| n.checked_mul(self.initial_balance))
            .ok_or_else(|| LedgerError::InvalidConfig("initial total overflows".to_string()))
    }
}
