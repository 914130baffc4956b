use std::fmt;

/// A request to move `amount` units from `source` to `destination`.
///
/// Requests are plain values and carry no validity guarantees: a requester may build
/// a same-account transfer or a non-positive amount. Only the ledger decides whether
/// a request is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub source: usize,
    pub destination: usize,
    pub amount: i64,
}

impl TransferRequest {
    pub fn new(source: usize, destination: usize, amount: i64) -> Self {
        Self {
            source,
            destination,
            amount,
        }
    }
}

impl fmt::Display for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.source, self.destination, self.amount)
    }
}

/// The result of evaluating a [`TransferRequest`] against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Applied,
    SameAccount,
    NonPositiveAmount,
    InsufficientFunds,
}

impl TransferOutcome {
    /// The boolean reported back to the submitter.
    pub fn is_applied(self) -> bool {
        self == TransferOutcome::Applied
    }
}
