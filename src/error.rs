use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Account index {index} is out of range for a ledger of {accounts} accounts")]
    AccountOutOfRange { index: usize, accounts: usize },
    #[error("Ledger actor is stopped and no longer accepts requests")]
    ActorStopped,
    #[error("Ledger actor terminated abnormally: {0}")]
    ActorPanicked(String),
    #[error("Transfer producer terminated abnormally: {0}")]
    ProducerPanicked(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
