use super::transfer::TransferRequest;
use crate::error::Result;
use async_trait::async_trait;

/// Anything that can evaluate a transfer and report whether it was applied.
#[async_trait]
pub trait Transfers: Send + Sync {
    async fn transfer(&self, request: TransferRequest) -> Result<bool>;
}

pub type TransfersBox = Box<dyn Transfers>;
