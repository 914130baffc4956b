//! Domain types: the account ledger, transfer requests and their outcomes.

pub mod ledger;
pub mod ports;
pub mod transfer;
