//! Application layer: the ledger actor and the simulation that drives it.
//!
//! [`actor::LedgerActor`] owns the ledger inside a single tokio task and serves
//! transfer requests from an unbounded channel, one at a time. [`simulation`] spawns
//! concurrent producers that submit random transfers through [`actor::LedgerHandle`].

pub mod actor;
pub mod simulation;
