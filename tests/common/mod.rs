#![allow(dead_code)]

use ledger_actor::application::actor::LedgerActor;
use ledger_actor::domain::ledger::Ledger;
use ledger_actor::domain::transfer::TransferRequest;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn spawn_ledger(accounts: usize, balance: i64) -> LedgerActor {
    LedgerActor::spawn(Ledger::new(accounts, balance).unwrap())
}

/// Arbitrary requests, including same-account transfers and non-positive amounts.
pub fn arbitrary_requests(seed: u64, accounts: usize, count: usize) -> Vec<TransferRequest> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            TransferRequest::new(
                rng.gen_range(0..accounts),
                rng.gen_range(0..accounts),
                rng.gen_range(-10..200),
            )
        })
        .collect()
}
