use crate::application::actor::{ActorStats, LedgerActor};
use crate::config::SimulationConfig;
use crate::domain::ledger::Ledger;
use crate::domain::ports::Transfers;
use crate::domain::transfer::TransferRequest;
use crate::error::{LedgerError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Builds random transfers between distinct accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestGenerator {
    accounts: usize,
    min_amount: i64,
    max_amount: i64,
}

impl RequestGenerator {
    /// `accounts` must be at least 2 and `[min_amount, max_amount)` must be non-empty.
    pub fn new(accounts: usize, min_amount: i64, max_amount: i64) -> Result<Self> {
        if accounts < 2 {
            return Err(LedgerError::InvalidConfig(format!(
                "cannot pick distinct accounts out of {accounts}"
            )));
        }
        if min_amount >= max_amount {
            return Err(LedgerError::InvalidConfig(format!(
                "amount range [{min_amount}, {max_amount}) is empty"
            )));
        }
        Ok(Self {
            accounts,
            min_amount,
            max_amount,
        })
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        Self::new(config.accounts, config.min_amount, config.max_amount)
    }

    /// Two different indices drawn uniformly from `0..accounts`.
    pub fn pick_distinct_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> (usize, usize) {
        let source = rng.gen_range(0..self.accounts);
        loop {
            let destination = rng.gen_range(0..self.accounts);
            if destination != source {
                return (source, destination);
            }
        }
    }

    pub fn next_request<R: Rng + ?Sized>(&self, rng: &mut R) -> TransferRequest {
        let (source, destination) = self.pick_distinct_pair(rng);
        let amount = rng.gen_range(self.min_amount..self.max_amount);
        TransferRequest::new(source, destination, amount)
    }
}

/// How a producer's retry loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Succeeded { attempts: u32 },
    GaveUp { attempts: u32 },
}

impl Attempt {
    pub fn attempts(self) -> u32 {
        match self {
            Attempt::Succeeded { attempts } | Attempt::GaveUp { attempts } => attempts,
        }
    }

    pub fn succeeded(self) -> bool {
        matches!(self, Attempt::Succeeded { .. })
    }
}

/// Tries up to `max_attempts` freshly generated transfers, stopping at the first one
/// that is applied. Rejections are not errors; only faults from `transfers` are.
pub async fn transfer_with_retry<T, R>(
    transfers: &T,
    generator: &RequestGenerator,
    rng: &mut R,
    max_attempts: u32,
) -> Result<Attempt>
where
    T: Transfers + ?Sized,
    R: Rng + Send + ?Sized,
{
    for attempt in 1..=max_attempts {
        let request = generator.next_request(rng);
        if transfers.transfer(request).await? {
            return Ok(Attempt::Succeeded { attempts: attempt });
        }
        debug!(%request, attempt, "transfer rejected");
    }
    Ok(Attempt::GaveUp {
        attempts: max_attempts,
    })
}

/// Summary of a finished simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub accounts: usize,
    pub operations: usize,
    pub initial_total: i64,
    pub final_total: i64,
    pub succeeded: u64,
    pub gave_up: u64,
    pub attempts: u64,
    pub actor: ActorStats,
    #[serde(skip)]
    pub balances: Vec<i64>,
}

impl SimulationReport {
    pub fn is_conserved(&self) -> bool {
        self.initial_total == self.final_total
    }

    pub fn all_non_negative(&self) -> bool {
        self.balances.iter().all(|b| *b >= 0)
    }
}

/// Many concurrent producers hammering a single ledger actor.
pub struct Simulation {
    config: SimulationConfig,
    generator: RequestGenerator,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let generator = RequestGenerator::from_config(&config)?;
        Ok(Self { config, generator })
    }

    /// Runs every producer to completion, drains the actor and reports the final ledger.
    pub async fn run(&self) -> Result<SimulationReport> {
        let ledger = Ledger::new(self.config.accounts, self.config.initial_balance)?;
        let initial_total = ledger.total_balance();
        let actor = LedgerActor::spawn(ledger);

        let mut producers = JoinSet::new();
        for index in 0..self.config.operations {
            let handle = actor.handle();
            let generator = self.generator;
            let max_attempts = self.config.max_attempts;
            let mut rng = self.rng_for(index);
            producers.spawn(async move {
                transfer_with_retry(&handle, &generator, &mut rng, max_attempts).await
            });
        }

        let mut succeeded = 0u64;
        let mut gave_up = 0u64;
        let mut attempts = 0u64;
        while let Some(joined) = producers.join_next().await {
            let attempt = joined.map_err(|e| LedgerError::ProducerPanicked(e.to_string()))??;
            attempts += u64::from(attempt.attempts());
            if attempt.succeeded() {
                succeeded += 1;
            } else {
                gave_up += 1;
            }
        }

        let drained = actor.shutdown().await?;
        let report = SimulationReport {
            accounts: self.config.accounts,
            operations: self.config.operations,
            initial_total,
            final_total: drained.ledger.total_balance(),
            succeeded,
            gave_up,
            attempts,
            actor: drained.stats,
            balances: drained.ledger.into_balances(),
        };
        info!(
            succeeded = report.succeeded,
            gave_up = report.gave_up,
            attempts = report.attempts,
            final_total = report.final_total,
            "simulation finished"
        );
        Ok(report)
    }

    fn rng_for(&self, index: usize) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers from a fixed script and records every request it sees.
    struct Scripted {
        answers: Mutex<Vec<bool>>,
        seen: Mutex<Vec<TransferRequest>>,
    }

    impl Scripted {
        fn new(mut answers: Vec<bool>) -> Self {
            answers.reverse();
            Self {
                answers: Mutex::new(answers),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transfers for Scripted {
        async fn transfer(&self, request: TransferRequest) -> Result<bool> {
            self.seen.lock().unwrap().push(request);
            Ok(self.answers.lock().unwrap().pop().unwrap_or(false))
        }
    }

    struct Stopped;

    #[async_trait]
    impl Transfers for Stopped {
        async fn transfer(&self, _request: TransferRequest) -> Result<bool> {
            Err(LedgerError::ActorStopped)
        }
    }

    #[test]
    fn test_generator_picks_distinct_accounts_in_range() {
        let generator = RequestGenerator::new(3, 1, 50).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1_000 {
            let request = generator.next_request(&mut rng);
            assert_ne!(request.source, request.destination);
            assert!(request.source < 3 && request.destination < 3);
            assert!((1..50).contains(&request.amount));
        }
    }

    #[test]
    fn test_generator_with_two_accounts() {
        let generator = RequestGenerator::new(2, 1, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let (source, destination) = generator.pick_distinct_pair(&mut rng);
            assert_eq!(source + destination, 1);
        }
        assert_eq!(generator.next_request(&mut rng).amount, 1);
    }

    #[test]
    fn test_generator_rejects_degenerate_input() {
        assert!(RequestGenerator::new(1, 1, 50).is_err());
        assert!(RequestGenerator::new(10, 5, 5).is_err());
    }

    #[tokio::test]
    async fn test_retry_stops_at_first_success() {
        let transfers = Scripted::new(vec![false, true, true]);
        let generator = RequestGenerator::new(10, 1, 50).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let attempt = transfer_with_retry(&transfers, &generator, &mut rng, 3)
            .await
            .unwrap();
        assert_eq!(attempt, Attempt::Succeeded { attempts: 2 });

        let seen = transfers.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_silently() {
        let transfers = Scripted::new(vec![]);
        let generator = RequestGenerator::new(10, 1, 50).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let attempt = transfer_with_retry(&transfers, &generator, &mut rng, 3)
            .await
            .unwrap();
        assert_eq!(attempt, Attempt::GaveUp { attempts: 3 });
        assert!(!attempt.succeeded());
        assert_eq!(transfers.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_retry_propagates_faults() {
        let generator = RequestGenerator::new(10, 1, 50).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let result = transfer_with_retry(&Stopped, &generator, &mut rng, 3).await;
        assert!(matches!(result, Err(LedgerError::ActorStopped)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_simulation_conserves_total() {
        let simulation = Simulation::new(SimulationConfig {
            accounts: 20,
            operations: 2_000,
            initial_balance: 30,
            min_amount: 1,
            max_amount: 50,
            max_attempts: 3,
            seed: Some(11),
        })
        .unwrap();

        let report = simulation.run().await.unwrap();
        assert!(report.is_conserved());
        assert!(report.all_non_negative());
        assert_eq!(report.initial_total, 600);
        assert_eq!(report.balances.len(), 20);
        assert_eq!(report.succeeded + report.gave_up, 2_000);
        assert_eq!(report.attempts, report.actor.processed);
        assert_eq!(report.succeeded, report.actor.applied);
    }

    #[test]
    fn test_simulation_rejects_invalid_config() {
        let config = SimulationConfig {
            accounts: 0,
            ..Default::default()
        };
        assert!(matches!(
            Simulation::new(config),
            Err(LedgerError::InvalidConfig(_))
        ));
    }
}
