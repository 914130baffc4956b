use crate::domain::ledger::Ledger;
use crate::domain::ports::Transfers;
use crate::domain::transfer::{TransferOutcome, TransferRequest};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle of the ledger actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    /// Accepting and processing requests.
    Running,
    /// Shutdown requested; already queued requests are still being processed.
    Draining,
    /// The processing loop has exited.
    Stopped,
}

/// Counters kept by the actor while it processes transfers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActorStats {
    pub processed: u64,
    pub applied: u64,
    pub rejected: u64,
}

impl ActorStats {
    fn record(&mut self, outcome: TransferOutcome) {
        self.processed += 1;
        if outcome.is_applied() {
            self.applied += 1;
        } else {
            self.rejected += 1;
        }
    }
}

/// A transfer paired with the channel its outcome is reported on.
struct WorkItem {
    request: TransferRequest,
    completion: oneshot::Sender<bool>,
}

enum Command {
    Transfer(WorkItem),
    TotalBalance(oneshot::Sender<i64>),
    Snapshot(oneshot::Sender<Vec<i64>>),
    Shutdown,
}

/// Resolves to the outcome of one submitted transfer.
///
/// Returned by [`LedgerHandle::submit`]. Yields `Ok(true)` if the transfer was
/// applied, `Ok(false)` if the ledger rejected it, and [`LedgerError::ActorStopped`]
/// if the actor went away without answering.
#[derive(Debug)]
#[must_use = "a completion does nothing unless awaited"]
pub struct Completion {
    rx: oneshot::Receiver<bool>,
}

impl Future for Completion {
    type Output = Result<bool>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| LedgerError::ActorStopped))
    }
}

/// Cloneable entry point to a running [`LedgerActor`].
///
/// Every producer holds its own clone. Requests from all clones land in the same
/// unbounded inbox and are applied in the order the actor receives them.
#[derive(Clone)]
pub struct LedgerHandle {
    inbox: mpsc::UnboundedSender<Command>,
    state: Arc<watch::Sender<ActorState>>,
    accounts: usize,
}

impl LedgerHandle {
    /// Enqueues a transfer and returns immediately.
    ///
    /// Fails with [`LedgerError::ActorStopped`] once shutdown was requested, and with
    /// [`LedgerError::AccountOutOfRange`] if the request names an account the ledger
    /// does not have. Any other request is accepted, including ones the ledger will
    /// reject.
    pub fn submit(&self, request: TransferRequest) -> Result<Completion> {
        if self.state() != ActorState::Running {
            warn!(%request, "transfer submitted after shutdown");
            return Err(LedgerError::ActorStopped);
        }
        Ledger::check_indices(self.accounts, &request)
            .inspect_err(|e| warn!(%request, error = %e, "malformed transfer"))?;

        let (completion, rx) = oneshot::channel();
        self.inbox
            .send(Command::Transfer(WorkItem {
                request,
                completion,
            }))
            .map_err(|_| LedgerError::ActorStopped)?;

        Ok(Completion { rx })
    }

    /// Submits a transfer and waits for its outcome.
    pub async fn transfer(&self, request: TransferRequest) -> Result<bool> {
        self.submit(request)?.await
    }

    /// Sum of all balances, evaluated by the actor after every request queued ahead of
    /// this query.
    pub async fn total_balance(&self) -> Result<i64> {
        self.ask(Command::TotalBalance).await
    }

    /// Point-in-time copy of every balance.
    pub async fn snapshot(&self) -> Result<Vec<i64>> {
        self.ask(Command::Snapshot).await
    }

    pub fn state(&self) -> ActorState {
        *self.state.borrow()
    }

    pub fn accounts(&self) -> usize {
        self.accounts
    }

    /// Stops accepting requests and waits until everything already queued is processed.
    ///
    /// Safe to call more than once and from several clones; later calls just wait for
    /// the actor to stop.
    pub async fn shutdown(&self) -> Result<()> {
        let initiated = self.state.send_if_modified(|state| {
            if *state == ActorState::Running {
                *state = ActorState::Draining;
                true
            } else {
                false
            }
        });
        if initiated {
            info!("ledger actor draining");
            // The actor may already be gone, in which case the state is Stopped.
            let _ = self.inbox.send(Command::Shutdown);
        }

        let mut state = self.state.subscribe();
        state
            .wait_for(|state| *state == ActorState::Stopped)
            .await
            .map_err(|_| LedgerError::ActorStopped)?;
        Ok(())
    }

    async fn ask<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.inbox
            .send(command(tx))
            .map_err(|_| LedgerError::ActorStopped)?;
        rx.await.map_err(|_| LedgerError::ActorStopped)
    }
}

#[async_trait]
impl Transfers for LedgerHandle {
    async fn transfer(&self, request: TransferRequest) -> Result<bool> {
        self.submit(request)?.await
    }
}

/// The ledger and counters handed back once the actor has drained.
#[derive(Debug)]
pub struct Drained {
    pub ledger: Ledger,
    pub stats: ActorStats,
}

/// Owner of the single task that serializes every mutation of a [`Ledger`].
pub struct LedgerActor {
    handle: LedgerHandle,
    task: JoinHandle<Drained>,
}

impl LedgerActor {
    /// Moves `ledger` into a new task on the current tokio runtime.
    pub fn spawn(ledger: Ledger) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(watch::Sender::new(ActorState::Running));
        let accounts = ledger.len();

        let worker = Worker {
            ledger,
            inbox: rx,
            stats: ActorStats::default(),
        };
        let task = tokio::spawn(worker.run(StopOnDrop(state.clone())));

        Self {
            handle: LedgerHandle {
                inbox: tx,
                state,
                accounts,
            },
            task,
        }
    }

    pub fn handle(&self) -> LedgerHandle {
        self.handle.clone()
    }

    /// Drains the actor and returns the final ledger.
    pub async fn shutdown(self) -> Result<Drained> {
        self.handle.shutdown().await?;
        self.task
            .await
            .map_err(|e| LedgerError::ActorPanicked(e.to_string()))
    }
}

/// Publishes `Stopped` when the worker exits, even by unwinding.
struct StopOnDrop(Arc<watch::Sender<ActorState>>);

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.0.send_replace(ActorState::Stopped);
    }
}

struct Worker {
    ledger: Ledger,
    inbox: mpsc::UnboundedReceiver<Command>,
    stats: ActorStats,
}

impl Worker {
    async fn run(mut self, _stop: StopOnDrop) -> Drained {
        info!(
            accounts = self.ledger.len(),
            total = self.ledger.total_balance(),
            "ledger actor started"
        );

        while let Some(command) = self.inbox.recv().await {
            match command {
                Command::Transfer(item) => self.process(item),
                Command::TotalBalance(reply) => {
                    let _ = reply.send(self.ledger.total_balance());
                }
                Command::Snapshot(reply) => {
                    let _ = reply.send(self.ledger.balances().to_vec());
                }
                // Closing keeps already queued commands receivable; recv() yields
                // None once they are consumed.
                Command::Shutdown => self.inbox.close(),
            }
        }

        info!(
            processed = self.stats.processed,
            applied = self.stats.applied,
            rejected = self.stats.rejected,
            total = self.ledger.total_balance(),
            "ledger actor stopped"
        );
        Drained {
            ledger: self.ledger,
            stats: self.stats,
        }
    }

    fn process(&mut self, item: WorkItem) {
        let WorkItem {
            request,
            completion,
        } = item;
        let outcome = self.ledger.apply(&request);
        self.stats.record(outcome);
        debug!(
            source = request.source,
            destination = request.destination,
            amount = request.amount,
            ?outcome,
            "transfer processed"
        );
        // The submitter may have stopped waiting.
        let _ = completion.send(outcome.is_applied());
    }
}
