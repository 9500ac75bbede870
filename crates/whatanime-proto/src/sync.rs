//! Background polling of the backend.
//!
//! The loop owns only its timer and the polls in flight. Classified results
//! go out over an mpsc channel as [`SyncMessage`]s; the UI shell is the only
//! writer of [`crate::state::PollState`].
//!
//! Phases: `Idle` (nothing in flight, nothing scheduled), `Polling` (at least
//! one request in flight), `Scheduled` (waiting for the next automatic poll).
//! A manual refresh runs alongside the automatic chain and never resets its
//! timer.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backend::{Backend, BackendError};
use crate::protocol::{classify, ClassifyError, PlaybackUpdate, RawUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Polling,
    Scheduled,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCommand {
    /// Issue one extra forced poll right away.
    Refresh,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncMessage {
    /// A classified poll result. `seq` grows with every poll issued, so the
    /// receiver can drop responses that arrive out of order.
    Update { seq: u64, update: PlaybackUpdate },
    /// The backend sent an unrecognized sentinel. The loop has stopped.
    Fatal(ClassifyError),
}

/// Cloneable control surface for a running [`SyncLoop`].
#[derive(Clone)]
pub struct SyncHandle {
    commands: mpsc::UnboundedSender<SyncCommand>,
    cancel: CancellationToken,
    phase: watch::Receiver<SyncPhase>,
}

impl SyncHandle {
    /// Request a forced poll (used after a binding is confirmed).
    pub fn refresh(&self) {
        if self.commands.send(SyncCommand::Refresh).is_err() {
            debug!("[sync] refresh requested after loop exit");
        }
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled() || *self.phase.borrow() == SyncPhase::Stopped
    }

    pub fn phase(&self) -> SyncPhase {
        *self.phase.borrow()
    }
}

struct PollOutcome {
    seq: u64,
    /// Part of the automatic chain; its completion schedules the next poll.
    scheduled: bool,
    result: Result<RawUpdate, BackendError>,
}

pub struct SyncLoop<B> {
    backend: Arc<B>,
    interval: Duration,
    tx: mpsc::Sender<SyncMessage>,
    commands: mpsc::UnboundedReceiver<SyncCommand>,
    cancel: CancellationToken,
    phase: watch::Sender<SyncPhase>,
    next_seq: u64,
}

impl<B: Backend> SyncLoop<B> {
    pub fn new(
        backend: Arc<B>,
        interval: Duration,
        tx: mpsc::Sender<SyncMessage>,
    ) -> (Self, SyncHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (phase_tx, phase_rx) = watch::channel(SyncPhase::Idle);
        let cancel = CancellationToken::new();
        let handle = SyncHandle {
            commands: cmd_tx,
            cancel: cancel.clone(),
            phase: phase_rx,
        };
        let sync = Self {
            backend,
            interval,
            tx,
            commands: cmd_rx,
            cancel,
            phase: phase_tx,
            next_seq: 0,
        };
        (sync, handle)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    fn start_poll(&mut self, force: bool, scheduled: bool) -> BoxFuture<'static, PollOutcome> {
        self.next_seq += 1;
        let seq = self.next_seq;
        let backend = Arc::clone(&self.backend);
        debug!("[sync] poll #{} force={} scheduled={}", seq, force, scheduled);
        Box::pin(async move {
            let result = backend.poll(force).await;
            PollOutcome {
                seq,
                scheduled,
                result,
            }
        })
    }

    fn set_phase(&self, phase: SyncPhase) {
        self.phase.send_replace(phase);
    }

    pub async fn run(mut self) {
        info!("[sync] started, interval {:?}", self.interval);
        let mut in_flight: FuturesUnordered<BoxFuture<'static, PollOutcome>> =
            FuturesUnordered::new();

        let timer = tokio::time::sleep(self.interval);
        tokio::pin!(timer);
        let mut scheduled = false;

        // The first poll asks the backend to re-resolve and starts the chain.
        in_flight.push(self.start_poll(true, true));
        self.set_phase(SyncPhase::Polling);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("[sync] stopped ({} poll(s) abandoned)", in_flight.len());
                    break;
                }

                () = &mut timer, if scheduled => {
                    scheduled = false;
                    in_flight.push(self.start_poll(false, true));
                }

                Some(cmd) = self.commands.recv() => match cmd {
                    SyncCommand::Refresh => {
                        in_flight.push(self.start_poll(true, false));
                    }
                },

                Some(outcome) = in_flight.next() => {
                    if !self.handle_outcome(outcome.seq, outcome.result).await {
                        break;
                    }
                    if outcome.scheduled {
                        timer.as_mut().reset(Instant::now() + self.interval);
                        scheduled = true;
                    }
                }
            }

            self.set_phase(if !in_flight.is_empty() {
                SyncPhase::Polling
            } else if scheduled {
                SyncPhase::Scheduled
            } else {
                SyncPhase::Idle
            });
        }

        self.set_phase(SyncPhase::Stopped);
        self.cancel.cancel();
    }

    /// Returns `false` when the loop must stop.
    async fn handle_outcome(&self, seq: u64, result: Result<RawUpdate, BackendError>) -> bool {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                // Same as no_updates: keep state, keep polling.
                warn!("[sync] poll #{} failed: {}", seq, e);
                return true;
            }
        };

        match classify(raw) {
            Ok(update) => {
                let login_required = matches!(update, PlaybackUpdate::LoginRequired);
                if !update.is_noop() {
                    debug!("[sync] poll #{} -> {}", seq, variant_name(&update));
                }
                if self
                    .tx
                    .send(SyncMessage::Update { seq, update })
                    .await
                    .is_err()
                {
                    debug!("[sync] receiver gone");
                    return false;
                }
                if login_required {
                    info!("[sync] login required, polling stopped");
                    return false;
                }
                true
            }
            Err(e) => {
                error!("[sync] poll #{}: {}", seq, e);
                let _ = self.tx.send(SyncMessage::Fatal(e)).await;
                false
            }
        }
    }
}

fn variant_name(update: &PlaybackUpdate) -> &'static str {
    match update {
        PlaybackUpdate::LoginRequired => "login_required",
        PlaybackUpdate::Unauthorized => "unauthorized",
        PlaybackUpdate::NotPlaying => "not_playing",
        PlaybackUpdate::NoUpdate => "no_updates",
        PlaybackUpdate::NewSong(_) => "new_song",
    }
}
