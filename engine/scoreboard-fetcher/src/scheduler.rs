use crate::orchestrator::{ScoreReport, ScoreboardService};
use chrono::{DateTime, Utc};
use scoreboard_core::ScoreboardError;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

/// Outcome of one refresh cycle
#[derive(Debug)]
pub enum PollEvent {
    /// Fresh report for the tracked teams
    Updated { report: ScoreReport, at: DateTime<Utc> },

    /// The cycle failed; the next tick is the retry
    Failed { error: ScoreboardError, at: DateTime<Utc> },
}

/// Handle to a running poller
pub struct PollerHandle {
    teams: watch::Sender<Vec<String>>,
    events: mpsc::Receiver<PollEvent>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Replace the tracked teams; any in-flight refresh is discarded and a new one starts
    pub fn set_teams(&self, teams: Vec<String>) {
        // The send only fails once the poller task has exited
        let _ = self.teams.send(teams);
    }

    /// Wait for the next cycle outcome
    pub async fn next_event(&mut self) -> Option<PollEvent> {
        self.events.recv().await
    }

    /// Stop polling
    pub fn stop(self) {
        self.task.abort();
    }
}

/// Refreshes scores for a tracked team list on a fixed interval
pub struct ScoreboardPoller {
    service: ScoreboardService,
    interval: Duration,
}

impl ScoreboardPoller {
    pub fn new(service: ScoreboardService, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Start polling in the background; the first cycle runs immediately
    pub fn spawn(self, teams: Vec<String>) -> PollerHandle {
        let (teams_tx, teams_rx) = watch::channel(teams);
        let (events_tx, events_rx) = mpsc::channel(16);
        let task = tokio::spawn(self.run(teams_rx, events_tx));
        PollerHandle { teams: teams_tx, events: events_rx, task }
    }

    async fn run(self, mut teams_rx: watch::Receiver<Vec<String>>, events: mpsc::Sender<PollEvent>) {
        info!("Starting scoreboard poller (every {:?})", self.interval);

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut run_now = false;

        loop {
            if !run_now {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = teams_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        ticker.reset();
                    }
                }
            }
            run_now = false;

            let teams = teams_rx.borrow_and_update().clone();

            tokio::select! {
                result = self.service.get_scores_and_ranks(&teams) => {
                    let at = Utc::now();
                    let event = match result {
                        Ok(report) => PollEvent::Updated { report, at },
                        Err(error) => {
                            warn!("Refresh for {} teams failed: {}", teams.len(), error);
                            PollEvent::Failed { error, at }
                        }
                    };
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
                changed = teams_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    info!("Tracked teams changed; discarding in-flight refresh");
                    ticker.reset();
                    run_now = true;
                }
            }
        }

        info!("Scoreboard poller stopped");
    }
}
