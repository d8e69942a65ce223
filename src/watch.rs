//! The monitoring loop: polls every source on a fixed interval, evaluates
//! conditions, detects rising edges and drives the debounce gate and the
//! alert dispatcher.

use crate::condition::evaluate;
use crate::config::{Config, SourceConfig};
use crate::debounce::{should_dispatch, MonitorKey, MonitorState};
use crate::dispatch::{AlertDispatcher, SendResult, SmsTransport};
use crate::sheets::SheetClient;
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of one full sweep across all sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub sources: usize,
    pub monitors_evaluated: usize,
    pub fetch_failures: usize,
    pub auth_failures: usize,
    pub alerts_sent: usize,
}

/// Top-level scheduler. Owns the config snapshot and the keyed per-monitor
/// state; the state map is populated for every configured monitor up front
/// and its size never changes afterwards.
pub struct Watcher<C, T> {
    sources: Vec<SourceConfig>,
    interval: Duration,
    client: C,
    dispatcher: AlertDispatcher<T>,
    states: HashMap<MonitorKey, MonitorState>,
}

impl<C: SheetClient, T: SmsTransport> Watcher<C, T> {
    pub fn new(config: &Config, client: C, dispatcher: AlertDispatcher<T>) -> Self {
        let mut states = HashMap::new();
        for (source, source_config) in config.spreadsheets.iter().enumerate() {
            for monitor in 0..source_config.monitors.len() {
                states.insert(MonitorKey { source, monitor }, MonitorState::default());
            }
        }
        Self {
            sources: config.spreadsheets.clone(),
            interval: Duration::from_secs(config.interval),
            client,
            dispatcher,
            states,
        }
    }

    /// Current state of one monitor, for inspection in tests and logs.
    pub fn state(&self, key: MonitorKey) -> Option<&MonitorState> {
        self.states.get(&key)
    }

    /// Run sweeps until `shutdown` resolves. The inter-cycle sleep races the
    /// shutdown future, so shutdown is honored promptly instead of after a
    /// full sleep. Auth rejection for every source on the first sweep is
    /// fatal; later auth failures are logged and retried like any fetch
    /// failure.
    pub async fn run<F: Future>(&mut self, shutdown: F) -> Result<()> {
        info!(
            sources = self.sources.len(),
            monitors = self.states.len(),
            interval_secs = self.interval.as_secs(),
            "starting monitoring loop"
        );

        let mut shutdown = std::pin::pin!(shutdown);
        let mut first_sweep = true;

        loop {
            let report = self.sweep(Utc::now()).await;
            debug!(
                fetch_failures = report.fetch_failures,
                alerts_sent = report.alerts_sent,
                "sweep complete"
            );

            if first_sweep {
                first_sweep = false;
                if report.sources > 0 && report.auth_failures == report.sources {
                    bail!("authentication rejected for every configured source; check credentials");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    info!("shutdown requested, stopping monitoring loop");
                    break;
                }
            }
        }

        Ok(())
    }

    /// One full polling cycle across all sources. Never aborts early: fetch
    /// and evaluation failures are logged at their own granularity and the
    /// sweep always completes.
    pub async fn sweep(&mut self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport {
            sources: self.sources.len(),
            ..SweepReport::default()
        };

        for source_index in 0..self.sources.len() {
            let source = &self.sources[source_index];
            let ranges: Vec<String> = source.monitors.iter().map(|m| m.range.clone()).collect();

            let value_sets = match self
                .client
                .batch_fetch(&source.spreadsheet_id, &source.worksheet_id, &ranges)
                .await
            {
                Ok(sets) => sets,
                Err(error) => {
                    report.fetch_failures += 1;
                    if error.is_auth() {
                        report.auth_failures += 1;
                    }
                    // previous state is retained for all of this source's monitors
                    warn!(
                        spreadsheet = %source.spreadsheet_id,
                        worksheet = %source.worksheet_id,
                        retriable = error.is_retriable(),
                        error = %error,
                        "fetch failed, skipping this source for the cycle"
                    );
                    continue;
                }
            };

            if value_sets.len() != source.monitors.len() {
                report.fetch_failures += 1;
                warn!(
                    spreadsheet = %source.spreadsheet_id,
                    expected = source.monitors.len(),
                    got = value_sets.len(),
                    "value range count mismatch, skipping this source for the cycle"
                );
                continue;
            }

            for (monitor_index, monitor) in source.monitors.iter().enumerate() {
                let key = MonitorKey {
                    source: source_index,
                    monitor: monitor_index,
                };
                let values = value_sets[monitor_index].flatten();
                report.monitors_evaluated += 1;

                // fail-safe: an evaluation error never alerts and never
                // stops the sweep
                let satisfied = match evaluate(&monitor.conditions, &values) {
                    Ok(satisfied) => satisfied,
                    Err(error) => {
                        warn!(
                            spreadsheet = %source.spreadsheet_id,
                            range = %monitor.range,
                            error = %error,
                            "evaluation failed, treating monitor as unsatisfied"
                        );
                        false
                    }
                };

                let state = self.states.entry(key).or_default();
                let rising_edge = satisfied && !state.last_satisfied;

                if rising_edge {
                    match &monitor.sms {
                        Some(rule) => {
                            if should_dispatch(state, now, monitor.debounce_window()) {
                                let results =
                                    self.dispatcher.dispatch(rule, &values, &monitor.range).await;
                                report.alerts_sent += results
                                    .iter()
                                    .filter(|(_, result)| *result == SendResult::Sent)
                                    .count();
                            } else {
                                debug!(
                                    spreadsheet = %source.spreadsheet_id,
                                    range = %monitor.range,
                                    "rising edge suppressed by debounce window"
                                );
                            }
                        }
                        None => {
                            debug!(
                                spreadsheet = %source.spreadsheet_id,
                                range = %monitor.range,
                                "rising edge with no alert rule configured"
                            );
                        }
                    }
                }

                state.last_satisfied = satisfied;
            }
        }

        report
    }
}
