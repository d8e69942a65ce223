//! Per-monitor state and the debounce gate that suppresses alert storms.

use chrono::{DateTime, Duration, Utc};

/// Stable composite key for one monitor: (source index, monitor index).
/// Configuration is fixed for the process lifetime, so indices are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonitorKey {
    pub source: usize,
    pub monitor: usize,
}

/// Mutable per-monitor state, owned exclusively by the monitoring loop.
/// Created once per configured monitor, never persisted across restarts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorState {
    /// Whether the conditions held as of the previous cycle. Starts false,
    /// so a first cycle that satisfies the conditions is a rising edge.
    pub last_satisfied: bool,
    /// Wall-clock time of the last authorized dispatch. Monotonically
    /// non-decreasing once set.
    pub last_alert_time: Option<DateTime<Utc>>,
}

/// Gate a rising edge against the monitor's debounce window.
///
/// Without a window every rising edge dispatches. With a window the edge
/// dispatches only if no alert was ever recorded or strictly more than
/// `window` has elapsed since the last one. `last_alert_time` is recorded
/// only when the dispatch is authorized: a suppressed edge does not push the
/// window forward, so a sustained flapping condition cannot suppress alerts
/// forever.
pub fn should_dispatch(
    state: &mut MonitorState,
    now: DateTime<Utc>,
    window: Option<Duration>,
) -> bool {
    let authorized = match (window, state.last_alert_time) {
        (None, _) => true,
        (Some(_), None) => true,
        (Some(window), Some(last)) => now - last > window,
    };
    if authorized {
        state.last_alert_time = Some(now);
    }
    authorized
}
