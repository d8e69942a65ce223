//! sheetwatch - watch spreadsheet ranges and alert over SMS on threshold
//! transitions.
//!
//! The core is the stateful monitoring loop in [`watch`]: it polls every
//! configured source on a fixed interval, evaluates threshold conditions
//! against the flattened range values, and dispatches SMS alerts on rising
//! edges, gated by an optional per-monitor debounce window. Spreadsheet
//! access and the SMS transport sit behind the narrow [`sheets::SheetClient`]
//! and [`dispatch::SmsTransport`] traits.

pub mod condition;
pub mod config;
pub mod debounce;
pub mod dispatch;
pub mod error;
pub mod sheets;
pub mod sms;
pub mod value;
pub mod watch;

pub use condition::{evaluate, Condition, ConditionOp};
pub use config::{AlertRule, Config, MonitorConfig, Receivers, SourceConfig};
pub use debounce::{should_dispatch, MonitorKey, MonitorState};
pub use dispatch::{render_template, AlertDispatcher, SendResult, SmsTransport};
pub use error::{ConfigError, EvaluateError, FetchError, ParseError, TransportError};
pub use sheets::{GoogleSheetsClient, SheetClient, SheetsConfig};
pub use sms::{VonageConfig, VonageSms};
pub use value::{normalize, CellNode};
pub use watch::{SweepReport, Watcher};
