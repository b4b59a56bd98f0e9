//! Autofilter domain layer
//!
//! Pure types and pure algorithms: no filesystem, network, or process
//! access. Everything here operates on values already in memory so it can
//! be exercised directly in unit tests.

pub mod bot;
pub mod config;
pub mod errors;
pub mod log_line;
pub mod threshold;
pub mod window;

pub use bot::{BotRecord, BotSet};
pub use config::{ConfigTables, DEFAULT_REQUEST_LIMIT, DEFAULT_BLOCK_SECS, DEFAULT_ONE_URI_LIMIT};
pub use errors::AutofilterError;
pub use log_line::{LogLine, LINE_FIELD_COUNT};
pub use threshold::{Entity, ThresholdKind, ThresholdResolver, ThresholdTable, UNLIMITED};
pub use window::CountsWindow;
