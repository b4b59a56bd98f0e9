mod bot_store;
mod log_source;
mod reload_signal;
mod reverse_dns;

pub use bot_store::BotStorePort;
pub use log_source::LogSource;
pub use reload_signal::ReloadSignalPort;
pub use reverse_dns::{ReverseDnsOutcome, ReverseDnsPort};
