//! Infrastructure adapters: filesystem, DNS, and process concerns wired
//! behind the application layer's ports.

mod bot_store;
mod config_loader;
mod logging;
mod reload_signal;
mod reverse_dns;
mod tailer;

pub use bot_store::FileBotStore;
pub use config_loader::load_config_tables;
pub use logging::RotatingFileWriter;
pub use reload_signal::PidFileReloadSignal;
pub use reverse_dns::FcrdnsVerifier;
pub use tailer::InodeTailer;
