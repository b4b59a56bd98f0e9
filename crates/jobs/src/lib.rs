//! The background daemon loop and its reload-cooldown bookkeeping.

mod daemon;
mod reload_controller;

pub use daemon::AutofilterDaemon;
pub use reload_controller::ReloadController;
