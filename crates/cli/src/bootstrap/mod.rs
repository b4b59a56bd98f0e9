pub mod config;
pub mod logging;

pub use config::load_tables;
pub use logging::init_logging;
