//! Application layer: ports the daemon depends on, and the detection use
//! case expressed purely against those ports and the domain types.

pub mod ports;
pub mod use_cases;

pub use ports::{BotStorePort, LogSource, ReloadSignalPort, ReverseDnsOutcome, ReverseDnsPort};
pub use use_cases::{DetectWindowUseCase, DetectionOutcome};
