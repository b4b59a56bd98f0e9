mod detect_window;

pub use detect_window::{DetectWindowUseCase, DetectionOutcome};
