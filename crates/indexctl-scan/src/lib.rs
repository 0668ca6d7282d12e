pub mod error;
pub mod extract;
pub mod language;
pub mod walk;

pub use error::ScanError;
pub use walk::{scan_tree, ScanFailure, ScanOutcome};
