pub mod backup;
pub mod error;
pub mod local;
pub mod remote;
pub mod sync;

pub use error::StoreError;
