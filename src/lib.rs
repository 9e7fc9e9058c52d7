pub mod backup;
pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod notify;
pub mod scheduler;
pub mod snapshot;
pub mod types;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{BackuperError, Result};
pub use types::RunMode;
