pub mod config;
pub mod error;
pub mod types;

pub use config::ChatgateConfig;
pub use error::{ChatgateError, Result};
pub use types::*;
