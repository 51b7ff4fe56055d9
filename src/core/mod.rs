//! Configuration, errors, logging and process helpers

pub mod config;
pub mod error;
pub mod logging;
pub mod process;

pub use config::Config;
pub use error::{ConfigError, CookieWriteError};
pub use logging::init_logger;
