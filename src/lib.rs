pub mod cli;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod errors;
pub mod logging;
