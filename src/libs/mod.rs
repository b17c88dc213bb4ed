pub mod celo;
pub mod config;
pub mod writing;
