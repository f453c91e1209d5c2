//! CLI subcommand implementations.

pub mod account;
pub mod cache;
pub mod crypto;
pub mod historical;
pub mod market;
pub mod refdata;
pub mod stock;
