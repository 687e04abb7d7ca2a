// src/config/mod.rs
//! Run configuration (TOML) and oracle configuration (JSON).

pub mod oracle;
pub mod run;

pub use oracle::OracleConfig;
pub use run::RunConfig;
