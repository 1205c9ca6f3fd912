//! Port traits implemented by adapters.

pub mod quote_port;
pub mod config_port;
