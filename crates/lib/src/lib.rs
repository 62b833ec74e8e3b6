//! pushgate core library: config, the push gateway, the delivery queue and
//! dispatcher, and host messengers. Used by the CLI.

pub mod config;
pub mod delivery;
pub mod gateway;
pub mod messengers;
pub mod recipient;
