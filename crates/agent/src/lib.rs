pub mod cli;
pub mod config;
pub mod session;

pub const APP_NAME: &str = "warden-agent";
