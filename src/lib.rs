// Public API for integration tests and potential library usage

pub mod acronym;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod protocol;
pub mod room;
pub mod roster;
pub mod server;
pub mod state;
pub mod timer;
pub mod types;
pub mod ws;
