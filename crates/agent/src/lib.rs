#![forbid(unsafe_code)]

//! Game account agent: remote client, status board and the run-loop supervisor.

pub mod client;
pub mod config;
pub mod credentials;
pub mod http;
pub mod logging;
pub mod shutdown;
pub mod status;
pub mod supervisor;

mod user_agent;
