// Library root
// -----------
// This crate exposes the library surface of `emailctl`, a command line
// client for the Postfix REST Server. The binary (`main.rs`) parses the
// command line and hands the parsed command to `commands`.
//
// Module responsibilities:
// - `validate`: mailbox syntax checks run before any request is sent.
// - `services`: typed domain/account/alias/BCC/auth operations, including
//   the compound alias operations.
// - `client`: builds every service on top of one shared transport.
// - `transport`: the HTTP client and the `Transport` seam the services use.
// - `config`: configuration file and credential cache.
// - `cli`, `commands`, `prompt`: argument parsing, command execution and
//   output, terminal password prompts.
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod prompt;
pub mod services;
pub mod transport;
pub mod validate;
pub mod version;

#[cfg(test)]
pub(crate) mod test_utils;

pub use client::Client;
pub use error::{Error, Result};
