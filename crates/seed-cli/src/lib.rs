#![deny(unsafe_code)]

//! Library side of the `seed` binary: arguments, configuration, logging
//! and the command implementations.

pub mod cli;
pub mod commands;
pub mod config;
pub mod input;
pub mod logging;
