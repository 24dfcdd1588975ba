//! Library crate for specter: drives nmap, masscan and EyeWitness and turns
//! masscan XML reports into per-port and per-host target lists.
pub mod commands;
pub mod config;
pub mod decompose;
pub mod error;
pub mod logging;
pub mod output;
pub mod ports;
pub mod runner;
pub mod types;
pub mod workdir;
