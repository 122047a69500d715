#![forbid(unsafe_code)]

//! Demo program for tcheck: a handful of simulated preflight checks shown in
//! a live terminal list.

pub mod checks;
pub mod cli;
pub mod logging;
