#![deny(warnings)]
pub mod config;
pub mod logging;
pub mod report;
pub mod runner;
