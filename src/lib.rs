pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod fmt;
pub mod harvest;
pub mod logging;
pub mod report;
pub mod schedule;
pub mod utils;
