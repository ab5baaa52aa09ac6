#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod graph;
pub mod load;
pub mod pipeline;
pub mod report;
pub mod util;
