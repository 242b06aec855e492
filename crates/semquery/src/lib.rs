#![forbid(unsafe_code)]

pub mod backend;
pub mod builder;
pub mod catalog;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod execution;
pub mod models;
pub mod panel;
pub mod selection;
pub mod utils;
pub mod validate;

pub use cli::app::{Cli, Command};
