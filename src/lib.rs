pub mod api;
pub mod catalog;
pub mod config;
pub mod consts;
pub mod error;
pub mod preset;
pub mod scheduler;
pub mod simulation;
pub mod stats;
// cmd and reports are binary modules (see main.rs).
