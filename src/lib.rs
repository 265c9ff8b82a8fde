//! Aggregates a remote artist API into an in-memory, indexed dataset and
//! serves it over HTTP.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod geocode;
pub mod logging;
pub mod state;
pub mod store;
pub mod utils;
pub mod web;
