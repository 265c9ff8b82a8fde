//! HTTP surface: HTML pages plus a small JSON API under `/api`.

mod coordinates;
pub mod error;
pub mod filter_form;
pub mod middleware;
mod pages;
pub mod render;
pub mod routes;
mod status;

pub use routes::*;
