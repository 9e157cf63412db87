//! # Export Module
//!
//! PDF download of a note and time-limited public share links.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;


pub use routes::export_routes;
