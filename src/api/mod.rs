//! API module - HTTP routes

pub mod routes;
