pub mod api;
pub mod auth;
pub mod backend;
pub mod cli;
