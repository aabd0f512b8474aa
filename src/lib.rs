pub mod admin;
pub mod api;
pub mod booking;
pub mod cli;
pub mod config;
pub mod mirror;
pub mod models;
