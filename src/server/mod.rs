pub mod database;
pub mod connection;
pub mod config;
pub mod error;
pub mod catalog;
pub mod projects;
pub mod export;
pub mod uploads;
pub mod collaboration;
pub mod routes;
