pub mod config;
pub mod error;
pub mod models;
pub mod pages;
pub mod services;
pub mod utils;
