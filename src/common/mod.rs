pub mod design_command;
pub mod models;
