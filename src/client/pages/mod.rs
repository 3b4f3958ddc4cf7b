//! Screen view-models. Each page owns its view state, loads through the
//! shared `ApiClient` and keeps the last error as inline text.

pub mod collaboration;
pub mod design_studio;
pub mod export;
pub mod material_library;
pub mod projects;
pub mod settings;
pub mod standards;
pub mod tutorials;
