use serde::Serialize;

/// Connectivity record owned by `ApiClient`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiStatus {
    pub is_loading: bool,
    pub is_error: bool,
    pub error_message: Option<String>,
    pub is_connected: bool,
}

impl ApiStatus {
    /// State while a health probe is in flight.
    pub fn checking() -> Self {
        Self { is_loading: true, ..Self::default() }
    }

    pub fn connected() -> Self {
        Self { is_connected: true, ..Self::default() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }
}
