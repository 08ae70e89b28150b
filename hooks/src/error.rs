use story_schematics_core::ApiError;

/// Errors returned by the query and pagination drivers.
#[derive(Debug, thiserror::Error)]
pub enum HooksError {
    /// The query is missing what it needs to run (a token, an id or slug).
    #[error("query {key} is disabled")]
    Disabled { key: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl HooksError {
    /// The underlying API error, if the request was issued.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            HooksError::Api(err) => Some(err),
            HooksError::Disabled { .. } => None,
        }
    }
}
