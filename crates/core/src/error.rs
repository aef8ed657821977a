#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A catalog entity (notification, channel, user) does not exist.
    ///
    /// Catalog entities are addressed by their unique `name` rather than a
    /// numeric id, so the lookup key is carried as a string.
    #[error("Entity not found: {entity} '{name}'")]
    NotFound { entity: &'static str, name: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Deleting an entity that is still referenced by other rows.
    #[error("Protected reference: {0}")]
    ProtectedReference(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] with an owned name.
    pub fn not_found(entity: &'static str, name: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            name: name.into(),
        }
    }
}
