use std::fmt;

use shared::error::ValidationError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Why a controller call did not commit. By the time a caller sees one of
/// these, any optimistic edit has already been undone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error(transparent)]
    ValidationFailed(#[from] ValidationError),
    #[error("{kind} failed: {message}")]
    RemoteOperationFailed {
        kind: MutationKind,
        id: Option<String>,
        message: String,
    },
    #[error("reload failed: {message}")]
    LoadFailed { message: String },
}

impl MutationError {
    pub(crate) fn remote(kind: MutationKind, id: Option<String>, err: &anyhow::Error) -> Self {
        Self::RemoteOperationFailed {
            kind,
            id,
            message: format!("{err:#}"),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailed(_))
    }

    /// The bare message a view shows next to the list.
    pub fn message(&self) -> String {
        match self {
            Self::ValidationFailed(err) => err.to_string(),
            Self::RemoteOperationFailed { message, .. } | Self::LoadFailed { message } => {
                message.clone()
            }
        }
    }
}
