//! Static descriptions of the three collections a list view can edit.

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    domain::{Note, Project, Record, Todo},
    error::ValidationError,
    protocol::{NewNote, NewProject, NewTodo},
};

/// How a collection forgets a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// The row is removed from the store.
    Hard,
    /// The row stays in the store with `deleted = true` and drops out of listings.
    Soft,
}

pub trait Resource: Send + Sync + 'static {
    type Record: Record;
    type Draft: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static;

    /// Path segment of the collection, e.g. `notes`.
    const COLLECTION: &'static str;
    /// Name of the editable text field on the wire.
    const TITLE_FIELD: &'static str;
    const DELETE_MODE: DeleteMode;

    fn draft(title: &str) -> Self::Draft;

    /// Trimmed copy of `draft`, or the first constraint it violates.
    fn validate_draft(draft: &Self::Draft) -> Result<Self::Draft, ValidationError>;
}

/// Trims `raw` and rejects it when nothing is left.
pub fn validate_title(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_string())
}

pub struct Notes;
pub struct Todos;
pub struct Projects;

impl Resource for Notes {
    type Record = Note;
    type Draft = NewNote;

    const COLLECTION: &'static str = "notes";
    const TITLE_FIELD: &'static str = "title";
    const DELETE_MODE: DeleteMode = DeleteMode::Hard;

    fn draft(title: &str) -> NewNote {
        NewNote {
            title: title.to_string(),
        }
    }

    fn validate_draft(draft: &NewNote) -> Result<NewNote, ValidationError> {
        Ok(NewNote {
            title: validate_title(Self::TITLE_FIELD, &draft.title)?,
        })
    }
}

impl Resource for Todos {
    type Record = Todo;
    type Draft = NewTodo;

    const COLLECTION: &'static str = "todos";
    const TITLE_FIELD: &'static str = "title";
    const DELETE_MODE: DeleteMode = DeleteMode::Soft;

    fn draft(title: &str) -> NewTodo {
        NewTodo {
            title: title.to_string(),
        }
    }

    fn validate_draft(draft: &NewTodo) -> Result<NewTodo, ValidationError> {
        Ok(NewTodo {
            title: validate_title(Self::TITLE_FIELD, &draft.title)?,
        })
    }
}

impl Resource for Projects {
    type Record = Project;
    type Draft = NewProject;

    const COLLECTION: &'static str = "projects";
    const TITLE_FIELD: &'static str = "name";
    const DELETE_MODE: DeleteMode = DeleteMode::Hard;

    fn draft(title: &str) -> NewProject {
        NewProject {
            name: title.to_string(),
        }
    }

    fn validate_draft(draft: &NewProject) -> Result<NewProject, ValidationError> {
        Ok(NewProject {
            name: validate_title(Self::TITLE_FIELD, &draft.name)?,
        })
    }
}
