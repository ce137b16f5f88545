use std::{fmt, hash::Hash, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map($name)
            }
        }
    };
}

id_newtype!(NoteId);
id_newtype!(TodoId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(ProjectId)
    }
}

/// A row of a remote collection as the list views see it.
///
/// Every record has a store-assigned identifier, an immutable creation
/// timestamp and exactly one editable title-like text field.
pub trait Record:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Id: Clone
        + fmt::Debug
        + fmt::Display
        + PartialEq
        + Eq
        + Hash
        + FromStr<Err = Self::IdParseError>
        + Send
        + Sync
        + 'static;
    type IdParseError: std::error::Error + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;
    fn title(&self) -> &str;
    /// Copy of `self` with only the title replaced.
    fn with_title(&self, title: &str) -> Self;
    fn created_at(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Record for Note {
    type Id = NoteId;
    type IdParseError = std::num::ParseIntError;

    fn id(&self) -> &NoteId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn with_title(&self, title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..self.clone()
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for Todo {
    type Id = TodoId;
    type IdParseError = std::num::ParseIntError;

    fn id(&self) -> &TodoId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn with_title(&self, title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..self.clone()
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for Project {
    type Id = ProjectId;
    type IdParseError = uuid::Error;

    fn id(&self) -> &ProjectId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn with_title(&self, title: &str) -> Self {
        Self {
            name: title.to_string(),
            ..self.clone()
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_display_and_parse() {
        let note: NoteId = " 42 ".parse().expect("note id");
        assert_eq!(note, NoteId(42));
        assert_eq!(note.to_string(), "42");

        let project = ProjectId::new_v4();
        let parsed: ProjectId = project.to_string().parse().expect("project id");
        assert_eq!(parsed, project);
    }

    #[test]
    fn with_title_only_touches_the_title_field() {
        let todo = Todo {
            id: TodoId(3),
            title: "old".into(),
            deleted: false,
            created_at: Utc::now(),
        };
        let renamed = todo.with_title("new");
        assert_eq!(renamed.title, "new");
        assert_eq!(renamed.id, todo.id);
        assert_eq!(renamed.created_at, todo.created_at);
        assert!(!renamed.deleted);
    }

    #[test]
    fn ids_serialize_as_bare_values() {
        let json = serde_json::to_value(NoteId(7)).expect("json");
        assert_eq!(json, serde_json::json!(7));
    }
}
