use crate::domain;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request body for creating or updating a to-do. Any `id` sent by the client is ignored;
/// the store assigns IDs on creation and the path decides which to-do gets updated.
#[derive(Debug, Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct TodoBody {
    #[serde(default)]
    #[schema(example = json!(null))]
    pub id: Option<Uuid>,
    #[schema(example = "CocoaHeads talk")]
    pub title: String,
}

impl From<TodoBody> for domain::todo::NewTodo {
    fn from(value: TodoBody) -> Self {
        domain::todo::NewTodo { title: value.title }
    }
}

impl From<TodoBody> for domain::todo::UpdateTodo {
    fn from(value: TodoBody) -> Self {
        domain::todo::UpdateTodo { title: value.title }
    }
}

/// A stored to-do as returned by the API
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq))]
pub struct Todo {
    #[schema(example = "4b6d7ed3-4f0c-4a36-bd6d-8f5f1e1bd7e2")]
    pub id: Uuid,
    #[schema(example = "CocoaHeads talk")]
    pub title: String,
}

impl From<domain::todo::Todo> for Todo {
    fn from(value: domain::todo::Todo) -> Self {
        Todo {
            id: value.id,
            title: value.title,
        }
    }
}
