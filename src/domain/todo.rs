use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::domain::todo::driving_ports::TodoError;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use derive_more::Display;
use uuid::Uuid;

/// A persisted to-do item
#[derive(PartialEq, Eq, Debug, Clone, Display)]
#[display("{title} ({id})")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
}

/// A to-do item which hasn't been stored yet, so it has no ID
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct NewTodo {
    pub title: String,
}

/// Replacement content for an existing to-do item
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct UpdateTodo {
    pub title: String,
}

pub mod driven_ports {
    use super::*;

    pub trait TodoReader {
        /// Every stored to-do, in whatever order the store produces them
        async fn all(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error>;

        async fn find(
            &self,
            todo_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;
    }

    pub trait TodoWriter {
        /// Stores a new to-do, letting the store assign its ID
        async fn insert(
            &self,
            new_todo: &NewTodo,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Todo, anyhow::Error>;

        /// Overwrites the stored copy of an existing to-do. Returns [None] if no row has its ID.
        async fn save(
            &self,
            todo: &Todo,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;

        /// Removes a to-do. Returns false if no row had the ID.
        async fn delete(
            &self,
            todo_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum TodoError {
        #[error("to-do {0} does not exist")]
        NotFound(Uuid),
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait TodoPort {
        async fn all_todos(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl TodoReader,
        ) -> Result<Vec<Todo>, TodoError>;

        async fn todo_by_id(
            &self,
            todo_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl TodoReader,
        ) -> Result<Todo, TodoError>;

        async fn create_todo(
            &self,
            new_todo: &NewTodo,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl TodoWriter,
        ) -> Result<Todo, TodoError>;

        async fn update_todo(
            &self,
            todo_id: Uuid,
            update: &UpdateTodo,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl TodoReader,
            todo_write: &impl TodoWriter,
        ) -> Result<Todo, TodoError>;

        async fn delete_todo(
            &self,
            todo_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl TodoWriter,
        ) -> Result<(), TodoError>;
    }
}

pub struct TodoService;

impl driving_ports::TodoPort for TodoService {
    async fn all_todos(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Vec<Todo>, TodoError> {
        let todos = todo_read
            .all(&mut *ext_cxn)
            .await
            .context("listing to-dos")?;

        Ok(todos)
    }

    async fn todo_by_id(
        &self,
        todo_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Todo, TodoError> {
        todo_read
            .find(todo_id, &mut *ext_cxn)
            .await
            .context("fetching a to-do by ID")?
            .ok_or(TodoError::NotFound(todo_id))
    }

    async fn create_todo(
        &self,
        new_todo: &NewTodo,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        let created = todo_write
            .insert(new_todo, &mut *ext_cxn)
            .await
            .context("creating a to-do")?;

        Ok(created)
    }

    async fn update_todo(
        &self,
        todo_id: Uuid,
        update: &UpdateTodo,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        let mut todo = todo_read
            .find(todo_id, &mut *ext_cxn)
            .await
            .context("looking up a to-do before updating it")?
            .ok_or(TodoError::NotFound(todo_id))?;

        todo.title = update.title.clone();

        // The row can vanish between the read and the write if someone deletes it concurrently
        todo_write
            .save(&todo, &mut *ext_cxn)
            .await
            .context("updating a to-do")?
            .ok_or(TodoError::NotFound(todo_id))
    }

    async fn delete_todo(
        &self,
        todo_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<(), TodoError> {
        let removed = todo_write
            .delete(todo_id, &mut *ext_cxn)
            .await
            .context("deleting a to-do")?;

        if removed {
            Ok(())
        } else {
            Err(TodoError::NotFound(todo_id))
        }
    }
}
