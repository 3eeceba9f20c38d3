use crate::domain;
use crate::domain::todo::{NewTodo, Todo};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::{FromRow, query, query_as};
use uuid::Uuid;

#[derive(FromRow)]
struct TodoRow {
    id: Uuid,
    title: String,
}

impl From<TodoRow> for Todo {
    fn from(value: TodoRow) -> Self {
        Todo {
            id: value.id,
            title: value.title,
        }
    }
}

pub struct DbTodoReader;

impl domain::todo::driven_ports::TodoReader for DbTodoReader {
    async fn all(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<Vec<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todos: Vec<Todo> = query_as::<_, TodoRow>("SELECT t.id, t.title FROM todo t")
            .fetch_all(cxn.borrow_connection())
            .await
            .context("trying to fetch all todos")?
            .into_iter()
            .map(Todo::from)
            .collect();

        Ok(todos)
    }

    async fn find(
        &self,
        todo_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todo = query_as::<_, TodoRow>("SELECT t.id, t.title FROM todo t WHERE t.id = $1")
            .bind(todo_id)
            .fetch_optional(cxn.borrow_connection())
            .await
            .context("trying to fetch a todo by ID")?
            .map(Todo::from);

        Ok(todo)
    }
}

pub struct DbTodoWriter;

impl domain::todo::driven_ports::TodoWriter for DbTodoWriter {
    async fn insert(
        &self,
        new_todo: &NewTodo,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Todo, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let inserted = query_as::<_, TodoRow>(
            "INSERT INTO todo(title) VALUES ($1) RETURNING todo.id, todo.title",
        )
        .bind(&new_todo.title)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new todo into the database")?;

        Ok(inserted.into())
    }

    async fn save(
        &self,
        todo: &Todo,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let saved = query_as::<_, TodoRow>(
            "UPDATE todo SET title = $1 WHERE id = $2 RETURNING todo.id, todo.title",
        )
        .bind(&todo.title)
        .bind(todo.id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to update a todo in the database")?
        .map(Todo::from);

        Ok(saved)
    }

    async fn delete(
        &self,
        todo_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let result = query("DELETE FROM todo WHERE id = $1")
            .bind(todo_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a todo from the database")?;

        Ok(result.rows_affected() > 0)
    }
}
