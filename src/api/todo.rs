use crate::domain::todo::TodoService;
use crate::domain::todo::driving_ports::{TodoError, TodoPort};
use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use crate::persistence::db_todo_driven_ports::{DbTodoReader, DbTodoWriter};
use crate::routing_utils::{
    BasicErrorResponse, GenericErrorResponse, Json, NotFoundErrorResponse, Path,
};
use crate::{AppState, SharedData, domain, dto};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::get;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

#[derive(OpenApi)]
#[openapi(
    paths(list_todos, get_todo, create_todo, update_todo, delete_todo),
    components(schemas(dto::Todo, dto::TodoBody, BasicErrorResponse))
)]
/// Defines the OpenAPI documentation for the to-do API
pub struct TodoApi;
/// Constant used to group to-do endpoints in OpenAPI documentation
pub const TODO_API_GROUP: &str = "Todos";
/// Root of the to-do collection
pub const TODOS_PATH: &str = "/v1/todos";

/// Builds a router for the routes under "/v1/todos". Each path also answers with a trailing slash.
pub fn todo_routes() -> Router<Arc<SharedData>> {
    let collection = get(|State(app_state): AppState| async move {
        let mut ext_cxn = app_state.ext_cxn.clone();

        list_todos(&mut ext_cxn, &TodoService).await
    })
    .post(
        |State(app_state): AppState, Json(body): Json<dto::TodoBody>| async move {
            let mut ext_cxn = app_state.ext_cxn.clone();

            create_todo(body, &mut ext_cxn, &TodoService).await
        },
    );
    let item = get(
        |State(app_state): AppState, Path(todo_id): Path<Uuid>| async move {
            let mut ext_cxn = app_state.ext_cxn.clone();

            get_todo(todo_id, &mut ext_cxn, &TodoService).await
        },
    )
    .put(
        |State(app_state): AppState,
         Path(todo_id): Path<Uuid>,
         Json(body): Json<dto::TodoBody>| async move {
            update_todo(todo_id, body, &app_state.ext_cxn, &TodoService).await
        },
    )
    .delete(
        |State(app_state): AppState, Path(todo_id): Path<Uuid>| async move {
            let mut ext_cxn = app_state.ext_cxn.clone();

            delete_todo(todo_id, &mut ext_cxn, &TodoService).await
        },
    );

    Router::new()
        .route(TODOS_PATH, collection.clone())
        .route(&format!("{TODOS_PATH}/"), collection)
        .route(&format!("{TODOS_PATH}/:todo_id"), item.clone())
        .route(&format!("{TODOS_PATH}/:todo_id/"), item)
}

/// Maps a service failure onto the HTTP response the caller should see
fn todo_error_response(err: TodoError) -> ErrorResponse {
    match err {
        TodoError::NotFound(todo_id) => {
            info!("To-do {todo_id} does not exist");
            NotFoundErrorResponse.into()
        }
        TodoError::PortError(cause) => GenericErrorResponse(cause).into(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/todos",
    tag = TODO_API_GROUP,
    responses(
        (status = 200, description = "Every stored to-do", body = Vec<dto::Todo>),
        (status = 500, description = "The data store couldn't be reached", body = BasicErrorResponse),
    ),
)]
/// Lists all to-dos
async fn list_todos(
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<Json<Vec<dto::Todo>>, ErrorResponse> {
    info!("Listing to-dos");
    let todos = todo_service
        .all_todos(&mut *ext_cxn, &DbTodoReader)
        .await
        .map_err(todo_error_response)?;

    Ok(Json(todos.into_iter().map(dto::Todo::from).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(
        ("todo_id" = Uuid, Path, description = "ID of the to-do to fetch"),
    ),
    responses(
        (status = 200, description = "The requested to-do", body = dto::Todo),
        (status = 400, description = "The ID wasn't a valid UUID", body = BasicErrorResponse),
        (status = 404, description = "No to-do has that ID", body = BasicErrorResponse),
        (status = 500, description = "The data store couldn't be reached", body = BasicErrorResponse),
    ),
)]
/// Fetches a single to-do
async fn get_todo(
    todo_id: Uuid,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<Json<dto::Todo>, ErrorResponse> {
    info!("Fetching to-do {todo_id}");
    let todo = todo_service
        .todo_by_id(todo_id, &mut *ext_cxn, &DbTodoReader)
        .await
        .map_err(todo_error_response)?;

    Ok(Json(todo.into()))
}

#[utoipa::path(
    post,
    path = "/v1/todos",
    tag = TODO_API_GROUP,
    request_body = dto::TodoBody,
    responses(
        (status = 201, description = "The stored to-do, including its new ID", body = dto::Todo),
        (status = 400, description = "The body wasn't a decodable to-do", body = BasicErrorResponse),
        (status = 500, description = "The data store couldn't be reached", body = BasicErrorResponse),
    ),
)]
/// Creates a to-do
async fn create_todo(
    body: dto::TodoBody,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<(StatusCode, Json<dto::Todo>), ErrorResponse> {
    let new_todo = domain::todo::NewTodo::from(body);
    info!("Creating to-do titled \"{}\"", new_todo.title);

    let created = todo_service
        .create_todo(&new_todo, &mut *ext_cxn, &DbTodoWriter)
        .await
        .map_err(todo_error_response)?;
    info!("Created to-do {created}");

    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    put,
    path = "/v1/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(
        ("todo_id" = Uuid, Path, description = "ID of the to-do to update"),
    ),
    request_body = dto::TodoBody,
    responses(
        (status = 200, description = "The to-do with its new title", body = dto::Todo),
        (status = 400, description = "The ID or body couldn't be decoded", body = BasicErrorResponse),
        (status = 404, description = "No to-do has that ID", body = BasicErrorResponse),
        (status = 500, description = "The data store couldn't be reached", body = BasicErrorResponse),
    ),
)]
/// Replaces the title of a to-do. The lookup and the write share one transaction.
async fn update_todo(
    todo_id: Uuid,
    body: dto::TodoBody,
    ext_cxn: &impl Transactable,
    todo_service: &impl TodoPort,
) -> Result<Json<dto::Todo>, ErrorResponse> {
    info!("Updating to-do {todo_id}");
    let update = domain::todo::UpdateTodo::from(body);

    let mut txn = ext_cxn
        .start_transaction()
        .await
        .map_err(GenericErrorResponse)?;
    let updated = todo_service
        .update_todo(todo_id, &update, &mut txn, &DbTodoReader, &DbTodoWriter)
        .await
        .map_err(todo_error_response)?;
    txn.commit().await.map_err(GenericErrorResponse)?;
    info!("Updated to-do {updated}");

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(
        ("todo_id" = Uuid, Path, description = "ID of the to-do to delete"),
    ),
    responses(
        (status = 204, description = "The to-do was deleted"),
        (status = 400, description = "The ID wasn't a valid UUID", body = BasicErrorResponse),
        (status = 404, description = "No to-do has that ID", body = BasicErrorResponse),
        (status = 500, description = "The data store couldn't be reached", body = BasicErrorResponse),
    ),
)]
/// Deletes a to-do
async fn delete_todo(
    todo_id: Uuid,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<StatusCode, ErrorResponse> {
    info!("Deleting to-do {todo_id}");
    todo_service
        .delete_todo(todo_id, &mut *ext_cxn, &DbTodoWriter)
        .await
        .map_err(todo_error_response)?;

    Ok(StatusCode::NO_CONTENT)
}
