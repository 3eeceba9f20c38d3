use crate::routing_utils::BasicErrorResponse;
use utoipa::OpenApi;

pub mod todo;

pub use todo::{Todo, TodoBody};

/// Shared schemas that aren't reachable from any single route's annotations
#[derive(OpenApi)]
#[openapi(components(schemas(BasicErrorResponse, Todo, TodoBody)))]
pub struct OpenApiSchemas;
