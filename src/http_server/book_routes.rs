//! Book HTTP Routes
//!
//! Owner-scoped book CRUD plus the aggregate endpoints. Edit and delete
//! take the book id in the body, matching the frontend's calls.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use super::require_identity;
use super::response::{AddBookResponse, MessageResponse};
use super::server::AppContext;
use crate::books::model::{BookPatch, BookResponse, BookStats};
use crate::error::{ApiError, ApiResult};

/// Book routes
pub fn book_routes() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/books", get(list_books_handler).post(add_book_handler))
        .route("/books/:id", get(get_book_handler))
        .route("/books/edit", post(edit_book_handler))
        .route("/books/delete", post(delete_book_handler))
        .route("/stats", get(stats_handler))
        .route("/genres", get(genres_handler))
}

// ==================
// Request Types
// ==================

/// Optional exact-match filters on the list endpoint
#[derive(Debug, Deserialize)]
struct ListBooksQuery {
    genre: Option<String>,
    author: Option<String>,
}

/// Edit request: the target id plus the fields to overwrite
#[derive(Debug, Deserialize)]
struct EditBookRequest {
    id: Option<String>,
    #[serde(flatten)]
    fields: BookPatch,
}

/// Delete request
#[derive(Debug, Deserialize)]
struct DeleteBookRequest {
    id: Option<String>,
}

// ==================
// Handlers
// ==================

/// List the caller's books, optionally filtered by genre or author
async fn list_books_handler(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Query(query): Query<ListBooksQuery>,
) -> ApiResult<Json<Vec<BookResponse>>> {
    let identity = require_identity(&ctx, &headers)?;

    let books = match (query.genre, query.author) {
        (Some(genre), _) => ctx.books.list_by_genre(&identity, &genre).await?,
        (None, Some(author)) => ctx.books.list_by_author(&identity, &author).await?,
        (None, None) => ctx.books.list(&identity).await?,
    };
    Ok(Json(books))
}

/// Fetch one book
async fn get_book_handler(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<BookResponse>> {
    let identity = require_identity(&ctx, &headers)?;
    Ok(Json(ctx.books.get(&identity, &id).await?))
}

/// Create a book owned by the caller
async fn add_book_handler(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Option<Json<BookPatch>>,
) -> ApiResult<Json<AddBookResponse>> {
    let identity = require_identity(&ctx, &headers)?;

    let Some(Json(fields)) = body else {
        return Err(ApiError::Validation("No data provided".to_string()));
    };

    let book = ctx.books.add(&identity, fields).await?;
    Ok(Json(AddBookResponse {
        message: "Book added successfully!".to_string(),
        book,
    }))
}

/// Update a book; only fields present in the payload are overwritten
async fn edit_book_handler(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Option<Json<EditBookRequest>>,
) -> ApiResult<Json<MessageResponse>> {
    let identity = require_identity(&ctx, &headers)?;

    let Some(Json(request)) = body else {
        return Err(ApiError::Validation("No data provided".to_string()));
    };

    ctx.books
        .edit(&identity, request.id.as_deref(), request.fields)
        .await?;
    Ok(Json(MessageResponse::new("Book updated successfully!")))
}

/// Delete a book
async fn delete_book_handler(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Option<Json<DeleteBookRequest>>,
) -> ApiResult<Json<MessageResponse>> {
    let identity = require_identity(&ctx, &headers)?;

    let Some(Json(request)) = body else {
        return Err(ApiError::Validation("No data provided".to_string()));
    };

    ctx.books.delete(&identity, request.id.as_deref()).await?;
    Ok(Json(MessageResponse::new("Book deleted successfully!")))
}

/// Aggregate statistics for the caller's collection
async fn stats_handler(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> ApiResult<Json<BookStats>> {
    let identity = require_identity(&ctx, &headers)?;
    Ok(Json(ctx.books.stats(&identity).await?))
}

/// Distinct genres in the caller's collection
async fn genres_handler(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<String>>> {
    let identity = require_identity(&ctx, &headers)?;
    Ok(Json(ctx.books.genres(&identity).await?))
}
