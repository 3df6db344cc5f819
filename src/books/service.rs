//! # Book Service
//!
//! Owner-scoped CRUD and aggregates on top of a [`BookStore`].
//!
//! ## Invariants
//! - Every mutation goes through [`BookService::owned_by`]; a book that is
//!   missing and a book owned by someone else produce the same error.
//! - The owner field of a new book comes from the caller's identity, never
//!   from the payload.

use std::sync::Arc;

use mongodb::bson::oid::ObjectId;

use super::model::{Book, BookPatch, BookResponse, BookStats};
use super::store::BookStore;
use crate::error::{ApiError, ApiResult};

/// Book service
pub struct BookService {
    books: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(books: Arc<dyn BookStore>) -> Self {
        Self { books }
    }

    /// All of the caller's books
    pub async fn list(&self, identity: &str) -> ApiResult<Vec<BookResponse>> {
        let books = self.books.list(identity).await?;
        Ok(books.into_iter().map(BookResponse::from).collect())
    }

    /// Caller's books with an exact genre match
    pub async fn list_by_genre(&self, identity: &str, genre: &str) -> ApiResult<Vec<BookResponse>> {
        if genre.is_empty() {
            return Err(ApiError::Validation("No genre provided".to_string()));
        }
        let books = self.books.find_by_genre(identity, genre).await?;
        Ok(books.into_iter().map(BookResponse::from).collect())
    }

    /// Caller's books with an exact author match
    pub async fn list_by_author(
        &self,
        identity: &str,
        author: &str,
    ) -> ApiResult<Vec<BookResponse>> {
        if author.is_empty() {
            return Err(ApiError::Validation("No author provided".to_string()));
        }
        let books = self.books.find_by_author(identity, author).await?;
        Ok(books.into_iter().map(BookResponse::from).collect())
    }

    /// Fetch one of the caller's books
    pub async fn get(&self, identity: &str, id: &str) -> ApiResult<BookResponse> {
        let book = self.owned_by(identity, id).await?;
        Ok(BookResponse::from(book))
    }

    /// Create a book owned by the caller; omitted fields get defaults
    pub async fn add(&self, identity: &str, fields: BookPatch) -> ApiResult<BookResponse> {
        let mut book = Book::new(identity);
        fields.apply(&mut book);

        self.books.insert(&book).await?;
        tracing::debug!(owner = %identity, title = %book.title, "book added");
        Ok(BookResponse::from(book))
    }

    /// Update one of the caller's books
    ///
    /// Only fields present in the payload are overwritten; the rest keep
    /// their stored values. The updated timestamp is always refreshed.
    pub async fn edit(
        &self,
        identity: &str,
        id: Option<&str>,
        fields: BookPatch,
    ) -> ApiResult<()> {
        let id = id.ok_or_else(|| ApiError::Validation("No book ID provided".to_string()))?;
        let mut book = self.owned_by(identity, id).await?;

        fields.apply(&mut book);
        book.touch();

        // The store's per-document write is the only atomicity here: two
        // concurrent edits resolve as last write wins.
        let oid = book
            .id
            .ok_or_else(|| ApiError::Internal("stored book has no id".to_string()))?;
        self.books.replace(&oid, &book).await?;
        Ok(())
    }

    /// Permanently delete one of the caller's books
    pub async fn delete(&self, identity: &str, id: Option<&str>) -> ApiResult<()> {
        let id = id.ok_or_else(|| ApiError::Validation("No book ID provided".to_string()))?;
        let book = self.owned_by(identity, id).await?;

        let oid = book
            .id
            .ok_or_else(|| ApiError::Internal("stored book has no id".to_string()))?;
        self.books.delete(&oid).await?;
        tracing::debug!(owner = %identity, id = %oid, "book deleted");
        Ok(())
    }

    /// Aggregate statistics over the caller's books
    pub async fn stats(&self, identity: &str) -> ApiResult<BookStats> {
        let mut stats = self.books.stats(identity).await?;
        // One decimal, the precision the frontend displays
        stats.avg_rating = (stats.avg_rating * 10.0).round() / 10.0;
        Ok(stats)
    }

    /// Distinct genres across the caller's books
    pub async fn genres(&self, identity: &str) -> ApiResult<Vec<String>> {
        Ok(self.books.distinct_genres(identity).await?)
    }

    /// The single authorization predicate in front of every book read and
    /// mutation: parse the id, fetch, and require ownership
    async fn owned_by(&self, identity: &str, id: &str) -> ApiResult<Book> {
        let oid = ObjectId::parse_str(id)
            .map_err(|_| ApiError::Validation("Invalid book ID".to_string()))?;

        match self.books.find_by_id(&oid).await? {
            Some(book) if book.user_email == identity => Ok(book),
            // Missing and not-owned are deliberately the same answer
            _ => Err(ApiError::Forbidden(
                "Book not found or unauthorized".to_string(),
            )),
        }
    }
}
