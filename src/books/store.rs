//! # Book Store
//!
//! Storage seam for book documents. The queries a backing store must
//! answer are all owner-scoped except `find_by_id`: the caller compares
//! the owner itself so that not-found and not-owned collapse into one
//! outcome.

use std::collections::HashMap;

use mongodb::bson::oid::ObjectId;

use super::model::{Book, BookStats, GenreCount};
use crate::error::StoreError;

/// Book store trait
#[async_trait::async_trait]
pub trait BookStore: Send + Sync {
    /// All books owned by `owner`; order is whatever the store returns
    async fn list(&self, owner: &str) -> Result<Vec<Book>, StoreError>;

    /// Owner's books with an exact genre match
    async fn find_by_genre(&self, owner: &str, genre: &str) -> Result<Vec<Book>, StoreError>;

    /// Owner's books with an exact author match
    async fn find_by_author(&self, owner: &str, author: &str) -> Result<Vec<Book>, StoreError>;

    /// Look up one book by id, regardless of owner
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Book>, StoreError>;

    /// Insert a new book (the id is already set by the caller)
    async fn insert(&self, book: &Book) -> Result<(), StoreError>;

    /// Replace the document with the given id
    async fn replace(&self, id: &ObjectId, book: &Book) -> Result<(), StoreError>;

    /// Permanently remove the document with the given id
    async fn delete(&self, id: &ObjectId) -> Result<(), StoreError>;

    /// Count, mean overall rating, and per-genre counts (descending) for
    /// one owner
    async fn stats(&self, owner: &str) -> Result<BookStats, StoreError>;

    /// Distinct genre values across one owner's books
    async fn distinct_genres(&self, owner: &str) -> Result<Vec<String>, StoreError>;
}

/// In-memory book store for tests
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    books: std::sync::RwLock<Vec<Book>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<Vec<Book>, StoreError> {
        self.books
            .read()
            .map(|books| books.clone())
            .map_err(|_| StoreError::Backend("Lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl BookStore for InMemoryBookStore {
    async fn list(&self, owner: &str) -> Result<Vec<Book>, StoreError> {
        Ok(self
            .read()?
            .into_iter()
            .filter(|b| b.user_email == owner)
            .collect())
    }

    async fn find_by_genre(&self, owner: &str, genre: &str) -> Result<Vec<Book>, StoreError> {
        Ok(self
            .read()?
            .into_iter()
            .filter(|b| b.user_email == owner && b.genre == genre)
            .collect())
    }

    async fn find_by_author(&self, owner: &str, author: &str) -> Result<Vec<Book>, StoreError> {
        Ok(self
            .read()?
            .into_iter()
            .filter(|b| b.user_email == owner && b.author == author)
            .collect())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Book>, StoreError> {
        Ok(self.read()?.into_iter().find(|b| b.id.as_ref() == Some(id)))
    }

    async fn insert(&self, book: &Book) -> Result<(), StoreError> {
        let mut books = self
            .books
            .write()
            .map_err(|_| StoreError::Backend("Lock poisoned".to_string()))?;
        books.push(book.clone());
        Ok(())
    }

    async fn replace(&self, id: &ObjectId, book: &Book) -> Result<(), StoreError> {
        let mut books = self
            .books
            .write()
            .map_err(|_| StoreError::Backend("Lock poisoned".to_string()))?;

        if let Some(existing) = books.iter_mut().find(|b| b.id.as_ref() == Some(id)) {
            *existing = book.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<(), StoreError> {
        let mut books = self
            .books
            .write()
            .map_err(|_| StoreError::Backend("Lock poisoned".to_string()))?;
        books.retain(|b| b.id.as_ref() != Some(id));
        Ok(())
    }

    async fn stats(&self, owner: &str) -> Result<BookStats, StoreError> {
        let owned: Vec<Book> = self
            .read()?
            .into_iter()
            .filter(|b| b.user_email == owner)
            .collect();

        let total_books = owned.len() as u64;
        let avg_rating = if owned.is_empty() {
            0.0
        } else {
            owned.iter().map(|b| b.rating).sum::<f64>() / owned.len() as f64
        };

        let mut counts: HashMap<String, u64> = HashMap::new();
        for book in &owned {
            *counts.entry(book.genre.clone()).or_default() += 1;
        }
        let mut genre_distribution: Vec<GenreCount> = counts
            .into_iter()
            .map(|(genre, count)| GenreCount { genre, count })
            .collect();
        // Descending by count; ties broken by name so the output is stable
        genre_distribution.sort_by(|a, b| b.count.cmp(&a.count).then(a.genre.cmp(&b.genre)));

        Ok(BookStats {
            total_books,
            avg_rating,
            genre_distribution,
        })
    }

    async fn distinct_genres(&self, owner: &str) -> Result<Vec<String>, StoreError> {
        let mut genres: Vec<String> = self
            .read()?
            .into_iter()
            .filter(|b| b.user_email == owner)
            .map(|b| b.genre)
            .collect();
        genres.sort();
        genres.dedup();
        Ok(genres)
    }
}
