//! # MongoDB Storage
//!
//! MongoDB-backed implementations of [`UserStore`] and [`BookStore`].
//! This is the only module that talks to the driver; everything above it
//! sees the store traits.
//!
//! ## Invariants
//! - Unique-index violations surface as [`StoreError::DuplicateKey`].
//! - Index creation failures are reported, not fatal: the service boots
//!   without its performance indexes.

use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use serde_json::{Map, Value};

use crate::auth::user::{User, UserStore};
use crate::books::model::{Book, BookStats, GenreCount};
use crate::books::store::BookStore;
use crate::error::StoreError;

/// Handle to the `users` and `books` collections
#[derive(Clone)]
pub struct MongoStore {
    users: Collection<User>,
    books: Collection<Book>,
}

impl MongoStore {
    /// Connect to the given deployment and database
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let options = ClientOptions::parse(uri).await.map_err(store_err)?;
        let client = Client::with_options(options).map_err(store_err)?;
        let db = client.database(db_name);

        Ok(Self {
            users: db.collection::<User>("users"),
            books: db.collection::<Book>("books"),
        })
    }

    /// Create the unique email index and the owner-scoped query indexes
    ///
    /// The caller decides what a failure means; at boot it is logged and
    /// swallowed.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users
            .create_index(unique_email, None)
            .await
            .map_err(store_err)?;

        for keys in [
            doc! { "user_email": 1, "genre": 1 },
            doc! { "user_email": 1, "author": 1 },
            doc! { "user_email": 1, "created_at": -1 },
        ] {
            let index = IndexModel::builder().keys(keys).build();
            self.books
                .create_index(index, None)
                .await
                .map_err(store_err)?;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl UserStore for MongoStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.users
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(store_err)
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        self.users
            .insert_one(user, None)
            .await
            .map(|_| ())
            .map_err(store_err)
    }

    async fn merge_profile(
        &self,
        email: &str,
        fields: &Map<String, Value>,
    ) -> Result<bool, StoreError> {
        let update = mongodb::bson::to_document(fields).map_err(|e| {
            StoreError::Backend(format!("profile fields are not a valid document: {}", e))
        })?;

        let result = self
            .users
            .update_one(doc! { "email": email }, doc! { "$set": update }, None)
            .await
            .map_err(store_err)?;

        Ok(result.matched_count > 0)
    }
}

#[async_trait::async_trait]
impl BookStore for MongoStore {
    async fn list(&self, owner: &str) -> Result<Vec<Book>, StoreError> {
        let cursor = self
            .books
            .find(doc! { "user_email": owner }, None)
            .await
            .map_err(store_err)?;
        cursor.try_collect().await.map_err(store_err)
    }

    async fn find_by_genre(&self, owner: &str, genre: &str) -> Result<Vec<Book>, StoreError> {
        let cursor = self
            .books
            .find(doc! { "user_email": owner, "genre": genre }, None)
            .await
            .map_err(store_err)?;
        cursor.try_collect().await.map_err(store_err)
    }

    async fn find_by_author(&self, owner: &str, author: &str) -> Result<Vec<Book>, StoreError> {
        let cursor = self
            .books
            .find(doc! { "user_email": owner, "author": author }, None)
            .await
            .map_err(store_err)?;
        cursor.try_collect().await.map_err(store_err)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Book>, StoreError> {
        self.books
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(store_err)
    }

    async fn insert(&self, book: &Book) -> Result<(), StoreError> {
        self.books
            .insert_one(book, None)
            .await
            .map(|_| ())
            .map_err(store_err)
    }

    async fn replace(&self, id: &ObjectId, book: &Book) -> Result<(), StoreError> {
        self.books
            .replace_one(doc! { "_id": id }, book, None)
            .await
            .map(|_| ())
            .map_err(store_err)
    }

    async fn delete(&self, id: &ObjectId) -> Result<(), StoreError> {
        self.books
            .delete_one(doc! { "_id": id }, None)
            .await
            .map(|_| ())
            .map_err(store_err)
    }

    async fn stats(&self, owner: &str) -> Result<BookStats, StoreError> {
        let total_books = self
            .books
            .count_documents(doc! { "user_email": owner }, None)
            .await
            .map_err(store_err)?;

        // Per-genre counts, largest first
        let pipeline = vec![
            doc! { "$match": { "user_email": owner } },
            doc! { "$group": { "_id": "$genre", "count": { "$sum": 1 } } },
            doc! { "$sort": { "count": -1 } },
        ];
        let cursor = self
            .books
            .aggregate(pipeline, None)
            .await
            .map_err(store_err)?;
        let groups: Vec<mongodb::bson::Document> =
            cursor.try_collect().await.map_err(store_err)?;
        let genre_distribution = groups
            .into_iter()
            .filter_map(|d| mongodb::bson::from_document::<GenreCount>(d).ok())
            .collect();

        let avg_pipeline = vec![
            doc! { "$match": { "user_email": owner } },
            doc! { "$group": { "_id": null, "avg_rating": { "$avg": "$rating" } } },
        ];
        let mut cursor = self
            .books
            .aggregate(avg_pipeline, None)
            .await
            .map_err(store_err)?;
        let avg_rating = match cursor.try_next().await.map_err(store_err)? {
            Some(d) => d.get("avg_rating").and_then(Bson::as_f64).unwrap_or(0.0),
            None => 0.0,
        };

        Ok(BookStats {
            total_books,
            avg_rating,
            genre_distribution,
        })
    }

    async fn distinct_genres(&self, owner: &str) -> Result<Vec<String>, StoreError> {
        let values = self
            .books
            .distinct("genre", doc! { "user_email": owner }, None)
            .await
            .map_err(store_err)?;

        Ok(values
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }
}

/// Map a driver error onto the storage seam
fn store_err(e: mongodb::error::Error) -> StoreError {
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = &*e.kind {
        // E11000: unique index violation
        if write_error.code == 11000 {
            return StoreError::DuplicateKey;
        }
    }
    StoreError::Backend(e.to_string())
}
