//! # Book Model
//!
//! Book documents and the request/response shapes around them. Wire names
//! follow the frontend: camelCase for the newer fields (reading dates,
//! per-aspect ratings, favorite flag), plain lowercase for the legacy set.
//!
//! ## Invariants
//! - `user_email` is always derived from the caller's validated identity,
//!   never from client input.
//! - A patch only touches fields present in the payload; everything else
//!   keeps its stored value.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Book document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Owner identity, the tenancy key
    pub user_email: String,

    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub genre: String,

    /// Legacy field, superseded by the reading dates
    #[serde(default)]
    pub year: Option<i32>,
    /// Legacy field
    #[serde(default)]
    pub pages: Option<i32>,

    #[serde(default, rename = "startedDate")]
    pub started_date: String,
    #[serde(default, rename = "finishedDate")]
    pub finished_date: String,

    #[serde(default)]
    pub resume: String,
    #[serde(default)]
    pub image: String,

    /// Overall rating; the per-aspect scores below are independent of it
    #[serde(default)]
    pub rating: f64,
    #[serde(default, rename = "characterRating")]
    pub character_rating: f64,
    #[serde(default, rename = "environmentRating")]
    pub environment_rating: f64,
    #[serde(default, rename = "plotRating")]
    pub plot_rating: f64,
    #[serde(default, rename = "plotTwistRating")]
    pub plot_twist_rating: f64,
    #[serde(default, rename = "originalityRating")]
    pub originality_rating: f64,

    #[serde(default, rename = "isFavorite")]
    pub is_favorite: bool,

    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub quotes: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,

    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Create an empty book owned by `owner`, every optional field at its
    /// default and both timestamps at now
    pub fn new(owner: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Some(ObjectId::new()),
            user_email: owner.to_string(),
            title: String::new(),
            author: String::new(),
            genre: String::new(),
            year: None,
            pages: None,
            started_date: String::new(),
            finished_date: String::new(),
            resume: String::new(),
            image: String::new(),
            rating: 0.0,
            character_rating: 0.0,
            environment_rating: 0.0,
            plot_rating: 0.0,
            plot_twist_rating: 0.0,
            originality_rating: 0.0,
            is_favorite: false,
            comment: String::new(),
            quotes: Vec::new(),
            highlights: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the updated timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Client-supplied book fields
///
/// Used both for create (defaults fill the gaps) and for edit (absent
/// fields keep their stored values). The owner field is deliberately not
/// part of this shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub pages: Option<i32>,
    #[serde(rename = "startedDate")]
    pub started_date: Option<String>,
    #[serde(rename = "finishedDate")]
    pub finished_date: Option<String>,
    pub resume: Option<String>,
    pub image: Option<String>,
    pub rating: Option<f64>,
    #[serde(rename = "characterRating")]
    pub character_rating: Option<f64>,
    #[serde(rename = "environmentRating")]
    pub environment_rating: Option<f64>,
    #[serde(rename = "plotRating")]
    pub plot_rating: Option<f64>,
    #[serde(rename = "plotTwistRating")]
    pub plot_twist_rating: Option<f64>,
    #[serde(rename = "originalityRating")]
    pub originality_rating: Option<f64>,
    #[serde(rename = "isFavorite")]
    pub is_favorite: Option<bool>,
    pub comment: Option<String>,
    pub quotes: Option<Vec<String>>,
    pub highlights: Option<Vec<String>>,
}

impl BookPatch {
    /// Overwrite exactly the fields present in this patch
    pub fn apply(&self, book: &mut Book) {
        if let Some(v) = &self.title {
            book.title = v.clone();
        }
        if let Some(v) = &self.author {
            book.author = v.clone();
        }
        if let Some(v) = &self.genre {
            book.genre = v.clone();
        }
        if let Some(v) = self.year {
            book.year = Some(v);
        }
        if let Some(v) = self.pages {
            book.pages = Some(v);
        }
        if let Some(v) = &self.started_date {
            book.started_date = v.clone();
        }
        if let Some(v) = &self.finished_date {
            book.finished_date = v.clone();
        }
        if let Some(v) = &self.resume {
            book.resume = v.clone();
        }
        if let Some(v) = &self.image {
            book.image = v.clone();
        }
        if let Some(v) = self.rating {
            book.rating = v;
        }
        if let Some(v) = self.character_rating {
            book.character_rating = v;
        }
        if let Some(v) = self.environment_rating {
            book.environment_rating = v;
        }
        if let Some(v) = self.plot_rating {
            book.plot_rating = v;
        }
        if let Some(v) = self.plot_twist_rating {
            book.plot_twist_rating = v;
        }
        if let Some(v) = self.originality_rating {
            book.originality_rating = v;
        }
        if let Some(v) = self.is_favorite {
            book.is_favorite = v;
        }
        if let Some(v) = &self.comment {
            book.comment = v.clone();
        }
        if let Some(v) = &self.quotes {
            book.quotes = v.clone();
        }
        if let Some(v) = &self.highlights {
            book.highlights = v.clone();
        }
    }
}

/// Book as returned to the caller: id as a hex string under `_id`,
/// timestamps as RFC 3339
#[derive(Debug, Clone, Serialize)]
pub struct BookResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_email: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year: Option<i32>,
    pub pages: Option<i32>,
    #[serde(rename = "startedDate")]
    pub started_date: String,
    #[serde(rename = "finishedDate")]
    pub finished_date: String,
    pub resume: String,
    pub image: String,
    pub rating: f64,
    #[serde(rename = "characterRating")]
    pub character_rating: f64,
    #[serde(rename = "environmentRating")]
    pub environment_rating: f64,
    #[serde(rename = "plotRating")]
    pub plot_rating: f64,
    #[serde(rename = "plotTwistRating")]
    pub plot_twist_rating: f64,
    #[serde(rename = "originalityRating")]
    pub originality_rating: f64,
    #[serde(rename = "isFavorite")]
    pub is_favorite: bool,
    pub comment: String,
    pub quotes: Vec<String>,
    pub highlights: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_email: book.user_email,
            title: book.title,
            author: book.author,
            genre: book.genre,
            year: book.year,
            pages: book.pages,
            started_date: book.started_date,
            finished_date: book.finished_date,
            resume: book.resume,
            image: book.image,
            rating: book.rating,
            character_rating: book.character_rating,
            environment_rating: book.environment_rating,
            plot_rating: book.plot_rating,
            plot_twist_rating: book.plot_twist_rating,
            originality_rating: book.originality_rating,
            is_favorite: book.is_favorite,
            comment: book.comment,
            quotes: book.quotes,
            highlights: book.highlights,
            created_at: book.created_at.to_rfc3339(),
            updated_at: book.updated_at.to_rfc3339(),
        }
    }
}

/// One genre's share of the owner's collection
///
/// Serialized as `{"_id": genre, "count": n}`, the shape the aggregation
/// produces and the frontend charts from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenreCount {
    #[serde(rename = "_id")]
    pub genre: String,
    pub count: u64,
}

/// Aggregate statistics over one owner's books
#[derive(Debug, Clone, Serialize)]
pub struct BookStats {
    pub total_books: u64,
    pub avg_rating: f64,
    pub genre_distribution: Vec<GenreCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_book_has_defaults() {
        let book = Book::new("a@x.com");

        assert_eq!(book.user_email, "a@x.com");
        assert!(book.id.is_some());
        assert_eq!(book.title, "");
        assert_eq!(book.year, None);
        assert_eq!(book.rating, 0.0);
        assert!(!book.is_favorite);
        assert!(book.quotes.is_empty());
        assert_eq!(book.created_at, book.updated_at);
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut book = Book::new("a@x.com");
        BookPatch {
            title: Some("Dune".to_string()),
            rating: Some(4.5),
            quotes: Some(vec!["Fear is the mind-killer".to_string()]),
            ..Default::default()
        }
        .apply(&mut book);

        let patch: BookPatch = serde_json::from_str(r#"{"genre": "SF"}"#).unwrap();
        patch.apply(&mut book);

        assert_eq!(book.genre, "SF");
        // Untouched by the second patch
        assert_eq!(book.title, "Dune");
        assert_eq!(book.rating, 4.5);
        assert_eq!(book.quotes.len(), 1);
    }

    #[test]
    fn test_patch_wire_names_are_camel_case() {
        let patch: BookPatch = serde_json::from_str(
            r#"{"startedDate": "2024-01-01", "plotTwistRating": 5, "isFavorite": true}"#,
        )
        .unwrap();

        assert_eq!(patch.started_date.as_deref(), Some("2024-01-01"));
        assert_eq!(patch.plot_twist_rating, Some(5.0));
        assert_eq!(patch.is_favorite, Some(true));
    }

    #[test]
    fn test_response_serializes_id_as_hex_string() {
        let book = Book::new("a@x.com");
        let hex = book.id.unwrap().to_hex();

        let json = serde_json::to_value(BookResponse::from(book)).unwrap();
        assert_eq!(json["_id"], serde_json::json!(hex));
        assert!(json["created_at"].is_string());
    }

    #[test]
    fn test_genre_count_wire_shape() {
        let count = GenreCount {
            genre: "SF".to_string(),
            count: 3,
        };
        let json = serde_json::to_value(&count).unwrap();
        assert_eq!(json, serde_json::json!({"_id": "SF", "count": 3}));
    }
}
