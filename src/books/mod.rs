//! # Books Module
//!
//! Owner-scoped book records: the resource layer of the service. Every
//! query and mutation is filtered by the owner email taken from the
//! caller's validated token.

pub mod model;
pub mod service;
pub mod store;

pub use model::{Book, BookPatch, BookResponse, BookStats, GenreCount};
pub use service::BookService;
pub use store::{BookStore, InMemoryBookStore};
