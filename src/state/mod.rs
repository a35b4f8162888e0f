/// State management module
///
/// This module handles the tagging session, including:
/// - Keyword string encoding and toggling (codec.rs)
/// - The vocabulary of known tags and their colors (vocabulary.rs)
/// - The ordered file catalog and its cursor (catalog.rs)
/// - Shared data structures (data.rs)
/// - The session controller tying them together (session.rs)

pub mod catalog;
pub mod codec;
pub mod data;
pub mod session;
pub mod vocabulary;

pub use catalog::{Advance, CatalogError, FileCatalog};
pub use data::{SessionView, TagState};
pub use session::{SessionController, SessionError};
