//! Persistence seam. The command layer talks to these traits only; the
//! remote REST service ([`http::HttpStore`]) and the local SQLite database
//! ([`crate::db::Database`]) are interchangeable implementations.

pub(crate) mod http;

use thiserror::Error;

use crate::models::{Bill, Category};

#[derive(Debug, Error)]
pub(crate) enum RepoError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("{0} has no id; it must be created before it can be changed")]
    MissingId(&'static str),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("local storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub(crate) type RepoResult<T> = std::result::Result<T, RepoError>;

pub(crate) trait CategoryRepository {
    /// All categories owned by `user_id`.
    fn list(&self, user_id: i64) -> RepoResult<Vec<Category>>;
    /// Persist a new category and return it with its assigned id.
    fn create(&self, category: &Category) -> RepoResult<Category>;
    fn update(&self, category: &Category) -> RepoResult<Category>;
    fn delete(&self, id: i64) -> RepoResult<()>;
}

pub(crate) trait BillRepository {
    fn list_bills(&self, user_id: i64) -> RepoResult<Vec<Bill>>;
    fn create_bill(&self, bill: &Bill) -> RepoResult<Bill>;
    fn update_bill(&self, bill: &Bill) -> RepoResult<Bill>;
    fn delete_bill(&self, id: i64) -> RepoResult<()>;
}

/// Everything the command layer needs from a backend.
pub(crate) trait Store: CategoryRepository + BillRepository {
    /// Short label for status output, e.g. the database path or base URL.
    fn describe(&self) -> String;
}
