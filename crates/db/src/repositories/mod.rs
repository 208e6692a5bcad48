//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod comment_repo;
pub mod project_repo;
pub mod user_repo;

pub use comment_repo::CommentRepo;
pub use project_repo::ProjectRepo;
pub use user_repo::UserRepo;
