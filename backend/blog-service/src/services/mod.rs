pub mod accounts;
pub mod comment_tree;
pub mod comments;
pub mod email;
pub mod media;
pub mod posts;

pub use accounts::AccountService;
pub use comments::CommentService;
pub use email::EmailService;
pub use media::{MediaStore, S3MediaStore};
pub use posts::PostService;
