pub mod account;
pub mod comment;
pub mod post;

pub use account::*;
pub use comment::*;
pub use post::*;
