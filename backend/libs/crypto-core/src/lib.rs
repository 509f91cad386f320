//! Credential primitives shared by the blog services.
//!
//! - [`jwt`]: signed session and email-verification tokens
//! - [`password`]: Argon2id password hashing

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtManager, TokenKind};
pub use password::{hash_password, verify_password, PasswordError};
