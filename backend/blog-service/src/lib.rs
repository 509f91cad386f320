/// Blog Service Library
///
/// Accounts, posts and threaded comments for the blogging platform, served
/// over a JSON REST API with bearer-token access control.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and the response envelope
/// - `models`: Data structures for accounts, posts, comments
/// - `services`: Business logic layer, media relay and mailer
/// - `db`: Repository traits and their Postgres implementations
/// - `middleware`: Bearer token resolution
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use crate::db::{AccountRepository, CommentRepository, PostRepository};
use crate::middleware::JwtAuthMiddleware;
use crate::services::{AccountService, CommentService, EmailService, MediaStore, PostService};
use actix_multipart::form::MultipartFormConfig;
use actix_web::web;
use crypto_core::JwtManager;
use std::sync::Arc;

/// Multipart bodies may carry a thumbnail plus several inline images
const MAX_FILES_PER_FORM: usize = 8;

/// Shared request state: one service per resource plus the token manager
pub struct AppState {
    pub accounts: AccountService,
    pub posts: PostService,
    pub comments: CommentService,
    pub jwt: Arc<JwtManager>,
    /// Per-file upload limit in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        media: Arc<dyn MediaStore>,
        email: Arc<EmailService>,
        jwt: Arc<JwtManager>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            accounts: AccountService::new(
                accounts.clone(),
                posts.clone(),
                media.clone(),
                email,
                jwt.clone(),
            ),
            posts: PostService::new(posts.clone(), accounts, comments.clone(), media),
            comments: CommentService::new(comments, posts),
            jwt,
            max_upload_bytes,
        }
    }
}

/// Register state, extractor configuration and every `/api/v1` route
pub fn configure(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let jwt = state.jwt.clone();
        let form_limit = state.max_upload_bytes.saturating_mul(MAX_FILES_PER_FORM);

        cfg.app_data(state)
            .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
            .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
            .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
            .app_data(
                MultipartFormConfig::default()
                    .memory_limit(form_limit)
                    .total_limit(form_limit)
                    .error_handler(|err, _req| {
                        AppError::Validation(format!("Invalid multipart body: {}", err)).into()
                    }),
            )
            .service(
                web::scope("/api/v1")
                    .wrap(JwtAuthMiddleware::new(jwt))
                    // Accounts
                    .route("/signup", web::post().to(handlers::signup))
                    .route("/verify-email/{token}", web::get().to(handlers::verify_email))
                    .route("/login", web::post().to(handlers::login))
                    .route("/users", web::get().to(handlers::list_users))
                    .route("/users/follow/{id}", web::post().to(handlers::toggle_follow))
                    .service(
                        web::resource("/users/{key}")
                            .route(web::get().to(handlers::get_user))
                            .route(web::put().to(handlers::update_user))
                            .route(web::delete().to(handlers::delete_user)),
                    )
                    // Posts
                    .service(
                        web::resource("/blogs")
                            .route(web::post().to(handlers::create_post))
                            .route(web::get().to(handlers::list_posts)),
                    )
                    .route("/blogs/user", web::get().to(handlers::list_own_posts))
                    .route("/blogs/like/{slug}", web::post().to(handlers::like_post))
                    .route("/save-blog/{slug}", web::patch().to(handlers::save_post))
                    .route("/upload-image", web::post().to(handlers::upload_image))
                    // Comments
                    .service(
                        web::resource("/blogs/comment/{id}")
                            .route(web::post().to(handlers::add_comment))
                            .route(web::get().to(handlers::list_comments))
                            .route(web::delete().to(handlers::delete_comment)),
                    )
                    .route(
                        "/blogs/edit-comment/{id}",
                        web::put().to(handlers::edit_comment),
                    )
                    .route(
                        "/blogs/like-comment/{id}",
                        web::patch().to(handlers::like_comment),
                    )
                    .route(
                        "/comment/{parent_id}/{post_id}",
                        web::post().to(handlers::add_reply),
                    )
                    .service(
                        web::resource("/blogs/{slug}")
                            .route(web::get().to(handlers::get_post))
                            .route(web::put().to(handlers::update_post))
                            .route(web::delete().to(handlers::delete_post)),
                    ),
            );
    }
}
