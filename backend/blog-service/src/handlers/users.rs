/// Account handlers - signup, verification, login, profiles and follows
use crate::error::Result;
use crate::handlers::{created, ok, ApiResponse};
use crate::middleware::UserId;
use crate::models::{AccountProfile, LoginRequest, ProfileChanges, PublicAccount, SignupRequest};
use crate::services::accounts::VerifyOutcome;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct UserPayload<T: Serialize> {
    pub user: T,
}

#[derive(Debug, Serialize)]
pub struct UsersPayload {
    pub users: Vec<PublicAccount>,
}

#[derive(Debug, Serialize)]
pub struct FollowPayload {
    pub following: bool,
    pub followers_count: i64,
}

/// Register a new account
pub async fn signup(
    state: web::Data<AppState>,
    req: web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    let user = state.accounts.register(req.into_inner()).await?;
    Ok(created(
        "User Created Successfully. Check your email to verify your account",
        UserPayload { user },
    ))
}

pub async fn verify_email(
    state: web::Data<AppState>,
    token: web::Path<String>,
) -> Result<HttpResponse> {
    let message = match state.accounts.verify(&token).await? {
        VerifyOutcome::Verified => "Email verified successfully",
        VerifyOutcome::AlreadyVerified => "Email already verified",
    };
    Ok(HttpResponse::Ok().json(ApiResponse::message(message)))
}

pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let outcome = state.accounts.login(&req.email, &req.password).await?;
    Ok(ok("Login successful", outcome))
}

pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse> {
    let users = state.accounts.list().await?;
    Ok(ok("Users fetched successfully", UsersPayload { users }))
}

/// Public profile; the owner also sees lists they chose to hide
pub async fn get_user(
    state: web::Data<AppState>,
    viewer: Option<UserId>,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let user: AccountProfile = state
        .accounts
        .get_by_username(&username, viewer.map(|v| v.0))
        .await?;
    Ok(ok("User fetched successfully", UserPayload { user }))
}

pub async fn update_user(
    state: web::Data<AppState>,
    user_id: UserId,
    target: web::Path<Uuid>,
    req: web::Json<ProfileChanges>,
) -> Result<HttpResponse> {
    let user = state
        .accounts
        .update_profile(user_id.0, target.into_inner(), req.into_inner())
        .await?;
    Ok(ok("User updated successfully", UserPayload { user }))
}

pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: UserId,
    target: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.accounts.delete(user_id.0, target.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("User deleted successfully")))
}

pub async fn toggle_follow(
    state: web::Data<AppState>,
    user_id: UserId,
    target: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let outcome = state
        .accounts
        .toggle_follow(user_id.0, target.into_inner())
        .await?;

    let message = if outcome.active {
        "User followed"
    } else {
        "User unfollowed"
    };
    Ok(ok(
        message,
        FollowPayload {
            following: outcome.active,
            followers_count: outcome.count,
        },
    ))
}
