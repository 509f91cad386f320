/// HTTP middleware for blog-service
///
/// Bearer token resolution runs on every request under the API scope. Public
/// routes ignore the outcome; protected handlers take a [`UserId`] argument,
/// which turns a missing or rejected token into a 401.
use crate::error::AppError;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use crypto_core::jwt::{JwtManager, TokenKind};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

/// Authenticated caller, stored in request extensions after auth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// Marker left in request extensions when a bearer token was sent but rejected
#[derive(Debug, Clone, Copy)]
struct AuthFailure;

/// Actix middleware that validates `Authorization: Bearer` session tokens.
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    jwt: Arc<JwtManager>,
}

impl JwtAuthMiddleware {
    pub fn new(jwt: Arc<JwtManager>) -> Self {
        Self { jwt }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            jwt: self.jwt.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    jwt: Arc<JwtManager>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        if let Some(header) = req.headers().get("Authorization") {
            match resolve_bearer(&self.jwt, header.to_str().ok()) {
                Some(user_id) => {
                    req.extensions_mut().insert(UserId(user_id));
                }
                None => {
                    tracing::debug!(path = %req.path(), "bearer token rejected");
                    req.extensions_mut().insert(AuthFailure);
                }
            }
        }

        Box::pin(async move { service.call(req).await })
    }
}

/// Caller id of a valid session token, `None` for anything else
fn resolve_bearer(jwt: &JwtManager, header: Option<&str>) -> Option<Uuid> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }

    let claims = jwt.validate(token, TokenKind::Session).ok()?;
    claims.user_id().ok()
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let extensions = req.extensions();

        let result = match extensions.get::<UserId>() {
            Some(user_id) => Ok(*user_id),
            None if extensions.get::<AuthFailure>().is_some() => Err(AppError::InvalidToken.into()),
            None => Err(AppError::Unauthorized("Authentication required".to_string()).into()),
        };

        ready(result)
    }
}
