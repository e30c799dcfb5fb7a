use actix_web::{
    Error, HttpMessage, Result,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{Ready, ready},
    rc::Rc,
};
use uuid::Uuid;

use crate::jwt::JwtService;
use crate::types::AuthError;

/// Author ID placed in the request extensions once a token is verified
#[derive(Debug, Clone, Copy)]
struct AuthorId(Uuid);

/// Marker placed in the request extensions when a token failed verification
#[derive(Debug, Clone, Copy)]
struct RejectedToken;

/// Middleware that verifies bearer tokens and records the authenticated author for
/// handlers.
///
/// Every request passes through. A request without a valid token reaches the
/// handler anonymously, so public routes serve it as usual and routes taking
/// [`AuthenticatedAuthor`] answer 401 (`missing_token` or `invalid_token`).
#[derive(Clone)]
pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    /// Creates the middleware around a shared token verifier
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt_service: self.jwt_service.clone(),
        }))
    }
}

/// Service that implements the authentication middleware logic
pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    jwt_service: JwtService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        let jwt_service = self.jwt_service.clone();

        Box::pin(async move {
            let token = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::to_string);

            if let Some(token) = token {
                match jwt_service.extract_author_id(&token) {
                    Ok(author_id) => {
                        req.extensions_mut().insert(AuthorId(author_id));
                    }
                    Err(e) => {
                        log::debug!("Treating {} {} as anonymous: {}", req.method(), req.path(), e);
                        req.extensions_mut().insert(RejectedToken);
                    }
                }
            }

            service.call(req).await
        })
    }
}

/// Custom extractor for the authenticated author ID
pub struct AuthenticatedAuthor(pub Uuid);

impl actix_web::FromRequest for AuthenticatedAuthor {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let extensions = req.extensions();

        ready(match extensions.get::<AuthorId>() {
            Some(AuthorId(id)) => Ok(AuthenticatedAuthor(*id)),
            None if extensions.get::<RejectedToken>().is_some() => {
                Err(AuthError::InvalidToken.into())
            }
            None => Err(AuthError::MissingToken.into()),
        })
    }
}
