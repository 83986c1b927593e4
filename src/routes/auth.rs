use crate::{
    auth::{CredentialService, CredentialsRequest},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Credentials may arrive as JSON or as an urlencoded form.
type CredentialsBody = web::Either<web::Json<CredentialsRequest>, web::Form<CredentialsRequest>>;

/// Register a new user
///
/// Creates a new account and returns `201` with a token and the username.
#[post("/register")]
pub async fn register(
    credentials: web::Data<CredentialService>,
    body: CredentialsBody,
) -> Result<impl Responder, AppError> {
    let body = body.into_inner();
    let response = credentials.register(&body.username, &body.password).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Login user
///
/// Authenticates a user and returns a fresh token.
#[post("/login")]
pub async fn login(
    credentials: web::Data<CredentialService>,
    body: CredentialsBody,
) -> Result<impl Responder, AppError> {
    let body = body.into_inner();
    let response = credentials.login(&body.username, &body.password).await?;
    Ok(HttpResponse::Ok().json(response))
}
