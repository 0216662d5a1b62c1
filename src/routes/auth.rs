use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::config::Settings;
use crate::error::ApiError;
use crate::mailer::Mailer;
use crate::models::dto::{RegistrationRequest, TokenRequest};
use crate::services::auth_service::AuthService;

/// POST /v1/auth/email - Inscription, envoie un code de confirmation (PUBLIC)
#[post("/email")]
pub async fn register(
    body: web::Json<RegistrationRequest>,
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<dyn Mailer>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    let registered = AuthService::register(db.get_ref(), mailer.get_ref(), &settings, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(registered))
}

/// POST /v1/auth/token - Échange (email, confirmation_code) contre un JWT (PUBLIC)
#[post("/token")]
pub async fn token(
    body: web::Json<TokenRequest>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    let token = AuthService::issue_token(db.get_ref(), &settings, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(token))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(token),
    );
}
