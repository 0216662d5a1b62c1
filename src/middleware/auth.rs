use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;

use crate::config::Settings;
use crate::error::ApiError;
use crate::models::users::{self, Role};
use crate::permissions::Access;
use crate::utils::jwt;

/// Utilisateur authentifié par son bearer token
/// Extracteur des routes protégées ; voir `Requester` pour les routes
/// ouvertes en lecture aux anonymes
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    /// Relu en base à chaque requête : un changement de rôle est immédiat
    pub role: Role,
}

/// Extrait le token du header "Authorization: Bearer <token>"
fn bearer_token(req: &HttpRequest) -> Result<String, ApiError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or(ApiError::NotAuthenticated)?;

    let value = header.to_str().map_err(|_| ApiError::NotAuthenticated)?;

    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::NotAuthenticated)
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let db = req.app_data::<web::Data<DatabaseConnection>>().cloned();
        let settings = req.app_data::<web::Data<Settings>>().cloned();

        Box::pin(async move {
            // 1. Token présent et bien formé
            let token = token?;

            let (db, settings) = match (db, settings) {
                (Some(db), Some(settings)) => (db, settings),
                _ => return Err(ApiError::Internal("application state not configured".to_string())),
            };

            // 2. Signature + expiration
            let claims = jwt::verify_token(&token, &settings.jwt).map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                ApiError::NotAuthenticated
            })?;

            // 3. L'utilisateur existe toujours
            let user = users::Entity::find_by_id(claims.sub)
                .one(db.get_ref())
                .await?
                .ok_or(ApiError::NotAuthenticated)?;

            Ok(AuthUser {
                id: user.id,
                username: user.username,
                role: user.role,
            })
        })
    }
}

/// Auteur d'une requête (anonyme si aucun token valide) et type d'accès
/// déduit de la méthode HTTP
#[derive(Debug, Clone)]
pub struct Requester {
    pub user: Option<AuthUser>,
    pub access: Access,
}

impl Requester {
    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }
}

impl FromRequest for Requester {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let access = Access::from(req.method());
        let user = AuthUser::from_request(req, payload);

        Box::pin(async move {
            // Seul un token absent ou invalide rend la requête anonyme :
            // une erreur de base reste une 500
            let user = match user.await {
                Ok(user) => Some(user),
                Err(ApiError::NotAuthenticated) => None,
                Err(e) => return Err(e),
            };

            Ok(Requester { user, access })
        })
    }
}
