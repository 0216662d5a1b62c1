use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::config::Settings;
use crate::error::ApiError;
use crate::middleware::{AuthUser, Requester};
use crate::models::dto::{PageParams, SearchParams, UserPayload, UserResponse};
use crate::permissions;
use crate::services::user_service::UserService;

fn require_admin(requester: &Requester) -> Result<(), ApiError> {
    permissions::require(permissions::is_admin(requester.user()), requester.user())
}

/// GET /v1/users - Liste des utilisateurs, ?search= sur le username (ADMIN)
#[get("")]
pub async fn list_users(
    requester: Requester,
    search: web::Query<SearchParams>,
    page: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&requester)?;

    let users = UserService::list(db.get_ref(), &search, &page, &settings.pagination).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// POST /v1/users - Créer un utilisateur (ADMIN)
#[post("")]
pub async fn create_user(
    requester: Requester,
    body: web::Json<UserPayload>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&requester)?;

    let user = UserService::create(db.get_ref(), body.into_inner(), &settings.password_policy).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// GET /v1/users/me - Profil de l'utilisateur connecté (PROTÉGÉE)
#[get("/me")]
pub async fn get_me(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, ApiError> {
    let user = UserService::get_by_id(db.get_ref(), auth_user.id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// PATCH /v1/users/me - Modifier son profil ; "role" ignoré hors admin (PROTÉGÉE)
#[patch("/me")]
pub async fn update_me(
    auth_user: AuthUser,
    body: web::Json<UserPayload>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    let user = UserService::get_by_id(db.get_ref(), auth_user.id).await?;
    let allow_role = UserService::may_change_own_role(auth_user.role);

    let updated = UserService::update(
        db.get_ref(),
        user,
        body.into_inner(),
        true,
        allow_role,
        &settings.password_policy,
    )
    .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

/// GET /v1/users/{username} (ADMIN)
#[get("/{username}")]
pub async fn get_user(
    requester: Requester,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&requester)?;

    let user = UserService::get_by_username(db.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

async fn update_user(
    requester: Requester,
    username: &str,
    payload: UserPayload,
    partial: bool,
    db: &DatabaseConnection,
    settings: &Settings,
) -> Result<HttpResponse, ApiError> {
    require_admin(&requester)?;

    let user = UserService::get_by_username(db, username).await?;
    let updated = UserService::update(db, user, payload, partial, true, &settings.password_policy).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

/// PATCH /v1/users/{username} - Modification partielle (ADMIN)
#[patch("/{username}")]
pub async fn patch_user(
    requester: Requester,
    path: web::Path<String>,
    body: web::Json<UserPayload>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    update_user(requester, &path, body.into_inner(), true, db.get_ref(), &settings).await
}

/// PUT /v1/users/{username} - Remplacement, username et email requis (ADMIN)
#[put("/{username}")]
pub async fn put_user(
    requester: Requester,
    path: web::Path<String>,
    body: web::Json<UserPayload>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    update_user(requester, &path, body.into_inner(), false, db.get_ref(), &settings).await
}

/// DELETE /v1/users/{username} (ADMIN)
#[delete("/{username}")]
pub async fn delete_user(
    requester: Requester,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&requester)?;

    UserService::delete(db.get_ref(), &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn users_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(list_users)
            .service(create_user)
            // "/me" avant "/{username}"
            .service(get_me)
            .service(update_me)
            .service(get_user)
            .service(patch_user)
            .service(put_user)
            .service(delete_user),
    );
}
