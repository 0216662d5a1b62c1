use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::config::Settings;
use crate::error::ApiError;
use crate::middleware::{AuthUser, Requester};
use crate::models::dto::{CommentPayload, PageParams};
use crate::permissions;
use crate::routes::reviews::ReviewPath;
use crate::services::comment_service::CommentService;

#[derive(Debug, Deserialize)]
pub struct CommentPath {
    pub title_id: i32,
    pub review_id: i32,
    pub comment_id: i32,
}

/// GET /v1/titles/{title_id}/reviews/{review_id}/comments (PUBLIC)
#[get("")]
pub async fn list_comments(
    path: web::Path<ReviewPath>,
    page: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    let comments = CommentService::list(
        db.get_ref(),
        path.title_id,
        path.review_id,
        &page,
        &settings.pagination,
    )
    .await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /v1/titles/{title_id}/reviews/{review_id}/comments (PROTÉGÉE)
#[post("")]
pub async fn create_comment(
    auth_user: AuthUser,
    path: web::Path<ReviewPath>,
    body: web::Json<CommentPayload>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let comment = CommentService::create(
        db.get_ref(),
        path.title_id,
        path.review_id,
        &auth_user,
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// GET /v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id} (PUBLIC)
#[get("/{comment_id}")]
pub async fn get_comment(
    path: web::Path<CommentPath>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let comment = CommentService::get(db.get_ref(), path.title_id, path.review_id, path.comment_id).await?;
    Ok(HttpResponse::Ok().json(CommentService::to_response(db.get_ref(), comment).await?))
}

async fn update_comment(
    requester: Requester,
    path: CommentPath,
    payload: CommentPayload,
    partial: bool,
    db: &DatabaseConnection,
) -> Result<HttpResponse, ApiError> {
    let access = requester.access;
    let requester = requester.user();
    permissions::require(permissions::is_authenticated_or_read_only(requester, access), requester)?;

    let comment = CommentService::get(db, path.title_id, path.review_id, path.comment_id).await?;
    permissions::require(
        permissions::can_modify_authored(requester, comment.author_id, access),
        requester,
    )?;

    let response = CommentService::update(db, comment, payload, partial).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// PATCH /v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id} (AUTEUR / STAFF)
#[patch("/{comment_id}")]
pub async fn patch_comment(
    requester: Requester,
    path: web::Path<CommentPath>,
    body: web::Json<CommentPayload>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    update_comment(requester, path.into_inner(), body.into_inner(), true, db.get_ref()).await
}

/// PUT /v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id} (AUTEUR / STAFF)
#[put("/{comment_id}")]
pub async fn put_comment(
    requester: Requester,
    path: web::Path<CommentPath>,
    body: web::Json<CommentPayload>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    update_comment(requester, path.into_inner(), body.into_inner(), false, db.get_ref()).await
}

/// DELETE /v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id} (AUTEUR / STAFF)
#[delete("/{comment_id}")]
pub async fn delete_comment(
    requester: Requester,
    path: web::Path<CommentPath>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let access = requester.access;
    let requester = requester.user();
    permissions::require(permissions::is_authenticated_or_read_only(requester, access), requester)?;

    let comment = CommentService::get(db.get_ref(), path.title_id, path.review_id, path.comment_id).await?;
    permissions::require(
        permissions::can_modify_authored(requester, comment.author_id, access),
        requester,
    )?;

    CommentService::delete(db.get_ref(), comment.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn comments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/titles/{title_id}/reviews/{review_id}/comments")
            .service(list_comments)
            .service(create_comment)
            .service(get_comment)
            .service(patch_comment)
            .service(put_comment)
            .service(delete_comment),
    );
}
