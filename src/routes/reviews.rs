use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::config::Settings;
use crate::error::ApiError;
use crate::middleware::{AuthUser, Requester};
use crate::models::dto::{PageParams, ReviewPayload, ReviewResponse};
use crate::permissions;
use crate::services::review_service::ReviewService;

#[derive(Debug, Deserialize)]
pub struct ReviewPath {
    pub title_id: i32,
    pub review_id: i32,
}

/// GET /v1/titles/{title_id}/reviews (PUBLIC)
#[get("")]
pub async fn list_reviews(
    path: web::Path<i32>,
    page: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    let reviews = ReviewService::list(db.get_ref(), path.into_inner(), &page, &settings.pagination).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// POST /v1/titles/{title_id}/reviews - Une seule review par titre et par auteur (PROTÉGÉE)
#[post("")]
pub async fn create_review(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ReviewPayload>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let review = ReviewService::create(db.get_ref(), path.into_inner(), &auth_user, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(review))
}

/// GET /v1/titles/{title_id}/reviews/{review_id} (PUBLIC)
#[get("/{review_id}")]
pub async fn get_review(
    path: web::Path<ReviewPath>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let review = ReviewService::get(db.get_ref(), path.title_id, path.review_id).await?;
    let response: ReviewResponse = ReviewService::to_response(db.get_ref(), review).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn update_review(
    requester: Requester,
    path: ReviewPath,
    payload: ReviewPayload,
    partial: bool,
    db: &DatabaseConnection,
) -> Result<HttpResponse, ApiError> {
    let access = requester.access;
    let requester = requester.user();

    // 1. Authentifié
    permissions::require(permissions::is_authenticated_or_read_only(requester, access), requester)?;

    // 2. La review existe sous ce titre
    let review = ReviewService::get(db, path.title_id, path.review_id).await?;

    // 3. Auteur, modérateur ou admin
    permissions::require(
        permissions::can_modify_authored(requester, review.author_id, access),
        requester,
    )?;

    let response = ReviewService::update(db, review, payload, partial).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// PATCH /v1/titles/{title_id}/reviews/{review_id} (AUTEUR / STAFF)
#[patch("/{review_id}")]
pub async fn patch_review(
    requester: Requester,
    path: web::Path<ReviewPath>,
    body: web::Json<ReviewPayload>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    update_review(requester, path.into_inner(), body.into_inner(), true, db.get_ref()).await
}

/// PUT /v1/titles/{title_id}/reviews/{review_id} (AUTEUR / STAFF)
#[put("/{review_id}")]
pub async fn put_review(
    requester: Requester,
    path: web::Path<ReviewPath>,
    body: web::Json<ReviewPayload>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    update_review(requester, path.into_inner(), body.into_inner(), false, db.get_ref()).await
}

/// DELETE /v1/titles/{title_id}/reviews/{review_id} - Supprime aussi les commentaires (AUTEUR / STAFF)
#[delete("/{review_id}")]
pub async fn delete_review(
    requester: Requester,
    path: web::Path<ReviewPath>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let access = requester.access;
    let requester = requester.user();
    permissions::require(permissions::is_authenticated_or_read_only(requester, access), requester)?;

    let review = ReviewService::get(db.get_ref(), path.title_id, path.review_id).await?;
    permissions::require(
        permissions::can_modify_authored(requester, review.author_id, access),
        requester,
    )?;

    ReviewService::delete(db.get_ref(), review.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn reviews_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/titles/{title_id}/reviews")
            .service(list_reviews)
            .service(create_review)
            .service(get_review)
            .service(patch_review)
            .service(put_review)
            .service(delete_review),
    );
}
