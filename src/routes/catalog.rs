use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::config::Settings;
use crate::error::ApiError;
use crate::middleware::Requester;
use crate::models::dto::{PageParams, SearchParams, SlugEntryPayload};
use crate::permissions;
use crate::services::catalog_service::{CategoryService, GenreService};

fn require_admin_write(requester: &Requester) -> Result<(), ApiError> {
    permissions::require(
        permissions::is_admin_or_read_only(requester.user(), requester.access),
        requester.user(),
    )
}

// ============================================================================
// Catégories
// ============================================================================

/// GET /v1/categories - Liste, ?search= sur le nom (PUBLIC)
#[get("")]
pub async fn list_categories(
    search: web::Query<SearchParams>,
    page: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    let categories = CategoryService::list(db.get_ref(), &search, &page, &settings.pagination).await?;
    Ok(HttpResponse::Ok().json(categories))
}

/// POST /v1/categories (ADMIN)
#[post("")]
pub async fn create_category(
    requester: Requester,
    body: web::Json<SlugEntryPayload>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    require_admin_write(&requester)?;

    let category = CategoryService::create(db.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(category))
}

/// DELETE /v1/categories/{slug} - Les titres liés perdent leur catégorie (ADMIN)
#[delete("/{slug}")]
pub async fn delete_category(
    requester: Requester,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    require_admin_write(&requester)?;

    CategoryService::delete(db.get_ref(), &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ============================================================================
// Genres
// ============================================================================

/// GET /v1/genres - Liste, ?search= sur le nom (PUBLIC)
#[get("")]
pub async fn list_genres(
    search: web::Query<SearchParams>,
    page: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    let genres = GenreService::list(db.get_ref(), &search, &page, &settings.pagination).await?;
    Ok(HttpResponse::Ok().json(genres))
}

/// POST /v1/genres (ADMIN)
#[post("")]
pub async fn create_genre(
    requester: Requester,
    body: web::Json<SlugEntryPayload>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    require_admin_write(&requester)?;

    let genre = GenreService::create(db.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(genre))
}

/// DELETE /v1/genres/{slug} (ADMIN)
#[delete("/{slug}")]
pub async fn delete_genre(
    requester: Requester,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    require_admin_write(&requester)?;

    GenreService::delete(db.get_ref(), &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn categories_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/categories")
            .service(list_categories)
            .service(create_category)
            .service(delete_category),
    );
}

pub fn genres_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/genres")
            .service(list_genres)
            .service(create_genre)
            .service(delete_genre),
    );
}
