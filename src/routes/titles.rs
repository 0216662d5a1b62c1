use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::config::Settings;
use crate::error::ApiError;
use crate::middleware::Requester;
use crate::models::dto::{PageParams, TitleFilter, TitlePayload};
use crate::permissions;
use crate::services::title_service::TitleService;

fn require_admin_write(requester: &Requester) -> Result<(), ApiError> {
    permissions::require(
        permissions::is_admin_or_read_only(requester.user(), requester.access),
        requester.user(),
    )
}

/// GET /v1/titles - Liste filtrée par category, genre, name, year (PUBLIC)
#[get("")]
pub async fn list_titles(
    filter: web::Query<TitleFilter>,
    page: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    let titles = TitleService::list(db.get_ref(), &filter, &page, &settings.pagination).await?;
    Ok(HttpResponse::Ok().json(titles))
}

/// POST /v1/titles - genre et category par slug (ADMIN)
#[post("")]
pub async fn create_title(
    requester: Requester,
    body: web::Json<TitlePayload>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    require_admin_write(&requester)?;

    let title = TitleService::create(db.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(title))
}

/// GET /v1/titles/{title_id} (PUBLIC)
#[get("/{title_id}")]
pub async fn get_title(path: web::Path<i32>, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, ApiError> {
    let title = TitleService::get(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(title))
}

/// PATCH /v1/titles/{title_id} (ADMIN)
#[patch("/{title_id}")]
pub async fn patch_title(
    requester: Requester,
    path: web::Path<i32>,
    body: web::Json<TitlePayload>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    require_admin_write(&requester)?;

    let title = TitleService::update(db.get_ref(), path.into_inner(), body.into_inner(), true).await?;
    Ok(HttpResponse::Ok().json(title))
}

/// PUT /v1/titles/{title_id} (ADMIN)
#[put("/{title_id}")]
pub async fn put_title(
    requester: Requester,
    path: web::Path<i32>,
    body: web::Json<TitlePayload>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    require_admin_write(&requester)?;

    let title = TitleService::update(db.get_ref(), path.into_inner(), body.into_inner(), false).await?;
    Ok(HttpResponse::Ok().json(title))
}

/// DELETE /v1/titles/{title_id} - Supprime aussi reviews et commentaires (ADMIN)
#[delete("/{title_id}")]
pub async fn delete_title(
    requester: Requester,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    require_admin_write(&requester)?;

    TitleService::delete(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn titles_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/titles")
            .service(list_titles)
            .service(create_title)
            .service(get_title)
            .service(patch_title)
            .service(put_title)
            .service(delete_title),
    );
}
