use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Select};

use crate::config::PaginationSettings;
use crate::error::{ApiError, ApiResult};
use crate::models::dto::{Page, PageParams};

/// Taille de page demandée, bornée par la configuration
pub fn page_size(params: &PageParams, settings: &PaginationSettings) -> u64 {
    params
        .page_size
        .unwrap_or(settings.page_size)
        .min(settings.max_page_size)
        .max(1)
}

/// Pagination par numéro de page (1-based), format {count, next, previous, results}
pub async fn fetch_page<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    params: &PageParams,
    settings: &PaginationSettings,
) -> ApiResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let page_size = page_size(params, settings);
    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::NotFound("page"));
    }

    let paginator = select.paginate(db, page_size);
    let count = paginator.num_items().await?;

    // Une liste vide a quand même une page 1
    let pages = count.div_ceil(page_size).max(1);
    if page > pages {
        return Err(ApiError::NotFound("page"));
    }

    let results = paginator.fetch_page(page - 1).await?;

    Ok(Page {
        count,
        next: (page < pages).then_some(page + 1),
        previous: (page > 1).then(|| page - 1),
        results,
    })
}
