// ============================================================================
// SERVICE : GENRES ET CATÉGORIES
// ============================================================================
//
// Description:
//   Données de référence adressées par slug. Seulement list / create /
//   delete : pas de lecture unitaire ni de modification.
//
// Points d'attention:
//   - Supprimer une catégorie met title.category_id à NULL (les titres
//     restent)
//   - Supprimer un genre retire seulement les liens title_genre
//
// ============================================================================

use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::config::PaginationSettings;
use crate::error::{ApiError, ApiResult};
use crate::models::dto::{Page, PageParams, SearchParams, SlugEntry, SlugEntryPayload};
use crate::models::{category, genre, title, title_genre};
use crate::services::pagination::fetch_page;
use crate::services::search::icontains;

fn search_term(search: &SearchParams) -> Option<&str> {
    search.search.as_deref().map(str::trim).filter(|term| !term.is_empty())
}

pub struct CategoryService;

impl CategoryService {
    pub async fn list(
        db: &DatabaseConnection,
        search: &SearchParams,
        page: &PageParams,
        settings: &PaginationSettings,
    ) -> ApiResult<Page<SlugEntry>> {
        let mut select = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .order_by_asc(category::Column::Id);

        if let Some(term) = search_term(search) {
            select = select.filter(icontains((category::Entity, category::Column::Name), term));
        }

        Ok(fetch_page(db, select, page, settings).await?.map(SlugEntry::from))
    }

    pub async fn create(db: &DatabaseConnection, payload: SlugEntryPayload) -> ApiResult<SlugEntry> {
        payload.check()?;

        let created = category::ActiveModel {
            name: Set(payload.name),
            slug: Set(payload.slug),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(slug = %created.slug, "Category created");
        Ok(created.into())
    }

    pub async fn delete(db: &DatabaseConnection, slug: &str) -> ApiResult<()> {
        let txn = db.begin().await?;

        let category = category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&txn)
            .await?
            .ok_or(ApiError::NotFound("category"))?;

        // 1. Détacher les titres
        let detached = title::Entity::update_many()
            .col_expr(title::Column::CategoryId, Expr::value(Option::<i32>::None))
            .filter(title::Column::CategoryId.eq(category.id))
            .exec(&txn)
            .await?;

        // 2. Supprimer la catégorie
        category::Entity::delete_by_id(category.id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(slug = %slug, titles_detached = detached.rows_affected, "Category deleted");
        Ok(())
    }
}

pub struct GenreService;

impl GenreService {
    pub async fn list(
        db: &DatabaseConnection,
        search: &SearchParams,
        page: &PageParams,
        settings: &PaginationSettings,
    ) -> ApiResult<Page<SlugEntry>> {
        let mut select = genre::Entity::find()
            .order_by_asc(genre::Column::Name)
            .order_by_asc(genre::Column::Id);

        if let Some(term) = search_term(search) {
            select = select.filter(icontains((genre::Entity, genre::Column::Name), term));
        }

        Ok(fetch_page(db, select, page, settings).await?.map(SlugEntry::from))
    }

    pub async fn create(db: &DatabaseConnection, payload: SlugEntryPayload) -> ApiResult<SlugEntry> {
        payload.check()?;

        let created = genre::ActiveModel {
            name: Set(payload.name),
            slug: Set(payload.slug),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(slug = %created.slug, "Genre created");
        Ok(created.into())
    }

    pub async fn delete(db: &DatabaseConnection, slug: &str) -> ApiResult<()> {
        let txn = db.begin().await?;

        let genre = genre::Entity::find()
            .filter(genre::Column::Slug.eq(slug))
            .one(&txn)
            .await?
            .ok_or(ApiError::NotFound("genre"))?;

        title_genre::Entity::delete_many()
            .filter(title_genre::Column::GenreId.eq(genre.id))
            .exec(&txn)
            .await?;

        genre::Entity::delete_by_id(genre.id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(slug = %slug, "Genre deleted");
        Ok(())
    }
}
