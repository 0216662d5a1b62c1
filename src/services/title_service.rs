// ============================================================================
// SERVICE : TITLES
// ============================================================================
//
// Description:
//   CRUD des oeuvres. En écriture, genre et catégorie arrivent sous forme de
//   slugs et sont résolus en ids ; en lecture ils sont développés en objets
//   {name, slug} et la note moyenne (rating) est ajoutée.
//
// Points d'attention:
//   - rating = SUM(score) / COUNT(*) des reviews, calculé en une requête
//     groupée par page de titres (pas de N+1)
//   - Écritures title + title_genre dans une seule transaction
//   - Supprimer un titre supprime ses reviews et leurs commentaires
//
// ============================================================================

use std::collections::{BTreeSet, HashMap};

use sea_orm::sea_query::{Expr, Query};
use sea_orm::*;

use crate::config::PaginationSettings;
use crate::error::{ApiError, ApiResult};
use crate::models::dto::{Page, PageParams, SlugEntry, TitleFilter, TitlePayload, TitleResponse};
use crate::models::{category, comment, genre, review, title, title_genre};
use crate::services::pagination::fetch_page;
use crate::services::search::icontains;

/// Somme et nombre de notes d'un titre
#[derive(Debug, FromQueryResult)]
struct ScoreTotals {
    title_id: i32,
    total: Option<i64>,
    reviews: i64,
}

/// Moyenne arithmétique, absente sans review
pub fn mean_score(total: i64, reviews: i64) -> Option<f64> {
    (reviews > 0).then(|| total as f64 / reviews as f64)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub struct TitleService;

impl TitleService {
    /// GET /v1/titles - filtres category, genre, name, year
    pub async fn list(
        db: &DatabaseConnection,
        filter: &TitleFilter,
        page: &PageParams,
        settings: &PaginationSettings,
    ) -> ApiResult<Page<TitleResponse>> {
        let mut select = title::Entity::find()
            .order_by_desc(title::Column::Year)
            .order_by_asc(title::Column::Id);

        if let Some(slug) = non_empty(&filter.category) {
            select = select.filter(
                title::Column::CategoryId.in_subquery(
                    Query::select()
                        .column(category::Column::Id)
                        .from(category::Entity)
                        .and_where(category::Column::Slug.eq(slug))
                        .to_owned(),
                ),
            );
        }

        if let Some(slug) = non_empty(&filter.genre) {
            select = select.filter(
                title::Column::Id.in_subquery(
                    Query::select()
                        .column(title_genre::Column::TitleId)
                        .from(title_genre::Entity)
                        .and_where(
                            title_genre::Column::GenreId.in_subquery(
                                Query::select()
                                    .column(genre::Column::Id)
                                    .from(genre::Entity)
                                    .and_where(genre::Column::Slug.eq(slug))
                                    .to_owned(),
                            ),
                        )
                        .to_owned(),
                ),
            );
        }

        if let Some(name) = non_empty(&filter.name) {
            select = select.filter(icontains((title::Entity, title::Column::Name), name));
        }

        if let Some(year) = filter.year {
            select = select.filter(title::Column::Year.eq(year));
        }

        let Page {
            count,
            next,
            previous,
            results,
        } = fetch_page(db, select, page, settings).await?;

        Ok(Page {
            count,
            next,
            previous,
            results: Self::hydrate(db, results).await?,
        })
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> ApiResult<TitleResponse> {
        let found = title::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("title"))?;

        Self::hydrate_one(db, found).await
    }

    pub async fn create(db: &DatabaseConnection, payload: TitlePayload) -> ApiResult<TitleResponse> {
        payload.check(true)?;

        let txn = db.begin().await?;

        // 1. Résoudre les slugs
        let category_id = Self::resolve_category(&txn, payload.category.flatten()).await?;
        let genre_ids = Self::resolve_genres(&txn, payload.genre.as_deref().unwrap_or_default()).await?;

        // 2. Créer le titre
        let created = title::ActiveModel {
            name: Set(payload.name.unwrap_or_default()),
            year: Set(payload.year.flatten()),
            description: Set(payload.description.unwrap_or_default()),
            category_id: Set(category_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // 3. Lier les genres
        Self::replace_genres(&txn, created.id, &genre_ids).await?;

        let response = Self::hydrate_one(&txn, created).await?;
        txn.commit().await?;

        tracing::info!(title_id = response.id, name = %response.name, "Title created");
        Ok(response)
    }

    /// PATCH (partial = true) ou PUT
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        payload: TitlePayload,
        partial: bool,
    ) -> ApiResult<TitleResponse> {
        payload.check(!partial)?;

        let txn = db.begin().await?;

        let existing = title::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ApiError::NotFound("title"))?;

        let mut active: title::ActiveModel = existing.clone().into();

        if let Some(name) = payload.name {
            active.name = Set(name);
        }

        if partial {
            if let Some(year) = payload.year {
                active.year = Set(year);
            }
            if let Some(description) = payload.description {
                active.description = Set(description);
            }
            if let Some(category) = payload.category {
                active.category_id = Set(Self::resolve_category(&txn, category).await?);
            }
        } else {
            // PUT : les champs absents reprennent leur valeur par défaut
            active.year = Set(payload.year.flatten());
            active.description = Set(payload.description.unwrap_or_default());
            active.category_id = Set(Self::resolve_category(&txn, payload.category.flatten()).await?);
        }

        let genre_slugs = match (payload.genre, partial) {
            (Some(slugs), _) => Some(slugs),
            (None, false) => Some(Vec::new()),
            (None, true) => None,
        };
        if let Some(slugs) = genre_slugs {
            let genre_ids = Self::resolve_genres(&txn, &slugs).await?;
            Self::replace_genres(&txn, id, &genre_ids).await?;
        }

        let updated = if active.is_changed() {
            active.update(&txn).await?
        } else {
            existing
        };

        let response = Self::hydrate_one(&txn, updated).await?;
        txn.commit().await?;

        tracing::info!(title_id = id, "Title updated");
        Ok(response)
    }

    /// Supprime le titre, ses reviews et leurs commentaires
    pub async fn delete(db: &DatabaseConnection, id: i32) -> ApiResult<()> {
        let txn = db.begin().await?;

        title::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ApiError::NotFound("title"))?;

        // 1. Commentaires des reviews du titre
        let comments = comment::Entity::delete_many()
            .filter(
                comment::Column::ReviewId.in_subquery(
                    Query::select()
                        .column(review::Column::Id)
                        .from(review::Entity)
                        .and_where(review::Column::TitleId.eq(id))
                        .to_owned(),
                ),
            )
            .exec(&txn)
            .await?;

        // 2. Reviews
        let reviews = review::Entity::delete_many()
            .filter(review::Column::TitleId.eq(id))
            .exec(&txn)
            .await?;

        // 3. Liens vers les genres puis le titre
        title_genre::Entity::delete_many()
            .filter(title_genre::Column::TitleId.eq(id))
            .exec(&txn)
            .await?;
        title::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            title_id = id,
            reviews_deleted = reviews.rows_affected,
            comments_deleted = comments.rows_affected,
            "Title deleted"
        );
        Ok(())
    }

    /// Slug de catégorie -> id (None = pas de catégorie)
    async fn resolve_category<C: ConnectionTrait>(db: &C, slug: Option<String>) -> ApiResult<Option<i32>> {
        let Some(slug) = slug else {
            return Ok(None);
        };

        category::Entity::find()
            .filter(category::Column::Slug.eq(slug.as_str()))
            .one(db)
            .await?
            .map(|found| Some(found.id))
            .ok_or_else(|| ApiError::field("category", format!("Object with slug={slug} does not exist.")))
    }

    /// Slugs de genres -> ids, erreur sur le premier slug inconnu
    async fn resolve_genres<C: ConnectionTrait>(db: &C, slugs: &[String]) -> ApiResult<Vec<i32>> {
        let wanted: BTreeSet<&str> = slugs.iter().map(String::as_str).collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let found = genre::Entity::find()
            .filter(genre::Column::Slug.is_in(wanted.iter().copied()))
            .all(db)
            .await?;

        if let Some(missing) = wanted
            .iter()
            .find(|slug| !found.iter().any(|g| g.slug == **slug))
        {
            return Err(ApiError::field(
                "genre",
                format!("Object with slug={missing} does not exist."),
            ));
        }

        Ok(found.into_iter().map(|g| g.id).collect())
    }

    async fn replace_genres<C: ConnectionTrait>(db: &C, title_id: i32, genre_ids: &[i32]) -> ApiResult<()> {
        title_genre::Entity::delete_many()
            .filter(title_genre::Column::TitleId.eq(title_id))
            .exec(db)
            .await?;

        if genre_ids.is_empty() {
            return Ok(());
        }

        let links = genre_ids.iter().map(|genre_id| title_genre::ActiveModel {
            title_id: Set(title_id),
            genre_id: Set(*genre_id),
        });
        title_genre::Entity::insert_many(links)
            .exec_without_returning(db)
            .await?;

        Ok(())
    }

    /// Notes moyennes des titres donnés (titres sans review absents de la map)
    pub async fn ratings<C: ConnectionTrait>(db: &C, title_ids: &[i32]) -> ApiResult<HashMap<i32, f64>> {
        let rows = review::Entity::find()
            .select_only()
            .column(review::Column::TitleId)
            .column_as(Expr::col((review::Entity, review::Column::Score)).sum(), "total")
            .column_as(Expr::col((review::Entity, review::Column::Id)).count(), "reviews")
            .filter(review::Column::TitleId.is_in(title_ids.iter().copied()))
            .group_by(review::Column::TitleId)
            .into_model::<ScoreTotals>()
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                mean_score(row.total.unwrap_or(0), row.reviews).map(|rating| (row.title_id, rating))
            })
            .collect())
    }

    async fn hydrate_one<C: ConnectionTrait>(db: &C, found: title::Model) -> ApiResult<TitleResponse> {
        Self::hydrate(db, vec![found])
            .await?
            .pop()
            .ok_or_else(|| ApiError::Internal("title hydration returned nothing".to_string()))
    }

    /// Modèles -> réponses : genres, catégorie et note en 3 requêtes
    async fn hydrate<C: ConnectionTrait>(db: &C, titles: Vec<title::Model>) -> ApiResult<Vec<TitleResponse>> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = titles.iter().map(|t| t.id).collect();

        // 1. Genres
        let links = title_genre::Entity::find()
            .filter(title_genre::Column::TitleId.is_in(ids.iter().copied()))
            .find_also_related(genre::Entity)
            .order_by_asc(genre::Column::Name)
            .all(db)
            .await?;

        let mut genres: HashMap<i32, Vec<SlugEntry>> = HashMap::new();
        for (link, linked_genre) in links {
            if let Some(linked_genre) = linked_genre {
                genres.entry(link.title_id).or_default().push(linked_genre.into());
            }
        }

        // 2. Catégories
        let category_ids: BTreeSet<i32> = titles.iter().filter_map(|t| t.category_id).collect();
        let categories: HashMap<i32, SlugEntry> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            category::Entity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|c| (c.id, c.into()))
                .collect()
        };

        // 3. Notes
        let ratings = Self::ratings(db, &ids).await?;

        Ok(titles
            .into_iter()
            .map(|t| TitleResponse {
                id: t.id,
                rating: ratings.get(&t.id).copied(),
                genre: genres.remove(&t.id).unwrap_or_default(),
                category: t.category_id.and_then(|id| categories.get(&id).cloned()),
                name: t.name,
                year: t.year,
                description: t.description,
            })
            .collect())
    }
}
