// ============================================================================
// SERVICE : REVIEWS
// ============================================================================
//
// Description:
//   Reviews d'un titre, toujours adressées par (title_id, review_id) : une
//   review d'un autre titre est un 404.
//
// Points d'attention:
//   - Une seule review par (auteur, titre) : vérifiée à la création pour
//     répondre 400 non_field_errors, garantie en base par l'index unique
//   - PATCH d'une review existante autorisé (pas de contrôle de doublon)
//   - pub_date fixée à la création, jamais modifiée
//
// ============================================================================

use chrono::Utc;
use sea_orm::*;

use crate::config::PaginationSettings;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::dto::{Page, PageParams, ReviewPayload, ReviewResponse};
use crate::models::{comment, review, title};
use crate::services::pagination::fetch_page;
use crate::services::user_service::UserService;

pub const DUPLICATE_REVIEW: &str = "You have already reviewed this title.";

pub struct ReviewService;

impl ReviewService {
    async fn ensure_title(db: &DatabaseConnection, title_id: i32) -> ApiResult<()> {
        title::Entity::find_by_id(title_id)
            .one(db)
            .await?
            .map(|_| ())
            .ok_or(ApiError::NotFound("title"))
    }

    pub async fn list(
        db: &DatabaseConnection,
        title_id: i32,
        page: &PageParams,
        settings: &PaginationSettings,
    ) -> ApiResult<Page<ReviewResponse>> {
        Self::ensure_title(db, title_id).await?;

        let select = review::Entity::find()
            .filter(review::Column::TitleId.eq(title_id))
            .order_by_desc(review::Column::PubDate)
            .order_by_desc(review::Column::Id);

        let page = fetch_page(db, select, page, settings).await?;
        let authors = UserService::usernames(db, page.results.iter().map(|r| r.author_id)).await?;

        Ok(page.map(|r| {
            let author = authors.get(&r.author_id).cloned().unwrap_or_default();
            ReviewResponse::new(r, author)
        }))
    }

    /// Review `review_id` du titre `title_id`
    pub async fn get(db: &DatabaseConnection, title_id: i32, review_id: i32) -> ApiResult<review::Model> {
        Self::ensure_title(db, title_id).await?;

        review::Entity::find_by_id(review_id)
            .filter(review::Column::TitleId.eq(title_id))
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("review"))
    }

    pub async fn to_response(db: &DatabaseConnection, found: review::Model) -> ApiResult<ReviewResponse> {
        let author = UserService::usernames(db, [found.author_id])
            .await?
            .remove(&found.author_id)
            .unwrap_or_default();

        Ok(ReviewResponse::new(found, author))
    }

    pub async fn create(
        db: &DatabaseConnection,
        title_id: i32,
        author: &AuthUser,
        payload: ReviewPayload,
    ) -> ApiResult<ReviewResponse> {
        // 1. Titre existant
        Self::ensure_title(db, title_id).await?;

        // 2. Payload valide
        payload.check(true)?;

        // 3. Pas de seconde review du même auteur
        let already_reviewed = review::Entity::find()
            .filter(review::Column::TitleId.eq(title_id))
            .filter(review::Column::AuthorId.eq(author.id))
            .count(db)
            .await?
            > 0;
        if already_reviewed {
            return Err(ApiError::non_field(DUPLICATE_REVIEW));
        }

        // 4. Insertion (l'index unique couvre une éventuelle course)
        let created = review::ActiveModel {
            author_id: Set(author.id),
            title_id: Set(title_id),
            text: Set(payload.text.unwrap_or_default()),
            score: Set(payload.score.unwrap_or_default()),
            pub_date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::non_field(DUPLICATE_REVIEW),
            other => other,
        })?;

        tracing::info!(review_id = created.id, title_id, author_id = author.id, score = created.score, "Review created");
        Ok(ReviewResponse::new(created, author.username.clone()))
    }

    pub async fn update(
        db: &DatabaseConnection,
        existing: review::Model,
        payload: ReviewPayload,
        partial: bool,
    ) -> ApiResult<ReviewResponse> {
        payload.check(!partial)?;

        let mut active: review::ActiveModel = existing.clone().into();
        if let Some(text) = payload.text {
            active.text = Set(text);
        }
        if let Some(score) = payload.score {
            active.score = Set(score);
        }

        let updated = if active.is_changed() {
            active.update(db).await?
        } else {
            existing
        };

        tracing::info!(review_id = updated.id, "Review updated");
        Self::to_response(db, updated).await
    }

    /// Supprime la review et ses commentaires
    pub async fn delete(db: &DatabaseConnection, review_id: i32) -> ApiResult<()> {
        let txn = db.begin().await?;

        let comments = comment::Entity::delete_many()
            .filter(comment::Column::ReviewId.eq(review_id))
            .exec(&txn)
            .await?;

        review::Entity::delete_by_id(review_id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(review_id, comments_deleted = comments.rows_affected, "Review deleted");
        Ok(())
    }
}
