use chrono::Utc;
use sea_orm::*;

use crate::config::PaginationSettings;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::comment;
use crate::models::dto::{CommentPayload, CommentResponse, Page, PageParams};
use crate::services::pagination::fetch_page;
use crate::services::review_service::ReviewService;
use crate::services::user_service::UserService;

/// Commentaires d'une review, adressés par (title_id, review_id, comment_id)
pub struct CommentService;

impl CommentService {
    pub async fn list(
        db: &DatabaseConnection,
        title_id: i32,
        review_id: i32,
        page: &PageParams,
        settings: &PaginationSettings,
    ) -> ApiResult<Page<CommentResponse>> {
        ReviewService::get(db, title_id, review_id).await?;

        let select = comment::Entity::find()
            .filter(comment::Column::ReviewId.eq(review_id))
            .order_by_desc(comment::Column::PubDate)
            .order_by_desc(comment::Column::Id);

        let page = fetch_page(db, select, page, settings).await?;
        let authors = UserService::usernames(db, page.results.iter().map(|c| c.author_id)).await?;

        Ok(page.map(|c| {
            let author = authors.get(&c.author_id).cloned().unwrap_or_default();
            CommentResponse::new(c, author)
        }))
    }

    pub async fn get(
        db: &DatabaseConnection,
        title_id: i32,
        review_id: i32,
        comment_id: i32,
    ) -> ApiResult<comment::Model> {
        ReviewService::get(db, title_id, review_id).await?;

        comment::Entity::find_by_id(comment_id)
            .filter(comment::Column::ReviewId.eq(review_id))
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("comment"))
    }

    pub async fn to_response(db: &DatabaseConnection, found: comment::Model) -> ApiResult<CommentResponse> {
        let author = UserService::usernames(db, [found.author_id])
            .await?
            .remove(&found.author_id)
            .unwrap_or_default();

        Ok(CommentResponse::new(found, author))
    }

    pub async fn create(
        db: &DatabaseConnection,
        title_id: i32,
        review_id: i32,
        author: &AuthUser,
        payload: CommentPayload,
    ) -> ApiResult<CommentResponse> {
        ReviewService::get(db, title_id, review_id).await?;
        payload.check(true)?;

        let created = comment::ActiveModel {
            author_id: Set(author.id),
            review_id: Set(review_id),
            text: Set(payload.text.unwrap_or_default()),
            pub_date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(comment_id = created.id, review_id, author_id = author.id, "Comment created");
        Ok(CommentResponse::new(created, author.username.clone()))
    }

    pub async fn update(
        db: &DatabaseConnection,
        existing: comment::Model,
        payload: CommentPayload,
        partial: bool,
    ) -> ApiResult<CommentResponse> {
        payload.check(!partial)?;

        let updated = match payload.text {
            Some(text) => {
                let mut active: comment::ActiveModel = existing.into();
                active.text = Set(text);
                active.update(db).await?
            }
            None => existing,
        };

        Self::to_response(db, updated).await
    }

    pub async fn delete(db: &DatabaseConnection, comment_id: i32) -> ApiResult<()> {
        comment::Entity::delete_by_id(comment_id).exec(db).await?;

        tracing::info!(comment_id, "Comment deleted");
        Ok(())
    }
}
