// connexion BD et création du schéma

use std::time::Duration;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};

use crate::config::DatabaseSettings;
use crate::models::{category, comment, genre, review, title, title_genre, users};

pub async fn establish_connection(settings: &DatabaseSettings) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(settings.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}

/// Crée les tables manquantes, dans l'ordre des clés étrangères
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let tables = [
        schema.create_table_from_entity(users::Entity),
        schema.create_table_from_entity(category::Entity),
        schema.create_table_from_entity(genre::Entity),
        schema.create_table_from_entity(title::Entity),
        schema.create_table_from_entity(title_genre::Entity),
        schema.create_table_from_entity(review::Entity),
        schema.create_table_from_entity(comment::Entity),
    ];
    for mut table in tables {
        table.if_not_exists();
        db.execute(backend.build(&table)).await?;
    }

    for mut index in schema.create_index_from_entity(title::Entity) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }

    // Une seule review par (auteur, titre)
    let unique_review = Index::create()
        .name("idx_review_author_title")
        .table(review::Entity)
        .col(review::Column::AuthorId)
        .col(review::Column::TitleId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&unique_review)).await?;

    tracing::info!(backend = ?backend, "Database schema ready");
    Ok(())
}
