// ============================================================================
// MODÈLE : REVIEW
// ============================================================================
//
// Colonnes de la table review:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - author_id (INTEGER, NOT NULL, FK vers users)
//   - title_id (INTEGER, NOT NULL, FK vers title)
//   - text (TEXT, NOT NULL)
//   - score (INTEGER, NOT NULL) - entre 1 et 10
//   - pub_date (TIMESTAMP, NOT NULL) - fixée à la création
//
// Points d'attention:
//   - UNIQUE (author_id, title_id) : une seule review par auteur et par titre
//     (index créé par db::create_schema)
//   - ON DELETE CASCADE depuis users et title
//
// ============================================================================

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub author_id: i32,

    pub title_id: i32,

    #[sea_orm(column_type = "Text")]
    pub text: String,

    pub score: i32,

    pub pub_date: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(
        belongs_to = "super::title::Entity",
        from = "Column::TitleId",
        to = "super::title::Column::Id",
        on_delete = "Cascade"
    )]
    Title,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::title::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Title.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
