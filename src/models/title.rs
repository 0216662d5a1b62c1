// ============================================================================
// MODÈLE : TITLE
// ============================================================================
//
// Description:
//   Une oeuvre notée (livre, film, ...). La note moyenne n'est PAS stockée :
//   elle est calculée à la lecture à partir des reviews.
//
// Colonnes de la table title:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - name (VARCHAR, UNIQUE, NOT NULL)
//   - year (INTEGER, NULL) - jamais dans le futur
//   - description (TEXT, NOT NULL, peut être vide)
//   - category_id (INTEGER, NULL, FK vers category)
//
// Points d'attention:
//   - ON DELETE SET NULL sur category_id : supprimer une catégorie garde
//     les titres
//   - Les genres passent par la table de jointure title_genre
//
// ============================================================================

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "title")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(indexed)]
    pub year: Option<i32>,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub category_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,

    #[sea_orm(has_many = "super::title_genre::Entity")]
    TitleGenre,

    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::title_genre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TitleGenre.def()
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::title_genre::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::title_genre::Relation::Title.def().rev())
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
