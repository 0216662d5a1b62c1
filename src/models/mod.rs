// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque entité correspond à une table avec SeaORM.
//
// Liste des modules:
//   - users : Utilisateurs, rôles (user/moderator/admin) et codes de confirmation
//   - category : Catégories des oeuvres (1 -> N title)
//   - genre : Genres (N <-> N title)
//   - title : Oeuvres notées
//   - title_genre : Table de jointure title <-> genre
//   - review : Critiques notées de 1 à 10
//   - comment : Commentaires sur une review
//   - dto : Payloads et réponses JSON de l'API
//   - health : Health check API
//
// Points d'attention:
//   - Tous les accès passent par SeaORM (pas de SQL brut)
//   - Les suppressions en cascade sont faites explicitement par les services,
//     dans une transaction (et déclarées en FK dans le schéma)
//
// ============================================================================

pub mod users;
pub mod category;
pub mod genre;
pub mod title;
pub mod title_genre;
pub mod review;
pub mod comment;
pub mod dto;
pub mod health;
