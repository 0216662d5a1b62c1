pub mod auth;
pub mod catalog;
pub mod comments;
pub mod health;
pub mod reviews;
pub mod titles;
pub mod users;

use actix_web::web;

use crate::error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health_check).service(
        web::scope("/v1")
            .configure(auth::auth_routes)
            .configure(users::users_routes)
            .configure(catalog::categories_routes)
            .configure(catalog::genres_routes)
            // Du préfixe le plus long au plus court : un scope qui matche ne
            // rend pas la main aux suivants
            .configure(comments::comments_routes)
            .configure(reviews::reviews_routes)
            .configure(titles::titles_routes),
    );
}

/// Erreurs des extracteurs Json / Query / Path au format de l'API
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler));
}
