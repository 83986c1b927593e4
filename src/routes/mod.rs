pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::{json_error_handler, path_error_handler, query_error_handler};
use crate::state::AppState;

/// Registers every route, the shared services and the extractor error handlers.
///
/// `/tareas` is the only gated scope; everything else is public.
pub fn config(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.config.clone()))
        .app_data(web::Data::new(state.credentials.clone()))
        .app_data(web::Data::new(state.tasks.clone()))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(health::index)
        .service(health::health)
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login),
        )
        .service(
            web::scope("/tareas")
                .wrap(AuthMiddleware::new(state.tokens.clone()))
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        )
        .default_service(web::route().to(health::not_found));
}
