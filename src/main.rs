use actix_cors::Cors;
use actix_web::{
    http::StatusCode,
    middleware::{ErrorHandlers, Logger, NormalizePath},
    App, HttpServer,
};
use tareas_api::{config::Config, error::render_internal_error, routes, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()?;
    let state = AppState::new(config.clone());

    let url = config.server_url();
    log::info!("Starting Tareas API at {}", url);
    log::info!("Register: POST {}/auth/register", url);
    log::info!("Login:    POST {}/auth/login", url);
    log::info!("Tasks:    {}/tareas (bearer token required)", url);
    log::info!(
        "Users stored in {}, tasks in {}",
        config.users_file.display(),
        config.tasks_file.display()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::INTERNAL_SERVER_ERROR, render_internal_error),
            )
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(NormalizePath::trim())
            .configure(|cfg| routes::config(cfg, &state))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
