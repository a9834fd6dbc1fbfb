#![deny(missing_docs)]
//! RepoMedic server executable.
//!
//! Hosts HTTP endpoints for repository health analysis, LLM-backed summaries,
//! file generation and GitHub issue creation.

mod config;
mod models;
mod openapi;
mod routes;

#[cfg(not(test))]
use actix_cors::Cors;
#[cfg(not(test))]
use actix_web::{App, HttpServer, http::header, web};
#[cfg(not(test))]
use dotenvy::dotenv;
#[cfg(not(test))]
use repomedic_core::{
    ChatCompletionsClient, GitHubApiClient, RetryPolicy, TextGenerator, TokioSleeper,
};
#[cfg(not(test))]
use std::io;
#[cfg(not(test))]
use std::sync::Arc;

#[cfg(not(test))]
use crate::config::ServerConfig;
#[cfg(not(test))]
use crate::models::HistoryStore;
#[cfg(not(test))]
use crate::routes::{
    AppState, analyze, deep_analyze, generate, history, issues, openapi_json, score, select,
};

#[cfg(not(test))]
#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let github = GitHubApiClient::from_env().map_err(io::Error::other)?;
    let generator: Option<Arc<dyn TextGenerator>> = match ChatCompletionsClient::from_env() {
        Ok(client) => {
            log::info!("LLM endpoints enabled with model {}", client.model());
            Some(Arc::new(client))
        }
        Err(err) => {
            log::warn!("LLM endpoints disabled: {err}");
            None
        }
    };

    let state = web::Data::new(AppState {
        github: Arc::new(github),
        generator,
        sleeper: Arc::new(TokioSleeper),
        retry: RetryPolicy::default(),
        history: HistoryStore::new(config.history_limit),
    });

    let allowed_origins = config.ui_origins.clone();
    log::info!("listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600);
        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .service(analyze)
            .service(score)
            .service(select)
            .service(deep_analyze)
            .service(generate)
            .service(issues)
            .service(history)
            .service(openapi_json)
    })
    .bind((config.host.clone(), config.port))?
    .run()
    .await
}

#[cfg(test)]
fn main() {}
