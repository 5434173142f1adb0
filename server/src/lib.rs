pub mod config;
pub mod cors;
pub mod error;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};

use crate::config::{ServerConfig, StoreConfig};
use crate::repository::{InMemoryTaskRepository, JsonFileTaskRepository, TaskRepository};
use crate::service::TaskService;

pub fn build_repository(store: &StoreConfig) -> Arc<dyn TaskRepository> {
    match store {
        StoreConfig::Memory => {
            log::warn!("using in-memory task store; tasks are lost on restart");
            Arc::new(InMemoryTaskRepository::new())
        }
        StoreConfig::File(path) => {
            let repository = JsonFileTaskRepository::new(path);
            log::info!("using task document at {}", repository.path().display());
            Arc::new(repository)
        }
    }
}

pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let service = web::Data::new(TaskService::new(build_repository(&config.store)));
    let origins = config.allowed_origins.clone();

    log::info!("the server is running on port {}", config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(cors::cors_policy(&origins))
            .wrap(middleware::Logger::default())
            .app_data(service.clone())
            .configure(routes::configure)
    })
    .bind(config.socket_addr())?
    .run()
    .await
}
