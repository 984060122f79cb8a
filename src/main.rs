use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use errors::AppError;
use tracing::{info, warn};

use crate::{
    auth::{AuthGate, TokenGate},
    cache::{PageCache, Revalidate, Revalidator},
    config::Settings,
    controller::AdminController,
    store::{PgStore, Store},
};

mod auth;
mod cache;
mod config;
mod controller;
mod errors;
mod handlers;
mod locks;
mod middlewares;
mod models;
mod schema;
mod seed;
mod store;
mod telemetry;
mod utils;
mod views;
mod workspace;

#[cfg(test)]
mod test_init_app;

pub struct GlobalState{
    pub store: Store,
    pub cache: Arc<PageCache>,
    pub revalidator: Arc<dyn Revalidate>,
    pub auth: Arc<dyn AuthGate>,
    pub admin: AdminController,
}

impl GlobalState {
    pub fn new(store: Store, settings: &Settings) -> Self {
        let cache = Arc::new(PageCache::new(settings.page_cache_ttl, settings.page_cache_capacity));
        let revalidator: Arc<dyn Revalidate> = Arc::new(Revalidator::new(cache.clone(), store.clone()));
        let auth = Arc::new(TokenGate::new(
            settings.admin_credential.clone(),
            settings.jwt_secret.clone(),
            settings.session_ttl,
        ));

        Self {
            admin: AdminController::new(store.clone(), revalidator.clone()),
            store,
            cache,
            revalidator,
            auth,
        }
    }
}

async fn open_store(settings: &Settings) -> Result<Store, AppError> {
    let Some(database_url) = &settings.database_url else {
        warn!("DATABASE_URL not set, content is kept in memory and lost on restart");
        let (store, _) = Store::memory();
        return Ok(store);
    };

    let pg = PgStore::connect(database_url, settings.db_max_connections)
        .await
        .map_err(|_e| AppError::DbConnect)?;

    pg.migrate().await.map_err(|_e| AppError::Migrate)?;

    Ok(Store::Postgres(pg))
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {

    dotenv().ok();

    // `course-site hash-password <secret>` prints a value for ADMIN_PASSWORD_HASH
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("hash-password") {
        let secret = args.get(2).ok_or(AppError::Usage)?;
        let hash = utils::hash_password(secret).map_err(|_e| AppError::InternalError)?;
        println!("{hash}");
        return Ok(());
    }

    let settings = Settings::from_env()?;
    telemetry::init(settings.log_format)?;

    let store = open_store(&settings).await?;
    info!(store = store.kind(), "Store ready");

    if settings.seed_demo_data {
        seed::seed_demo_data(&store).await;
    }

    let app_data = web::Data::new(GlobalState::new(store, &settings));

    info!(address = %settings.bind_address, "The Server is running");

    HttpServer::new(
        move||{
            App::new()
            .app_data(app_data.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
        }
    ).bind(&settings.bind_address)
    .map_err(|_e|AppError::SocketBind)?
    .run()
    .await
    .map_err(|_e|AppError::ServerStart)?;

    Ok(())

}
