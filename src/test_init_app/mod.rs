use std::{ops::Deref, sync::Arc};

use actix_web::{test, App, web, dev::ServiceResponse, Error};
use actix_service::Service;
use actix_http::Request;

use crate::{config::Settings, handlers, store::{MemoryStore, Store}, GlobalState};

pub const TEST_PASSWORD: &str = "sinha123";

/// Shared state of the app under test plus the memory store behind it.
pub struct TestState {
    pub state: web::Data<GlobalState>,
    pub memory: Arc<MemoryStore>,
}

impl Deref for TestState {
    type Target = GlobalState;

    fn deref(&self) -> &GlobalState {
        &self.state
    }
}

pub fn settings() -> Settings {
    Settings::from_lookup(|key| match key {
        "ADMIN_PASSWORD" => Some(TEST_PASSWORD.to_string()),
        "ADMIN_JWT_PASSWORD" => Some("test-jwt-secret".to_string()),
        _ => None,
    })
    .expect("test settings are complete")
}

/// The full app over an empty in-memory store.
pub async fn init() -> (impl Service<Request, Response = ServiceResponse, Error = Error>, TestState) {

    let (store, memory) = Store::memory();

    let app_data = web::Data::new(GlobalState::new(store, &settings()));

    let app = test::init_service(
        App::new()
            .app_data(app_data.clone())
            .configure(handlers::configure)
    ).await;

    (app, TestState { state: app_data, memory })
}
