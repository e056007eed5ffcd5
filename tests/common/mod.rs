#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::extract::connect_info::MockConnectInfo;
use axum_test::TestServer;
use shortlink::application::services::{LinkService, LinkSettings, RateLimiter};
use shortlink::domain::entities::RateLimitPolicy;
use shortlink::domain::store::{KeyValueStore, StoreError, StoreResult};
use shortlink::infrastructure::store::MemoryStore;
use shortlink::routes::app_router;
use shortlink::state::AppState;
use shortlink::utils::code_generator::CodeGenerator;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub const CLIENT_ADDR: &str = "1.2.3.4:40000";

pub fn create_test_state() -> AppState {
    create_test_state_with(Arc::new(MemoryStore::new()), false)
}

pub fn create_test_state_with(store: Arc<dyn KeyValueStore>, behind_proxy: bool) -> AppState {
    let link_service = LinkService::new(
        store.clone(),
        CodeGenerator::default(),
        RateLimiter::new(store.clone(), RateLimitPolicy::default()),
        LinkSettings::default(),
    );

    AppState::new(Arc::new(link_service), store, behind_proxy)
}

/// Full application router with a fixed peer address.
pub fn test_app(state: AppState) -> Router {
    let addr: SocketAddr = CLIENT_ADDR.parse().unwrap();
    app_router(state).layer(MockConnectInfo(addr))
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(test_app(state)).unwrap()
}

/// Store whose every operation fails as if Redis were down.
pub struct UnavailableStore;

fn down<T>() -> StoreResult<T> {
    Err(StoreError::Connection("connection refused".to_string()))
}

#[async_trait]
impl KeyValueStore for UnavailableStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        down()
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> StoreResult<()> {
        down()
    }

    async fn set_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> StoreResult<bool> {
        down()
    }

    async fn decrement(&self, _key: &str) -> StoreResult<i64> {
        down()
    }

    async fn decrement_with_floor(
        &self,
        _key: &str,
        _initial: i64,
        _ttl: Duration,
    ) -> StoreResult<Option<i64>> {
        down()
    }

    async fn time_to_live(&self, _key: &str) -> StoreResult<Option<Duration>> {
        down()
    }

    async fn health_check(&self) -> bool {
        false
    }

    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}
