//! Native platform: tokio timers and local tasks, reqwest for HTTP.
//!
//! `TokioSpawner` uses `spawn_local`, so widgets must be driven from inside a
//! `tokio::task::LocalSet`.

use anyhow::Result;
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use serde_json::Value;
use std::rc::Rc;
use std::time::Duration;

use super::{HttpResponse, HttpTransport, Services, SessionStore, Spawner, Timer};

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

impl Spawner for TokioSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(task);
    }
}

/// reqwest-backed transport for remote mode
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait(?Send)]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}

impl Services {
    /// Tokio timers and tasks, reqwest HTTP, and the given storage
    pub fn native(storage: Rc<dyn SessionStore>) -> Self {
        Self {
            storage,
            timer: Rc::new(TokioTimer),
            spawner: Rc::new(TokioSpawner),
            transport: Rc::new(ReqwestTransport::new()),
        }
    }
}
