use std::rc::Rc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use serde_json::Value;

use chatwidget_core::{HttpResponse, HttpTransport, Services, Spawner, Timer};

use crate::storage::BrowserSessionStore;

/// `setTimeout`-backed delays
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooTimer;

impl Timer for GlooTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        // Created here so the countdown starts now, not on first poll
        TimeoutFuture::new(millis).boxed_local()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserSpawner;

impl Spawner for BrowserSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// `fetch` via gloo-net
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooTransport;

#[async_trait(?Send)]
impl HttpTransport for GlooTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse> {
        let response = Request::post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .map_err(|e| anyhow!("Failed to serialize request: {:?}", e))?
            .send()
            .await
            .map_err(|e| anyhow!("Request failed: {:?}", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response: {:?}", e))?;

        Ok(HttpResponse { status, body })
    }
}

/// Services backed by the browser: `sessionStorage`, timers, fetch
pub fn browser_services() -> Services {
    Services {
        storage: Rc::new(BrowserSessionStore::new()),
        timer: Rc::new(GlooTimer),
        spawner: Rc::new(BrowserSpawner),
        transport: Rc::new(GlooTransport),
    }
}
