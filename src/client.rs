//! REST transport to the quiz server.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use crate::api::{
    self, PublicState, StartEventRequest, StartStageRequest, SubmitRequest, SubmitResult,
};
use crate::config::ClientConfig;
use crate::error::ClientError;

/// The server's JSON surface. The session only talks to the server through
/// this, so tests can drive it with an in-memory double.
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn state(&self) -> Result<Option<PublicState>, ClientError>;
    async fn submit(&self, answer: &SubmitRequest) -> Result<SubmitResult, ClientError>;
    async fn start_stage(&self, stage_id: &str) -> Result<Option<PublicState>, ClientError>;
    async fn start_event(&self, event_key: &str) -> Result<Option<PublicState>, ClientError>;
    async fn next(&self) -> Result<Option<PublicState>, ClientError>;
    async fn reset(&self) -> Result<(), ClientError>;
}

/// `fetch`-based backend for the browser.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    async fn send(&self, method: &str, path: &str, body: Option<String>) -> Result<Value, ClientError> {
        let window = web_sys::window().ok_or_else(|| ClientError::Transport("no window".into()))?;
        let url = self.config.url(path);

        let init = RequestInit::new();
        init.set_method(method);
        if let Some(body) = &body {
            init.set_body(&JsValue::from_str(body));
        }
        let request = Request::new_with_str_and_init(&url, &init).map_err(ClientError::js)?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(ClientError::js)?;
        }

        let resp: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(ClientError::js)?
            .dyn_into()
            .map_err(ClientError::js)?;
        let text = JsFuture::from(resp.text().map_err(ClientError::js)?)
            .await
            .map_err(ClientError::js)?
            .as_string()
            .unwrap_or_default();
        debug!(method, url = %url, status = resp.status(), "api response");

        if !resp.ok() {
            let message = api::error_message(&text).unwrap_or_else(|| resp.status_text());
            return Err(ClientError::Status {
                status: resp.status(),
                message,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ClientError> {
        let body = serde_json::to_string(body)?;
        self.send("POST", path, Some(body)).await
    }
}

impl Backend for HttpBackend {
    async fn state(&self) -> Result<Option<PublicState>, ClientError> {
        let raw = self.send("GET", api::STATE_PATH, None).await?;
        Ok(api::parse_state(raw)?)
    }

    async fn submit(&self, answer: &SubmitRequest) -> Result<SubmitResult, ClientError> {
        let raw = self.post(api::SUBMIT_PATH, answer).await?;
        Ok(serde_json::from_value(raw)?)
    }

    async fn start_stage(&self, stage_id: &str) -> Result<Option<PublicState>, ClientError> {
        let raw = self
            .post(api::START_STAGE_PATH, &StartStageRequest { stage_id })
            .await?;
        Ok(api::parse_state(raw)?)
    }

    async fn start_event(&self, event_key: &str) -> Result<Option<PublicState>, ClientError> {
        let raw = self
            .post(api::START_EVENT_PATH, &StartEventRequest { event_key })
            .await?;
        Ok(api::parse_state(raw)?)
    }

    async fn next(&self) -> Result<Option<PublicState>, ClientError> {
        let raw = self.send("POST", api::NEXT_PATH, None).await?;
        Ok(api::parse_state(raw)?)
    }

    async fn reset(&self) -> Result<(), ClientError> {
        self.send("POST", api::RESET_PATH, None).await.map(|_| ())
    }
}
