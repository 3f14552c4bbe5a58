//! Shared harness: an in-memory service behind the real router.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use rt_config::ResearchConfig;
use rt_core::enums::AccountRole;
use rt_db::service::ResearchService;
use rt_llm::{ChatClient, ChatRequest, LlmError};
use rt_server::{AppState, router};
use serde_json::Value;
use tower::ServiceExt;

/// Chat client returning a canned reply, or failing when there is none.
pub struct FakeLlm {
    pub reply: Option<Value>,
}

#[async_trait]
impl ChatClient for FakeLlm {
    async fn complete_json(&self, _request: ChatRequest) -> Result<Value, LlmError> {
        self.reply.clone().ok_or(LlmError::Api {
            status: 500,
            message: "fake outage".into(),
        })
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

pub struct TestApp {
    pub state: Arc<AppState>,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(None).await
    }

    pub async fn with_llm(reply: Option<Value>) -> Self {
        Self::build(Some(Arc::new(FakeLlm { reply }))).await
    }

    async fn build(llm: Option<Arc<dyn ChatClient>>) -> Self {
        let service = ResearchService::open_local(":memory:").await.unwrap();
        let state = Arc::new(AppState::new(service, ResearchConfig::default(), llm));
        Self {
            router: router(Arc::clone(&state)),
            state,
        }
    }

    pub fn service(&self) -> &ResearchService {
        &self.state.service
    }

    /// Register an analyst directly through the service.
    pub async fn account(&self) -> String {
        self.account_with_role(AccountRole::Analyst).await
    }

    pub async fn account_with_role(&self, role: AccountRole) -> String {
        self.service()
            .register_account(role)
            .await
            .unwrap()
            .account_hash
    }

    /// Send a request and decode the JSON body (`Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(hash) = auth {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {hash}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, auth: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(auth), None).await
    }

    pub async fn post(&self, uri: &str, auth: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(auth), Some(body)).await
    }

    pub async fn put(&self, uri: &str, auth: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(auth), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, auth: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(auth), None).await
    }

    /// Create a private workspace owned by `owner`, returning its id.
    pub async fn workspace(&self, owner: &str) -> String {
        let (status, body) = self
            .post(
                "/api/workspaces",
                owner,
                serde_json::json!({"name": "Case file"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}
