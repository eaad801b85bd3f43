//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use liff_editor::session::{InMemoryHost, InMemoryProvider};
use liff_editor::{EditorClient, EditorConfig, HostPage, IdentityProvider, UiDelays};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};
use std::sync::Arc;

pub const APP_ID: &str = "app-1";
pub const PAGE_URL: &str = "https://liff.example.com/?messageId=m1";

/// A mock GraphQL endpoint.
pub struct MockGraphQl {
    pub server: ServerGuard,
    pub url: String,
}

impl MockGraphQl {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let url = format!("{}/graphql", server.url());
        Self { server, url }
    }

    /// Mock answering requests whose query mentions `field` with `status` and `body`.
    pub async fn mock_field(&mut self, field: &str, status: usize, body: Value) -> Mock {
        self.server
            .mock("POST", "/graphql")
            .match_body(Matcher::Regex(format!("{field}\\(")))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    pub fn config(&self) -> EditorConfig {
        EditorConfig::new(self.url.clone(), APP_ID).with_delays(UiDelays::immediate())
    }
}

pub fn data(value: Value) -> Value {
    json!({ "data": value })
}

pub fn errors(message: &str) -> Value {
    json!({ "data": null, "errors": [{ "message": message }] })
}

pub struct Harness {
    pub client: EditorClient,
    pub provider: Arc<InMemoryProvider>,
    pub host: Arc<InMemoryHost>,
}

pub fn harness(config: EditorConfig, provider: InMemoryProvider) -> Harness {
    let provider = Arc::new(provider);
    let host = Arc::new(InMemoryHost::new(PAGE_URL));
    let client = EditorClient::builder()
        .config(config)
        .provider(provider.clone() as Arc<dyn IdentityProvider>)
        .host(host.clone() as Arc<dyn HostPage>)
        .build()
        .expect("client builds");
    Harness {
        client,
        provider,
        host,
    }
}

/// Client whose identity SDK never loaded.
pub fn harness_without_provider(config: EditorConfig) -> (EditorClient, Arc<InMemoryHost>) {
    let host = Arc::new(InMemoryHost::new(PAGE_URL));
    let client = EditorClient::builder()
        .config(config)
        .host(host.clone() as Arc<dyn HostPage>)
        .build()
        .expect("client builds");
    (client, host)
}
