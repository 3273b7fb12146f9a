//! Test helper module for records-service integration tests.
//!
//! Spawns the real HTTP server on a random port, backed by an in-memory
//! store the test can reach into.

#![allow(dead_code)]

use records_service::config::{DatabaseConfig, RecordsConfig, StoreBackend};
use records_service::services::{init_metrics, MemoryStore, RecordStore};
use records_service::startup::Application;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

pub fn test_config() -> RecordsConfig {
    RecordsConfig {
        common: CoreConfig {
            port: 0, // Random port
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        },
        service_name: "records-service-test".to_string(),
        service_version: "0.1.0".to_string(),
        log_level: "warn".to_string(),
        otlp_endpoint: None,
        store: StoreBackend::Memory,
        database: DatabaseConfig {
            url: None,
            max_connections: 5,
            min_connections: 1,
        },
    }
}

/// Test application wrapper for integration tests.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<MemoryStore>,
    pub client: Client,
}

impl TestApp {
    /// Spawn a new test application backed by an empty in-memory store.
    pub async fn spawn() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::spawn_with_store(store.clone(), store).await
    }

    /// Spawn against any store; `memory` is kept for failure injection.
    pub async fn spawn_with_store(memory: Arc<MemoryStore>, store: Arc<dyn RecordStore>) -> Self {
        init_metrics();

        let app = Application::with_store(test_config(), store)
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = Client::new();
        let address = format!("http://127.0.0.1:{}", port);
        for _ in 0..50 {
            if client.get(format!("{}/ready", address)).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            store: memory,
            client,
        }
    }

    /// Send a request and return the status with the parsed JSON body
    /// (`Value::Null` when the body is not JSON).
    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.address, path));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.expect("Failed to execute request");
        let status = response.status();
        let text = response.text().await.expect("Failed to read body");
        let value = serde_json::from_str(&text).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, path, None).await
    }

    /// Send a raw, non-JSON body with a JSON content type.
    pub async fn send_raw(&self, method: Method, path: &str, body: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .request(method, format!("{}{}", self.address, path))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Failed to execute request");
        let status = response.status();
        let value = response.json().await.unwrap_or(Value::Null);
        (status, value)
    }

    /// Create a student and return its JSON representation.
    pub async fn create_student(&self, name: &str, aadhar: &str) -> Value {
        let (status, body) = self
            .post(
                "/students",
                json!({
                    "name": name,
                    "dateOfBirth": "2003-04-12",
                    "aadharNumber": aadhar,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create student: {}", body);
        body["student"].clone()
    }

    /// Create a professor and return its JSON representation.
    pub async fn create_professor(&self, name: &str, aadhar: &str) -> Value {
        let (status, body) = self
            .post(
                "/professors",
                json!({
                    "name": name,
                    "seniority": "Senior",
                    "aadharNumber": aadhar,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create professor: {}", body);
        body
    }

    /// Current list of students from the plain listing.
    pub async fn students(&self) -> Vec<Value> {
        let (status, body) = self.get("/students").await;
        assert_eq!(status, StatusCode::OK);
        body["message"].as_array().cloned().unwrap_or_default()
    }
}

pub fn id_of(record: &Value) -> String {
    record["id"].as_str().expect("record has an id").to_string()
}
