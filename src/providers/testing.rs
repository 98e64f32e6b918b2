//! Scripted in-memory [`PrintfulApi`] for pipeline tests
//!
//! Replies are keyed by `"{operation}:{argument}"` (for example
//! `"catalog:4016"` or `"list:71:100"`). A key with several replies hands
//! them out in order and then keeps repeating the last one. Unscripted keys
//! answer 404. Every call is recorded.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::traits::{PrintfulApi, ProviderError, ProviderResult};

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
}

#[derive(Default)]
pub struct ScriptedApi {
    script: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `key` with a JSON body
    pub fn on(self, key: &str, body: Value) -> Self {
        self.push(key, Reply::Json(body))
    }

    /// Answer `key` with an HTTP error status
    pub fn on_status(self, key: &str, status: u16) -> Self {
        self.push(key, Reply::Status(status))
    }

    /// Answer successive calls to `key` with successive bodies
    pub fn on_sequence(self, key: &str, bodies: Vec<Value>) -> Self {
        bodies.into_iter().fold(self, |api, body| api.on(key, body))
    }

    fn push(self, key: &str, reply: Reply) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn reply(&self, key: String) -> ProviderResult<Value> {
        self.calls.lock().unwrap().push(key.clone());

        let mut script = self.script.lock().unwrap();
        let reply = match script.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match reply {
            Some(Reply::Json(body)) => Ok(body),
            Some(Reply::Status(404)) | None => Err(ProviderError::NotFound {
                path: key,
                body: String::new(),
            }),
            Some(Reply::Status(status)) => Err(ProviderError::Upstream {
                status,
                body: "scripted failure".to_string(),
            }),
        }
    }
}

#[async_trait]
impl PrintfulApi for ScriptedApi {
    async fn get_catalog_variant(&self, variant_id: &str) -> ProviderResult<Value> {
        self.reply(format!("catalog:{}", variant_id))
    }

    async fn get_store_variant(&self, variant_id: &str) -> ProviderResult<Value> {
        self.reply(format!("store:{}", variant_id))
    }

    async fn get_legacy_variant(&self, variant_id: &str) -> ProviderResult<Value> {
        self.reply(format!("legacy:{}", variant_id))
    }

    async fn list_catalog_variants(&self, product_id: &str, _limit: u32, offset: u32) -> ProviderResult<Value> {
        self.reply(format!("list:{}:{}", product_id, offset))
    }

    async fn get_mockup_templates(&self, product_id: &str, _variant_id: Option<&str>) -> ProviderResult<Value> {
        self.reply(format!("templates:{}", product_id))
    }

    async fn get_mockup_printfiles(&self, product_id: &str, _variant_id: Option<&str>) -> ProviderResult<Value> {
        self.reply(format!("printfiles:{}", product_id))
    }

    async fn get_mockup_styles(&self, product_id: &str) -> ProviderResult<Value> {
        self.reply(format!("styles:{}", product_id))
    }

    async fn create_mockup_task(&self, product_id: &str, _payload: &Value) -> ProviderResult<Value> {
        self.reply(format!("create_task:{}", product_id))
    }

    async fn get_mockup_task(&self, task_key: &str) -> ProviderResult<Value> {
        self.reply(format!("task:{}", task_key))
    }
}
