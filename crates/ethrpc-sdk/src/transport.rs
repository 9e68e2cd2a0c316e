//! Transport layer for JSON-RPC communication

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::SdkError;

/// Error code used when a node answers without a usable result
const NULL_RESULT_CODE: i64 = -32603;

/// One entry of a batch request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    /// Method name
    pub method: String,
    /// Positional parameters
    pub params: Vec<Value>,
}

impl RpcRequest {
    /// Create a request
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// Transport trait for RPC communication (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an RPC request and get the `result` member of the response
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError>;

    /// Send several requests; results come back in request order
    ///
    /// The default sends them one after another. Transports that can put
    /// them on the wire as a single JSON-RPC batch override this.
    async fn request_batch(&self, requests: Vec<RpcRequest>) -> Result<Vec<Value>, SdkError> {
        debug!(size = requests.len(), "sending RPC batch sequentially");
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.request_json(&request.method, request.params).await?);
        }
        Ok(results)
    }
}

/// Helper to deserialize response
pub fn deserialize_response<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, SdkError> {
    serde_json::from_value(value).map_err(|e| SdkError::Serialization(e.to_string()))
}

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    /// `result`, unless the node sent an error or nothing at all
    fn into_result(self) -> Result<Value, SdkError> {
        if let Some(error) = self.error {
            return Err(SdkError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        non_null(self.result.unwrap_or(Value::Null))
    }
}

fn non_null(value: Value) -> Result<Value, SdkError> {
    if value.is_null() {
        return Err(SdkError::Rpc {
            code: NULL_RESULT_CODE,
            message: "RPC responded with null".to_string(),
        });
    }
    Ok(value)
}

/// Mock transport for testing
///
/// Answers from canned values: first a response registered for the exact
/// method and params, then one registered for the method, then the built-in
/// defaults. Every request is recorded.
#[derive(Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<String, Value>>>,
    param_responses: Arc<Mutex<HashMap<(String, String), Value>>>,
    default_responses: Arc<Mutex<HashMap<String, Value>>>,
    requests: Arc<Mutex<Vec<RpcRequest>>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        let mut defaults = HashMap::new();

        defaults.insert("eth_chainId".to_string(), Value::String("0x1".to_string()));
        defaults.insert("eth_gasPrice".to_string(), Value::String("0x3b9aca00".to_string())); // 1 gwei
        defaults.insert("eth_blockNumber".to_string(), Value::String("0x100".to_string())); // Block 256
        defaults.insert("eth_getTransactionCount".to_string(), Value::String("0x0".to_string()));
        defaults.insert(
            "eth_sendRawTransaction".to_string(),
            Value::String(
                "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b".to_string(),
            ),
        );
        defaults.insert("eth_call".to_string(), Value::String("0x".to_string()));
        defaults.insert("eth_getCode".to_string(), Value::String("0x".to_string()));
        defaults.insert("eth_getLogs".to_string(), Value::Array(vec![]));

        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            param_responses: Arc::new(Mutex::new(HashMap::new())),
            default_responses: Arc::new(Mutex::new(defaults)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a mock response for a specific method
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn set_response(&self, method: &str, response: Value) {
        self.responses
            .lock()
            .expect("MockTransport mutex poisoned")
            .insert(method.to_string(), response);
    }

    /// Set a mock response for a method called with exactly `params`
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn set_response_for(&self, method: &str, params: Vec<Value>, response: Value) {
        self.param_responses
            .lock()
            .expect("MockTransport mutex poisoned")
            .insert(param_key(method, &params), response);
    }

    /// Requests received so far, oldest first
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn requests(&self) -> Vec<RpcRequest> {
        self.requests
            .lock()
            .expect("MockTransport mutex poisoned")
            .clone()
    }

    fn lookup(&self, method: &str, params: &[Value]) -> Result<Option<Value>, SdkError> {
        if let Some(value) = self
            .param_responses
            .lock()
            .map_err(poisoned)?
            .get(&param_key(method, params))
        {
            return Ok(Some(value.clone()));
        }
        if let Some(value) = self.responses.lock().map_err(poisoned)?.get(method) {
            return Ok(Some(value.clone()));
        }
        Ok(self
            .default_responses
            .lock()
            .map_err(poisoned)?
            .get(method)
            .cloned())
    }
}

fn poisoned<T>(_: T) -> SdkError {
    SdkError::Transport("MockTransport mutex poisoned".to_string())
}

fn param_key(method: &str, params: &[Value]) -> (String, String) {
    (method.to_string(), Value::Array(params.to_vec()).to_string())
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError> {
        self.requests
            .lock()
            .map_err(poisoned)?
            .push(RpcRequest::new(method, params.clone()));

        match self.lookup(method, &params)? {
            Some(response) => non_null(response),
            None => Err(SdkError::Rpc {
                code: -32601,
                message: format!("Method not found: {}", method),
            }),
        }
    }
}

/// HTTP transport for real RPC communication
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    request_id: std::sync::atomic::AtomicU64,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            request_id: std::sync::atomic::AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.request_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }

    async fn post<T: serde::de::DeserializeOwned>(&self, body: &Value) -> Result<T, SdkError> {
        let response = self
            .client
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        response
            .json()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id(),
            "method": method,
            "params": params,
        });
        debug!(method, url = %self.url, "sending RPC request");

        let response: JsonRpcResponse = self.post(&request).await?;
        response.into_result()
    }

    async fn request_batch(&self, requests: Vec<RpcRequest>) -> Result<Vec<Value>, SdkError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<u64> = requests.iter().map(|_| self.next_id()).collect();
        let batch: Vec<Value> = requests
            .iter()
            .zip(&ids)
            .map(|(request, id)| {
                serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "method": request.method,
                    "params": request.params,
                })
            })
            .collect();
        debug!(size = batch.len(), url = %self.url, "sending RPC batch");

        let responses: Vec<JsonRpcResponse> = self.post(&Value::Array(batch)).await?;
        correlate(&ids, responses)
    }
}

/// Order batch responses by the ids they answer
#[cfg_attr(not(feature = "http"), allow(dead_code))]
fn correlate(ids: &[u64], responses: Vec<JsonRpcResponse>) -> Result<Vec<Value>, SdkError> {
    let mut by_id: HashMap<u64, JsonRpcResponse> = responses
        .into_iter()
        .filter_map(|response| {
            let id = response.id.as_ref().and_then(Value::as_u64)?;
            Some((id, response))
        })
        .collect();

    ids.iter()
        .map(|id| {
            by_id
                .remove(id)
                .ok_or_else(|| SdkError::Rpc {
                    code: NULL_RESULT_CODE,
                    message: format!("No response for batch request {id}"),
                })?
                .into_result()
        })
        .collect()
}
