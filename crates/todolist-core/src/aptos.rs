//! Aptos fullnode REST shapes shared by the native and browser chain
//! readers. Transport lives with the readers; this module only knows
//! paths, bodies and how to classify answers.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use crate::account::AccountAddress;
use crate::config::Config;
use crate::error::ChainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeUrl(String);

impl NodeUrl {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn resource(&self, account: &AccountAddress, resource_type: &str) -> String {
        format!("{}/accounts/{account}/resource/{resource_type}", self.0)
    }

    pub fn table_item(&self, handle: &str) -> String {
        format!("{}/tables/{handle}/item", self.0)
    }

    pub fn transaction_by_hash(&self, hash: &str) -> String {
        format!("{}/transactions/by_hash/{hash}", self.0)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

/// Maps a non-success HTTP answer to a [`ChainError`]. Any 404 counts as
/// not-found: a fresh account has neither the resource nor, sometimes,
/// the account itself.
pub fn classify_error(status: u16, body: &str) -> ChainError {
    if status == 404 {
        return ChainError::NotFound;
    }

    let message = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.message.is_empty() => {
            trace!(error_code = ?parsed.error_code, "node error body");
            parsed.message
        }
        _ if body.trim().is_empty() => format!("request failed with status {status}"),
        _ => body.trim().to_string(),
    };

    ChainError::Api { status, message }
}

/// Extracts `data` from a `GET /accounts/{addr}/resource/{type}` answer.
pub fn resource_data(mut body: Value) -> Result<Value, ChainError> {
    match body.get_mut("data") {
        Some(data) => Ok(data.take()),
        None => Err(ChainError::Decode(
            "resource response has no data field".to_string(),
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Committed,
    Failed(String),
}

#[derive(Debug, Deserialize)]
struct TransactionBody {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    vm_status: Option<String>,
}

pub fn transaction_status(body: &Value) -> Result<TransactionStatus, ChainError> {
    let parsed = TransactionBody::deserialize(body)?;
    if parsed.kind == "pending_transaction" {
        return Ok(TransactionStatus::Pending);
    }

    match parsed.success {
        Some(true) => Ok(TransactionStatus::Committed),
        Some(false) => Ok(TransactionStatus::Failed(
            parsed.vm_status.unwrap_or_else(|| "unknown vm status".to_string()),
        )),
        None => Err(ChainError::Decode(format!(
            "transaction of type {} carries no success flag",
            parsed.kind
        ))),
    }
}

/// How long and how often to poll for finality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalityPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl FinalityPolicy {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            poll_interval: Duration::from_millis(cfg.get_u64("chain.poll_ms").unwrap_or(500).max(1)),
            timeout: Duration::from_secs(cfg.get_u64("chain.timeout_secs").unwrap_or(30)),
        }
    }

    /// Number of polls before giving up; always at least one.
    pub fn max_polls(&self) -> u32 {
        let polls = self.timeout.as_millis() / self.poll_interval.as_millis().max(1);
        u32::try_from(polls).unwrap_or(u32::MAX).max(1)
    }
}

impl Default for FinalityPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn any_404_is_not_found() {
        let body = r#"{"message":"Resource not found","error_code":"resource_not_found"}"#;
        assert_eq!(classify_error(404, body), ChainError::NotFound);
        assert_eq!(classify_error(404, ""), ChainError::NotFound);
    }

    #[test]
    fn api_error_uses_node_message() {
        let body = r#"{"message":"Invalid address","error_code":"invalid_input"}"#;
        assert_eq!(
            classify_error(400, body),
            ChainError::Api {
                status: 400,
                message: "Invalid address".to_string()
            }
        );
        assert_eq!(
            classify_error(502, ""),
            ChainError::Api {
                status: 502,
                message: "request failed with status 502".to_string()
            }
        );
    }

    #[test]
    fn paths_trim_trailing_slash() {
        let node = NodeUrl::new("https://node.example/v1/");
        let account: AccountAddress = "0x1".parse().unwrap();
        assert_eq!(
            node.resource(&account, "0x2::todolist::TodoList"),
            "https://node.example/v1/accounts/0x1/resource/0x2::todolist::TodoList"
        );
        assert_eq!(node.table_item("0xab"), "https://node.example/v1/tables/0xab/item");
    }

    #[test]
    fn transaction_status_variants() {
        assert_eq!(
            transaction_status(&json!({"type": "pending_transaction", "hash": "0x1"})).unwrap(),
            TransactionStatus::Pending
        );
        assert_eq!(
            transaction_status(&json!({"type": "user_transaction", "success": true, "vm_status": "Executed successfully"})).unwrap(),
            TransactionStatus::Committed
        );
        assert_eq!(
            transaction_status(&json!({"type": "user_transaction", "success": false, "vm_status": "Move abort: ETASK_IS_COMPLETED"})).unwrap(),
            TransactionStatus::Failed("Move abort: ETASK_IS_COMPLETED".to_string())
        );
    }

    #[test]
    fn max_polls_is_never_zero() {
        let policy = FinalityPolicy {
            poll_interval: std::time::Duration::from_secs(10),
            timeout: std::time::Duration::from_secs(1),
        };
        assert_eq!(policy.max_polls(), 1);
        assert_eq!(FinalityPolicy::default().max_polls(), 60);
    }

    #[test]
    fn resource_data_requires_data_field() {
        let data = resource_data(json!({"type": "0x1::todolist::TodoList", "data": {"task_counter": "0"}})).unwrap();
        assert_eq!(data, json!({"task_counter": "0"}));
        assert!(resource_data(json!({"type": "x"})).is_err());
    }
}
