use std::time::Duration;

use anyhow::Context;
use serde_json::Value;
use todolist_core::aptos::{self, FinalityPolicy, NodeUrl, TransactionStatus};
use todolist_core::config::{Config, DEFAULT_NODE_URL};
use todolist_core::{AccountAddress, ChainError, ChainReader, TableItemRequest};
use tracing::{debug, trace};

/// Chain reader backed by an Aptos fullnode REST endpoint.
#[derive(Debug, Clone)]
pub struct RestChainReader {
    client: reqwest::Client,
    node: NodeUrl,
    finality: FinalityPolicy,
}

impl RestChainReader {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let node = NodeUrl::new(
            &cfg.get("node.url")
                .unwrap_or_else(|| DEFAULT_NODE_URL.to_string()),
        );
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("todolist/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed building HTTP client for the fullnode")?;

        debug!(node = node.as_str(), "using fullnode");
        Ok(Self {
            client,
            node,
            finality: FinalityPolicy::from_config(cfg),
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ChainError> {
        let response = request
            .send()
            .await
            .map_err(|e| ChainError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChainError::Network(e.to_string()))?;
        trace!(status = status.as_u16(), bytes = body.len(), "fullnode response");

        if !status.is_success() {
            return Err(aptos::classify_error(status.as_u16(), &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl ChainReader for RestChainReader {
    #[tracing::instrument(skip(self))]
    async fn get_resource(
        &self,
        account: &AccountAddress,
        resource_type: &str,
    ) -> Result<Value, ChainError> {
        let url = self.node.resource(account, resource_type);
        let body = self.send(self.client.get(url)).await?;
        aptos::resource_data(body)
    }

    #[tracing::instrument(skip(self, request), fields(key = %request.key))]
    async fn get_table_item(
        &self,
        handle: &str,
        request: &TableItemRequest,
    ) -> Result<Value, ChainError> {
        let url = self.node.table_item(handle);
        self.send(self.client.post(url).json(request)).await
    }

    #[tracing::instrument(skip(self))]
    async fn wait_for_transaction(&self, hash: &str) -> Result<(), ChainError> {
        let url = self.node.transaction_by_hash(hash);

        for attempt in 0..self.finality.max_polls() {
            match self.send(self.client.get(&url)).await {
                Ok(body) => match aptos::transaction_status(&body)? {
                    TransactionStatus::Committed => return Ok(()),
                    TransactionStatus::Failed(vm_status) => {
                        return Err(ChainError::Aborted(vm_status));
                    }
                    TransactionStatus::Pending => {}
                },
                // not indexed yet
                Err(ChainError::NotFound) => {}
                Err(err) => return Err(err),
            }

            trace!(attempt, "transaction still pending");
            tokio::time::sleep(self.finality.poll_interval).await;
        }

        Err(ChainError::Timeout)
    }
}
