use gloo::net::http::{
  Request,
  Response
};
use gloo::timers::future::TimeoutFuture;
use serde_json::Value;
use todolist_core::aptos::{
  self,
  FinalityPolicy,
  NodeUrl,
  TransactionStatus
};
use todolist_core::config::{
  Config,
  DEFAULT_NODE_URL
};
use todolist_core::{
  AccountAddress,
  ChainError,
  ChainReader,
  TableItemRequest
};
use tracing::trace;

/// Fullnode reader using the
/// browser's `fetch`.
#[derive(Clone)]
pub struct FetchChainReader {
  node:     NodeUrl,
  finality: FinalityPolicy
}

impl FetchChainReader {
  pub fn new(cfg: &Config) -> Self {
    Self {
      node:     NodeUrl::new(
        &cfg
          .get("node.url")
          .unwrap_or_else(|| {
            DEFAULT_NODE_URL.to_string()
          })
      ),
      finality:
        FinalityPolicy::from_config(
          cfg
        )
    }
  }
}

fn network(
  err: gloo::net::Error
) -> ChainError {
  ChainError::Network(err.to_string())
}

async fn read_json(
  response: Response
) -> Result<Value, ChainError> {
  let status = response.status();
  let body = response
    .text()
    .await
    .map_err(network)?;
  trace!(status, bytes = body.len(), "fullnode response");
  if !response.ok() {
    return Err(aptos::classify_error(
      status, &body
    ));
  }
  Ok(serde_json::from_str(&body)?)
}

impl ChainReader for FetchChainReader {
  async fn get_resource(
    &self,
    account: &AccountAddress,
    resource_type: &str
  ) -> Result<Value, ChainError> {
    let url = self
      .node
      .resource(account, resource_type);
    let response = Request::get(&url)
      .send()
      .await
      .map_err(network)?;
    aptos::resource_data(
      read_json(response).await?
    )
  }

  async fn get_table_item(
    &self,
    handle: &str,
    request: &TableItemRequest
  ) -> Result<Value, ChainError> {
    let url =
      self.node.table_item(handle);
    let response = Request::post(&url)
      .json(request)
      .map_err(network)?
      .send()
      .await
      .map_err(network)?;
    read_json(response).await
  }

  async fn wait_for_transaction(
    &self,
    hash: &str
  ) -> Result<(), ChainError> {
    let url = self
      .node
      .transaction_by_hash(hash);
    let poll_ms = u32::try_from(
      self
        .finality
        .poll_interval
        .as_millis()
    )
    .unwrap_or(u32::MAX);

    for attempt in
      0..self.finality.max_polls()
    {
      let response = Request::get(&url)
        .send()
        .await
        .map_err(network)?;
      match read_json(response).await {
        | Ok(body) => {
          match aptos::transaction_status(
            &body
          )? {
            | TransactionStatus::Committed => {
              return Ok(());
            }
            | TransactionStatus::Failed(
              vm_status
            ) => {
              return Err(
                ChainError::Aborted(
                  vm_status
                )
              );
            }
            | TransactionStatus::Pending => {}
          }
        }
        | Err(ChainError::NotFound) => {}
        | Err(err) => return Err(err)
      }

      trace!(attempt, "transaction still pending");
      TimeoutFuture::new(poll_ms).await;
    }

    Err(ChainError::Timeout)
  }
}
