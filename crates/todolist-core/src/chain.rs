//! Seams to the external wallet and chain node.
//!
//! Futures returned by these traits are not required to be `Send`: the
//! browser front-end runs on a single-threaded executor and the CLI drives
//! them on a current-thread runtime.
#![allow(async_fn_in_trait)]

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::account::AccountAddress;
use crate::error::ChainError;
use crate::payload::TransactionPayload;

/// Handle of a submitted, not yet finalized, transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub hash: String,
}

/// Lookup key for one entry of a keyed table resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableItemRequest {
    pub key_type: String,
    pub value_type: String,
    pub key: String,
}

impl TableItemRequest {
    pub fn u64_key(value_type: impl Into<String>, key: u64) -> Self {
        Self {
            key_type: "u64".to_string(),
            value_type: value_type.into(),
            key: key.to_string(),
        }
    }
}

pub trait WalletConnector {
    /// Account currently connected, if any.
    fn current_account(&self) -> Option<AccountAddress>;

    /// Sign and submit; resolves once the node accepted the transaction.
    async fn sign_and_submit(
        &self,
        payload: &TransactionPayload,
    ) -> Result<PendingTransaction, ChainError>;
}

pub trait ChainReader {
    /// Returns the resource's `data` object.
    async fn get_resource(
        &self,
        account: &AccountAddress,
        resource_type: &str,
    ) -> Result<Value, ChainError>;

    async fn get_table_item(
        &self,
        handle: &str,
        request: &TableItemRequest,
    ) -> Result<Value, ChainError>;

    /// Resolves once the transaction is final; fails if it was aborted.
    async fn wait_for_transaction(&self, hash: &str) -> Result<(), ChainError>;
}

impl<T: WalletConnector + ?Sized> WalletConnector for Rc<T> {
    fn current_account(&self) -> Option<AccountAddress> {
        (**self).current_account()
    }

    async fn sign_and_submit(
        &self,
        payload: &TransactionPayload,
    ) -> Result<PendingTransaction, ChainError> {
        (**self).sign_and_submit(payload).await
    }
}

impl<T: ChainReader + ?Sized> ChainReader for Rc<T> {
    async fn get_resource(
        &self,
        account: &AccountAddress,
        resource_type: &str,
    ) -> Result<Value, ChainError> {
        (**self).get_resource(account, resource_type).await
    }

    async fn get_table_item(
        &self,
        handle: &str,
        request: &TableItemRequest,
    ) -> Result<Value, ChainError> {
        (**self).get_table_item(handle, request).await
    }

    async fn wait_for_transaction(&self, hash: &str) -> Result<(), ChainError> {
        (**self).wait_for_transaction(hash).await
    }
}
