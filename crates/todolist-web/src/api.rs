//! Bindings to the wallet injected as `window.aptos`.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use todolist_core::{
  AccountAddress,
  ChainError,
  PendingTransaction,
  TransactionPayload,
  WalletConnector
};
use tracing::{info, warn};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
  #[wasm_bindgen(catch, js_namespace = ["window", "aptos"], js_name = connect)]
  async fn aptos_connect() -> Result<JsValue, JsValue>;

  #[wasm_bindgen(catch, js_namespace = ["window", "aptos"], js_name = account)]
  async fn aptos_account() -> Result<JsValue, JsValue>;

  #[wasm_bindgen(catch, js_namespace = ["window", "aptos"], js_name = disconnect)]
  async fn aptos_disconnect() -> Result<JsValue, JsValue>;

  #[wasm_bindgen(catch, js_namespace = ["window", "aptos"], js_name = isConnected)]
  async fn aptos_is_connected() -> Result<JsValue, JsValue>;

  #[wasm_bindgen(catch, js_namespace = ["window", "aptos"], js_name = signAndSubmitTransaction)]
  async fn aptos_sign_and_submit(
    payload: JsValue
  ) -> Result<JsValue, JsValue>;

  #[wasm_bindgen(catch, js_namespace = ["window", "aptos"], js_name = onAccountChange)]
  fn aptos_on_account_change(
    callback: &Closure<dyn FnMut(JsValue)>
  ) -> Result<(), JsValue>;
}

#[derive(Deserialize)]
struct AccountInfo {
  address: String
}

#[derive(Deserialize)]
struct SubmitResult {
  hash: String
}

/// Wallet extension exposed on
/// `window.aptos`. Clones share the
/// connected account.
#[derive(Clone, Default)]
pub struct BrowserWallet {
  account: Rc<RefCell<Option<AccountAddress>>>
}

impl BrowserWallet {
  pub fn is_installed() -> bool {
    web_sys::window()
      .and_then(|window| {
        js_sys::Reflect::get(
          &window,
          &JsValue::from_str("aptos")
        )
        .ok()
      })
      .is_some_and(|value| {
        !value.is_undefined()
          && !value.is_null()
      })
  }

  pub async fn connect(
    &self
  ) -> Result<(), ChainError> {
    if !Self::is_installed() {
      return Err(ChainError::Rejected(
        "No Aptos wallet found. \
         Install Petra and reload."
          .to_string()
      ));
    }
    let info = aptos_connect()
      .await
      .map_err(rejected)?;
    self.set_account(&info)?;
    Ok(())
  }

  /// Picks up a session the
  /// extension kept from an earlier
  /// visit.
  pub async fn restore(&self) {
    if !Self::is_installed() {
      return;
    }
    let connected =
      aptos_is_connected()
        .await
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if !connected {
      return;
    }
    match aptos_account().await {
      | Ok(info) => {
        if let Err(err) =
          self.set_account(&info)
        {
          warn!(error = %err, "could not read restored account");
        }
      }
      | Err(err) => {
        warn!(error = %js_error_message(&err), "restoring wallet session failed");
      }
    }
  }

  pub async fn disconnect(&self) {
    if Self::is_installed()
      && let Err(err) =
        aptos_disconnect().await
    {
      warn!(error = %js_error_message(&err), "wallet disconnect failed");
    }
    *self.account.borrow_mut() = None;
  }

  /// Runs `on_change` after the
  /// extension switches accounts.
  pub fn on_account_change(
    &self,
    on_change: impl Fn() + 'static
  ) {
    if !Self::is_installed() {
      return;
    }
    let account = self.account.clone();
    let closure = Closure::<
      dyn FnMut(JsValue)
    >::new(
      move |info: JsValue| {
        let next =
          parse_account(&info).ok();
        info!(account = ?next, "wallet reported account change");
        *account.borrow_mut() = next;
        on_change();
      }
    );
    match aptos_on_account_change(
      &closure
    ) {
      | Ok(()) => closure.forget(),
      | Err(err) => {
        warn!(error = %js_error_message(&err), "wallet has no account change events");
      }
    }
  }

  fn set_account(
    &self,
    info: &JsValue
  ) -> Result<(), ChainError> {
    let address = parse_account(info)?;
    info!(account = %address, "wallet connected");
    *self.account.borrow_mut() =
      Some(address);
    Ok(())
  }
}

impl WalletConnector for BrowserWallet {
  fn current_account(
    &self
  ) -> Option<AccountAddress> {
    self.account.borrow().clone()
  }

  async fn sign_and_submit(
    &self,
    payload: &TransactionPayload
  ) -> Result<PendingTransaction, ChainError>
  {
    let js_payload = payload
      .serialize(
        &serde_wasm_bindgen::Serializer::json_compatible()
      )
      .map_err(|e| {
        ChainError::Decode(format!(
          "failed to encode \
           payload: {e}"
        ))
      })?;
    let result =
      aptos_sign_and_submit(js_payload)
        .await
        .map_err(rejected)?;
    let submitted: SubmitResult =
      serde_wasm_bindgen::from_value(
        result
      )
      .map_err(|e| {
        ChainError::Decode(format!(
          "decode error: {e}"
        ))
      })?;
    Ok(PendingTransaction {
      hash: submitted.hash
    })
  }
}

fn parse_account(
  info: &JsValue
) -> Result<AccountAddress, ChainError> {
  let parsed: AccountInfo =
    serde_wasm_bindgen::from_value(
      info.clone()
    )
    .map_err(|e| {
      ChainError::Decode(format!(
        "decode error: {e}"
      ))
    })?;
  parsed.address.parse()
}

fn rejected(err: JsValue) -> ChainError {
  ChainError::Rejected(js_error_message(
    &err
  ))
}

/// Wallet errors are usually objects
/// with a `message`; some are bare
/// strings.
fn js_error_message(
  err: &JsValue
) -> String {
  if let Some(text) = err.as_string() {
    return text;
  }
  js_sys::Reflect::get(
    err,
    &JsValue::from_str("message")
  )
  .ok()
  .and_then(|v| v.as_string())
  .unwrap_or_else(|| format!("{err:?}"))
}
