//! Wallet backed by the `aptos` CLI. Keys stay with the CLI profile; this
//! process only asks it to sign and submit.

use serde_json::Value;
use todolist_core::config::{Config, DEFAULT_NODE_URL};
use todolist_core::{AccountAddress, ChainError, PendingTransaction, TransactionPayload, WalletConnector};
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct AptosCliWallet {
    bin: String,
    profile: String,
    node_url: String,
    account: Option<AccountAddress>,
}

impl AptosCliWallet {
    /// Resolves the account from `wallet.account`, else from the CLI
    /// profile. A wallet without an account is still returned; the view
    /// then reports that no wallet is connected.
    #[tracing::instrument(skip(cfg))]
    pub async fn connect(cfg: &Config) -> Self {
        let mut wallet = Self {
            bin: cfg.get("wallet.bin").unwrap_or_else(|| "aptos".to_string()),
            profile: cfg
                .get("wallet.profile")
                .unwrap_or_else(|| "default".to_string()),
            node_url: cfg
                .get("node.url")
                .unwrap_or_else(|| DEFAULT_NODE_URL.to_string()),
            account: None,
        };

        wallet.account = match cfg.get("wallet.account") {
            Some(raw) => match raw.parse() {
                Ok(account) => Some(account),
                Err(err) => {
                    warn!(value = %raw, error = %err, "ignoring invalid wallet.account");
                    None
                }
            },
            None => match wallet.profile_account().await {
                Ok(account) => Some(account),
                Err(err) => {
                    warn!(profile = %wallet.profile, error = %err, "no account from aptos profile");
                    None
                }
            },
        };

        if let Some(account) = &wallet.account {
            info!(%account, profile = %wallet.profile, "wallet connected");
        }
        wallet
    }

    async fn profile_account(&self) -> Result<AccountAddress, ChainError> {
        let result = self
            .invoke(&["config", "show-profiles", "--profile", &self.profile])
            .await?;
        profile_account(&result, &self.profile)
    }

    async fn invoke(&self, args: &[&str]) -> Result<Value, ChainError> {
        debug!(bin = %self.bin, ?args, "running aptos cli");
        let output = Command::new(&self.bin)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ChainError::Rejected(format!("failed to run {}: {e}", self.bin)))?;

        if output.stdout.is_empty() && !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ChainError::Rejected(stderr.trim().to_string()));
        }
        parse_cli_output(&output.stdout)
    }
}

impl WalletConnector for AptosCliWallet {
    fn current_account(&self) -> Option<AccountAddress> {
        self.account.clone()
    }

    #[tracing::instrument(skip(self, payload), fields(function = %payload.function))]
    async fn sign_and_submit(
        &self,
        payload: &TransactionPayload,
    ) -> Result<PendingTransaction, ChainError> {
        let cli_args: Vec<String> = payload.arguments.iter().map(|a| a.cli_arg()).collect();

        let mut args = vec![
            "move",
            "run",
            "--function-id",
            payload.function.as_str(),
            "--profile",
            self.profile.as_str(),
            "--url",
            self.node_url.as_str(),
            "--assume-yes",
        ];
        if !cli_args.is_empty() {
            args.push("--args");
            args.extend(cli_args.iter().map(String::as_str));
        }

        let result = self.invoke(&args).await?;
        let hash = result
            .get("transaction_hash")
            .and_then(Value::as_str)
            .ok_or_else(|| ChainError::Decode("aptos cli result has no transaction_hash".to_string()))?;
        Ok(PendingTransaction {
            hash: hash.to_string(),
        })
    }
}

/// The CLI prints `{"Result": ..}` on success and `{"Error": ".."}` on
/// failure, regardless of the exit status.
pub fn parse_cli_output(stdout: &[u8]) -> Result<Value, ChainError> {
    let mut value: Value = serde_json::from_slice(stdout)?;
    if let Some(result) = value.get_mut("Result") {
        return Ok(result.take());
    }
    match value.get("Error").and_then(Value::as_str) {
        Some(message) => Err(ChainError::Rejected(message.to_string())),
        None => Err(ChainError::Decode(
            "aptos cli output has neither Result nor Error".to_string(),
        )),
    }
}

fn profile_account(result: &Value, profile: &str) -> Result<AccountAddress, ChainError> {
    result
        .get(profile)
        .and_then(|p| p.get("account"))
        .and_then(Value::as_str)
        .ok_or_else(|| ChainError::Decode(format!("profile {profile} has no account")))?
        .parse()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse_cli_output, profile_account};
    use todolist_core::ChainError;

    #[test]
    fn result_and_error_envelopes() {
        let ok = parse_cli_output(br#"{"Result": {"transaction_hash": "0xabc", "success": true}}"#).unwrap();
        assert_eq!(ok["transaction_hash"], "0xabc");

        let err = parse_cli_output(br#"{"Error": "Simulation failed with status: Move abort"}"#).unwrap_err();
        assert_eq!(
            err,
            ChainError::Rejected("Simulation failed with status: Move abort".to_string())
        );

        assert!(parse_cli_output(b"not json").is_err());
    }

    #[test]
    fn profile_account_gets_prefixed() {
        let result = json!({ "default": { "account": "ABCD", "network": "Testnet" } });
        assert_eq!(profile_account(&result, "default").unwrap().as_str(), "0xabcd");
        assert!(profile_account(&result, "devnet").is_err());
    }
}
