use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use todolist_cli::rest::RestChainReader;
use todolist_core::config::Config;
use todolist_core::{
    AccountAddress, ChainError, ChainReader, Contract, PendingTransaction, TaskListView,
    TransactionPayload, ViewOptions, WalletConnector,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const MODULE: &str = "0xc0ffee";

type Route = dyn Fn(&str, &str, &str) -> (u16, String) + Send + Sync;

/// Minimal HTTP/1.1 responder: one request per connection.
async fn serve(route: Arc<Route>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let route = route.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                let (head, body) = loop {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        return;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    let text = String::from_utf8_lossy(&buf).to_string();
                    if let Some((head, body)) = text.split_once("\r\n\r\n") {
                        let length = head
                            .lines()
                            .find_map(|l| {
                                let (k, v) = l.split_once(':')?;
                                k.eq_ignore_ascii_case("content-length")
                                    .then(|| v.trim().parse::<usize>().ok())
                                    .flatten()
                            })
                            .unwrap_or(0);
                        if body.len() >= length {
                            break (head.to_string(), body.to_string());
                        }
                    }
                };

                let mut request_line = head.lines().next().unwrap_or_default().split(' ');
                let method = request_line.next().unwrap_or_default().to_string();
                let path = request_line.next().unwrap_or_default().to_string();
                let (status, payload) = (*route)(&method, &path, &body);

                let response = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
                    payload.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

fn reader_for(addr: SocketAddr) -> RestChainReader {
    let mut cfg = Config::defaults();
    cfg.apply_overrides([
        ("node.url".to_string(), format!("http://{addr}/v1/")),
        ("chain.poll_ms".to_string(), "5".to_string()),
        ("chain.timeout_secs".to_string(), "1".to_string()),
    ]);
    RestChainReader::new(&cfg).unwrap()
}

fn fullnode() -> Arc<Route> {
    let polls = Arc::new(AtomicUsize::new(0));
    Arc::new(move |method: &str, path: &str, body: &str| {
        let list_path = format!("/v1/accounts/0xa11ce/resource/{MODULE}::todolist::TodoList");
        match (method, path) {
            ("GET", p) if p == list_path => (
                200,
                json!({
                    "type": format!("{MODULE}::todolist::TodoList"),
                    "data": { "tasks": { "handle": "0xh" }, "task_counter": "2" }
                })
                .to_string(),
            ),
            ("GET", p) if p.starts_with("/v1/accounts/") => (
                404,
                json!({ "message": "Resource not found", "error_code": "resource_not_found" })
                    .to_string(),
            ),
            ("POST", "/v1/tables/0xh/item") => {
                let request: serde_json::Value = serde_json::from_str(body).unwrap();
                assert_eq!(request["key_type"], "u64");
                assert_eq!(request["value_type"], format!("{MODULE}::todolist::Task"));
                let key = request["key"].as_str().unwrap().to_string();
                (
                    200,
                    json!({
                        "address": "0xa11ce",
                        "completed": key == "1",
                        "content": format!("task {key}"),
                        "task_id": key
                    })
                    .to_string(),
                )
            }
            ("GET", "/v1/transactions/by_hash/0xslow") => {
                match polls.fetch_add(1, Ordering::SeqCst) {
                    0 => (404, json!({ "message": "not found" }).to_string()),
                    1 => (200, json!({ "type": "pending_transaction" }).to_string()),
                    _ => (
                        200,
                        json!({ "type": "user_transaction", "success": true, "vm_status": "Executed successfully" })
                            .to_string(),
                    ),
                }
            }
            ("GET", "/v1/transactions/by_hash/0xbad") => (
                200,
                json!({ "type": "user_transaction", "success": false, "vm_status": "Move abort: ETASK_IS_COMPLETED" })
                    .to_string(),
            ),
            ("GET", "/v1/transactions/by_hash/0xstuck") => {
                (200, json!({ "type": "pending_transaction" }).to_string())
            }
            _ => (400, json!({ "message": format!("unexpected {method} {path}") }).to_string()),
        }
    })
}

struct ReadOnlyWallet(Option<AccountAddress>);

impl WalletConnector for ReadOnlyWallet {
    fn current_account(&self) -> Option<AccountAddress> {
        self.0.clone()
    }

    async fn sign_and_submit(
        &self,
        _payload: &TransactionPayload,
    ) -> Result<PendingTransaction, ChainError> {
        Err(ChainError::Rejected("read-only wallet".to_string()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn view_refreshes_through_fullnode() {
    let addr = serve(fullnode()).await;
    let view = TaskListView::new(
        ReadOnlyWallet(Some("0xa11ce".parse().unwrap())),
        reader_for(addr),
        Contract::new(MODULE),
        ViewOptions::default(),
    );

    view.sync_account().await;

    let state = view.snapshot();
    assert_eq!(state.error, None);
    assert!(state.has_list);
    assert_eq!(
        state
            .tasks
            .iter()
            .map(|t| (t.task_id, t.completed, t.content.as_str()))
            .collect::<Vec<_>>(),
        vec![(1, true, "task 1"), (2, false, "task 2")]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn missing_resource_maps_to_not_found() {
    let addr = serve(fullnode()).await;
    let reader = reader_for(addr);
    let account: AccountAddress = "0xb0b".parse().unwrap();

    let err = reader
        .get_resource(&account, &Contract::new(MODULE).list_resource_type())
        .await
        .unwrap_err();
    assert_eq!(err, ChainError::NotFound);
}

#[tokio::test(flavor = "current_thread")]
async fn finality_polls_past_pending_and_unindexed() {
    let addr = serve(fullnode()).await;
    let reader = reader_for(addr);

    reader.wait_for_transaction("0xslow").await.unwrap();
    assert_eq!(
        reader.wait_for_transaction("0xbad").await,
        Err(ChainError::Aborted("Move abort: ETASK_IS_COMPLETED".to_string()))
    );
}

#[tokio::test(flavor = "current_thread")]
async fn finality_gives_up_after_timeout() {
    let addr = serve(fullnode()).await;
    let mut cfg = Config::defaults();
    cfg.apply_overrides([
        ("node.url".to_string(), format!("http://{addr}/v1")),
        ("chain.poll_ms".to_string(), "400".to_string()),
        ("chain.timeout_secs".to_string(), "1".to_string()),
    ]);
    let reader = RestChainReader::new(&cfg).unwrap();

    assert_eq!(
        reader.wait_for_transaction("0xstuck").await,
        Err(ChainError::Timeout)
    );
}
