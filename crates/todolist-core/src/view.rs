//! Task list view: state held by a front-end plus the operations that
//! move it, delegating signing to a [`WalletConnector`] and reads to a
//! [`ChainReader`].

use std::cell::RefCell;

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info, warn};

use crate::account::AccountAddress;
use crate::chain::{ChainReader, TableItemRequest, WalletConnector};
use crate::config::Config;
use crate::error::{ChainError, ViewError};
use crate::payload::{Contract, TransactionPayload};
use crate::task::{Task, TodoListResource};

/// Rows drawn while the first refresh is pending.
pub const PLACEHOLDER_ROWS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub account: Option<AccountAddress>,
    pub has_list: bool,
    pub tasks: Vec<Task>,
    pub draft: String,
    pub loading: bool,
    pub transaction_in_progress: bool,
    pub error: Option<String>,
    /// Local tasks were changed optimistically and not yet re-read.
    pub stale: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            account: None,
            has_list: false,
            tasks: vec![],
            draft: String::new(),
            loading: true,
            transaction_in_progress: false,
            error: None,
            stale: false,
        }
    }
}

/// What a front-end should draw for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    ConnectWallet,
    NeedsList,
    Loading,
    Empty,
    Tasks,
}

impl ViewState {
    pub fn screen(&self) -> Screen {
        if self.account.is_none() {
            Screen::ConnectWallet
        } else if !self.has_list {
            Screen::NeedsList
        } else if self.loading && self.tasks.is_empty() {
            Screen::Loading
        } else if self.tasks.is_empty() {
            Screen::Empty
        } else {
            Screen::Tasks
        }
    }

    pub fn can_submit_draft(&self) -> bool {
        !self.transaction_in_progress && !self.draft.trim().is_empty()
    }

    pub fn can_complete(&self, task: &Task) -> bool {
        !task.completed && !self.transaction_in_progress
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    /// Upper bound of concurrent table lookups during a refresh.
    pub fetch_concurrency: usize,
    /// Re-read the list after a completion so the optimistic flip
    /// converges with the chain.
    pub reconcile_after_complete: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            fetch_concurrency: 8,
            reconcile_after_complete: true,
        }
    }
}

impl ViewOptions {
    pub fn from_config(cfg: &Config) -> Self {
        let defaults = Self::default();
        Self {
            fetch_concurrency: cfg
                .get_u64("fetch.concurrency")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(defaults.fetch_concurrency)
                .max(1),
            reconcile_after_complete: cfg
                .get_bool("view.reconcile_after_complete")
                .unwrap_or(defaults.reconcile_after_complete),
        }
    }
}

type Observer = Box<dyn Fn(&ViewState)>;

pub struct TaskListView<W, R> {
    wallet: W,
    chain: R,
    contract: Contract,
    options: ViewOptions,
    state: RefCell<ViewState>,
    observers: RefCell<Vec<Observer>>,
}

impl<W, R> TaskListView<W, R>
where
    W: WalletConnector,
    R: ChainReader,
{
    pub fn new(wallet: W, chain: R, contract: Contract, options: ViewOptions) -> Self {
        Self {
            wallet,
            chain,
            contract,
            options,
            state: RefCell::new(ViewState::default()),
            observers: RefCell::new(vec![]),
        }
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Registers a callback run after every state change.
    pub fn subscribe(&self, observer: impl Fn(&ViewState) + 'static) {
        self.observers.borrow_mut().push(Box::new(observer));
    }

    fn update(&self, apply: impl FnOnce(&mut ViewState)) {
        apply(&mut self.state.borrow_mut());
        let snapshot = self.snapshot();
        for observer in self.observers.borrow().iter() {
            observer(&snapshot);
        }
    }

    fn current_session(&self) -> Option<AccountAddress> {
        self.state.borrow().account.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|s| s.draft = text);
    }

    /// Shows a message raised outside the view's own operations (a
    /// failed wallet connect, say), or clears the current one.
    pub fn set_error(&self, message: Option<String>) {
        self.update(|s| s.error = message);
    }

    /// Picks up the wallet's current account. A different account drops
    /// everything held for the previous one. Always refreshes.
    #[tracing::instrument(skip(self))]
    pub async fn sync_account(&self) {
        let current = self.wallet.current_account();
        let changed = self.current_session() != current;
        if changed {
            info!(account = ?current, "wallet account changed");
            self.update(|s| {
                s.account = current;
                s.has_list = false;
                s.tasks.clear();
                s.draft.clear();
                s.error = None;
                s.stale = false;
            });
        }
        self.refresh().await;
    }

    /// Re-reads the list resource and every task it indexes.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) {
        let Some(account) = self.current_session() else {
            self.update(|s| {
                s.tasks.clear();
                s.has_list = false;
                s.loading = false;
            });
            return;
        };

        self.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let list = self.fetch_list(&account).await;
        if !self.still_current(&account) {
            return;
        }
        let list = match list {
            Ok(list) => list,
            Err(err) if err.is_not_found() => {
                debug!(%account, "account has no todo list");
                self.update(|s| {
                    s.has_list = false;
                    s.tasks.clear();
                    s.stale = false;
                    s.loading = false;
                });
                return;
            }
            Err(err) => return self.refresh_failed(&account, err),
        };
        self.update(|s| s.has_list = true);

        let fetched = self.fetch_tasks(&list).await;
        if !self.still_current(&account) {
            return;
        }
        match fetched {
            Ok(tasks) => {
                debug!(%account, count = tasks.len(), "fetched tasks");
                self.update(|s| {
                    s.tasks = tasks;
                    s.stale = false;
                    s.loading = false;
                });
            }
            Err(err) => self.refresh_failed(&account, err),
        }
    }

    fn still_current(&self, account: &AccountAddress) -> bool {
        let current = self.current_session().as_ref() == Some(account);
        if !current {
            debug!(%account, "account changed during refresh; dropping result");
        }
        current
    }

    fn refresh_failed(&self, account: &AccountAddress, err: ChainError) {
        warn!(%account, error = %err, "refresh failed");
        let message = ViewError::from(err).message_or("Failed to fetch tasks");
        self.update(|s| {
            s.error = Some(message);
            s.loading = false;
        });
    }

    async fn fetch_list(&self, account: &AccountAddress) -> Result<TodoListResource, ChainError> {
        let data = self
            .chain
            .get_resource(account, &self.contract.list_resource_type())
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Looks up ids `1..=counter` with bounded concurrency. `buffered`
    /// yields in input order, so the result is ordered by id.
    async fn fetch_tasks(&self, list: &TodoListResource) -> Result<Vec<Task>, ChainError> {
        let value_type = self.contract.task_value_type();
        let handle = list.tasks.handle.as_str();

        stream::iter(list.task_ids())
            .map(|id| {
                let request = TableItemRequest::u64_key(value_type.clone(), id);
                async move {
                    let value = self
                        .chain
                        .get_table_item(handle, &request)
                        .await
                        .map_err(|err| {
                            // Only the list resource itself may mean "no list".
                            if err.is_not_found() {
                                ChainError::Decode(format!("task {id} missing from list"))
                            } else {
                                err
                            }
                        })?;
                    let task: Task = serde_json::from_value(value)?;
                    if task.task_id != id {
                        warn!(requested = id, got = task.task_id, "table entry id mismatch");
                    }
                    Ok::<_, ChainError>(task)
                }
            })
            .buffered(self.options.fetch_concurrency.max(1))
            .try_collect()
            .await
    }

    /// Marks the start of a mutation. Returns the connected account, or
    /// `None` if the mutation must not run.
    fn begin_transaction(&self) -> Option<AccountAddress> {
        let (account, busy) = {
            let s = self.state.borrow();
            (s.account.clone(), s.transaction_in_progress)
        };

        let Some(account) = account else {
            self.update(|s| s.error = Some(ViewError::NoWallet.to_string()));
            return None;
        };
        if busy {
            warn!(%account, "transaction already in progress; ignoring");
            return None;
        }

        self.update(|s| {
            s.transaction_in_progress = true;
            s.error = None;
        });
        Some(account)
    }

    fn end_transaction(&self) {
        self.update(|s| s.transaction_in_progress = false);
    }

    async fn submit(&self, payload: &TransactionPayload) -> Result<(), ChainError> {
        let pending = self.wallet.sign_and_submit(payload).await?;
        debug!(hash = %pending.hash, function = %payload.function, "submitted transaction");
        self.chain.wait_for_transaction(&pending.hash).await?;
        info!(hash = %pending.hash, function = %payload.function, "transaction final");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_list(&self) {
        let Some(account) = self.begin_transaction() else {
            return;
        };

        match self.submit(&self.contract.create_list()).await {
            Ok(()) => {
                self.update(|s| s.has_list = true);
                self.refresh().await;
            }
            Err(err) => {
                warn!(%account, error = %err, "create list failed");
                let message = ViewError::from(err).message_or("Failed to create list");
                self.update(|s| {
                    s.error = Some(message);
                    s.has_list = false;
                });
            }
        }

        self.end_transaction();
    }

    /// Submits the current draft as a new task.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self) {
        let content = self.state.borrow().draft.trim().to_string();
        if self.current_session().is_some() && content.is_empty() {
            self.update(|s| s.error = Some(ViewError::EmptyTask.to_string()));
            return;
        }
        let Some(account) = self.begin_transaction() else {
            return;
        };

        match self.submit(&self.contract.create_task(&content)).await {
            Ok(()) => {
                self.refresh().await;
                self.update(|s| s.draft.clear());
            }
            Err(err) => {
                warn!(%account, error = %err, "create task failed");
                let message = ViewError::from(err).message_or("Failed to add task");
                self.update(|s| s.error = Some(message));
            }
        }

        self.end_transaction();
    }

    #[tracing::instrument(skip(self))]
    pub async fn complete_task(&self, task_id: u64) {
        let Some(account) = self.begin_transaction() else {
            return;
        };

        match self.submit(&self.contract.complete_task(task_id)).await {
            Ok(()) => {
                self.update(|s| {
                    if let Some(task) = s.tasks.iter_mut().find(|t| t.task_id == task_id) {
                        task.completed = true;
                    }
                    s.stale = true;
                });
                if self.options.reconcile_after_complete {
                    self.refresh().await;
                }
            }
            Err(err) => {
                warn!(%account, task_id, error = %err, "complete task failed");
                let message = ViewError::from(err).message_or("Failed to complete task");
                self.update(|s| s.error = Some(message));
            }
        }

        self.end_transaction();
    }
}
