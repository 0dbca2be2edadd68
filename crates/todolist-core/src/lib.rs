pub mod account;
pub mod aptos;
pub mod chain;
pub mod config;
pub mod error;
pub mod payload;
pub mod task;
pub mod view;

pub use account::AccountAddress;
pub use chain::{ChainReader, PendingTransaction, TableItemRequest, WalletConnector};
pub use error::{ChainError, ViewError};
pub use payload::{Contract, MoveArg, TransactionPayload};
pub use task::{Task, TodoListResource};
pub use view::{Screen, TaskListView, ViewOptions, ViewState};
