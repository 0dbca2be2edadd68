mod connect_bar;
mod create_list_prompt;
mod error_banner;
mod new_task_form;
mod placeholder_rows;
mod task_list;
mod task_list_row;

pub use connect_bar::ConnectBar;
pub use create_list_prompt::CreateListPrompt;
pub use error_banner::ErrorBanner;
pub use new_task_form::NewTaskForm;
pub use placeholder_rows::PlaceholderRows;
pub use task_list::TaskList;
pub use task_list_row::TaskListRow;
