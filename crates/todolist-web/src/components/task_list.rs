use todolist_core::Task;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

use super::TaskListRow;

#[derive(Properties, PartialEq)]
pub struct TaskListProps {
  /// Each task with whether it can be
  /// completed right now.
  pub rows:        Vec<(Task, bool)>,
  pub on_complete: Callback<u64>
}

#[function_component(TaskList)]
pub fn task_list(
  props: &TaskListProps
) -> Html {
  html! {
      <div class="list">
          {
              for props.rows.iter().cloned().map(|(task, completable)| {
                  let disabled = !completable;
                  let key = task.task_id.to_string();
                  html! {
                      <TaskListRow
                          key={key}
                          disabled={disabled}
                          task={task}
                          on_complete={props.on_complete.clone()}
                      />
                  }
              })
          }
      </div>
  }
}
