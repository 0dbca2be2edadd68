use todolist_core::Task;
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TaskListRowProps {
  pub task:        Task,
  pub disabled:    bool,
  pub on_complete: Callback<u64>
}

#[function_component(TaskListRow)]
pub fn task_list_row(
  props: &TaskListRowProps
) -> Html {
  let id = props.task.task_id;
  let completed = props.task.completed;
  let on_complete =
    props.on_complete.clone();

  html! {
      <div class={classes!("row", completed.then_some("done"))}>
          <input
              type="checkbox"
              checked={completed}
              disabled={props.disabled}
              onchange={move |_| on_complete.emit(id)}
          />
          <label class={classes!(completed.then_some("strike"))}>
              { &props.task.content }
          </label>
      </div>
  }
}
