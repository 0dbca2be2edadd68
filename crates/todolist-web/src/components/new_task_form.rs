use web_sys::{
  HtmlInputElement,
  KeyboardEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct NewTaskFormProps {
  pub draft:      String,
  pub busy:       bool,
  pub can_submit: bool,
  pub on_input:   Callback<String>,
  pub on_submit:  Callback<()>
}

#[function_component(NewTaskForm)]
pub fn new_task_form(
  props: &NewTaskFormProps
) -> Html {
  let oninput = {
    let on_input =
      props.on_input.clone();
    Callback::from(
      move |e: web_sys::InputEvent| {
        let input: HtmlInputElement =
          e.target_unchecked_into();
        on_input.emit(input.value());
      }
    )
  };

  let onkeypress = {
    let on_submit =
      props.on_submit.clone();
    let can_submit = props.can_submit;
    Callback::from(
      move |e: KeyboardEvent| {
        if e.key() == "Enter"
          && can_submit
        {
          on_submit.emit(());
        }
      }
    )
  };

  let on_submit =
    props.on_submit.clone();

  html! {
      <div class="new-task">
          <input
              value={props.draft.clone()}
              {oninput}
              {onkeypress}
              placeholder="Write a new task..."
              disabled={props.busy}
          />
          <button
              class="btn primary"
              disabled={!props.can_submit}
              onclick={move |_| on_submit.emit(())}
          >
              { "Add" }
          </button>
      </div>
  }
}
