use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct CreateListPromptProps {
  pub busy:      bool,
  pub on_create: Callback<()>
}

#[function_component(CreateListPrompt)]
pub fn create_list_prompt(
  props: &CreateListPromptProps
) -> Html {
  let on_create =
    props.on_create.clone();
  html! {
      <div class="empty-state">
          <p>{ "You need to create a todo list before adding tasks." }</p>
          <button
              class="btn primary"
              disabled={props.busy}
              onclick={move |_| on_create.emit(())}
          >
              { if props.busy { "Creating..." } else { "Create Todo List" } }
          </button>
      </div>
  }
}
