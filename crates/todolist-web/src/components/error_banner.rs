use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ErrorBannerProps {
  pub message:    String,
  pub on_dismiss: Callback<()>
}

#[function_component(ErrorBanner)]
pub fn error_banner(
  props: &ErrorBannerProps
) -> Html {
  let on_dismiss =
    props.on_dismiss.clone();
  html! {
      <div class="alert error" role="alert">
          <div class="text">{ &props.message }</div>
          <button class="close" onclick={move |_| on_dismiss.emit(())}>{ "×" }</button>
      </div>
  }
}
