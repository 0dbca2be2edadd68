mod api;
mod app;
mod chain;
mod components;

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  let root = web_sys::window()
    .and_then(|w| w.document())
    .and_then(|d| {
      d.get_element_by_id("app")
    });

  match root {
    | Some(root) => {
      tracing::info!(
        wallet = api::BrowserWallet::is_installed(),
        "mounting todo list on #app"
      );
      yew::Renderer::<app::App>::with_root(
        root
      )
      .render();
    }
    | None => {
      tracing::warn!(
        "no #app element; mounting todo list on <body>"
      );
      yew::Renderer::<app::App>::new()
        .render();
    }
  }
}
