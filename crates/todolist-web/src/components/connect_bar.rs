use todolist_core::AccountAddress;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ConnectBarProps {
  pub account:
    Option<AccountAddress>,
  pub wallet_installed: bool,
  pub on_connect:       Callback<()>,
  pub on_disconnect:    Callback<()>
}

#[function_component(ConnectBar)]
pub fn connect_bar(
  props: &ConnectBarProps
) -> Html {
  let body = match &props.account {
    | Some(account) => {
      let on_disconnect =
        props.on_disconnect.clone();
      html! {
          <>
              <span class="badge account" title={account.to_string()}>
                  { short_address(account) }
              </span>
              <button class="btn" onclick={move |_| on_disconnect.emit(())}>
                  { "Disconnect" }
              </button>
          </>
      }
    }
    | None => {
      let on_connect =
        props.on_connect.clone();
      html! {
          <button
              class="btn primary"
              disabled={!props.wallet_installed}
              onclick={move |_| on_connect.emit(())}
          >
              { if props.wallet_installed { "Connect Wallet" } else { "No Wallet Found" } }
          </button>
      }
    }
  };

  html! {
      <div class="connect-bar">{ body }</div>
  }
}

fn short_address(
  account: &AccountAddress
) -> String {
  let text = account.as_str();
  if text.len() <= 12 {
    return text.to_string();
  }
  format!(
    "{}…{}",
    &text[..6],
    &text[text.len() - 4..]
  )
}
