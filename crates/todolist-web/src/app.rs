use std::rc::Rc;

use todolist_core::config::{
  Config,
  DEFAULT_MODULE_ADDRESS
};
use todolist_core::view::PLACEHOLDER_ROWS;
use todolist_core::{
  Contract,
  Screen,
  TaskListView,
  ViewError,
  ViewOptions,
  ViewState
};
use tracing::debug;
use wasm_bindgen_futures::spawn_local;
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_effect_with,
  use_memo,
  use_state
};

use crate::api::BrowserWallet;
use crate::chain::FetchChainReader;
use crate::components::{
  ConnectBar,
  CreateListPrompt,
  ErrorBanner,
  NewTaskForm,
  PlaceholderRows,
  TaskList
};

type View =
  TaskListView<BrowserWallet, FetchChainReader>;

/// Defaults, with the module and node
/// optionally fixed at build time.
fn web_config() -> Config {
  let mut cfg = Config::defaults();
  let build_overrides = [
    (
      "module.address",
      option_env!(
        "TODOLIST_MODULE_ADDRESS"
      )
    ),
    (
      "node.url",
      option_env!("TODOLIST_NODE_URL")
    )
  ];
  cfg.apply_overrides(
    build_overrides
      .into_iter()
      .filter_map(|(k, v)| {
        v.map(|v| {
          (k.to_string(), v.to_string())
        })
      })
  );
  cfg
}

/// Runs `op` against the view on the
/// browser's task queue.
fn spawn_with<F, Fut>(
  view: &Rc<View>,
  op: F
) where
  F: FnOnce(Rc<View>) -> Fut + 'static,
  Fut: Future<Output = ()> + 'static
{
  let view = view.clone();
  spawn_local(op(view));
}

#[function_component(App)]
pub fn app() -> Html {
  let state = use_state(ViewState::default);

  let view = {
    let setter = state.setter();
    use_memo((), move |_| {
      let cfg = web_config();
      let module = cfg
        .get("module.address")
        .unwrap_or_else(|| {
          DEFAULT_MODULE_ADDRESS
            .to_string()
        });
      let view = View::new(
        BrowserWallet::default(),
        FetchChainReader::new(&cfg),
        Contract::new(module),
        ViewOptions::from_config(&cfg)
      );
      view.subscribe(move |s| {
        setter.set(s.clone())
      });
      view
    })
  };

  {
    let view = view.clone();
    use_effect_with((), move |_| {
      let on_change = view.clone();
      view.wallet().on_account_change(
        move || {
          spawn_with(
            &on_change,
            |v| async move {
              v.sync_account().await
            }
          );
        }
      );
      spawn_with(&view, |v| async move {
        v.wallet().restore().await;
        v.sync_account().await;
      });
      || ()
    });
  }

  let on_connect = {
    let view = view.clone();
    Callback::from(move |_: ()| {
      spawn_with(&view, |v| async move {
        match v.wallet().connect().await {
          | Ok(()) => {
            v.sync_account().await
          }
          | Err(err) => {
            v.set_error(Some(
              ViewError::from(err)
                .message_or(
                  "Failed to connect \
                   wallet"
                )
            ))
          }
        }
      });
    })
  };

  let on_disconnect = {
    let view = view.clone();
    Callback::from(move |_: ()| {
      spawn_with(&view, |v| async move {
        v.wallet().disconnect().await;
        v.sync_account().await;
      });
    })
  };

  let on_dismiss_error = {
    let view = view.clone();
    Callback::from(move |_: ()| {
      view.set_error(None)
    })
  };

  let on_create_list = {
    let view = view.clone();
    Callback::from(move |_: ()| {
      spawn_with(&view, |v| async move {
        v.create_list().await
      });
    })
  };

  let on_draft = {
    let view = view.clone();
    Callback::from(
      move |text: String| {
        view.set_draft(text)
      }
    )
  };

  let on_add = {
    let view = view.clone();
    Callback::from(move |_: ()| {
      spawn_with(&view, |v| async move {
        v.create_task().await
      });
    })
  };

  let on_complete = {
    let view = view.clone();
    Callback::from(move |id: u64| {
      debug!(task_id = id, "completing task");
      spawn_with(
        &view,
        move |v| async move {
          v.complete_task(id).await
        }
      );
    })
  };

  let s = (*state).clone();
  let busy = s.transaction_in_progress;

  let error = s
    .error
    .clone()
    .map(|message| {
      html! {
          <ErrorBanner message={message} on_dismiss={on_dismiss_error.clone()} />
      }
    })
    .unwrap_or_default();

  let rows = s
    .tasks
    .iter()
    .map(|t| (t.clone(), s.can_complete(t)))
    .collect::<Vec<_>>();

  let task_panel = html! {
      <div class="tasks">
          <h3>{ "Your Tasks" }</h3>
          {
              match s.screen() {
                  Screen::Loading => html! {
                      <PlaceholderRows count={PLACEHOLDER_ROWS} />
                  },
                  Screen::Empty => html! {
                      <p class="muted">{ "No tasks yet. Add your first task above!" }</p>
                  },
                  _ => html! {
                      <TaskList rows={rows} on_complete={on_complete.clone()} />
                  },
              }
          }
      </div>
  };

  let body = match s.screen() {
    | Screen::ConnectWallet => html! {
        <div class="notice">
            { "Please connect your wallet to use the Todo List app." }
        </div>
    },
    | Screen::NeedsList => html! {
        <CreateListPrompt busy={busy} on_create={on_create_list.clone()} />
    },
    | Screen::Loading
    | Screen::Empty
    | Screen::Tasks => html! {
        <>
            <NewTaskForm
                draft={s.draft.clone()}
                busy={busy}
                can_submit={s.can_submit_draft()}
                on_input={on_draft.clone()}
                on_submit={on_add.clone()}
            />
            { task_panel }
        </>
    }
  };

  html! {
      <div class="page">
          <div class="card">
              <div class="card-header">
                  <div class="title">{ "Aptos Todo List" }</div>
                  <ConnectBar
                      account={s.account.clone()}
                      wallet_installed={BrowserWallet::is_installed()}
                      on_connect={on_connect}
                      on_disconnect={on_disconnect}
                  />
              </div>
              <div class="card-body">
                  { error }
                  { body }
              </div>
          </div>
      </div>
  }
}
