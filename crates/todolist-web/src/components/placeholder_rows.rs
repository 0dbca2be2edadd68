use yew::{
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct PlaceholderRowsProps {
  pub count: usize
}

#[function_component(PlaceholderRows)]
pub fn placeholder_rows(
  props: &PlaceholderRowsProps
) -> Html {
  html! {
      <>
          {
              for (0..props.count).map(|i| html! {
                  <div key={i.to_string()} class="row placeholder">
                      <div class="box"></div>
                      <div class="bar"></div>
                  </div>
              })
          }
      </>
  }
}
