//! A sheet that slides in from the top of the viewport. Visibility is driven
//! by the `show` CSS class so the slide animation stays in the stylesheet.

use uuid::Uuid;
use web_sys::js_sys;
use yew::{html, Component, Context, Html, NodeRef, Properties};

const VISIBLE_CLASS: &str = "show";
/// Delay before toggling, so a freshly mounted sheet still animates.
const TOGGLE_DELAY_MS: i32 = 50;

pub struct YwMaterialTopSheet {
    pub id: String,
}

#[derive(Properties, PartialEq)]
pub struct Props {
    #[prop_or_default]
    pub children: Html,
    pub node_ref: NodeRef,
}

impl Component for YwMaterialTopSheet {
    type Message = ();
    type Properties = Props;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            id: format!("sheet-{}", Uuid::new_v4()),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="top-sheet" id={self.id.clone()} ref={ctx.props().node_ref.clone()}>
                { ctx.props().children.clone() }
            </div>
        }
    }
}

pub fn open_top_sheet(top_sheet_ref: NodeRef) {
    toggle(top_sheet_ref, "add");
}

pub fn close_top_sheet(top_sheet_ref: NodeRef) {
    toggle(top_sheet_ref, "remove");
}

fn toggle(top_sheet_ref: NodeRef, method: &str) {
    let (Some(top_sheet), Some(window)) = (
        top_sheet_ref.cast::<web_sys::HtmlElement>(),
        web_sys::window(),
    ) else {
        return;
    };
    let func = js_sys::Function::new_no_args(&format!(
        "document.querySelector('#{}').classList.{}('{}')",
        top_sheet.id(),
        method,
        VISIBLE_CLASS
    ));
    if window
        .set_timeout_with_callback_and_timeout_and_arguments_0(&func, TOGGLE_DELAY_MS)
        .is_err()
    {
        gloo_console::error!("could not schedule top sheet toggle");
    }
}
