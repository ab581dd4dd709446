//! Certificate template editor.
//!
//! Elm-style: `state` holds the loaded template and UI flags, `update` applies
//! messages, `view` and `canvas` render. On first render the template named by
//! the props is fetched; a missing template sends the user back to the list.
//! The canvas scale follows the width of its container, re-measured after
//! every render and on window resize.

use gloo_net::http::Request;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use yew::platform::spawn_local;
use yew::prelude::*;

mod canvas;
mod dialogs;
mod helpers;
mod messages;
mod props;
mod state;
mod update;
mod view;

use crate::components::helpers::{error_message, set_window_dirty_flag};
use common::model::template::CertificateTemplate;
pub use messages::Msg;
pub use props::EditorProps;
pub use state::CertificateEditor;

pub(crate) const API_PATH: &str = "/api/certificates/templates";

impl Component for CertificateEditor {
    type Message = Msg;
    type Properties = EditorProps;

    fn create(_ctx: &Context<Self>) -> Self {
        CertificateEditor::new()
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render && !self.loaded {
            self.loaded = true;
            load_template(ctx.link().clone(), ctx.props().template_id.clone());
            self.resize_listener = listen_for_resize(ctx.link().clone());
        }
        if self.measured_scale().is_some_and(|scale| scale != self.scale) {
            ctx.link().send_message(Msg::Measure);
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        if let (Some(listener), Some(window)) = (self.resize_listener.take(), web_sys::window()) {
            let _ = window
                .remove_event_listener_with_callback("resize", listener.as_ref().unchecked_ref());
        }
        set_window_dirty_flag(false);
    }
}

fn load_template(link: yew::html::Scope<CertificateEditor>, template_id: String) {
    spawn_local(async move {
        let url = format!("{API_PATH}/{template_id}");
        match Request::get(&url).send().await {
            Ok(resp) if resp.ok() => match resp.json::<CertificateTemplate>().await {
                Ok(template) => link.send_message(Msg::Loaded(template)),
                Err(err) => link.send_message(Msg::LoadFailed(err.to_string())),
            },
            Ok(resp) => link.send_message(Msg::LoadFailed(error_message(resp).await)),
            Err(err) => link.send_message(Msg::LoadFailed(err.to_string())),
        }
    });
}

fn listen_for_resize(link: yew::html::Scope<CertificateEditor>) -> Option<Closure<dyn Fn()>> {
    let window = web_sys::window()?;
    let listener = Closure::<dyn Fn()>::new(move || link.send_message(Msg::Measure));
    window
        .add_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())
        .ok()?;
    Some(listener)
}
