//! Certificate template list: loads every stored template, surfaces storage
//! warnings, creates drafts, publishes them and opens the editor.

use crate::components::helpers::{error_message, show_toast};
use common::model::template::{CertificateTemplate, TemplateStatus};
use common::requests::{CreateTemplateRequest, ListResponse};
use gloo_net::http::Request;
use web_sys::HtmlInputElement;
use yew::platform::spawn_local;
use yew::prelude::*;

const API_PATH: &str = "/api/certificates/templates";

#[derive(Properties, PartialEq, Clone)]
pub struct TemplateListProps {
    /// Called with the id of the template to edit.
    pub on_open: Callback<String>,
}

pub enum Msg {
    Load,
    Loaded(Vec<CertificateTemplate>),
    LoadFailed(String),
    UpdateNewName(String),
    Create,
    Created(CertificateTemplate),
    Publish(String),
    Published(CertificateTemplate),
    RequestFailed(String),
}

pub struct TemplateListComponent {
    templates: Vec<CertificateTemplate>,
    new_name: String,
    loading: bool,
    busy: bool,
}

impl Component for TemplateListComponent {
    type Message = Msg;
    type Properties = TemplateListProps;

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Load);
        Self {
            templates: Vec::new(),
            new_name: String::new(),
            loading: true,
            busy: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                self.loading = true;
                let link = ctx.link().clone();
                spawn_local(async move {
                    match Request::get(API_PATH).send().await {
                        Ok(resp) if resp.ok() => {
                            match resp.json::<ListResponse<CertificateTemplate>>().await {
                                Ok(list) => {
                                    if let Some(warning) = &list.warning {
                                        show_toast(warning);
                                    }
                                    link.send_message(Msg::Loaded(list.items));
                                }
                                Err(err) => link.send_message(Msg::LoadFailed(err.to_string())),
                            }
                        }
                        Ok(resp) => link.send_message(Msg::LoadFailed(error_message(resp).await)),
                        Err(err) => link.send_message(Msg::LoadFailed(err.to_string())),
                    }
                });
                true
            }
            Msg::Loaded(templates) => {
                self.templates = templates;
                self.loading = false;
                true
            }
            Msg::LoadFailed(message) => {
                self.loading = false;
                gloo_console::error!(format!("Loading templates failed: {message}"));
                show_toast(&format!("Could not load templates: {message}"));
                true
            }
            Msg::UpdateNewName(name) => {
                self.new_name = name;
                true
            }
            Msg::Create => {
                let name = self.new_name.trim().to_string();
                if name.is_empty() {
                    show_toast("Give the template a name first.");
                    return false;
                }
                self.busy = true;
                let link = ctx.link().clone();
                let request = CreateTemplateRequest {
                    name,
                    description: String::new(),
                };
                spawn_local(async move {
                    let sent = match Request::post(API_PATH).json(&request) {
                        Ok(req) => req.send().await,
                        Err(err) => return link.send_message(Msg::RequestFailed(err.to_string())),
                    };
                    match sent {
                        Ok(resp) if resp.ok() => match resp.json::<CertificateTemplate>().await {
                            Ok(template) => link.send_message(Msg::Created(template)),
                            Err(err) => link.send_message(Msg::RequestFailed(err.to_string())),
                        },
                        Ok(resp) => link.send_message(Msg::RequestFailed(error_message(resp).await)),
                        Err(err) => link.send_message(Msg::RequestFailed(err.to_string())),
                    }
                });
                true
            }
            Msg::Created(template) => {
                self.busy = false;
                self.new_name.clear();
                show_toast("Template created.");
                ctx.props().on_open.emit(template.id().to_string());
                false
            }
            Msg::Publish(id) => {
                self.busy = true;
                let link = ctx.link().clone();
                spawn_local(async move {
                    let url = format!("{API_PATH}/{id}/publish");
                    match Request::post(&url).send().await {
                        Ok(resp) if resp.ok() => match resp.json::<CertificateTemplate>().await {
                            Ok(template) => link.send_message(Msg::Published(template)),
                            Err(err) => link.send_message(Msg::RequestFailed(err.to_string())),
                        },
                        Ok(resp) => link.send_message(Msg::RequestFailed(error_message(resp).await)),
                        Err(err) => link.send_message(Msg::RequestFailed(err.to_string())),
                    }
                });
                true
            }
            Msg::Published(template) => {
                self.busy = false;
                show_toast(&format!("“{}” is published.", template.name()));
                if let Some(slot) = self.templates.iter_mut().find(|t| t.id() == template.id()) {
                    *slot = template;
                }
                true
            }
            Msg::RequestFailed(message) => {
                self.busy = false;
                show_toast(&message);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let on_name = link.callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::UpdateNewName(input.value())
        });
        let on_create = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Create
        });

        html! {
            <div class="template-list">
                <h1>{ "Certificate templates" }</h1>
                <form class="template-create" onsubmit={on_create}>
                    <input
                        type="text"
                        placeholder="New template name"
                        value={self.new_name.clone()}
                        oninput={on_name}
                    />
                    <button class="icon-btn" type="submit" disabled={self.busy}>
                        <i class="material-icons">{ "add" }</i>
                        <span class="icon-label">{ "Create" }</span>
                    </button>
                </form>
                {
                    if self.loading {
                        html! { <p class="muted">{ "Loading…" }</p> }
                    } else if self.templates.is_empty() {
                        html! { <p class="muted">{ "No templates yet." }</p> }
                    } else {
                        html! {
                            <table class="templates">
                                <thead>
                                    <tr>
                                        <th>{ "Name" }</th>
                                        <th>{ "Status" }</th>
                                        <th>{ "Last change" }</th>
                                        <th></th>
                                    </tr>
                                </thead>
                                <tbody>
                                    { for self.templates.iter().map(|t| self.row(ctx, t)) }
                                </tbody>
                            </table>
                        }
                    }
                }
            </div>
        }
    }
}

impl TemplateListComponent {
    fn row(&self, ctx: &Context<Self>, template: &CertificateTemplate) -> Html {
        let id = template.id().to_string();
        let on_open = {
            let on_open = ctx.props().on_open.clone();
            let id = id.clone();
            Callback::from(move |_: MouseEvent| on_open.emit(id.clone()))
        };
        let publish = match template.status() {
            TemplateStatus::Draft => {
                let on_publish = ctx.link().callback(move |_: MouseEvent| Msg::Publish(id.clone()));
                html! {
                    <button class="icon-btn" onclick={on_publish} disabled={self.busy}>
                        <i class="material-icons">{ "verified" }</i>
                        <span class="icon-label">{ "Publish" }</span>
                    </button>
                }
            }
            TemplateStatus::Published => html! {},
        };

        html! {
            <tr key={template.id().to_string()}>
                <td>
                    <a href="#" onclick={on_open}>{ template.name() }</a>
                    <div class="muted">{ template.description() }</div>
                </td>
                <td>{ status_label(template.status()) }</td>
                <td>{ template.updated_at().format("%Y-%m-%d %H:%M").to_string() }</td>
                <td>{ publish }</td>
            </tr>
        }
    }
}

fn status_label(status: TemplateStatus) -> &'static str {
    match status {
        TemplateStatus::Draft => "Draft",
        TemplateStatus::Published => "Published",
    }
}
