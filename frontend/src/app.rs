use crate::components::certificates::editor::CertificateEditor;
use crate::components::certificates::list::TemplateListComponent;
use yew::{html, Callback, Component, Context, Html};

#[derive(Debug, Clone, PartialEq)]
enum Page {
    List,
    Editor(String),
}

pub enum Msg {
    Open(String),
    ShowList,
}

pub struct App {
    page: Page,
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self { page: Page::List }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        let page = match msg {
            Msg::Open(id) => Page::Editor(id),
            Msg::ShowList => Page::List,
        };
        if page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        match &self.page {
            Page::List => html! {
                <TemplateListComponent on_open={link.callback(Msg::Open)} />
            },
            Page::Editor(id) => {
                let on_close: Callback<()> = link.callback(|_| Msg::ShowList);
                html! {
                    <CertificateEditor key={id.clone()} template_id={id.clone()} {on_close} />
                }
            }
        }
    }
}
