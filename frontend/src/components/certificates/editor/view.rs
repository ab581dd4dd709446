//! Editor layout: toolbar, name and description, the canvas and a property
//! panel editing the same template the canvas draws.

use common::model::certificate::{BorderStyle, DesignElements};
use common::model::template::CertificateTemplate;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::html::Scope;
use yew::prelude::*;

use super::canvas::canvas;
use super::dialogs::pdf::pdf_dialog;
use super::helpers::{BorderField, BorderSlot, DesignField, BORDER_STYLES, FONT_FAMILIES};
use super::messages::Msg;
use super::state::CertificateEditor;

pub fn view(component: &CertificateEditor, ctx: &Context<CertificateEditor>) -> Html {
    let link = ctx.link();
    let Some(template) = &component.template else {
        return html! { <p class="muted">{ "Loading template…" }</p> };
    };

    html! {
        <div class="certificate-editor">
            { build_toolbar(component, link) }
            { build_header(template, link) }
            <div class="editor-body" style="display:flex;gap:16px;align-items:flex-start;">
                <div class="canvas-container" style="flex:1;min-width:0;">
                    { canvas(component, template.design(), link) }
                </div>
                { build_properties(template.design(), component, link) }
            </div>
            { pdf_dialog(component, link) }
        </div>
    }
}

fn build_toolbar(component: &CertificateEditor, link: &Scope<CertificateEditor>) -> Html {
    let dirty = component.is_dirty();
    html! {
        <div class="icon-toolbar">
            { icon_button("arrow_back", "Templates", link.callback(|_| Msg::Close), false) }
            { icon_button("picture_as_pdf", "PDF", link.callback(|_| Msg::OpenPdf), false) }
            { icon_button("save", "Save", link.callback(|_| Msg::Save), component.saving) }
            {
                if dirty {
                    html! {
                        <span
                            title="Unsaved changes"
                            style="width:8px;height:8px;background:#e53935;border-radius:50%;display:inline-block;"
                        />
                    }
                } else {
                    html! {}
                }
            }
        </div>
    }
}

fn build_header(template: &CertificateTemplate, link: &Scope<CertificateEditor>) -> Html {
    let on_name = link.callback(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::Rename(input.value())
    });
    let on_description = link.callback(|e: InputEvent| {
        let input: HtmlTextAreaElement = e.target_unchecked_into();
        Msg::SetDescription(input.value())
    });
    html! {
        <div class="editor-header">
            <input class="template-name" type="text" value={template.name().to_string()} oninput={on_name} />
            <textarea
                class="template-description"
                rows="2"
                placeholder="Description"
                value={template.description().to_string()}
                oninput={on_description}
            />
        </div>
    }
}

fn build_properties(
    design: &DesignElements,
    component: &CertificateEditor,
    link: &Scope<CertificateEditor>,
) -> Html {
    html! {
        <div class="property-panel" style="width:320px;">
            <h3>{ "Texts" }</h3>
            { for DesignField::TEXTS.iter().map(|(field, label)| text_field(design, *field, label, link)) }

            <h3>{ "Colors" }</h3>
            { for DesignField::COLORS.iter().map(|(field, label)| color_field(design, *field, label, link)) }

            <h3>{ "Font" }</h3>
            { font_fields(design, link) }

            <h3>{ "Logo" }</h3>
            { logo_fields(design, component, link) }

            { for BorderSlot::ALL.iter().map(|slot| border_fields(design, *slot, link)) }
        </div>
    }
}

fn text_field(
    design: &DesignElements,
    field: DesignField,
    label: &str,
    link: &Scope<CertificateEditor>,
) -> Html {
    let oninput = link.callback(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::EditDesign(field, input.value())
    });
    html! {
        <label class="field">
            <span>{ label }</span>
            <input type="text" value={field.value(design)} {oninput} />
        </label>
    }
}

fn color_field(
    design: &DesignElements,
    field: DesignField,
    label: &str,
    link: &Scope<CertificateEditor>,
) -> Html {
    let oninput = link.callback(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::EditDesign(field, input.value())
    });
    html! {
        <label class="field">
            <span>{ label }</span>
            <input type="color" value={field.value(design)} {oninput} />
        </label>
    }
}

fn font_fields(design: &DesignElements, link: &Scope<CertificateEditor>) -> Html {
    let on_family = link.callback(|e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        Msg::EditDesign(DesignField::FontFamily, select.value())
    });
    let on_size = link.callback(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::EditDesign(DesignField::FontSize, input.value())
    });
    let known = FONT_FAMILIES.contains(&design.font_family.as_str());
    html! {
        <>
            <label class="field">
                <span>{ "Family" }</span>
                <select onchange={on_family}>
                    {
                        if known {
                            html! {}
                        } else {
                            html! { <option selected=true value={design.font_family.clone()}>{ design.font_family.clone() }</option> }
                        }
                    }
                    { for FONT_FAMILIES.iter().map(|family| html! {
                        <option value={*family} selected={design.font_family == *family}>{ *family }</option>
                    }) }
                </select>
            </label>
            <label class="field">
                <span>{ "Base size" }</span>
                <input type="number" min="6" max="96" step="0.5" value={design.font_size.to_string()} oninput={on_size} />
            </label>
        </>
    }
}

fn logo_fields(
    design: &DesignElements,
    component: &CertificateEditor,
    link: &Scope<CertificateEditor>,
) -> Html {
    let on_file = link.batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().and_then(|files| files.get(0));
        input.set_value("");
        file.map(Msg::LogoSelected)
    });
    html! {
        <div class="field">
            <input
                type="file"
                accept="image/*"
                style="display:none;"
                ref={component.logo_input_ref.clone()}
                onchange={on_file}
            />
            { icon_button("image", "Choose", link.callback(|_| Msg::OpenLogoPicker), false) }
            {
                if design.logo_url.is_some() {
                    icon_button("delete", "Remove", link.callback(|_| Msg::RemoveLogo), false)
                } else {
                    html! {}
                }
            }
        </div>
    }
}

fn border_fields(design: &DesignElements, slot: BorderSlot, link: &Scope<CertificateEditor>) -> Html {
    let border = slot.get(design);
    let number = |field: BorderField| {
        link.callback(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::EditBorder(slot, field, input.value())
        })
    };
    let on_color = number(BorderField::Color);
    let on_style = link.callback(move |e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        Msg::EditBorder(slot, BorderField::Style, select.value())
    });
    let dashed = border.style == BorderStyle::Dashed;

    html! {
        <fieldset class="border-fields">
            <legend>{ slot.label() }</legend>
            <label class="field">
                <span>{ "Style" }</span>
                <select onchange={on_style}>
                    { for BORDER_STYLES.iter().map(|(style, name)| html! {
                        <option value={*name} selected={*style == border.style}>{ *name }</option>
                    }) }
                </select>
            </label>
            <label class="field">
                <span>{ "Width" }</span>
                <input type="number" min="0" max="50" step="0.5" value={border.width.to_string()} oninput={number(BorderField::Width)} />
            </label>
            <label class="field">
                <span>{ "Color" }</span>
                <input type="color" value={border.color.clone()} oninput={on_color} />
            </label>
            <label class="field">
                <span>{ "Dash / gap" }</span>
                <input type="number" min="0.5" max="100" step="0.5" disabled={!dashed} value={border.dash_length.to_string()} oninput={number(BorderField::DashLength)} />
                <input type="number" min="0" max="100" disabled={!dashed} value={border.dash_gap.to_string()} oninput={number(BorderField::DashGap)} />
            </label>
        </fieldset>
    }
}

fn icon_button(icon_name: &str, label: &str, on_click: Callback<MouseEvent>, disabled: bool) -> Html {
    html! {
        <button class="icon-btn" onclick={on_click} {disabled}>
            <i class="material-icons">{ icon_name }</i>
            <span class="icon-label">{ label }</span>
        </button>
    }
}
