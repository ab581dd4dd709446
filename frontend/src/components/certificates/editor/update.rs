//! Elm-style update for the certificate editor.
//!
//! Every edit, form or drag, goes through the loaded `CertificateTemplate`
//! so the canvas, the form and the saved document never disagree. Dirty state
//! is mirrored into `window.app_dirty` after each change.

use gloo_file::futures::read_as_bytes;
use gloo_file::Blob;
use gloo_net::http::Request;
use js_sys::Date;
use yew::platform::spawn_local;
use yew::prelude::*;

use common::model::canvas::Point;
use common::model::template::CertificateTemplate;

use crate::components::helpers::{
    error_message, set_window_dirty_flag, show_toast, template_fingerprint,
};
use crate::tops_sheet::yw_material_top_sheet::{close_top_sheet, open_top_sheet};

use super::helpers::{apply_border_field, logo_data_url, pdf_preview_url, DragState};
use super::messages::Msg;
use super::state::CertificateEditor;
use super::API_PATH;

pub fn update(component: &mut CertificateEditor, ctx: &Context<CertificateEditor>, msg: Msg) -> bool {
    match msg {
        Msg::Loaded(template) => {
            component.saved_fingerprint = Some(template_fingerprint(&template));
            component.template = Some(template);
            set_window_dirty_flag(false);
            true
        }
        Msg::LoadFailed(message) => {
            gloo_console::error!(format!("Loading template failed: {message}"));
            show_toast(&message);
            ctx.props().on_close.emit(());
            false
        }
        Msg::Rename(name) => edit(component, |t| t.rename(name)),
        Msg::SetDescription(description) => edit(component, |t| t.set_description(description)),
        Msg::EditDesign(field, value) => {
            let Some(template) = &component.template else {
                return false;
            };
            let mut design = template.design().clone();
            if !field.apply(&mut design, &value) {
                return false;
            }
            edit(component, |t| t.update_design(|d| *d = design))
        }
        Msg::EditBorder(slot, field, value) => {
            let Some(template) = &component.template else {
                return false;
            };
            let mut border = slot.get(template.design()).clone();
            if !apply_border_field(&mut border, field, &value) {
                return false;
            }
            edit(component, |t| t.update_design(|d| *slot.get_mut(d) = border))
        }
        Msg::DragStart { element, x, y } => {
            let Some(start) = component
                .template
                .as_ref()
                .and_then(|t| t.design().position(element))
            else {
                return false;
            };
            component.drag = Some(DragState {
                element,
                pointer_start: Point::new(x, y),
                element_start: start,
            });
            false
        }
        Msg::DragMove { x, y } => {
            let Some(drag) = component.drag else {
                return false;
            };
            let target = drag.target(Point::new(x, y), component.scale);
            let moved = component
                .template
                .as_mut()
                .map(|t| t.set_element_position(drag.element, target))
                .unwrap_or(false);
            if moved {
                refresh_dirty_flag(component);
            }
            moved
        }
        Msg::DragEnd => {
            component.drag = None;
            false
        }
        Msg::Measure => match component.measured_scale() {
            Some(scale) if scale != component.scale => {
                component.scale = scale;
                true
            }
            _ => false,
        },
        Msg::OpenLogoPicker => {
            if let Some(input) = component.logo_input_ref.cast::<web_sys::HtmlInputElement>() {
                input.click();
            }
            false
        }
        Msg::LogoSelected(file) => {
            let mime = match file.type_() {
                t if t.starts_with("image/") => t,
                _ => {
                    show_toast("The logo has to be an image.");
                    return false;
                }
            };
            let link = ctx.link().clone();
            spawn_local(async move {
                let blob = Blob::from(file);
                match read_as_bytes(&blob).await {
                    Ok(bytes) => link.send_message(Msg::LogoLoaded(logo_data_url(&mime, &bytes))),
                    Err(err) => show_toast(&format!("Could not read the logo: {err}")),
                }
            });
            false
        }
        Msg::LogoLoaded(url) => edit(component, |t| t.update_design(|d| d.logo_url = Some(url))),
        Msg::RemoveLogo => edit(component, |t| t.update_design(|d| d.logo_url = None)),
        Msg::Save => {
            let Some(template) = component.template.clone() else {
                return false;
            };
            component.saving = true;
            let link = ctx.link().clone();
            spawn_local(async move {
                let url = format!("{API_PATH}/{}", template.id());
                let sent = match Request::put(&url).json(&template) {
                    Ok(request) => request.send().await,
                    Err(err) => return link.send_message(Msg::SaveFailed(err.to_string())),
                };
                match sent {
                    Ok(response) if response.ok() => {
                        match response.json::<CertificateTemplate>().await {
                            Ok(saved) => link.send_message(Msg::SaveSucceeded(saved)),
                            Err(err) => link.send_message(Msg::SaveFailed(err.to_string())),
                        }
                    }
                    Ok(response) => link.send_message(Msg::SaveFailed(error_message(response).await)),
                    Err(err) => link.send_message(Msg::SaveFailed(err.to_string())),
                }
            });
            true
        }
        Msg::SaveSucceeded(saved) => {
            component.saving = false;
            component.saved_fingerprint = Some(template_fingerprint(&saved));
            component.template = Some(saved);
            set_window_dirty_flag(false);
            show_toast("Template saved.");
            ctx.props().on_close.emit(());
            true
        }
        Msg::SaveFailed(message) => {
            component.saving = false;
            show_toast(&format!("Could not save the template: {message}"));
            true
        }
        Msg::OpenPdf => {
            let Some(template) = &component.template else {
                show_toast("No template loaded.");
                return false;
            };
            if component.is_dirty() {
                show_toast("Save the template before generating the PDF.");
                return false;
            }
            component.pdf_url = Some(pdf_preview_url(template.id(), Date::now() as u64));
            component.pdf_loading = true;
            open_top_sheet(component.pdf_viewer_dialog_ref.clone());
            true
        }
        Msg::PdfLoaded => {
            component.pdf_loading = false;
            true
        }
        Msg::ClosePdfDialog => {
            close_top_sheet(component.pdf_viewer_dialog_ref.clone());
            component.pdf_url = None;
            component.pdf_loading = false;
            true
        }
        Msg::Close => {
            if component.is_dirty() {
                let confirmed = web_sys::window()
                    .and_then(|w| w.confirm_with_message("Discard unsaved changes?").ok())
                    .unwrap_or(true);
                if !confirmed {
                    return false;
                }
            }
            set_window_dirty_flag(false);
            ctx.props().on_close.emit(());
            false
        }
    }
}

/// Runs `change` on the loaded template and refreshes the dirty flag.
fn edit<F>(component: &mut CertificateEditor, change: F) -> bool
where
    F: FnOnce(&mut CertificateTemplate),
{
    let Some(template) = component.template.as_mut() else {
        return false;
    };
    change(template);
    refresh_dirty_flag(component);
    true
}

fn refresh_dirty_flag(component: &CertificateEditor) {
    set_window_dirty_flag(component.is_dirty());
}
