//! Helpers shared by the certificate screens: toast notifications, dirty
//! tracking fingerprints and reading API error bodies.

use common::model::template::CertificateTemplate;
use common::requests::ErrorBody;
use gloo_net::http::Response;
use js_sys::Reflect;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

const TOAST_MS: u32 = 3000;

/// Shows a temporary notification at the bottom of the page.
pub fn show_toast(message: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) {
        toast.set_text_content(Some(message));
        let html_toast: HtmlElement = toast.unchecked_into();
        let style = html_toast.style();
        style.set_property("position", "fixed").ok();
        style.set_property("bottom", "20px").ok();
        style.set_property("left", "50%").ok();
        style.set_property("transform", "translateX(-50%)").ok();
        style.set_property("background", "rgba(0, 0, 0, 0.8)").ok();
        style.set_property("color", "#fff").ok();
        style.set_property("padding", "10px 20px").ok();
        style.set_property("border-radius", "4px").ok();
        style.set_property("z-index", "10000").ok();
        style.set_property("font-family", "Arial, sans-serif").ok();

        if body.append_child(&html_toast).is_ok() {
            wasm_bindgen_futures::spawn_local(async move {
                gloo_timers::future::TimeoutFuture::new(TOAST_MS).await;
                if let Some(parent) = html_toast.parent_node() {
                    parent.remove_child(&html_toast).ok();
                }
            });
        }
    }
}

/// Hex MD5 of `input`.
pub fn compute_md5(input: &str) -> String {
    format!("{:x}", md5::compute(input))
}

#[derive(Serialize)]
struct EditableContent<'a> {
    name: &'a str,
    description: &'a str,
    design: &'a common::model::certificate::DesignElements,
}

/// Fingerprint of everything a user can edit. Timestamps are left out so that
/// undoing an edit by hand makes the template clean again.
pub fn template_fingerprint(template: &CertificateTemplate) -> String {
    let content = EditableContent {
        name: template.name(),
        description: template.description(),
        design: template.design(),
    };
    compute_md5(&serde_json::to_string(&content).unwrap_or_default())
}

/// Mirrors unsaved state into `window.app_dirty`, which the page's
/// `beforeunload` handler reads.
pub fn set_window_dirty_flag(dirty: bool) {
    if let Some(window) = web_sys::window() {
        let _ = Reflect::set(
            &window,
            &JsValue::from_str("app_dirty"),
            &JsValue::from_bool(dirty),
        );
    }
}

/// One line describing a failed API call, field errors included.
pub fn describe_error(body: &ErrorBody) -> String {
    if body.field_errors.is_empty() {
        body.message.clone()
    } else {
        body.field_errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Reads an error response, falling back to the status line.
pub async fn error_message(response: Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => describe_error(&body),
        Err(_) => format!("request failed with status {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::validation::FieldError;

    #[test]
    fn fingerprint_ignores_timestamps_but_not_content() {
        let template: CertificateTemplate = serde_json::from_value(serde_json::json!({
            "id": "t-1",
            "name": "Reiki",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        let mut touched = template.clone();
        touched.rename("Reiki");
        assert_eq!(template_fingerprint(&template), template_fingerprint(&touched));

        touched.update_design(|d| d.font_size = 20.0);
        assert_ne!(template_fingerprint(&template), template_fingerprint(&touched));
    }

    #[test]
    fn errors_list_fields_when_present() {
        let body = ErrorBody {
            message: "validation failed".into(),
            field_errors: vec![FieldError::new("name", "is required")],
        };
        assert_eq!(describe_error(&body), "name: is required");
        let body = ErrorBody {
            message: "template `x` not found".into(),
            field_errors: Vec::new(),
        };
        assert_eq!(describe_error(&body), "template `x` not found");
    }
}
