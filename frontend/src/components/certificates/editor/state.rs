//! Runtime state of the certificate editor.

use super::helpers::DragState;
use crate::components::helpers::template_fingerprint;
use common::model::canvas::CanvasScale;
use common::model::template::CertificateTemplate;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlElement;
use yew::prelude::*;

pub struct CertificateEditor {
    /// `None` until the first load finishes.
    pub template: Option<CertificateTemplate>,
    /// Fingerprint of the template as last loaded or saved.
    pub saved_fingerprint: Option<String>,
    pub scale: CanvasScale,
    pub drag: Option<DragState>,
    pub canvas_ref: NodeRef,
    pub logo_input_ref: NodeRef,
    pub pdf_viewer_dialog_ref: NodeRef,
    pub pdf_url: Option<String>,
    pub pdf_loading: bool,
    pub saving: bool,
    pub loaded: bool,
    /// Window `resize` listener, kept alive for the component's lifetime.
    pub resize_listener: Option<Closure<dyn Fn()>>,
}

impl CertificateEditor {
    pub fn new() -> Self {
        Self {
            template: None,
            saved_fingerprint: None,
            scale: CanvasScale::IDENTITY,
            drag: None,
            canvas_ref: NodeRef::default(),
            logo_input_ref: NodeRef::default(),
            pdf_viewer_dialog_ref: NodeRef::default(),
            pdf_url: None,
            pdf_loading: false,
            saving: false,
            loaded: false,
            resize_listener: None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        match (&self.template, &self.saved_fingerprint) {
            (Some(template), Some(saved)) => template_fingerprint(template) != *saved,
            _ => false,
        }
    }

    /// Scale fitting the canvas into the width of its container, if mounted.
    pub fn measured_scale(&self) -> Option<CanvasScale> {
        let canvas = self.canvas_ref.cast::<HtmlElement>()?;
        let container = canvas.parent_element()?;
        let width = f64::from(container.client_width());
        (width > 0.0).then(|| CanvasScale::fit_width(width))
    }
}
