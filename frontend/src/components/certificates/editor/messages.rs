use super::helpers::{BorderField, BorderSlot, DesignField};
use common::model::certificate::ElementName;
use common::model::template::CertificateTemplate;

pub enum Msg {
    Loaded(CertificateTemplate),
    LoadFailed(String),
    Rename(String),
    SetDescription(String),
    EditDesign(DesignField, String),
    EditBorder(BorderSlot, BorderField, String),
    /// Pointer pressed on an element, client coordinates in pixels.
    DragStart { element: ElementName, x: f64, y: f64 },
    DragMove { x: f64, y: f64 },
    DragEnd,
    /// Re-measure the canvas container and rescale if its width changed.
    Measure,
    OpenLogoPicker,
    LogoSelected(web_sys::File),
    LogoLoaded(String),
    RemoveLogo,
    Save,
    SaveSucceeded(CertificateTemplate),
    SaveFailed(String),
    OpenPdf,
    PdfLoaded,
    ClosePdfDialog,
    Close,
}
