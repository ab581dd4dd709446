use crate::components::certificates::editor::messages::Msg;
use crate::components::certificates::editor::state::CertificateEditor;
use crate::tops_sheet::yw_material_top_sheet::YwMaterialTopSheet;
use yew::html::Scope;
use yew::prelude::*;

/// Full-screen sheet showing the rendered preview PDF in an iframe. A white
/// overlay hides the previous document until the new one has loaded.
pub fn pdf_dialog(component: &CertificateEditor, link: &Scope<CertificateEditor>) -> Html {
    let on_close = link.callback(|_: MouseEvent| Msg::ClosePdfDialog);
    let on_iframe_load = link.callback(|_: Event| Msg::PdfLoaded);

    html! {
        <YwMaterialTopSheet node_ref={component.pdf_viewer_dialog_ref.clone()}>
            <div style="position:fixed;top:0;left:0;width:100vw;height:100vh;background:rgba(0,0,0,0.85);z-index:9999;display:flex;flex-direction:column;align-items:center;justify-content:center;">
                <button
                    onclick={on_close}
                    style="position:absolute;top:24px;right:32px;z-index:10000;padding:0.5rem 1rem;font-size:1.5rem;background:#fff;border:none;border-radius:4px;cursor:pointer;"
                >
                    { "✕" }
                </button>
                {
                    if let Some(url) = &component.pdf_url {
                        let visibility = if component.pdf_loading { "hidden" } else { "visible" };
                        html! {
                            <div style="position:relative;width:80vw;height:80vh;">
                                <iframe
                                    src={url.clone()}
                                    style={format!("width:100%;height:100%;border:none;background:#fff;border-radius:4px;visibility:{visibility};")}
                                    onload={on_iframe_load}
                                />
                                {
                                    if component.pdf_loading {
                                        html! {
                                            <div style="position:absolute;top:0;left:0;width:100%;height:100%;display:flex;align-items:center;justify-content:center;background:#fff;z-index:10001;">
                                                <div style="padding:24px;display:flex;flex-direction:column;align-items:center;">
                                                    <div class="spin" style="width:48px;height:48px;border:6px solid #ccc;border-top-color:#8b6f47;border-radius:50%;animation:spin 1s linear infinite;"></div>
                                                    <div style="margin-top:12px;color:#000;">{ "Rendering PDF…" }</div>
                                                </div>
                                                <style>{ "@keyframes spin { from { transform: rotate(0deg); } to { transform: rotate(360deg); } }" }</style>
                                            </div>
                                        }
                                    } else {
                                        html! {}
                                    }
                                }
                            </div>
                        }
                    } else {
                        html! { <div style="color:#fff;">{ "No PDF available" }</div> }
                    }
                }
            </div>
        </YwMaterialTopSheet>
    }
}
