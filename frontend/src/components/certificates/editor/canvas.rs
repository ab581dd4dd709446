//! The scaled design surface: background, the three frame lines, the logo and
//! every positioned text element. Text elements can be dragged.

use common::model::certificate::{DesignElements, ElementName};
use yew::html::Scope;
use yew::prelude::*;

use super::helpers::{border_rects, canvas_style, element_style, logo_style, BorderSlot};
use super::messages::Msg;
use super::state::CertificateEditor;

pub fn canvas(
    component: &CertificateEditor,
    design: &DesignElements,
    link: &Scope<CertificateEditor>,
) -> Html {
    let scale = component.scale;
    let (width, height) = scale.screen_size();
    let on_move = link.callback(|e: MouseEvent| Msg::DragMove {
        x: f64::from(e.client_x()),
        y: f64::from(e.client_y()),
    });
    let on_up = link.callback(|_: MouseEvent| Msg::DragEnd);
    let on_leave = link.callback(|_: MouseEvent| Msg::DragEnd);

    html! {
        <div
            class="certificate-canvas"
            ref={component.canvas_ref.clone()}
            style={canvas_style(design, scale)}
            onmousemove={on_move}
            onmouseup={on_up}
            onmouseleave={on_leave}
        >
            <svg
                width={format!("{width:.2}")}
                height={format!("{height:.2}")}
                style="position:absolute;top:0;left:0;pointer-events:none;"
            >
                { for BorderSlot::ALL.iter().map(|slot| borders(design, *slot, scale)) }
            </svg>
            {
                match &design.logo_url {
                    Some(url) if !url.is_empty() => html! {
                        <img src={url.clone()} alt="logo" draggable="false" style={logo_style(scale)} />
                    },
                    _ => html! {},
                }
            }
            { for ElementName::POSITIONED.iter().map(|element| text_element(design, *element, component, link)) }
        </div>
    }
}

fn borders(
    design: &DesignElements,
    slot: BorderSlot,
    scale: common::model::canvas::CanvasScale,
) -> Html {
    let border = slot.get(design);
    html! {
        { for border_rects(border, slot.inset(), scale).into_iter().map(|r| html! {
            <rect
                x={format!("{:.2}", r.x)}
                y={format!("{:.2}", r.y)}
                width={format!("{:.2}", r.width)}
                height={format!("{:.2}", r.height)}
                fill="none"
                stroke={border.color.clone()}
                stroke-width={format!("{:.2}", r.stroke_width)}
                stroke-dasharray={r.dash_array}
            />
        }) }
    }
}

fn text_element(
    design: &DesignElements,
    element: ElementName,
    component: &CertificateEditor,
    link: &Scope<CertificateEditor>,
) -> Html {
    let text = design.placeholder_text(element);
    if text.trim().is_empty() {
        return html! {};
    }
    let on_down = link.callback(move |e: MouseEvent| {
        e.prevent_default();
        Msg::DragStart {
            element,
            x: f64::from(e.client_x()),
            y: f64::from(e.client_y()),
        }
    });
    let dragging = component.drag.is_some_and(|d| d.element == element);

    html! {
        <div
            key={element.as_str()}
            class={classes!("canvas-element", dragging.then_some("dragging"))}
            title={element.label()}
            style={element_style(design, element, component.scale)}
            onmousedown={on_down}
        >
            { text.to_string() }
        </div>
    }
}
