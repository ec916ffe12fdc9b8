use dioxus::prelude::*;
use fieldwork_core::annotate::{Point, SketchPad, Tool, SKETCH_ERASER_WIDTH, SKETCH_PEN_WIDTH};
use fieldwork_core::WorkOrderId;

use crate::app::{report_error, use_api, use_navigator};
use crate::attachments::png_data_uri;
use crate::navigation::Screen;
use crate::ui::{ButtonVariant, ErrorBanner, UiButton};

const CANVAS_WIDTH: u32 = 360;
const CANVAS_HEIGHT: u32 = 480;

fn preview(pad: &SketchPad) -> Option<String> {
    png_data_uri(pad.canvas())
        .inspect_err(|error| tracing::warn!("Could not render sketch preview: {}", error))
        .ok()
}

#[component]
pub fn DrawNoteView(id: WorkOrderId) -> Element {
    let api = use_api();
    let mut navigator = use_navigator();
    let mut pad = use_signal(|| SketchPad::new(CANVAS_WIDTH, CANVAS_HEIGHT));
    let mut image = use_signal(|| None::<String>);
    let mut tool = use_signal(Tool::default);
    let mut live = use_signal(Vec::<(f32, f32)>::new);
    let mut drawing = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let mut commit = move || {
        if !drawing() {
            return;
        }
        drawing.set(false);
        let points: Vec<Point> = live
            .take()
            .into_iter()
            .map(|(x, y)| Point::new(x, y))
            .collect();
        pad.write().draw_path(&points, tool());
        image.set(preview(&pad.read()));
    };

    let on_save = move |_| {
        let api = api.clone();
        spawn(async move {
            let upload = match pad.read().export_upload() {
                Ok(upload) => upload,
                Err(failure) => {
                    error.set(Some(failure.user_message()));
                    return;
                }
            };
            busy.set(true);
            error.set(None);
            let result = api.upload_photos(id, std::slice::from_ref(&upload)).await;
            busy.set(false);
            match result {
                Ok(()) => navigator.write().replace(Screen::ViewWorkOrder(id)),
                Err(failure) => error.set(report_error(&failure, &api, navigator)),
            }
        });
    };

    let stroke_color = if tool() == Tool::Pen { "#000000" } else { "#ffffff" };
    let stroke_width = if tool() == Tool::Pen {
        SKETCH_PEN_WIDTH
    } else {
        SKETCH_ERASER_WIDTH
    };
    let live_points = live
        .read()
        .iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect::<Vec<_>>()
        .join(" ");

    rsx! {
        ErrorBanner { message: error() }
        div {
            class: "ui-card",
            style: "flex-direction: row; flex-wrap: wrap; gap: 8px;",
            UiButton {
                variant: if tool() == Tool::Pen { ButtonVariant::Primary } else { ButtonVariant::Outline },
                onclick: move |_| tool.set(Tool::Pen),
                "Pen"
            }
            UiButton {
                variant: if tool() == Tool::Eraser { ButtonVariant::Primary } else { ButtonVariant::Outline },
                onclick: move |_| tool.set(Tool::Eraser),
                "Eraser"
            }
            UiButton {
                variant: ButtonVariant::Outline,
                onclick: move |_| {
                    pad.write().clear();
                    image.set(None);
                },
                "Clear"
            }
            UiButton {
                variant: ButtonVariant::Primary,
                disabled: busy(),
                onclick: on_save,
                if busy() { "Saving..." } else { "Save" }
            }
        }
        div {
            style: "position: relative; width: {CANVAS_WIDTH}px; height: {CANVAS_HEIGHT}px; background: #ffffff; border: 1px solid #e5e7eb; border-radius: 8px; touch-action: none; align-self: center;",
            onpointerdown: move |event: PointerEvent| {
                let at = event.element_coordinates();
                drawing.set(true);
                live.set(vec![(at.x as f32, at.y as f32)]);
            },
            onpointermove: move |event: PointerEvent| {
                if drawing() {
                    let at = event.element_coordinates();
                    live.write().push((at.x as f32, at.y as f32));
                }
            },
            onpointerup: move |_| commit(),
            onpointerleave: move |_| commit(),
            if let Some(uri) = image() {
                img {
                    src: "{uri}",
                    style: "position: absolute; inset: 0; width: 100%; height: 100%; pointer-events: none;",
                }
            }
            if drawing() {
                svg {
                    style: "position: absolute; inset: 0; pointer-events: none;",
                    width: "{CANVAS_WIDTH}",
                    height: "{CANVAS_HEIGHT}",
                    polyline {
                        points: "{live_points}",
                        fill: "none",
                        stroke: "{stroke_color}",
                        stroke_width: "{stroke_width}",
                        stroke_linecap: "round",
                        stroke_linejoin: "round",
                    }
                }
            }
        }
    }
}
