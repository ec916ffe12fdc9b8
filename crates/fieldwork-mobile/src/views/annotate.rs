use dioxus::prelude::*;
use fieldwork_core::annotate::{AnnotationSession, PageLayout, Point, Tool, PEN_WIDTH};
use fieldwork_core::files::UploadFile;
use fieldwork_core::util::unix_timestamp_millis;
use fieldwork_core::{Error, Result, WorkOrder, WorkOrderId};

use crate::app::{report_error, use_api, use_navigator, Api};
use crate::attachments::png_data_uri;
use crate::navigation::Screen;
use crate::paths::cache_dir;
use crate::preview::{annotation_backgrounds, system_rasterizer};
use crate::ui::{ButtonVariant, ErrorBanner, UiButton};

/// In-progress stroke drawn as an SVG polyline until it is committed.
#[derive(Clone, PartialEq)]
struct LiveStroke {
    page: usize,
    points: Vec<(f32, f32)>,
}

async fn open_session(api: &Api, id: WorkOrderId) -> Result<(WorkOrder, AnnotationSession)> {
    let order = api.get_work_order(id).await?;
    let key = order
        .pdf_key()
        .ok_or_else(|| Error::InvalidInput("This work order has no PDF.".to_string()))?
        .to_string();
    let bytes = api.download_file(&key).await?;
    match cache_dir() {
        Ok(cache) => {
            if let Err(error) = cache.write(&cache.annotation_source_path(id), &bytes) {
                tracing::warn!("Could not cache PDF for work order {}: {}", id, error);
            }
        }
        Err(error) => tracing::warn!("No cache directory: {}", error),
    }
    Ok((order, AnnotationSession::open(bytes)?))
}

/// Page images under the ink, or blank pages and a notice when the
/// renderer is unavailable.
fn page_backgrounds(session: &AnnotationSession) -> (Vec<Option<String>>, Option<String>) {
    match system_rasterizer().and_then(|rasterizer| annotation_backgrounds(&rasterizer, session)) {
        Ok(pages) => (pages.into_iter().map(|page| Some(page.image_uri)).collect(), None),
        Err(error) => {
            tracing::warn!("Could not render PDF pages: {}", error);
            (
                vec![None; session.page_count()],
                Some("Page preview unavailable. Ink is still placed on the right page.".to_string()),
            )
        }
    }
}

fn overlay_uri(session: &AnnotationSession, page: usize) -> Option<String> {
    let layer = session.ink_layer(page)?;
    if !layer.has_ink() {
        return None;
    }
    png_data_uri(layer.image())
        .inspect_err(|error| tracing::warn!("Could not render ink for page {}: {}", page + 1, error))
        .ok()
}

fn polyline_points(points: &[(f32, f32)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[component]
pub fn AnnotatePdfView(id: WorkOrderId) -> Element {
    let api = use_api();
    let mut navigator = use_navigator();
    let mut order = use_signal(|| None::<WorkOrder>);
    let mut session = use_signal(|| None::<AnnotationSession>);
    let mut overlays = use_signal(Vec::<Option<String>>::new);
    let mut backgrounds = use_signal(Vec::<Option<String>>::new);
    let mut notice = use_signal(|| None::<String>);
    let mut live = use_signal(|| None::<LiveStroke>);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    use_future({
        let api = api.clone();
        move || {
            let api = api.clone();
            async move {
                match open_session(&api, id).await {
                    Ok((loaded, opened)) => {
                        let (pages, unavailable) = page_backgrounds(&opened);
                        backgrounds.set(pages);
                        notice.set(unavailable);
                        overlays.set(vec![None; opened.page_count()]);
                        order.set(Some(loaded));
                        session.set(Some(opened));
                    }
                    Err(failure) => error.set(report_error(&failure, &api, navigator)),
                }
            }
        }
    });

    let mut refresh_overlay = move |page: usize| {
        let uri = session.read().as_ref().and_then(|opened| overlay_uri(opened, page));
        if let Some(slot) = overlays.write().get_mut(page) {
            *slot = uri;
        }
    };

    let mut finish_stroke = move || {
        if let Some(stroke) = live.take() {
            if let Some(opened) = session.write().as_mut() {
                opened.end_stroke();
            }
            refresh_overlay(stroke.page);
        }
    };

    let on_save = {
        let api = api.clone();
        move |_| {
            let api = api.clone();
            spawn(async move {
                let Some(loaded) = order() else {
                    return;
                };
                let flattened = {
                    let guard = session.read();
                    let Some(opened) = guard.as_ref() else {
                        return;
                    };
                    if opened.inked_pages().is_empty() {
                        error.set(Some("Draw on the PDF before saving.".to_string()));
                        return;
                    }
                    opened.flatten()
                };
                busy.set(true);
                error.set(None);
                let result = async {
                    let bytes = flattened?;
                    let cache = cache_dir()?;
                    cache.write(&cache.signed_pdf_path(unix_timestamp_millis()), &bytes)?;
                    let upload = UploadFile::pdf(loaded.signed_pdf_file_name(), bytes)?;
                    api.replace_pdf(id, &upload).await
                }
                .await;
                busy.set(false);
                match result {
                    Ok(()) => navigator.write().replace(Screen::ViewWorkOrder(id)),
                    Err(failure) => error.set(report_error(&failure, &api, navigator)),
                }
            });
        }
    };

    let guard = session.read();
    let Some(opened) = guard.as_ref() else {
        return rsx! {
            ErrorBanner { message: error() }
            if error().is_none() {
                p { class: "ui-muted", "Loading PDF..." }
            }
        };
    };
    let draw_mode = opened.draw_mode();
    let tool = opened.tool();
    let layouts: Vec<PageLayout> = opened.layouts();
    let depths: Vec<usize> = (0..opened.page_count()).map(|page| opened.undo_depth(page)).collect();
    drop(guard);

    let current_overlays = overlays();
    let current_backgrounds = backgrounds();
    let current_live = live();

    rsx! {
        ErrorBanner { message: error() }
        if let Some(message) = notice() {
            p { class: "ui-muted", "{message}" }
        }
        div {
            class: "ui-card",
            style: "flex-direction: row; flex-wrap: wrap; gap: 8px;",
            UiButton {
                variant: if draw_mode { ButtonVariant::Primary } else { ButtonVariant::Outline },
                onclick: move |_| {
                    if let Some(opened) = session.write().as_mut() {
                        let enabled = !opened.draw_mode();
                        opened.set_draw_mode(enabled);
                    }
                    live.set(None);
                },
                if draw_mode { "Drawing: On" } else { "Drawing: Off" }
            }
            UiButton {
                variant: if tool == Tool::Pen { ButtonVariant::Primary } else { ButtonVariant::Outline },
                onclick: move |_| {
                    if let Some(opened) = session.write().as_mut() {
                        opened.set_tool(Tool::Pen);
                    }
                },
                "Pen"
            }
            UiButton {
                variant: if tool == Tool::Eraser { ButtonVariant::Primary } else { ButtonVariant::Outline },
                onclick: move |_| {
                    if let Some(opened) = session.write().as_mut() {
                        opened.set_tool(Tool::Eraser);
                    }
                },
                "Eraser"
            }
            UiButton {
                variant: ButtonVariant::Primary,
                disabled: busy(),
                onclick: on_save,
                if busy() { "Saving..." } else { "Save" }
            }
            UiButton {
                variant: ButtonVariant::Outline,
                disabled: busy(),
                onclick: move |_| {
                    navigator.write().back();
                },
                "Cancel"
            }
        }

        for layout in layouts {
            div {
                key: "page-{layout.index}",
                class: "ui-card",
                div {
                    style: "display: flex; align-items: center; justify-content: space-between;",
                    span { class: "ui-muted", "Page {layout.index + 1}" }
                    div {
                        style: "display: flex; gap: 6px;",
                        UiButton {
                            variant: ButtonVariant::Outline,
                            disabled: depths.get(layout.index).copied().unwrap_or_default() == 0,
                            onclick: move |_| {
                                if let Some(opened) = session.write().as_mut() {
                                    opened.undo(layout.index);
                                }
                                refresh_overlay(layout.index);
                            },
                            "Undo"
                        }
                        UiButton {
                            variant: ButtonVariant::Outline,
                            onclick: move |_| {
                                if let Some(opened) = session.write().as_mut() {
                                    opened.clear_page(layout.index);
                                }
                                refresh_overlay(layout.index);
                            },
                            "Clear"
                        }
                    }
                }
                div {
                    style: "overflow-x: auto;",
                    div {
                        style: "position: relative; width: {layout.canvas_width}px; height: {layout.canvas_height}px; background: #ffffff; box-shadow: 0 1px 4px rgba(0,0,0,0.15); touch-action: {touch_action(draw_mode)};",
                        onpointerdown: move |event: PointerEvent| {
                            let at = event.element_coordinates();
                            let started = session
                                .write()
                                .as_mut()
                                .is_some_and(|opened| {
                                    opened.begin_stroke(layout.index, Point::new(at.x as f32, at.y as f32))
                                });
                            if started {
                                live.set(Some(LiveStroke {
                                    page: layout.index,
                                    points: vec![(at.x as f32, at.y as f32)],
                                }));
                            }
                        },
                        onpointermove: move |event: PointerEvent| {
                            if !live.read().as_ref().is_some_and(|stroke| stroke.page == layout.index) {
                                return;
                            }
                            let at = event.element_coordinates();
                            let point = (at.x as f32, at.y as f32);
                            let drawn = session
                                .write()
                                .as_mut()
                                .is_some_and(|opened| opened.stroke_to(Point::new(point.0, point.1)));
                            if drawn {
                                if let Some(stroke) = live.write().as_mut() {
                                    stroke.points.push(point);
                                }
                            }
                        },
                        onpointerup: move |_| finish_stroke(),
                        onpointerleave: move |_| finish_stroke(),
                        if let Some(Some(uri)) = current_backgrounds.get(layout.index) {
                            img {
                                src: "{uri}",
                                draggable: "false",
                                style: "position: absolute; inset: 0; width: 100%; height: 100%; pointer-events: none; user-select: none;",
                            }
                        }
                        if let Some(Some(uri)) = current_overlays.get(layout.index) {
                            img {
                                src: "{uri}",
                                style: "position: absolute; inset: 0; width: 100%; height: 100%; pointer-events: none;",
                            }
                        }
                        if let Some(stroke) = current_live.as_ref().filter(|stroke| stroke.page == layout.index) {
                            svg {
                                style: "position: absolute; inset: 0; pointer-events: none;",
                                width: "{layout.canvas_width}",
                                height: "{layout.canvas_height}",
                                polyline {
                                    points: "{polyline_points(&stroke.points)}",
                                    fill: "none",
                                    stroke: if tool == Tool::Pen { "#000000" } else { "#f87171" },
                                    stroke_width: "{PEN_WIDTH}",
                                    stroke_linecap: "round",
                                    stroke_linejoin: "round",
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

const fn touch_action(draw_mode: bool) -> &'static str {
    if draw_mode {
        "none"
    } else {
        "auto"
    }
}
