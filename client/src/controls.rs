use floodmap_shared::FLOOD_STYLE;
use floodmap_shared::scale::metric_scale;
use leptos::prelude::*;

use crate::app::CanvasSize;
use crate::colors::fill_css;
use crate::config::{LEGEND_LABEL, SCALE_MAX_WIDTH_PX, TILE_ATTRIBUTION};
use crate::viewport::Viewport;

const CONTROL_STYLE: &str = "background: #fff; border-radius: 4px; box-shadow: 0 1px 5px rgba(0,0,0,0.65);";

/// Static legend: fill swatch and label.
#[component]
pub fn Legend() -> impl IntoView {
    let swatch = format!(
        "display: inline-block; width: 18px; height: 18px; vertical-align: middle; margin-right: 8px; background: {}; border: 1px solid {};",
        fill_css(&FLOOD_STYLE),
        FLOOD_STYLE.color,
    );

    view! {
        <div
            class="info legend"
            style=format!("{CONTROL_STYLE} padding: 6px 8px; font-size: 14px; line-height: 18px; color: #555;")
        >
            <i style=swatch></i>
            {LEGEND_LABEL}
        </div>
    }
}

/// Metric scale bar measured along the map's horizontal centre line.
#[component]
pub fn ScaleControl() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let CanvasSize(canvas_size) = expect_context();

    let bar = Memo::new(move |_| {
        let (_, h) = canvas_size.get();
        let y = h / 2.0;
        viewport.with(|vp| {
            let left = vp.screen_to_latlng(0.0, y);
            let right = vp.screen_to_latlng(SCALE_MAX_WIDTH_PX, y);
            metric_scale(left, right, SCALE_MAX_WIDTH_PX)
        })
    });

    view! {
        <div
            class="map-scale"
            style:width=move || format!("{}px", bar.get().width_px)
            style="border: 2px solid #777; border-top: none; padding: 2px 5px 1px; font-size: 11px; line-height: 1.1; color: #333; white-space: nowrap; box-sizing: border-box; background: rgba(255,255,255,0.8);"
        >
            {move || bar.get().label}
        </div>
    }
}

/// `+`/`-` buttons stepping one whole zoom level about the map centre.
#[component]
pub fn ZoomControl() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let CanvasSize(canvas_size) = expect_context();

    let zoom_step = move |levels: f64| {
        let (w, h) = canvas_size.get_untracked();
        viewport.update(|vp| vp.zoom_by(levels, w / 2.0, h / 2.0));
    };
    let can_zoom_in = Memo::new(move |_| viewport.with(Viewport::can_zoom_in));
    let can_zoom_out = Memo::new(move |_| viewport.with(Viewport::can_zoom_out));

    let button_style = move |enabled: bool| {
        format!(
            "display: block; width: 30px; height: 30px; border: none; background: #fff; font: bold 18px 'Lucida Console', Monaco, monospace; color: {}; cursor: {};",
            if enabled { "#000" } else { "#bbb" },
            if enabled { "pointer" } else { "default" },
        )
    };

    view! {
        <div class="map-zoom" style=format!("{CONTROL_STYLE} overflow: hidden;")>
            <button
                title="Zoom in"
                aria-label="Zoom in"
                disabled=move || !can_zoom_in.get()
                style=move || button_style(can_zoom_in.get())
                on:click=move |_| zoom_step(1.0)
            >
                "+"
            </button>
            <div style="height: 1px; background: #ccc;" />
            <button
                title="Zoom out"
                aria-label="Zoom out"
                disabled=move || !can_zoom_out.get()
                style=move || button_style(can_zoom_out.get())
                on:click=move |_| zoom_step(-1.0)
            >
                "\u{2212}"
            </button>
        </div>
    }
}

#[component]
pub fn Attribution() -> impl IntoView {
    view! {
        <div
            class="map-attribution"
            style="background: rgba(255,255,255,0.8); padding: 0 5px; font-size: 12px; line-height: 1.4; color: #333;"
        >
            {TILE_ATTRIBUTION}
        </div>
    }
}
