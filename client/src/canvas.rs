use std::cell::{Cell, RefCell};
use std::rc::Rc;

use floodmap_shared::tiles::{tile_zoom, visible_tiles};
use floodmap_shared::{FloodOverlay, OverlaySlot, WorldPoint};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, CanvasWindingRule, HtmlCanvasElement, MouseEvent, PointerEvent,
    WheelEvent,
};

use crate::app::{CanvasSize, Hovered};
use crate::colors::{fill_css, stroke_css};
use crate::config::{INITIAL_CENTER, INITIAL_ZOOM, MAX_ZOOM};
use crate::popup::OpenPopup;
use crate::render_loop::FrameScheduler;
use crate::spatial::SpatialGrid;
use crate::tiles::{LoadedTile, TileLoader};
use crate::viewport::Viewport;

/// Pointer travel (CSS px) below which a press counts as a click.
const CLICK_SLOP_PX: f64 = 5.0;
/// Higher-zoom tiles are only kept on screen while they are still legible.
const MAX_OVERZOOMED_LEVELS: u8 = 2;
const MAP_BACKGROUND: &str = "#dddddd";

/// Canvas map: base tiles with the flood overlay on top, plus pan/zoom,
/// hover and click handling.
#[component]
pub fn MapCanvas() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let overlay: RwSignal<OverlaySlot> = expect_context();
    let loaded_tiles: RwSignal<Vec<LoadedTile>> = expect_context();
    let popup: RwSignal<Option<OpenPopup>> = expect_context();
    let Hovered(hovered) = expect_context();
    let CanvasSize(canvas_size) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    // Track drag state
    let is_dragging = Rc::new(Cell::new(false));
    let drag_start_x = Rc::new(Cell::new(0.0f64));
    let drag_start_y = Rc::new(Cell::new(0.0f64));
    let last_x = Rc::new(Cell::new(0.0f64));
    let last_y = Rc::new(Cell::new(0.0f64));

    // Track pinch state
    let pinch_dist = Rc::new(Cell::new(0.0f64));

    let spatial_grid: Rc<RefCell<SpatialGrid>> = Rc::new(RefCell::new(SpatialGrid::empty()));
    let grid_for_move = spatial_grid.clone();
    let grid_for_click = spatial_grid.clone();

    // The overlay is set exactly once; index it when it lands.
    let grid_built = Rc::new(Cell::new(false));
    Effect::new({
        let grid = spatial_grid.clone();
        move || {
            let loaded = overlay.with(|slot| slot.is_loaded());
            if !loaded || grid_built.get() {
                return;
            }
            overlay.with_untracked(|slot| {
                if let Some(o) = slot.overlay() {
                    *grid.borrow_mut() = SpatialGrid::build(o);
                }
            });
            grid_built.set(true);
        }
    });

    let placed = Rc::new(Cell::new(false));
    let fitted = Rc::new(Cell::new(false));

    // Cached 2D context (invalidated on canvas resize)
    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));

    let scheduler = Rc::new(FrameScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let canvas: &HtmlCanvasElement = &canvas;

        let Some(parent) = canvas.parent_element() else {
            return;
        };
        let w = parent.client_width() as f64;
        let h = parent.client_height() as f64;
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let dpr = web_sys::window()
            .map(|win| win.device_pixel_ratio())
            .unwrap_or(1.0)
            .max(1.0);
        let pw = (w * dpr).round().max(1.0) as u32;
        let ph = (h * dpr).round().max(1.0) as u32;
        if canvas.width() != pw || canvas.height() != ph {
            canvas.set_width(pw);
            canvas.set_height(ph);
            // Canvas resize resets 2D context state
            *cached_ctx.borrow_mut() = None;
        }
        if canvas_size.get_untracked() != (w, h) {
            canvas_size.set((w, h));
        }

        // Initial view until the overlay arrives
        if !placed.get() {
            placed.set(true);
            viewport.set(Viewport::centered_on(INITIAL_CENTER, INITIAL_ZOOM, w, h));
            return;
        }

        // Fit once, on the first frame after a successful load
        if !fitted.get() && overlay.with_untracked(|slot| slot.is_loaded()) {
            fitted.set(true);
            if let Some(bounds) = overlay.with_untracked(|slot| slot.overlay()?.bounds()) {
                viewport.update(|vp| vp.fit_bounds(&bounds, w, h));
                return;
            }
        }

        let ctx = {
            let mut ctx_cache = cached_ctx.borrow_mut();
            if ctx_cache.is_none() {
                let Some(ctx) = canvas
                    .get_context("2d")
                    .ok()
                    .flatten()
                    .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
                else {
                    web_sys::console::warn_1(&"Canvas 2D context unavailable; skipping frame".into());
                    return;
                };
                *ctx_cache = Some(ctx);
            }
            let Some(ctx) = ctx_cache.clone() else {
                return;
            };
            ctx
        };
        // All drawing stays in CSS pixel coords
        ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();

        let vp = viewport.get_untracked();
        loaded_tiles.with_untracked(|tiles| {
            overlay.with_untracked(|slot| {
                render_frame(FrameInput {
                    ctx: &ctx,
                    w,
                    h,
                    vp: &vp,
                    tiles,
                    overlay: slot.overlay(),
                });
            });
        });
    }));

    // Any change to what is drawn needs a repaint.
    let sched_vp = scheduler.clone();
    Effect::new(move || {
        viewport.track();
        loaded_tiles.track();
        overlay.track();
        canvas_size.track();
        sched_vp.mark_dirty();
    });

    // Window resizes only reach the canvas through a repaint.
    bind_resize(scheduler.clone());

    // Tile requests follow the visible area.
    let tile_loader = TileLoader::new(loaded_tiles);
    Effect::new(move || {
        let vp = viewport.get();
        let (w, h) = canvas_size.get();
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let z = tile_zoom(vp.zoom(), MAX_ZOOM);
        let (x1, y1, x2, y2) = vp.visible_world(w, h);
        tile_loader.request_visible(&visible_tiles(x1, y1, x2, y2, z));
    });

    let local_point = move |client_x: f64, client_y: f64| -> Option<(f64, f64)> {
        let el = canvas_ref.get_untracked()?;
        let rect = el.get_bounding_client_rect();
        Some((client_x - rect.left(), client_y - rect.top()))
    };

    // --- Input handlers ---

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let delta = e.delta_y();
        let (x, y) = local_point(e.client_x() as f64, e.client_y() as f64)
            .unwrap_or((e.offset_x() as f64, e.offset_y() as f64));
        viewport.update(|vp| vp.zoom_at(delta, x, y));
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let drag_start_x = drag_start_x.clone();
        let drag_start_y = drag_start_y.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            is_dragging.set(true);
            set_hovered(overlay, hovered, None);
            drag_start_x.set(e.client_x() as f64);
            drag_start_y.set(e.client_y() as f64);
            last_x.set(e.client_x() as f64);
            last_y.set(e.client_y() as f64);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        let grid = grid_for_move;
        move |e: PointerEvent| {
            if is_dragging.get() {
                let dx = e.client_x() as f64 - last_x.get();
                let dy = e.client_y() as f64 - last_y.get();
                last_x.set(e.client_x() as f64);
                last_y.set(e.client_y() as f64);
                viewport.update(|vp| vp.pan(dx, dy));
                return;
            }

            let Some((sx, sy)) = local_point(e.client_x() as f64, e.client_y() as f64) else {
                return;
            };
            let (wx, wy) = viewport.with_untracked(|vp| vp.screen_to_world(sx, sy));
            let hit = overlay.with_untracked(|slot| {
                let o = slot.overlay()?;
                grid.borrow().find_at(o, wx, wy)
            });
            set_hovered(overlay, hovered, hit);

            if let Some(el) = canvas_ref.get_untracked() {
                let cursor = if hit.is_some() { "pointer" } else { "grab" };
                web_sys::HtmlElement::style(&el).set_property("cursor", cursor).ok();
            }
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "grab").ok();
            }
        }
    };

    let on_click = {
        let drag_start_x = drag_start_x.clone();
        let drag_start_y = drag_start_y.clone();
        let grid = grid_for_click;
        move |e: MouseEvent| {
            let dx = (e.client_x() as f64 - drag_start_x.get()).abs();
            let dy = (e.client_y() as f64 - drag_start_y.get()).abs();
            if dx >= CLICK_SLOP_PX || dy >= CLICK_SLOP_PX {
                return;
            }
            let Some((sx, sy)) = local_point(e.client_x() as f64, e.client_y() as f64) else {
                return;
            };
            let vp = viewport.get_untracked();
            let (wx, wy) = vp.screen_to_world(sx, sy);
            let content = overlay.with_untracked(|slot| {
                let o = slot.overlay()?;
                let idx = grid.borrow().find_at(o, wx, wy)?;
                o.click(idx).map(str::to_owned)
            });
            match content {
                Some(html) => popup.set(Some(OpenPopup {
                    anchor: vp.screen_to_latlng(sx, sy),
                    html,
                })),
                None => {
                    if popup.with_untracked(Option::is_some) {
                        popup.set(None);
                    }
                }
            }
        }
    };

    let on_pointer_leave = {
        let is_dragging = is_dragging.clone();
        move |_: PointerEvent| {
            if !is_dragging.get() {
                set_hovered(overlay, hovered, None);
            }
        }
    };

    let on_touch_start = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = (t1.client_x() - t0.client_x()) as f64;
                let dy = (t1.client_y() - t0.client_y()) as f64;
                pinch_dist.set((dx * dx + dy * dy).sqrt());
            }
        }
    };

    let on_touch_move = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = (t1.client_x() - t0.client_x()) as f64;
                let dy = (t1.client_y() - t0.client_y()) as f64;
                let new_dist = (dx * dx + dy * dy).sqrt();
                let old_dist = pinch_dist.get();

                if old_dist > 0.0 {
                    let mid_x = (t0.client_x() + t1.client_x()) as f64 / 2.0;
                    let mid_y = (t0.client_y() + t1.client_y()) as f64 / 2.0;
                    let (mx, my) = local_point(mid_x, mid_y).unwrap_or((mid_x, mid_y));
                    let delta = -(new_dist - old_dist) * 2.0;
                    viewport.update(|vp| vp.zoom_at(delta, mx, my));
                }

                pinch_dist.set(new_dist);
            }
        }
    };

    view! {
        <div
            style="position: absolute; inset: 0; overflow: hidden;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointerleave=on_pointer_leave
            on:click=on_click
            on:touchstart=on_touch_start
            on:touchmove=on_touch_move
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            />
        </div>
    }
}

struct ResizeBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

fn bind_resize(scheduler: Rc<FrameScheduler>) {
    let Some(window) = web_sys::window() else {
        return;
    };

    RESIZE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old.window.remove_event_listener_with_callback(
                "resize",
                old._handler.as_ref().unchecked_ref(),
            );
        }
    });

    let handler = Closure::<dyn Fn()>::new(move || scheduler.mark_dirty());
    if window
        .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
        .is_ok()
    {
        RESIZE_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(ResizeBinding {
                window: window.clone(),
                _handler: handler,
            });
        });
    }
}

/// Move the hover emphasis to `hit`. Leaving restores the default style;
/// entering emphasizes the feature and raises it to the top.
fn set_hovered(
    overlay: RwSignal<OverlaySlot>,
    hovered: RwSignal<Option<usize>>,
    hit: Option<usize>,
) {
    let prev = hovered.get_untracked();
    if prev == hit {
        return;
    }
    overlay.update(|slot| {
        let Some(o) = slot.overlay_mut() else {
            return;
        };
        if let Some(idx) = prev {
            o.pointer_leave(idx);
        }
        if let Some(idx) = hit {
            o.pointer_enter(idx);
        }
    });
    hovered.set(hit);
}

struct FrameInput<'a> {
    ctx: &'a CanvasRenderingContext2d,
    w: f64,
    h: f64,
    vp: &'a Viewport,
    tiles: &'a [LoadedTile],
    overlay: Option<&'a FloodOverlay>,
}

fn render_frame(input: FrameInput<'_>) {
    let FrameInput {
        ctx,
        w,
        h,
        vp,
        tiles,
        overlay,
    } = input;

    ctx.set_fill_style_str(MAP_BACKGROUND);
    ctx.fill_rect(0.0, 0.0, w, h);

    draw_tiles(ctx, w, h, vp, tiles);
    if let Some(overlay) = overlay {
        draw_overlay(ctx, w, h, vp, overlay);
    }
}

fn draw_tiles(ctx: &CanvasRenderingContext2d, w: f64, h: f64, vp: &Viewport, tiles: &[LoadedTile]) {
    let z = tile_zoom(vp.zoom(), MAX_ZOOM);
    let mut ordered: Vec<&LoadedTile> = tiles
        .iter()
        .filter(|t| t.coord.z <= z.saturating_add(MAX_OVERZOOMED_LEVELS))
        .collect();
    // Other levels fill gaps underneath; the current level paints last.
    ordered.sort_by_key(|t| std::cmp::Reverse(t.coord.z.abs_diff(z)));

    for tile in ordered {
        let (x1, y1, x2, y2) = tile.coord.world_rect();
        let (sx, sy) = vp.world_to_screen(x1, y1);
        let (ex, ey) = vp.world_to_screen(x2, y2);
        // Snap to pixel grid: floor start, ceil end, so neighbours overlap by up to 1px
        let sx = sx.floor();
        let sy = sy.floor();
        let sw = ex.ceil() - sx;
        let sh = ey.ceil() - sy;

        if sx + sw < 0.0 || sy + sh < 0.0 || sx > w || sy > h {
            continue;
        }

        ctx.draw_image_with_html_image_element_and_dw_and_dh(&tile.image, sx, sy, sw, sh)
            .ok();
    }
}

fn draw_overlay(
    ctx: &CanvasRenderingContext2d,
    w: f64,
    h: f64,
    vp: &Viewport,
    overlay: &FloodOverlay,
) {
    ctx.set_line_join("round");
    ctx.set_line_cap("round");

    for (_, f) in overlay.iter_draw_order() {
        let (x1, y1, x2, y2) = f.feature.world_bounds;
        let (sx1, sy1) = vp.world_to_screen(x1, y1);
        let (sx2, sy2) = vp.world_to_screen(x2, y2);
        let pad = f.style.weight;
        if sx2 + pad < 0.0 || sy2 + pad < 0.0 || sx1 - pad > w || sy1 - pad > h {
            continue;
        }

        ctx.begin_path();
        for polygon in &f.feature.polygons {
            for ring in &polygon.rings {
                trace_ring(ctx, vp, ring);
            }
        }

        ctx.set_fill_style_str(&fill_css(&f.style));
        ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
        ctx.set_stroke_style_str(&stroke_css(&f.style));
        ctx.set_line_width(f.style.weight);
        ctx.stroke();
    }
}

fn trace_ring(ctx: &CanvasRenderingContext2d, vp: &Viewport, ring: &[WorldPoint]) {
    let mut points = ring.iter().map(|p| vp.world_to_screen(p.x, p.y));
    let Some((x, y)) = points.next() else {
        return;
    };
    ctx.move_to(x, y);
    for (x, y) in points {
        ctx.line_to(x, y);
    }
    ctx.close_path();
}
