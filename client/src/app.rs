use std::cell::RefCell;

use floodmap_shared::OverlaySlot;
use leptos::prelude::*;

use crate::canvas::MapCanvas;
use crate::config::KEYBOARD_PAN_PX;
use crate::controls::{Attribution, Legend, ScaleControl, ZoomControl};
use crate::overlay::load_flood_overlay;
use crate::popup::{OpenPopup, PopupView};
use crate::tiles::LoadedTile;
use crate::viewport::Viewport;

struct KeydownBinding {
    window: web_sys::Window,
    _handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

/// Index of the feature under the pointer.
#[derive(Clone, Copy)]
pub(crate) struct Hovered(pub RwSignal<Option<usize>>);

/// CSS size of the map canvas, written by the render loop.
#[derive(Clone, Copy)]
pub(crate) struct CanvasSize(pub RwSignal<(f64, f64)>);

#[component]
pub fn App() -> impl IntoView {
    let viewport: RwSignal<Viewport> = RwSignal::new(Viewport::default());
    let overlay: RwSignal<OverlaySlot> = RwSignal::new(OverlaySlot::new());
    let loaded_tiles: RwSignal<Vec<LoadedTile>> = RwSignal::new(Vec::new());
    let popup: RwSignal<Option<OpenPopup>> = RwSignal::new(None);
    let hovered: RwSignal<Option<usize>> = RwSignal::new(None);
    let canvas_size: RwSignal<(f64, f64)> = RwSignal::new((0.0, 0.0));

    provide_context(viewport);
    provide_context(overlay);
    provide_context(loaded_tiles);
    provide_context(popup);
    provide_context(Hovered(hovered));
    provide_context(CanvasSize(canvas_size));

    // The flood layer is requested once, as soon as the map exists.
    load_flood_overlay(overlay);

    // Keyboard navigation
    Effect::new(move || {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::prelude::*;

        let Some(window) = web_sys::window() else {
            return;
        };

        KEYDOWN_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "keydown",
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });

        let handler =
            Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
                if e.ctrl_key() || e.meta_key() || e.alt_key() {
                    return;
                }
                let (cw, ch) = canvas_size.get_untracked();
                match e.key().as_str() {
                    "ArrowLeft" => {
                        e.prevent_default();
                        viewport.update(|vp| vp.pan(KEYBOARD_PAN_PX, 0.0));
                    }
                    "ArrowRight" => {
                        e.prevent_default();
                        viewport.update(|vp| vp.pan(-KEYBOARD_PAN_PX, 0.0));
                    }
                    "ArrowUp" => {
                        e.prevent_default();
                        viewport.update(|vp| vp.pan(0.0, KEYBOARD_PAN_PX));
                    }
                    "ArrowDown" => {
                        e.prevent_default();
                        viewport.update(|vp| vp.pan(0.0, -KEYBOARD_PAN_PX));
                    }
                    "+" | "=" => {
                        e.prevent_default();
                        viewport.update(|vp| vp.zoom_by(1.0, cw / 2.0, ch / 2.0));
                    }
                    "-" | "_" => {
                        e.prevent_default();
                        viewport.update(|vp| vp.zoom_by(-1.0, cw / 2.0, ch / 2.0));
                    }
                    "Escape" => {
                        if popup.with_untracked(Option::is_some) {
                            popup.set(None);
                        }
                    }
                    _ => {}
                }
            });

        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            KEYDOWN_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(KeydownBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }
    });

    view! {
        <div style="width: 100%; height: 100%; position: relative; overflow: hidden; background: #dddddd; font-family: 'Helvetica Neue', Arial, Helvetica, sans-serif;">
            <MapCanvas />
            <PopupView />
            <div class="map-control-top-left" style="position: absolute; top: 10px; left: 10px; z-index: 800;">
                <ZoomControl />
            </div>
            <div class="map-control-bottom-left" style="position: absolute; bottom: 10px; left: 10px; z-index: 800; pointer-events: none;">
                <ScaleControl />
            </div>
            <div
                class="map-control-bottom-right"
                style="position: absolute; bottom: 0; right: 0; z-index: 800; display: flex; flex-direction: column; align-items: flex-end; gap: 10px; pointer-events: none;"
            >
                <div style="margin-right: 10px; pointer-events: auto;">
                    <Legend />
                </div>
                <div style="pointer-events: auto;">
                    <Attribution />
                </div>
            </div>
        </div>
    }
}
