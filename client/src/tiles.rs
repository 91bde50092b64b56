#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use floodmap_shared::tiles::{TileCoord, tile_url};
use js_sys::Reflect;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

use crate::config::{MAX_CACHED_TILES, TILE_CONCURRENCY, TILE_SUBDOMAINS, TILE_URL_TEMPLATE};

const ONLOAD_HANDLE_KEY: &str = "__floodTileOnload";
const ONERROR_HANDLE_KEY: &str = "__floodTileOnerror";

/// A decoded base-map tile.
#[derive(Clone)]
pub struct LoadedTile {
    pub coord: TileCoord,
    pub image: HtmlImageElement,
}

/// Fetches base-map tiles with bounded concurrency. Only the most recent
/// visible set is kept queued; tiles already requested are never re-queued
/// unless they were evicted from the cache.
pub struct TileLoader {
    tiles_signal: RwSignal<Vec<LoadedTile>>,
    queue: RefCell<VecDeque<TileCoord>>,
    in_flight: Cell<usize>,
    requested: RefCell<HashSet<TileCoord>>,
}

impl TileLoader {
    pub fn new(tiles_signal: RwSignal<Vec<LoadedTile>>) -> Rc<Self> {
        Rc::new(Self {
            tiles_signal,
            queue: RefCell::new(VecDeque::new()),
            in_flight: Cell::new(0),
            requested: RefCell::new(HashSet::new()),
        })
    }

    /// Replace the pending queue with the tiles of the current view.
    pub fn request_visible(self: &Rc<Self>, visible: &[TileCoord]) {
        let plan = plan_requests(visible, &self.requested.borrow());
        *self.queue.borrow_mut() = plan;
        self.pump();
    }

    fn pump(self: &Rc<Self>) {
        while self.in_flight.get() < TILE_CONCURRENCY {
            let Some(coord) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            self.requested.borrow_mut().insert(coord);
            self.in_flight.set(self.in_flight.get() + 1);
            load_tile(self.clone(), coord);
        }
    }

    fn finish(self: &Rc<Self>, loaded: Option<LoadedTile>) {
        self.in_flight.set(self.in_flight.get().saturating_sub(1));
        if let Some(tile) = loaded {
            let mut evicted = Vec::new();
            self.tiles_signal.update(|cache| {
                if cache.iter().any(|t| t.coord == tile.coord) {
                    return;
                }
                cache.push(tile);
                let excess = overflow(cache.len(), MAX_CACHED_TILES);
                evicted.extend(cache.drain(..excess).map(|t| t.coord));
            });
            let mut requested = self.requested.borrow_mut();
            for coord in evicted {
                requested.remove(&coord);
            }
        }
        self.pump();
    }
}

/// Visible tiles not yet requested, keeping the nearest-first order.
pub fn plan_requests(visible: &[TileCoord], requested: &HashSet<TileCoord>) -> VecDeque<TileCoord> {
    visible
        .iter()
        .filter(|c| !requested.contains(c))
        .copied()
        .collect()
}

/// Number of oldest entries to drop to respect `cap`.
pub fn overflow(len: usize, cap: usize) -> usize {
    len.saturating_sub(cap)
}

fn load_tile(loader: Rc<TileLoader>, coord: TileCoord) {
    let src = tile_url(TILE_URL_TEMPLATE, TILE_SUBDOMAINS, coord);
    let img = match HtmlImageElement::new() {
        Ok(img) => img,
        Err(_) => {
            loader.finish(None);
            return;
        }
    };

    let img_for_load = img.clone();
    let loader_load = loader.clone();
    let onload = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_load);

        let img_for_decode = img_for_load.clone();
        let loader_load = loader_load.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let _ = JsFuture::from(img_for_decode.decode()).await;
            loader_load.finish(Some(LoadedTile {
                coord,
                image: img_for_decode,
            }));
        });
    });

    let img_for_error = img.clone();
    let loader_error = loader;
    let onerror = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_error);
        loader_error.finish(None);
    });

    let onload_js = onload.into_js_value();
    let onerror_js = onerror.into_js_value();
    img.set_onload(Some(onload_js.unchecked_ref()));
    img.set_onerror(Some(onerror_js.unchecked_ref()));
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONLOAD_HANDLE_KEY),
        &onload_js,
    );
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONERROR_HANDLE_KEY),
        &onerror_js,
    );
    img.set_src(&src);
}

fn clear_image_handlers(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY));
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(z: u8, x: i64, y: i64) -> TileCoord {
        TileCoord { z, x, y }
    }

    #[test]
    fn already_requested_tiles_are_not_queued_again() {
        let visible = [t(3, 4, 2), t(3, 5, 2), t(3, 4, 3)];
        let requested: HashSet<_> = [t(3, 5, 2)].into_iter().collect();
        let plan = plan_requests(&visible, &requested);
        assert_eq!(plan, VecDeque::from(vec![t(3, 4, 2), t(3, 4, 3)]));
    }

    #[test]
    fn overflow_counts_excess_only() {
        assert_eq!(overflow(10, 384), 0);
        assert_eq!(overflow(384, 384), 0);
        assert_eq!(overflow(390, 384), 6);
    }
}
