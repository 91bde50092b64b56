mod app;
mod canvas;
mod colors;
mod config;
mod controls;
mod overlay;
mod popup;
mod render_loop;
mod spatial;
mod tiles;
mod viewport;

use std::any::Any;
use std::cell::RefCell;

use leptos::mount::mount_to;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::config::MOUNT_ELEMENT_ID;

thread_local! {
    /// Keeps the Leptos owner (and with it every effect) alive for the page.
    static MOUNTED_MAP: RefCell<Option<Box<dyn Any>>> = const { RefCell::new(None) };
}

/// The map container, or `<body>` when the page has none.
fn map_container(document: &Document) -> Option<HtmlElement> {
    if let Some(el) = document
        .get_element_by_id(MOUNT_ELEMENT_ID)
        .and_then(|node| node.dyn_into::<HtmlElement>().ok())
    {
        return Some(el);
    }
    web_sys::console::warn_1(
        &format!("#{MOUNT_ELEMENT_ID} not found; mounting the map on <body>").into(),
    );
    document.body()
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(container) = map_container(&document) else {
        return;
    };

    MOUNTED_MAP.with(move |slot| {
        // Unmount first so a second main() never runs two maps side by side.
        drop(slot.borrow_mut().take());
        let handle = mount_to(container, app::App);
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
