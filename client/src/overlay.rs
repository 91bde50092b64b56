use floodmap_shared::{FloodDataset, LoadOutcome, OverlayLoadError, OverlaySlot, parse_dataset};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::config::DATASET_PATH;

/// Start the one and only flood overlay load. Further calls are refused.
pub fn load_flood_overlay(slot: RwSignal<OverlaySlot>) {
    let Some(ticket) = slot.try_update(|s| s.begin_load()).flatten() else {
        web_sys::console::warn_1(&"Flood overlay already requested; ignoring reload".into());
        return;
    };

    spawn_local(async move {
        let result = fetch_dataset(DATASET_PATH).await;
        let Some(outcome) = slot.try_update(move |s| s.complete(ticket, result)) else {
            return;
        };
        match outcome {
            LoadOutcome::Loaded { features, skipped } => {
                web_sys::console::info_1(
                    &format!("flood overlay loaded: features={features} skipped={skipped}").into(),
                );
            }
            LoadOutcome::Failed { diagnostic, notice } => {
                web_sys::console::error_1(&diagnostic.into());
                notify_user(notice);
            }
        }
    });
}

/// Blocking notice, as the page has nothing else to show the user.
fn notify_user(message: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let _ = window.alert_with_message(message);
}

async fn fetch_dataset(path: &str) -> Result<FloodDataset, OverlayLoadError> {
    let resp = gloo_net::http::Request::get(path)
        .send()
        .await
        .map_err(|e| OverlayLoadError::new(format!("fetch error: {e}")))?;

    if !resp.ok() {
        return Err(OverlayLoadError::new(format!("HTTP {}", resp.status())));
    }

    let text = resp
        .text()
        .await
        .map_err(|e| OverlayLoadError::new(format!("read error: {e}")))?;
    parse_dataset(&text)
}
