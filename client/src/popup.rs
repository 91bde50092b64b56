use floodmap_shared::LatLng;
use leptos::prelude::*;

use crate::viewport::Viewport;

/// A popup opened by a feature click. `html` is inserted verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPopup {
    pub anchor: LatLng,
    pub html: String,
}

/// Popup bubble pinned above its geographic anchor; follows pan and zoom.
#[component]
pub fn PopupView() -> impl IntoView {
    let popup: RwSignal<Option<OpenPopup>> = expect_context();
    let viewport: RwSignal<Viewport> = expect_context();

    let content = Memo::new(move |_| popup.get().map(|p| p.html));
    let position = Memo::new(move |_| {
        let anchor = popup.with(|p| p.as_ref().map(|p| p.anchor))?;
        Some(viewport.with(|vp| vp.latlng_to_screen(anchor)))
    });

    view! {
        {move || {
            let Some(html) = content.get() else {
                return view! { <div style="display:none;" /> }.into_any();
            };
            view! {
                <div
                    class="map-popup"
                    style:left=move || format!("{}px", position.get().map(|p| p.0).unwrap_or(0.0))
                    style:top=move || format!("{}px", position.get().map(|p| p.1).unwrap_or(0.0))
                    style="position: absolute; z-index: 700; transform: translate(-50%, calc(-100% - 11px)); pointer-events: auto;"
                >
                    <div style="position: relative; background: #fff; color: #333; border-radius: 12px; box-shadow: 0 3px 14px rgba(0,0,0,0.4); min-width: 50px; max-width: 300px;">
                        <button
                            class="map-popup-close"
                            aria-label="Close popup"
                            style="position: absolute; top: 0; right: 0; width: 24px; height: 24px; border: none; background: transparent; color: #757575; font: 16px/24px Tahoma, Verdana, sans-serif; cursor: pointer;"
                            on:click=move |_| popup.set(None)
                        >
                            "\u{00D7}"
                        </button>
                        <div
                            class="map-popup-content"
                            style="margin: 13px 24px 13px 20px; line-height: 1.3; font-size: 13px; overflow-wrap: anywhere;"
                            inner_html=html
                        />
                    </div>
                    <div style="position: absolute; left: 50%; bottom: -10px; margin-left: -10px; width: 20px; height: 10px; overflow: hidden; pointer-events: none;">
                        <div style="width: 14px; height: 14px; margin: -8px auto 0; background: #fff; transform: rotate(45deg); box-shadow: 0 3px 14px rgba(0,0,0,0.4);" />
                    </div>
                </div>
            }
            .into_any()
        }}
    }
}
