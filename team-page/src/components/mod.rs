//! ==============================================================================
//! components/mod.rs - UI Components
//! ==============================================================================

mod more_games;

pub use more_games::{GameRow, MoreGames};

use leptos::prelude::*;
use shared::markup::{API_BASE_ATTR, MORE_GAMES_ATTR, MORE_GAMES_SELECTOR, OFFSET_ATTR, TEAM_ATTR};
use shared::Panel;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::api;

/// mount a `MoreGames` list into every `[data-more-games]` element.
/// returns how many were mounted.
pub fn mount_more_games(document: &Document) -> Result<usize, JsValue> {
    let mounts = document.query_selector_all(MORE_GAMES_SELECTOR)?;
    let mut mounted = 0;

    for i in 0..mounts.length() {
        let Some(element) = mounts.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };

        let tag = element.get_attribute(MORE_GAMES_ATTR);
        let Some(panel) = tag.as_deref().and_then(Panel::from_tag) else {
            log::warn!("ignoring {} with unknown list {:?}", MORE_GAMES_SELECTOR, tag);
            continue;
        };
        let Some(team) = element.get_attribute(TEAM_ATTR) else {
            log::warn!("ignoring {} without {}", MORE_GAMES_SELECTOR, TEAM_ATTR);
            continue;
        };
        let offset = element
            .get_attribute(OFFSET_ATTR)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let api_base = element
            .get_attribute(API_BASE_ATTR)
            .unwrap_or_else(|| api::DEFAULT_API_BASE.to_string());

        leptos::mount::mount_to(element, move || {
            view! { <MoreGames panel=panel team=team api_base=api_base offset=offset /> }
        })
        .forget();
        mounted += 1;
    }

    Ok(mounted)
}
