//! ==============================================================================
//! lib.rs - Team Page
//! ==============================================================================
//!
//! purpose:
//!     browser side of a team's page. the host site renders the markup; this
//!     crate wires up the results / upcoming tabs and the load-more lists.
//!
//! architecture:
//!     - compiled to wasm, runs in browser
//!     - tab switching works directly on the rendered dom (web-sys)
//!     - load-more lists are leptos csr islands mounted into the page
//!     - more games come from the games-api worker via fetch
//!
//! ==============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub mod api;
pub mod components;
pub mod tab_switcher;

pub use tab_switcher::{ListenerHandle, TabSwitcher};

// ==============================================================================
// main entry point
// ==============================================================================

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    if let Err(err) = on_dom_ready(boot) {
        log::error!("team page failed to start: {:?}", err);
    }
}

/// run `f` once the document is parsed
fn on_dom_ready(f: fn()) -> Result<(), JsValue> {
    let document = document()?;

    let ready_state = js_sys::Reflect::get(&document, &JsValue::from_str("readyState"))?;
    if ready_state.as_string().as_deref() != Some("loading") {
        f();
        return Ok(());
    }

    let closure = Closure::<dyn FnMut()>::new(move || f());
    document.add_event_listener_with_callback("DOMContentLoaded", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn boot() {
    let document = match document() {
        Ok(document) => document,
        Err(err) => {
            log::error!("{:?}", err);
            return;
        }
    };

    match TabSwitcher::from_document(&document) {
        Some(switcher) => match switcher.install() {
            Ok(handle) => handle.forget(),
            Err(err) => log::error!("couldn't attach tab listener: {:?}", err),
        },
        None => log::warn!(
            "#{} not found, tabs left as rendered",
            shared::markup::NAV_ID
        ),
    }

    match components::mount_more_games(&document) {
        Ok(0) => {}
        Ok(n) => log::debug!("mounted {} load-more lists", n),
        Err(err) => log::error!("couldn't mount load-more lists: {:?}", err),
    }
}
