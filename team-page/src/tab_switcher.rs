//! ==============================================================================
//! tab_switcher.rs - results / upcoming tab switching
//! ==============================================================================
//!
//! one click listener on the navigation container (event delegation). a click
//! on a tab, or anything inside one, marks that tab active and shows the
//! matching panel while hiding the other. clicks that don't land in a tab are
//! ignored.
//!
//! panels are looked up on every click so markup replaced after load keeps
//! working. a tab may name its panel with `data-tab="results|upcoming"`;
//! without it the tab's visible text decides ("Results" or anything else).
//!
//! ==============================================================================

use shared::markup::{ACTIVE_CLASS, NAV_ID, TAB_ATTR, TAB_SELECTOR};
use shared::Panel;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, Node};

pub struct TabSwitcher {
    document: Document,
    nav: Element,
}

impl TabSwitcher {
    pub fn new(document: Document, nav: Element) -> Self {
        Self { document, nav }
    }

    /// switcher for `#team-nav`, if the page has one
    pub fn from_document(document: &Document) -> Option<Self> {
        let nav = document.get_element_by_id(NAV_ID)?;
        Some(Self::new(document.clone(), nav))
    }

    /// attach the delegated click listener to the navigation container
    pub fn install(self) -> Result<ListenerHandle, JsValue> {
        let target = self.nav.clone();

        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            match self.handle_tab_click(&event) {
                Ok(Some(panel)) => log::debug!("showing {} panel", panel.tag()),
                Ok(None) => {}
                Err(err) => log::error!("tab switch failed: {:?}", err),
            }
        });
        target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;

        Ok(ListenerHandle {
            target,
            closure: Some(closure),
        })
    }

    /// handle one click inside the navigation container.
    /// returns the panel now shown, or `None` when the click missed every tab.
    pub fn handle_tab_click(&self, event: &Event) -> Result<Option<Panel>, JsValue> {
        let Some(tab) = self.resolve_tab(event) else {
            return Ok(None);
        };

        // tabs are links
        event.prevent_default();

        self.clear_active()?;
        tab.class_list().add_1(ACTIVE_CLASS)?;

        let tag = tab.get_attribute(TAB_ATTR);
        let panel = Panel::for_tab(tag.as_deref(), &tab_label(&tab));
        self.show(panel)?;

        Ok(Some(panel))
    }

    /// the tab the event target sits in, never looking past the nav
    fn resolve_tab(&self, event: &Event) -> Option<Element> {
        let target = event.target()?.dyn_into::<Element>().ok()?;
        let tab = target.closest(TAB_SELECTOR).ok()??;

        let node: &Node = &tab;
        if self.nav.contains(Some(node)) {
            Some(tab)
        } else {
            None
        }
    }

    fn clear_active(&self) -> Result<(), JsValue> {
        let tabs = self.nav.query_selector_all(TAB_SELECTOR)?;
        for i in 0..tabs.length() {
            if let Some(tab) = tabs.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                tab.class_list().remove_1(ACTIVE_CLASS)?;
            }
        }
        Ok(())
    }

    fn show(&self, selected: Panel) -> Result<(), JsValue> {
        for panel in Panel::all() {
            let Some(element) = self.document.query_selector(panel.selector())? else {
                log::warn!("no element matches {}", panel.selector());
                continue;
            };
            let Some(element) = element.dyn_ref::<HtmlElement>() else {
                log::warn!("{} is not an html element", panel.selector());
                continue;
            };
            element
                .style()
                .set_property("display", selected.visibility_of(panel).css_display())?;
        }
        Ok(())
    }
}

/// visible text, as the user sees it
fn tab_label(tab: &Element) -> String {
    match tab.dyn_ref::<HtmlElement>() {
        Some(html) => html.inner_text(),
        None => tab.text_content().unwrap_or_default(),
    }
}

/// keeps the click listener alive; dropping it detaches the listener
pub struct ListenerHandle {
    target: Element,
    closure: Option<Closure<dyn FnMut(Event)>>,
}

impl ListenerHandle {
    /// keep the listener for the rest of the page's life
    pub fn forget(mut self) {
        if let Some(closure) = self.closure.take() {
            closure.forget();
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(closure) = self.closure.take() {
            let _ = self
                .target
                .remove_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        }
    }
}
