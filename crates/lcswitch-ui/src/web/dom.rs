//! [`Dom`] over the live browser document.

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlElement, KeyboardEvent, MediaQueryList, MediaQueryListEvent,
    MouseEvent,
};

use crate::breakpoints::MOBILE_QUERY;
use crate::dom::{Dom, EventType, ListenTarget, ListenerId, Selector};
use crate::events::{Dispatch, Key, PointerInfo, UiEvent, UiEventKind};
use crate::web::host;

/// Browser document adapter.
pub struct WebDom {
    document: Document,
    viewport: Option<MediaQueryList>,
}

impl WebDom {
    /// Adapter over the window's document, or `None` outside a browsing context.
    #[must_use]
    pub fn from_window() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let viewport = window.match_media(MOBILE_QUERY).ok().flatten();
        Some(Self { document, viewport })
    }
}

fn elements(list: &web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn translate(event: &Event, event_type: EventType) -> UiEvent<Element> {
    let target = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok());
    let kind = match event_type {
        EventType::Click => {
            let (client_x, client_y) = event
                .dyn_ref::<MouseEvent>()
                .map_or((0, 0), |mouse| (mouse.client_x(), mouse.client_y()));
            UiEventKind::Click(PointerInfo {
                trusted: event.is_trusted(),
                client_x,
                client_y,
            })
        }
        EventType::KeyDown => UiEventKind::KeyDown(
            event
                .dyn_ref::<KeyboardEvent>()
                .map_or(Key::Other, |keyboard| Key::from_dom_key(&keyboard.key())),
        ),
        EventType::ViewportChange => UiEventKind::ViewportChange {
            mobile: event
                .dyn_ref::<MediaQueryListEvent>()
                .is_some_and(MediaQueryListEvent::matches),
        },
    };
    UiEvent { kind, target }
}

fn apply(event: &Event, dispatch: &Dispatch<Element>) {
    if dispatch.prevent_default {
        event.prevent_default();
    }
    if dispatch.stop_propagation {
        event.stop_propagation();
    }
}

fn warn_on_error<T>(result: Result<T, wasm_bindgen::JsValue>, operation: &'static str) {
    if let Err(err) = result {
        tracing::warn!(operation, error = ?err, "document operation failed");
    }
}

impl Dom for WebDom {
    type Node = Element;
    type Listener = EventListener;

    fn query_all(&self, selector: &Selector<'_>) -> Vec<Element> {
        self.document
            .query_selector_all(&selector.to_css())
            .map(|list| elements(&list))
            .unwrap_or_default()
    }

    fn find_first(&self, scope: &Element, selector: &Selector<'_>) -> Option<Element> {
        scope.query_selector(&selector.to_css()).ok().flatten()
    }

    fn find_all(&self, scope: &Element, selector: &Selector<'_>) -> Vec<Element> {
        scope
            .query_selector_all(&selector.to_css())
            .map(|list| elements(&list))
            .unwrap_or_default()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn children(&self, node: &Element) -> Vec<Element> {
        let collection = node.children();
        (0..collection.length())
            .filter_map(|index| collection.item(index))
            .collect()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        ancestor.contains(Some(node))
    }

    fn create_element(&mut self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok()
    }

    fn append_child(&mut self, parent: &Element, child: &Element) {
        warn_on_error(parent.append_child(child), "append_child");
    }

    fn append_to_body(&mut self, child: &Element) {
        if let Some(body) = self.document.body() {
            warn_on_error(body.append_child(child), "append_to_body");
        }
    }

    fn remove(&mut self, node: &Element) {
        node.remove();
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        warn_on_error(node.set_attribute(name, value), "set_attribute");
    }

    fn remove_attribute(&mut self, node: &Element, name: &str) {
        warn_on_error(node.remove_attribute(name), "remove_attribute");
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        warn_on_error(node.class_list().add_1(class), "add_class");
    }

    fn remove_class(&mut self, node: &Element, class: &str) {
        warn_on_error(node.class_list().remove_1(class), "remove_class");
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&mut self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_markup(&mut self, node: &Element, markup: &str) {
        node.set_inner_html(markup);
    }

    fn set_hidden(&mut self, node: &Element, hidden: bool) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            element.set_hidden(hidden);
        }
    }

    fn focus(&mut self, node: &Element) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            warn_on_error(element.focus(), "focus");
        }
    }

    fn document_lang(&self) -> Option<String> {
        self.document
            .document_element()
            .and_then(|html| html.get_attribute("lang"))
    }

    fn set_document_attribute(&mut self, name: &str, value: &str) {
        if let Some(html) = self.document.document_element() {
            warn_on_error(html.set_attribute(name, value), "set_document_attribute");
        }
    }

    fn viewport_is_mobile(&self) -> bool {
        self.viewport.as_ref().is_some_and(MediaQueryList::matches)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn listen(
        &mut self,
        id: ListenerId,
        target: ListenTarget<'_, Element>,
        event_type: EventType,
    ) -> Option<EventListener> {
        let callback = move |event: &Event| {
            let translated = translate(event, event_type);
            if let Some(dispatch) = host::deliver(id, &translated) {
                apply(event, &dispatch);
                host::run_effects(dispatch.effects);
            }
        };
        let bubble = EventListenerOptions::enable_prevent_default();
        let listener = match target {
            ListenTarget::Node(node) => {
                EventListener::new_with_options(node, event_type.dom_name(), bubble, callback)
            }
            ListenTarget::Document => {
                let phase = if event_type == EventType::Click {
                    EventListenerPhase::Capture
                } else {
                    EventListenerPhase::Bubble
                };
                EventListener::new_with_options(
                    &self.document,
                    event_type.dom_name(),
                    EventListenerOptions {
                        phase,
                        passive: false,
                    },
                    callback,
                )
            }
            ListenTarget::Viewport => EventListener::new(
                self.viewport.as_ref()?,
                event_type.dom_name(),
                callback,
            ),
        };
        Some(listener)
    }

    fn unlisten(&mut self, listener: EventListener) {
        drop(listener);
    }
}
