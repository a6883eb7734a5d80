//! Document abstraction the switcher drives.
//!
//! # Design
//! - The engine never talks to `web-sys` directly; it goes through [`Dom`] so the same
//!   state machine runs against the browser and against [`memory::MemoryDom`].
//! - Listener registration returns an owned subscription handle. Dropping it through
//!   [`Dom::unlisten`] is the only way a listener goes away.
//! - Selectors are a closed set of shapes the widgets actually need.

pub mod memory;

use std::fmt;

/// Identifier the engine assigns to every listener it registers.
pub type ListenerId = u64;

/// Event families the engine subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Pointer activation (`click`). Page-level click listeners use the capture phase.
    Click,
    /// Key press (`keydown`).
    KeyDown,
    /// Mobile breakpoint match changed.
    ViewportChange,
}

impl EventType {
    /// DOM event name.
    #[must_use]
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::ViewportChange => "change",
        }
    }
}

/// Where a listener is attached.
#[derive(Clone, Copy, Debug)]
pub enum ListenTarget<'a, N> {
    /// A specific element.
    Node(&'a N),
    /// The document itself.
    Document,
    /// The mobile breakpoint media query.
    Viewport,
}

/// Element selectors understood by every [`Dom`] implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selector<'a> {
    /// Elements carrying one class.
    Class(&'a str),
    /// Elements carrying every listed class.
    Classes(&'a [&'a str]),
    /// Elements with a `role` attribute.
    Role(&'a str),
}

impl Selector<'_> {
    /// CSS form of the selector.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Class(class) => format!(".{class}"),
            Self::Classes(classes) => classes.iter().map(|class| format!(".{class}")).collect(),
            Self::Role(role) => format!("[role=\"{role}\"]"),
        }
    }

    /// Whether an element with the given classes and role matches.
    #[must_use]
    pub fn matches(&self, classes: &[String], role: Option<&str>) -> bool {
        let has = |wanted: &str| classes.iter().any(|class| class == wanted);
        match self {
            Self::Class(class) => has(class),
            Self::Classes(wanted) => wanted.iter().all(|class| has(class)),
            Self::Role(wanted) => role == Some(*wanted),
        }
    }
}

/// Document operations the switcher relies on.
///
/// Mutating calls are infallible from the engine's point of view: an implementation
/// that cannot apply a change logs it and carries on.
pub trait Dom {
    /// Element handle.
    type Node: Clone + PartialEq + fmt::Debug;
    /// Live subscription handle returned by [`Dom::listen`].
    type Listener;

    /// Every connected element matching `selector`, in document order.
    fn query_all(&self, selector: &Selector<'_>) -> Vec<Self::Node>;
    /// First descendant of `scope` matching `selector`.
    fn find_first(&self, scope: &Self::Node, selector: &Selector<'_>) -> Option<Self::Node>;
    /// Every descendant of `scope` matching `selector`, in document order.
    fn find_all(&self, scope: &Self::Node, selector: &Selector<'_>) -> Vec<Self::Node>;
    /// Connected element with the given id.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;
    /// Direct element children of `node`.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;
    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> Option<Self::Node>;
    /// Append `child` to `parent`, moving it if it is already attached elsewhere.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);
    /// Append `child` to the document body.
    fn append_to_body(&mut self, child: &Self::Node);
    /// Detach `node` from its parent.
    fn remove(&mut self, node: &Self::Node);

    /// Attribute value.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    /// Set an attribute.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);
    /// Remove an attribute.
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);
    /// Whether the element carries `class`.
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    /// Add a class.
    fn add_class(&mut self, node: &Self::Node, class: &str);
    /// Remove a class.
    fn remove_class(&mut self, node: &Self::Node, class: &str);
    /// Text content of the element and its descendants.
    fn text(&self, node: &Self::Node) -> String;
    /// Replace the element's content with text.
    fn set_text(&mut self, node: &Self::Node, text: &str);
    /// Replace the element's content with trusted static markup.
    fn set_markup(&mut self, node: &Self::Node, markup: &str);
    /// Hide or show the element.
    fn set_hidden(&mut self, node: &Self::Node, hidden: bool);
    /// Move keyboard focus to the element.
    fn focus(&mut self, node: &Self::Node);

    /// Language declared on the document element.
    fn document_lang(&self) -> Option<String>;
    /// Set an attribute on the document element.
    fn set_document_attribute(&mut self, name: &str, value: &str);
    /// Whether the viewport currently matches the mobile breakpoint.
    fn viewport_is_mobile(&self) -> bool;
    /// Monotonic clock in milliseconds.
    fn now_ms(&self) -> u64;

    /// Subscribe listener `id` to `event` on `target`.
    fn listen(
        &mut self,
        id: ListenerId,
        target: ListenTarget<'_, Self::Node>,
        event: EventType,
    ) -> Option<Self::Listener>;
    /// Cancel a subscription.
    fn unlisten(&mut self, listener: Self::Listener);
}

/// Root of a language switcher.
pub const LANGUAGE_ROOT: Selector<'static> = Selector::Classes(&["switch", "lang"]);
/// Root of a currency switcher.
pub const CURRENCY_ROOT: Selector<'static> = Selector::Classes(&["switch", "currency"]);
/// Trigger button inside a root.
pub const TRIGGER: Selector<'static> = Selector::Class("current");
/// Option container inside a root.
pub const LISTBOX: Selector<'static> = Selector::Role("listbox");
/// Option entries inside a listbox.
pub const OPTION: Selector<'static> = Selector::Role("option");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_render_css() {
        assert_eq!(LANGUAGE_ROOT.to_css(), ".switch.lang");
        assert_eq!(TRIGGER.to_css(), ".current");
        assert_eq!(LISTBOX.to_css(), "[role=\"listbox\"]");
    }

    #[test]
    fn selectors_match_classes_and_roles() {
        let classes = vec!["switch".to_string(), "currency".to_string()];
        assert!(CURRENCY_ROOT.matches(&classes, None));
        assert!(!LANGUAGE_ROOT.matches(&classes, None));
        assert!(OPTION.matches(&[], Some("option")));
        assert!(!OPTION.matches(&[], Some("listbox")));
    }

    #[test]
    fn event_names_follow_dom_conventions() {
        assert_eq!(EventType::Click.dom_name(), "click");
        assert_eq!(EventType::KeyDown.dom_name(), "keydown");
    }
}
