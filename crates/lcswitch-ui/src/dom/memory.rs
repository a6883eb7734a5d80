//! In-memory document used by native hosts, server-side snapshots and tests.
//!
//! Elements live in an arena and are never freed; removing a node only detaches it.
//! The document carries a virtual clock and a viewport width so deferred work and the
//! mobile breakpoint can be driven deterministically.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::breakpoints;
use crate::dom::{Dom, EventType, ListenTarget, ListenerId, Selector};

/// Handle to an element in a [`MemoryDom`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Subscription handle issued by [`MemoryDom`].
#[derive(Debug, PartialEq, Eq)]
pub struct MemoryListener {
    id: ListenerId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Attachment {
    Node(NodeId),
    Document,
    Viewport,
}

#[derive(Clone, Copy, Debug)]
struct ListenerRecord {
    attachment: Attachment,
    event: EventType,
}

#[derive(Clone, Debug, Default)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    markup: Option<String>,
    hidden: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document tree.
#[derive(Clone, Debug)]
pub struct MemoryDom {
    elements: Vec<Element>,
    html: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
    viewport_width: u16,
    clock_ms: u64,
    listeners: BTreeMap<ListenerId, ListenerRecord>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Desktop-sized viewport used until a test narrows it.
    pub const DEFAULT_VIEWPORT_WIDTH: u16 = 1280;

    /// Empty document with `<html>` and `<body>`.
    #[must_use]
    pub fn new() -> Self {
        let mut dom = Self {
            elements: Vec::new(),
            html: NodeId(0),
            body: NodeId(1),
            focused: None,
            viewport_width: Self::DEFAULT_VIEWPORT_WIDTH,
            clock_ms: 0,
            listeners: BTreeMap::new(),
        };
        let html = dom.push("html");
        let body = dom.push("body");
        dom.attach(html, body);
        dom.html = html;
        dom.body = body;
        dom
    }

    /// The document element.
    #[must_use]
    pub const fn html(&self) -> NodeId {
        self.html
    }

    /// The body element.
    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Create an element and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.push(tag);
        self.attach(parent, node);
        node
    }

    /// Declare the page language (`<html lang>`).
    pub fn set_document_lang(&mut self, lang: &str) {
        let html = self.html;
        self.set_attribute(&html, "lang", lang);
    }

    /// Resize the viewport.
    pub const fn set_viewport_width(&mut self, width: u16) {
        self.viewport_width = width;
    }

    /// Current viewport width.
    #[must_use]
    pub const fn viewport_width(&self) -> u16 {
        self.viewport_width
    }

    /// Move the virtual clock forward.
    pub const fn advance_clock(&mut self, ms: u64) {
        self.clock_ms = self.clock_ms.saturating_add(ms);
    }

    /// Move the virtual clock to `ms` if that is later than now.
    pub fn set_clock(&mut self, ms: u64) {
        self.clock_ms = self.clock_ms.max(ms);
    }

    /// Element holding keyboard focus.
    #[must_use]
    pub const fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Whether the element was hidden through [`Dom::set_hidden`].
    #[must_use]
    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.elements.get(node.0).is_some_and(|element| element.hidden)
    }

    /// Whether the element is reachable from the document element.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.ancestry(node).any(|ancestor| ancestor == self.html)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of live subscriptions attached to page-level targets.
    #[must_use]
    pub fn page_listener_count(&self) -> usize {
        self.listeners
            .values()
            .filter(|record| !matches!(record.attachment, Attachment::Node(_)))
            .count()
    }

    /// Listeners a browser would invoke for `event` dispatched at `target`, in order.
    ///
    /// Clicks reach page-level listeners first (capture phase) and then bubble from the
    /// target up; key presses bubble from the target up to the page-level listeners.
    #[must_use]
    pub fn propagation_path(&self, target: NodeId, event: EventType) -> Vec<ListenerId> {
        let connected = self.is_connected(target);
        let document = || {
            self.listeners
                .iter()
                .filter(move |(_, record)| {
                    connected
                        && record.event == event
                        && record.attachment == Attachment::Document
                })
                .map(|(id, _)| *id)
        };
        let bubbling = self.ancestry(target).flat_map(|node| {
            self.listeners
                .iter()
                .filter(move |(_, record)| {
                    record.event == event && record.attachment == Attachment::Node(node)
                })
                .map(|(id, _)| *id)
        });

        match event {
            EventType::Click => document().chain(bubbling).collect(),
            EventType::KeyDown => bubbling.chain(document()).collect(),
            EventType::ViewportChange => self.viewport_listeners(),
        }
    }

    /// Listeners attached to the mobile breakpoint.
    #[must_use]
    pub fn viewport_listeners(&self) -> Vec<ListenerId> {
        self.listeners
            .iter()
            .filter(|(_, record)| record.attachment == Attachment::Viewport)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Serialise an element subtree.
    #[must_use]
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(element) = self.elements.get(node.0) else {
            return;
        };
        let _ = write!(out, "<{}", element.tag);
        if !element.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&element.classes.join(" ")));
        }
        for (name, value) in &element.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }
        if element.hidden {
            out.push_str(" hidden");
        }
        out.push('>');
        if let Some(markup) = &element.markup {
            out.push_str(markup);
        } else {
            out.push_str(&escape(&element.text));
        }
        for child in &element.children {
            self.write_html(*child, out);
        }
        let _ = write!(out, "</{}>", element.tag);
    }

    fn push(&mut self, tag: &str) -> NodeId {
        self.elements.push(Element {
            tag: tag.to_ascii_lowercase(),
            ..Element::default()
        });
        NodeId(self.elements.len() - 1)
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        self.elements.get(node.0)
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.elements.get_mut(node.0)
    }

    fn ancestry(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), |current| {
            self.element(*current).and_then(|element| element.parent)
        })
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.element_mut(node).and_then(|element| element.parent.take());
        if let Some(parent) = parent.and_then(|parent| self.element_mut(parent)) {
            parent.children.retain(|child| *child != node);
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.elements.len() || child.0 >= self.elements.len() {
            return;
        }
        if self.ancestry(parent).any(|ancestor| ancestor == child) {
            return;
        }
        self.detach(child);
        if let Some(element) = self.element_mut(child) {
            element.parent = Some(parent);
        }
        if let Some(element) = self.element_mut(parent) {
            element.children.push(child);
        }
    }

    fn clear_content(&mut self, node: NodeId) {
        let children = self
            .element(node)
            .map(|element| element.children.clone())
            .unwrap_or_default();
        for child in children {
            self.detach(child);
        }
        if let Some(element) = self.element_mut(node) {
            element.text.clear();
            element.markup = None;
        }
    }

    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self
            .element(scope)
            .map(|element| element.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(node) = stack.pop() {
            found.push(node);
            if let Some(element) = self.element(node) {
                stack.extend(element.children.iter().rev().copied());
            }
        }
        found
    }

    fn matches(&self, node: NodeId, selector: &Selector<'_>) -> bool {
        self.element(node).is_some_and(|element| {
            selector.matches(
                &element.classes,
                element.attributes.get("role").map(String::as_str),
            )
        })
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;
    type Listener = MemoryListener;

    fn query_all(&self, selector: &Selector<'_>) -> Vec<NodeId> {
        self.descendants(self.html)
            .into_iter()
            .filter(|node| self.matches(*node, selector))
            .collect()
    }

    fn find_first(&self, scope: &NodeId, selector: &Selector<'_>) -> Option<NodeId> {
        self.descendants(*scope)
            .into_iter()
            .find(|node| self.matches(*node, selector))
    }

    fn find_all(&self, scope: &NodeId, selector: &Selector<'_>) -> Vec<NodeId> {
        self.descendants(*scope)
            .into_iter()
            .filter(|node| self.matches(*node, selector))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.html).into_iter().find(|node| {
            self.element(*node)
                .and_then(|element| element.attributes.get("id"))
                .is_some_and(|value| value == id)
        })
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.element(*node)
            .map(|element| element.children.clone())
            .unwrap_or_default()
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.ancestry(*node).any(|current| current == *ancestor)
    }

    fn create_element(&mut self, tag: &str) -> Option<NodeId> {
        Some(self.push(tag))
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        self.attach(*parent, *child);
    }

    fn append_to_body(&mut self, child: &NodeId) {
        let body = self.body;
        self.attach(body, *child);
    }

    fn remove(&mut self, node: &NodeId) {
        if self.focused.is_some_and(|focused| self.contains(node, &focused)) {
            self.focused = None;
        }
        self.detach(*node);
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let element = self.element(*node)?;
        if name == "class" {
            return (!element.classes.is_empty()).then(|| element.classes.join(" "));
        }
        element.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(*node) {
            if name == "class" {
                element.classes = value.split_whitespace().map(str::to_string).collect();
            } else {
                element.attributes.insert(name.to_string(), value.to_string());
            }
        }
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        if let Some(element) = self.element_mut(*node) {
            if name == "class" {
                element.classes.clear();
            } else {
                element.attributes.remove(name);
            }
        }
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.element(*node)
            .is_some_and(|element| element.classes.iter().any(|current| current == class))
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if let Some(element) = self.element_mut(*node) {
            if !element.classes.iter().any(|current| current == class) {
                element.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        if let Some(element) = self.element_mut(*node) {
            element.classes.retain(|current| current != class);
        }
    }

    fn text(&self, node: &NodeId) -> String {
        let Some(element) = self.element(*node) else {
            return String::new();
        };
        let mut text = element.text.clone();
        for child in &element.children {
            text.push_str(&self.text(child));
        }
        text
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        self.clear_content(*node);
        if let Some(element) = self.element_mut(*node) {
            element.text = text.to_string();
        }
    }

    fn set_markup(&mut self, node: &NodeId, markup: &str) {
        self.clear_content(*node);
        if let Some(element) = self.element_mut(*node) {
            element.markup = Some(markup.to_string());
        }
    }

    fn set_hidden(&mut self, node: &NodeId, hidden: bool) {
        if let Some(element) = self.element_mut(*node) {
            element.hidden = hidden;
        }
    }

    fn focus(&mut self, node: &NodeId) {
        if node.0 < self.elements.len() {
            self.focused = Some(*node);
        }
    }

    fn document_lang(&self) -> Option<String> {
        self.attribute(&self.html, "lang")
    }

    fn set_document_attribute(&mut self, name: &str, value: &str) {
        let html = self.html;
        self.set_attribute(&html, name, value);
    }

    fn viewport_is_mobile(&self) -> bool {
        breakpoints::is_mobile_width(self.viewport_width)
    }

    fn now_ms(&self) -> u64 {
        self.clock_ms
    }

    fn listen(
        &mut self,
        id: ListenerId,
        target: ListenTarget<'_, NodeId>,
        event: EventType,
    ) -> Option<MemoryListener> {
        let attachment = match target {
            ListenTarget::Node(node) => Attachment::Node(*node),
            ListenTarget::Document => Attachment::Document,
            ListenTarget::Viewport => Attachment::Viewport,
        };
        self.listeners
            .insert(id, ListenerRecord { attachment, event });
        Some(MemoryListener { id })
    }

    fn unlisten(&mut self, listener: MemoryListener) {
        self.listeners.remove(&listener.id);
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{OPTION, TRIGGER};

    #[test]
    fn append_moves_nodes_between_parents() {
        let mut dom = MemoryDom::new();
        let first = dom.append_element(dom.body(), "div");
        let second = dom.append_element(dom.body(), "div");
        let child = dom.append_element(first, "span");
        dom.append_child(&second, &child);
        assert!(dom.children(&first).is_empty());
        assert_eq!(dom.children(&second), vec![child]);
        assert!(dom.contains(&second, &child));
    }

    #[test]
    fn append_refuses_cycles() {
        let mut dom = MemoryDom::new();
        let outer = dom.append_element(dom.body(), "div");
        let inner = dom.append_element(outer, "div");
        dom.append_child(&inner, &outer);
        assert_eq!(dom.children(&outer), vec![inner]);
    }

    #[test]
    fn queries_only_see_connected_elements() {
        let mut dom = MemoryDom::new();
        let button = dom.append_element(dom.body(), "button");
        dom.add_class(&button, "current");
        let detached = dom.create_element("button");
        assert!(detached.is_some());
        if let Some(detached) = detached {
            dom.add_class(&detached, "current");
        }
        assert_eq!(dom.query_all(&TRIGGER), vec![button]);
        dom.remove(&button);
        assert!(dom.query_all(&TRIGGER).is_empty());
        assert!(!dom.is_connected(button));
    }

    #[test]
    fn class_attribute_round_trips_through_class_list() {
        let mut dom = MemoryDom::new();
        let span = dom.append_element(dom.body(), "span");
        dom.set_attribute(&span, "class", "flag-icon  flag-icon-gb");
        assert!(dom.has_class(&span, "flag-icon-gb"));
        dom.remove_class(&span, "flag-icon");
        assert_eq!(dom.attribute(&span, "class").as_deref(), Some("flag-icon-gb"));
    }

    #[test]
    fn text_collects_descendants_and_set_text_replaces_children() {
        let mut dom = MemoryDom::new();
        let li = dom.append_element(dom.body(), "li");
        dom.set_attribute(&li, "role", "option");
        let span = dom.append_element(li, "span");
        dom.set_text(&span, "English");
        assert_eq!(dom.text(&li), "English");
        assert_eq!(dom.find_first(&dom.body(), &OPTION), Some(li));
        dom.set_text(&li, "Deutsch");
        assert!(dom.children(&li).is_empty());
        assert_eq!(dom.text(&li), "Deutsch");
    }

    #[test]
    fn click_path_runs_capture_listeners_before_bubbling() {
        let mut dom = MemoryDom::new();
        let outer = dom.append_element(dom.body(), "div");
        let inner = dom.append_element(outer, "button");
        let _outer_listener = dom.listen(1, ListenTarget::Node(&outer), EventType::Click);
        let _inner_listener = dom.listen(2, ListenTarget::Node(&inner), EventType::Click);
        let _page = dom.listen(3, ListenTarget::Document, EventType::Click);
        let _keys = dom.listen(4, ListenTarget::Document, EventType::KeyDown);
        assert_eq!(dom.propagation_path(inner, EventType::Click), vec![3, 2, 1]);
        assert_eq!(dom.propagation_path(inner, EventType::KeyDown), vec![4]);
    }

    #[test]
    fn unlisten_removes_subscription() {
        let mut dom = MemoryDom::new();
        let listener = dom.listen(9, ListenTarget::Viewport, EventType::ViewportChange);
        assert_eq!(dom.viewport_listeners(), vec![9]);
        if let Some(listener) = listener {
            dom.unlisten(listener);
        }
        assert_eq!(dom.listener_count(), 0);
    }

    #[test]
    fn serialises_subtree() {
        let mut dom = MemoryDom::new();
        let li = dom.append_element(dom.body(), "li");
        dom.set_attribute(&li, "data-lang", "en");
        dom.add_class(&li, "selected");
        let span = dom.append_element(li, "span");
        dom.set_text(&span, "A & B");
        assert_eq!(
            dom.to_html(li),
            "<li class=\"selected\" data-lang=\"en\"><span>A &amp; B</span></li>"
        );
    }

    #[test]
    fn viewport_width_drives_mobile_breakpoint() {
        let mut dom = MemoryDom::new();
        assert!(!dom.viewport_is_mobile());
        dom.set_viewport_width(600);
        assert!(dom.viewport_is_mobile());
    }
}
