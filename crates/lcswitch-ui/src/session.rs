//! Page-wide singletons shared by every widget of one `init`.

use std::collections::BTreeMap;

use crate::a11y::Announcer;
use crate::dom::{Dom, EventType, ListenTarget, ListenerId};
use crate::timers::{OVERLAY_ACTIVATE_MS, OVERLAY_REMOVE_MS, Owner, Task, TimerQueue};

/// Class of the shared mobile overlay.
pub const OVERLAY_CLASS: &str = "switch-mobile-overlay";
/// Class marking the overlay visible.
pub const OVERLAY_ACTIVE: &str = "active";

/// What a registered listener is wired to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Route {
    Trigger(usize),
    Option(usize, usize),
    Overlay,
    DocumentClick,
    DocumentKey,
    Viewport,
}

/// A listener registered through the session.
pub(crate) struct Subscription<D: Dom> {
    id: ListenerId,
    handle: D::Listener,
}

struct Overlay<D: Dom> {
    node: D::Node,
    subscription: Option<Subscription<D>>,
    leaving: bool,
}

/// Singletons of one session: timers, live region, overlay, open widget, listener routes.
pub(crate) struct UiSessionState<D: Dom> {
    pub(crate) timers: TimerQueue,
    pub(crate) announcer: Announcer<D::Node>,
    pub(crate) open_widget: Option<usize>,
    overlay: Option<Overlay<D>>,
    routes: BTreeMap<ListenerId, Route>,
    next_listener: ListenerId,
    viewport: Option<Subscription<D>>,
    page: Vec<Subscription<D>>,
}

impl<D: Dom> Default for UiSessionState<D> {
    fn default() -> Self {
        Self {
            timers: TimerQueue::new(),
            announcer: Announcer::default(),
            open_widget: None,
            overlay: None,
            routes: BTreeMap::new(),
            next_listener: 0,
            viewport: None,
            page: Vec::new(),
        }
    }
}

impl<D: Dom> UiSessionState<D> {
    /// Register a listener and remember where its events go.
    pub(crate) fn subscribe(
        &mut self,
        dom: &mut D,
        target: ListenTarget<'_, D::Node>,
        event: EventType,
        route: Route,
    ) -> Option<Subscription<D>> {
        self.next_listener += 1;
        let id = self.next_listener;
        let Some(handle) = dom.listen(id, target, event) else {
            tracing::warn!(?route, event = event.dom_name(), "listener could not be attached");
            return None;
        };
        self.routes.insert(id, route);
        Some(Subscription { id, handle })
    }

    /// Cancel a listener.
    pub(crate) fn unsubscribe(&mut self, dom: &mut D, subscription: Subscription<D>) {
        self.routes.remove(&subscription.id);
        dom.unlisten(subscription.handle);
    }

    /// Route of a live listener.
    pub(crate) fn route(&self, listener: ListenerId) -> Option<Route> {
        self.routes.get(&listener).copied()
    }

    /// Clear the live region and queue `message`.
    pub(crate) fn announce(&mut self, dom: &mut D, message: &str) {
        self.announcer.announce(dom, &mut self.timers, message);
    }

    /// Schedule session-owned work relative to the document clock.
    pub(crate) fn schedule(&mut self, dom: &D, delay: u64, owner: Owner, task: Task) {
        self.timers.schedule(dom.now_ms(), delay, owner, task);
    }

    /// Watch the mobile breakpoint.
    pub(crate) fn install_viewport_listener(&mut self, dom: &mut D) {
        if self.viewport.is_none() {
            self.viewport = self.subscribe(
                dom,
                ListenTarget::Viewport,
                EventType::ViewportChange,
                Route::Viewport,
            );
        }
    }

    /// Install the page-wide outside-click and Escape listeners.
    pub(crate) fn arm_page_listeners(&mut self, dom: &mut D) {
        if !self.page.is_empty() {
            return;
        }
        let click = self.subscribe(
            dom,
            ListenTarget::Document,
            EventType::Click,
            Route::DocumentClick,
        );
        let key = self.subscribe(
            dom,
            ListenTarget::Document,
            EventType::KeyDown,
            Route::DocumentKey,
        );
        self.page.extend(click);
        self.page.extend(key);
        tracing::debug!("page-wide listeners armed");
    }

    /// Make the shared overlay visible, creating it or cancelling its fade-out.
    pub(crate) fn acquire_overlay(&mut self, dom: &mut D) {
        if let Some(overlay) = self.overlay.as_mut() {
            if overlay.leaving {
                overlay.leaving = false;
                self.timers
                    .cancel_where(|timer| timer.task == Task::RemoveOverlay);
                self.schedule(dom, OVERLAY_ACTIVATE_MS, Owner::Session, Task::ActivateOverlay);
                tracing::debug!("mobile overlay revived");
            }
            return;
        }
        let Some(node) = dom.create_element("div") else {
            tracing::warn!("mobile overlay could not be created");
            return;
        };
        dom.add_class(&node, OVERLAY_CLASS);
        dom.append_to_body(&node);
        let subscription = self.subscribe(
            dom,
            ListenTarget::Node(&node),
            EventType::Click,
            Route::Overlay,
        );
        self.overlay = Some(Overlay {
            node,
            subscription,
            leaving: false,
        });
        self.schedule(dom, OVERLAY_ACTIVATE_MS, Owner::Session, Task::ActivateOverlay);
        tracing::debug!("mobile overlay created");
    }

    /// Start fading the overlay out; it is removed once the fade completes.
    pub(crate) fn release_overlay(&mut self, dom: &mut D) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };
        if overlay.leaving {
            return;
        }
        overlay.leaving = true;
        dom.remove_class(&overlay.node, OVERLAY_ACTIVE);
        self.timers
            .cancel_where(|timer| timer.task == Task::ActivateOverlay);
        self.schedule(dom, OVERLAY_REMOVE_MS, Owner::Session, Task::RemoveOverlay);
    }

    /// Mark the overlay visible unless it is fading out.
    pub(crate) fn activate_overlay(&mut self, dom: &mut D) {
        if let Some(overlay) = self.overlay.as_ref().filter(|overlay| !overlay.leaving) {
            dom.add_class(&overlay.node, OVERLAY_ACTIVE);
        }
    }

    /// Remove the overlay if its fade-out has completed.
    pub(crate) fn remove_faded_overlay(&mut self, dom: &mut D) {
        if self.overlay.as_ref().is_some_and(|overlay| overlay.leaving) {
            self.remove_overlay(dom);
            tracing::debug!("mobile overlay removed");
        }
    }

    /// The overlay element, if one exists.
    pub(crate) fn overlay_node(&self) -> Option<&D::Node> {
        self.overlay.as_ref().map(|overlay| &overlay.node)
    }

    /// Release everything the session created.
    pub(crate) fn teardown(&mut self, dom: &mut D) {
        if let Some(viewport) = self.viewport.take() {
            self.unsubscribe(dom, viewport);
        }
        for subscription in std::mem::take(&mut self.page) {
            self.unsubscribe(dom, subscription);
        }
        self.remove_overlay(dom);
        self.announcer.teardown(dom);
        self.timers.clear();
        self.routes.clear();
        self.open_widget = None;
    }

    fn remove_overlay(&mut self, dom: &mut D) {
        if let Some(overlay) = self.overlay.take() {
            if let Some(subscription) = overlay.subscription {
                self.unsubscribe(dom, subscription);
            }
            dom.remove(&overlay.node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDom;

    fn overlays(dom: &MemoryDom) -> usize {
        let body = dom.body();
        dom.children(&body)
            .iter()
            .filter(|node| dom.has_class(node, OVERLAY_CLASS))
            .count()
    }

    #[test]
    fn overlay_is_created_once_and_faded_out() {
        let mut dom = MemoryDom::new();
        let mut session = UiSessionState::<MemoryDom>::default();
        session.acquire_overlay(&mut dom);
        session.acquire_overlay(&mut dom);
        assert_eq!(overlays(&dom), 1);
        assert_eq!(dom.listener_count(), 1);

        session.release_overlay(&mut dom);
        assert!(session.timers.has_pending(Owner::Session, &Task::RemoveOverlay));
        assert!(!session.timers.has_pending(Owner::Session, &Task::ActivateOverlay));
        session.remove_faded_overlay(&mut dom);
        assert_eq!(overlays(&dom), 0);
        assert_eq!(dom.listener_count(), 0);
        assert!(session.overlay_node().is_none());
    }

    #[test]
    fn reacquiring_during_fade_keeps_the_overlay() {
        let mut dom = MemoryDom::new();
        let mut session = UiSessionState::<MemoryDom>::default();
        session.acquire_overlay(&mut dom);
        session.activate_overlay(&mut dom);
        session.release_overlay(&mut dom);
        session.acquire_overlay(&mut dom);
        assert!(!session.timers.has_pending(Owner::Session, &Task::RemoveOverlay));
        session.remove_faded_overlay(&mut dom);
        assert_eq!(overlays(&dom), 1);
        session.activate_overlay(&mut dom);
        let node = session.overlay_node().copied();
        assert!(node.is_some_and(|node| dom.has_class(&node, OVERLAY_ACTIVE)));
    }

    #[test]
    fn page_listeners_arm_once_and_teardown_releases_everything() {
        let mut dom = MemoryDom::new();
        let mut session = UiSessionState::<MemoryDom>::default();
        session.install_viewport_listener(&mut dom);
        session.arm_page_listeners(&mut dom);
        session.arm_page_listeners(&mut dom);
        assert_eq!(dom.page_listener_count(), 3);

        session.teardown(&mut dom);
        assert_eq!(dom.listener_count(), 0);
        assert!(session.timers.is_empty());
        assert!(session.route(1).is_none());
    }
}
