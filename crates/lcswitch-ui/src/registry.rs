//! Public switcher surface: `init`, `destroy`, event routing and timer draining.
//!
//! # Design
//! - One [`Switcher`] owns the document adapter, every controller and the session
//!   singletons, so "at most one open widget" is enforced in one place.
//! - Hosts feed events in through [`Switcher::handle`] and drain deferred work through
//!   [`Switcher::run_due_timers`]; both return host effects instead of running them.

use lcswitch_config::{ResolvedOptions, SwitcherOptions, WidgetKind};
use serde::Serialize;

use crate::controller::{DropdownController, FocusStep, WidgetState};
use crate::dom::{CURRENCY_ROOT, Dom, LANGUAGE_ROOT, ListenerId};
use crate::events::{Dispatch, Effect, Key, PointerInfo, UiEvent, UiEventKind};
use crate::selectors::{init_currency_selector, init_language_selector};
use crate::session::{Route, UiSessionState};
use crate::timers::{GLOBAL_LISTENER_DELAY_MS, Owner, TOGGLE_DEBOUNCE_MS, Task, Timer};

/// Outcome of [`Switcher::init`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitReport {
    /// Language roots wired.
    pub language_widgets: usize,
    /// Currency roots wired.
    pub currency_widgets: usize,
    /// Currency roots hidden because currency change is disabled.
    pub hidden_currency_roots: usize,
    /// Roots skipped because their structure was incomplete.
    pub skipped: usize,
}

/// Read-only view of one widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSnapshot {
    /// Selector kind.
    pub kind: WidgetKind,
    /// Current state.
    pub state: WidgetState,
}

/// Diagnostic summary of a switcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitcherStatus {
    /// Whether `init` ran since the last `destroy`.
    pub initialized: bool,
    /// Wired language widgets.
    pub language_widgets: usize,
    /// Wired currency widgets.
    pub currency_widgets: usize,
    /// Widgets currently open.
    pub open_widgets: usize,
    /// Language declared by the page.
    pub page_language: Option<String>,
    /// Active language.
    pub language: Option<String>,
    /// Whether the mobile overlay exists.
    pub overlay_present: bool,
    /// Deferred continuations waiting to run.
    pub pending_timers: usize,
    /// Verbose logging toggle.
    pub debug: bool,
}

/// Turn verbose logging on.
pub fn enable_debug() {
    lcswitch_telemetry::enable_debug();
}

/// Turn verbose logging off.
pub fn disable_debug() {
    lcswitch_telemetry::disable_debug();
}

/// Widget registry bound to one document.
pub struct Switcher<D: Dom> {
    dom: D,
    widgets: Vec<DropdownController<D>>,
    session: UiSessionState<D>,
    resolved: Option<ResolvedOptions>,
}

impl<D: Dom> Switcher<D> {
    /// Registry over `dom`; nothing is wired until [`Switcher::init`].
    pub fn new(dom: D) -> Self {
        Self {
            dom,
            widgets: Vec::new(),
            session: UiSessionState::default(),
            resolved: None,
        }
    }

    /// The document adapter.
    pub const fn dom(&self) -> &D {
        &self.dom
    }

    /// Mutable access to the document adapter.
    pub const fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// Whether `init` ran since the last `destroy`.
    pub const fn is_initialized(&self) -> bool {
        self.resolved.is_some()
    }

    /// Options in effect, with defaults applied.
    pub const fn resolved(&self) -> Option<&ResolvedOptions> {
        self.resolved.as_ref()
    }

    /// Discover and wire every switcher root. A previous session is destroyed first.
    pub fn init(&mut self, options: &SwitcherOptions) -> InitReport {
        if self.is_initialized() {
            tracing::debug!("re-initialising; tearing down previous session");
            self.destroy();
        }
        lcswitch_telemetry::set_debug(options.debug.unwrap_or(false));

        let page_language = self.dom.document_lang();
        let resolved = ResolvedOptions::resolve(options, page_language.as_deref());
        tracing::debug!(
            language = %resolved.language,
            currency = %resolved.currency,
            languages = resolved.languages.len(),
            "switcher init started"
        );

        let mut report = InitReport::default();
        for root in self.dom.query_all(&LANGUAGE_ROOT) {
            let index = self.widgets.len();
            match init_language_selector(&mut self.dom, index, root, resolved.language_widget()) {
                Ok(controller) => {
                    self.adopt(controller);
                    report.language_widgets += 1;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "skipping switcher root");
                    report.skipped += 1;
                }
            }
        }

        let currency_roots = self.dom.query_all(&CURRENCY_ROOT);
        if resolved.allow_currency_change {
            for root in currency_roots {
                self.dom.set_hidden(&root, false);
                let index = self.widgets.len();
                let config = resolved.currency_widget(Vec::new());
                match init_currency_selector(&mut self.dom, index, root, config) {
                    Ok(controller) => {
                        self.adopt(controller);
                        report.currency_widgets += 1;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "skipping switcher root");
                        report.skipped += 1;
                    }
                }
            }
        } else {
            for root in currency_roots {
                self.dom.set_hidden(&root, true);
                report.hidden_currency_roots += 1;
            }
            tracing::debug!("currency switchers hidden");
        }

        self.dom.set_document_attribute("data-lang", &resolved.language);
        if resolved.currency_configured {
            self.dom
                .set_document_attribute("data-currency", &resolved.currency);
        }

        self.session.install_viewport_listener(&mut self.dom);
        self.session.schedule(
            &self.dom,
            GLOBAL_LISTENER_DELAY_MS,
            Owner::Session,
            Task::ArmGlobalListeners,
        );
        self.resolved = Some(resolved);
        tracing::debug!(?report, "switcher init finished");
        report
    }

    /// Decode JSON options and run [`Switcher::init`]; undecodable options fall back to
    /// the defaults.
    pub fn init_json(&mut self, raw: &str) -> InitReport {
        let options = SwitcherOptions::from_json(raw).unwrap_or_else(|err| {
            tracing::error!(error = %err, "invalid switcher options; using defaults");
            SwitcherOptions::default()
        });
        self.init(&options)
    }

    /// Remove every listener, timer and page-wide element, and reset widgets to closed.
    /// Safe to call repeatedly and before `init`.
    pub fn destroy(&mut self) {
        for mut widget in self.widgets.drain(..) {
            widget.detach(&mut self.dom, &mut self.session);
            widget.reset(&mut self.dom);
        }
        self.session.teardown(&mut self.dom);
        if self.resolved.take().is_some() {
            tracing::debug!("switcher destroyed");
        }
    }

    /// Route an event received by listener `listener`.
    pub fn handle(&mut self, listener: ListenerId, event: &UiEvent<D::Node>) -> Dispatch<D::Node> {
        let Some(route) = self.session.route(listener) else {
            return Dispatch::ignored();
        };
        match (route, event.kind) {
            (Route::Trigger(widget), UiEventKind::Click(_)) => self.trigger_click(widget),
            (Route::Trigger(widget), UiEventKind::KeyDown(key)) => self.trigger_key(widget, key),
            (Route::Option(widget, position), UiEventKind::Click(_)) => {
                self.option_click(widget, position)
            }
            (Route::Option(widget, position), UiEventKind::KeyDown(key)) => {
                self.option_key(widget, position, key)
            }
            (Route::Overlay, UiEventKind::Click(_)) => {
                tracing::debug!("overlay click");
                self.close_open_widget();
                Dispatch::consumed()
            }
            (Route::DocumentClick, UiEventKind::Click(pointer)) => {
                self.outside_click(event.target.as_ref(), pointer)
            }
            (Route::DocumentKey, UiEventKind::KeyDown(Key::Escape)) => {
                if self.session.open_widget.is_some() {
                    self.close_open_widget();
                    Dispatch::consumed()
                } else {
                    Dispatch::ignored()
                }
            }
            (Route::Viewport, UiEventKind::ViewportChange { mobile }) => {
                tracing::debug!(mobile, "viewport changed");
                if !mobile {
                    self.session.release_overlay(&mut self.dom);
                }
                Dispatch::ignored()
            }
            _ => Dispatch::ignored(),
        }
    }

    /// Run every continuation due at the document's current time.
    pub fn run_due_timers(&mut self) -> Vec<Effect<D::Node>> {
        let mut effects = Vec::new();
        while let Some(timer) = self.session.timers.pop_due(self.dom.now_ms()) {
            effects.extend(self.run_timer(timer));
        }
        effects
    }

    /// Milliseconds until the next continuation is due.
    pub fn next_timer_delay(&self) -> Option<u64> {
        let now = self.dom.now_ms();
        self.session
            .timers
            .next_due()
            .map(|due| due.saturating_sub(now))
    }

    /// State of every wired widget in registration order.
    pub fn widget_states(&self) -> Vec<WidgetSnapshot> {
        self.widgets
            .iter()
            .map(|widget| WidgetSnapshot {
                kind: widget.kind(),
                state: widget.state().clone(),
            })
            .collect()
    }

    /// Number of open widgets.
    pub fn open_count(&self) -> usize {
        self.widgets.iter().filter(|widget| widget.is_open()).count()
    }

    /// Diagnostic summary.
    pub fn status(&self) -> SwitcherStatus {
        let count = |kind: WidgetKind| {
            self.widgets
                .iter()
                .filter(|widget| widget.kind() == kind)
                .count()
        };
        SwitcherStatus {
            initialized: self.is_initialized(),
            language_widgets: count(WidgetKind::Language),
            currency_widgets: count(WidgetKind::Currency),
            open_widgets: self.open_count(),
            page_language: self.dom.document_lang(),
            language: self.resolved.as_ref().map(|resolved| resolved.language.clone()),
            overlay_present: self.session.overlay_node().is_some(),
            pending_timers: self.session.timers.len(),
            debug: lcswitch_telemetry::debug_enabled(),
        }
    }

    fn adopt(&mut self, mut controller: DropdownController<D>) {
        controller.attach(&mut self.dom, &mut self.session);
        self.widgets.push(controller);
    }

    fn open(&mut self, index: usize) {
        for (other, widget) in self.widgets.iter_mut().enumerate() {
            if other != index && widget.is_open() {
                widget.close(&mut self.dom, &mut self.session);
            }
        }
        if let Some(widget) = self.widgets.get_mut(index) {
            widget.open(&mut self.dom, &mut self.session);
        }
    }

    fn close(&mut self, index: usize) {
        if let Some(widget) = self.widgets.get_mut(index) {
            widget.close(&mut self.dom, &mut self.session);
        }
    }

    fn toggle(&mut self, index: usize) {
        if self.widgets.get(index).is_some_and(DropdownController::is_open) {
            self.close(index);
        } else {
            self.open(index);
        }
    }

    fn close_open_widget(&mut self) {
        if let Some(index) = self.session.open_widget {
            self.close(index);
        }
    }

    fn trigger_click(&mut self, index: usize) -> Dispatch<D::Node> {
        let owner = Owner::Widget(index);
        if self.session.timers.has_pending(owner, &Task::ToggleCheck) {
            tracing::debug!("trigger click debounced");
        } else {
            self.session
                .schedule(&self.dom, TOGGLE_DEBOUNCE_MS, owner, Task::ToggleCheck);
        }
        Dispatch::consumed()
    }

    fn trigger_key(&mut self, index: usize, key: Key) -> Dispatch<D::Node> {
        match key {
            key if key.is_activation() => self.toggle(index),
            Key::ArrowDown | Key::ArrowUp => self.open(index),
            Key::Escape => self.close(index),
            _ => return Dispatch::ignored(),
        }
        Dispatch::consumed()
    }

    fn option_click(&mut self, index: usize, position: usize) -> Dispatch<D::Node> {
        let Some(widget) = self.widgets.get_mut(index) else {
            return Dispatch::ignored();
        };
        match widget.kind() {
            WidgetKind::Language => {
                if widget.is_open() {
                    widget.select_language(&mut self.dom, &mut self.session, position, false);
                }
                Dispatch::ignored()
            }
            WidgetKind::Currency => {
                let effect = widget.commit_currency(&mut self.dom, &mut self.session, position);
                let dispatch = Dispatch::consumed();
                match effect {
                    Some(effect) => dispatch.with_effect(effect),
                    None => dispatch,
                }
            }
        }
    }

    fn option_key(&mut self, index: usize, position: usize, key: Key) -> Dispatch<D::Node> {
        let step = match key {
            Key::ArrowDown => Some(FocusStep::Next),
            Key::ArrowUp => Some(FocusStep::Previous),
            Key::Home => Some(FocusStep::First),
            Key::End => Some(FocusStep::Last),
            Key::Escape | Key::Enter | Key::Space | Key::Other => None,
        };
        let Some(widget) = self.widgets.get_mut(index) else {
            return Dispatch::ignored();
        };
        if let Some(step) = step {
            // Focus can linger on an option after the list closes.
            if !widget.is_open() {
                return Dispatch::ignored();
            }
            widget.move_focus(&mut self.dom, position, step);
            return Dispatch::consumed();
        }
        match key {
            Key::Escape => {
                widget.close(&mut self.dom, &mut self.session);
                widget.focus_trigger(&mut self.dom);
                Dispatch::consumed()
            }
            key if key.is_activation() => match widget.kind() {
                WidgetKind::Language => {
                    widget.select_language(&mut self.dom, &mut self.session, position, true);
                    Dispatch::consumed()
                }
                WidgetKind::Currency => {
                    let effect =
                        widget.commit_currency(&mut self.dom, &mut self.session, position);
                    let dispatch = Dispatch::consumed();
                    match effect {
                        Some(effect) => dispatch.with_effect(effect),
                        None => dispatch,
                    }
                }
            },
            _ => Dispatch::ignored(),
        }
    }

    fn outside_click(&mut self, target: Option<&D::Node>, pointer: PointerInfo) -> Dispatch<D::Node> {
        let Some(index) = self.session.open_widget else {
            return Dispatch::ignored();
        };
        let inside = target.is_some_and(|target| {
            self.widgets
                .get(index)
                .is_some_and(|widget| widget.contains(&self.dom, target))
        });
        if inside {
            return Dispatch::ignored();
        }
        if pointer.looks_synthetic() {
            tracing::debug!("ignoring keyboard-synthesised click");
            return Dispatch::ignored();
        }
        tracing::debug!("click outside open switcher");
        self.close(index);
        Dispatch::ignored()
    }

    fn run_timer(&mut self, timer: Timer) -> Option<Effect<D::Node>> {
        match (timer.owner, timer.task) {
            (Owner::Widget(index), Task::ToggleCheck) => self.toggle(index),
            (Owner::Widget(index), Task::FollowLink { option }) => {
                let link = self.widgets.get(index)?.link(option)?.clone();
                return Some(Effect::ActivateLink(link));
            }
            (Owner::Widget(index), task) if task.is_stage() => {
                if let Some(widget) = self.widgets.get(index) {
                    widget.apply_stage(&mut self.dom, &task);
                }
            }
            (_, Task::ActivateOverlay) => self.session.activate_overlay(&mut self.dom),
            (_, Task::RemoveOverlay) => self.session.remove_faded_overlay(&mut self.dom),
            (_, Task::ArmGlobalListeners) => self.session.arm_page_listeners(&mut self.dom),
            (_, Task::Announce(message)) => {
                self.session.announcer.deliver(&mut self.dom, &message);
            }
            (owner, task) => tracing::debug!(?owner, ?task, "dropping unowned timer"),
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDom;

    fn page_with_language_root() -> MemoryDom {
        let mut dom = MemoryDom::new();
        let root = dom.append_element(dom.body(), "div");
        dom.set_attribute(&root, "class", "switch lang");
        let trigger = dom.append_element(root, "button");
        dom.add_class(&trigger, "current");
        let listbox = dom.append_element(root, "ul");
        dom.set_attribute(&listbox, "role", "listbox");
        dom
    }

    #[test]
    fn destroy_before_init_is_a_no_op() {
        let mut switcher = Switcher::new(MemoryDom::new());
        switcher.destroy();
        switcher.destroy();
        assert!(!switcher.is_initialized());
        assert_eq!(switcher.dom().listener_count(), 0);
    }

    #[test]
    fn init_wires_roots_and_defers_page_listeners() {
        let mut switcher = Switcher::new(page_with_language_root());
        let report = switcher.init(&SwitcherOptions::default());
        assert_eq!(report.language_widgets, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(switcher.dom().page_listener_count(), 1);
        assert_eq!(switcher.next_timer_delay(), Some(GLOBAL_LISTENER_DELAY_MS));

        switcher.dom_mut().advance_clock(GLOBAL_LISTENER_DELAY_MS);
        assert!(switcher.run_due_timers().is_empty());
        assert_eq!(switcher.dom().page_listener_count(), 3);
        assert_eq!(switcher.next_timer_delay(), None);
    }

    #[test]
    fn invalid_json_falls_back_to_defaults() {
        let mut switcher = Switcher::new(page_with_language_root());
        let report = switcher.init_json("[1, 2]");
        assert_eq!(report.language_widgets, 1);
        assert_eq!(
            switcher.resolved().map(|resolved| resolved.language.as_str()),
            Some("sk")
        );
        let html = switcher.dom().html();
        assert_eq!(
            switcher.dom().attribute(&html, "data-lang").as_deref(),
            Some("sk")
        );
        assert_eq!(switcher.dom().attribute(&html, "data-currency"), None);
    }

    #[test]
    fn unknown_listener_is_ignored() {
        let mut switcher = Switcher::new(MemoryDom::new());
        let dispatch = switcher.handle(42, &UiEvent::viewport(true));
        assert_eq!(dispatch, Dispatch::ignored());
    }

    #[test]
    fn status_reports_counts() {
        let mut dom = page_with_language_root();
        dom.set_document_lang("en-GB");
        let mut switcher = Switcher::new(dom);
        switcher.init(&SwitcherOptions::default());
        let status = switcher.status();
        assert!(status.initialized);
        assert_eq!(status.language_widgets, 1);
        assert_eq!(status.currency_widgets, 0);
        assert_eq!(status.page_language.as_deref(), Some("en-GB"));
        assert_eq!(status.language.as_deref(), Some("en"));
        assert!(!status.overlay_present);
    }
}
