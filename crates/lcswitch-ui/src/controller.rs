//! Open/close state machine of one dropdown root.
//!
//! # Design
//! - The controller only touches its own root. Closing other widgets before opening is
//!   the registry's job since it owns every controller.
//! - Presentational stages (`anim-options`, `show-shadow`, delayed `show-options`
//!   removal) are timers owned by the widget; a state change cancels the stale ones and
//!   the handlers re-check the state when they fire.

use lcswitch_config::{WidgetConfig, WidgetKind};
use serde::Serialize;

use crate::dom::{Dom, EventType, ListenTarget};
use crate::events::Effect;
use crate::session::{Route, Subscription, UiSessionState};
use crate::timers::{
    FINISH_CLOSE_MS, FOLLOW_LINK_MS, Owner, REVEAL_OPTIONS_MS, REVEAL_SHADOW_MS, Task,
};

/// Root class while the option list is shown.
pub const SHOW_OPTIONS: &str = "show-options";
/// Root class added shortly after opening.
pub const ANIM_OPTIONS: &str = "anim-options";
/// Root class added last while opening.
pub const SHOW_SHADOW: &str = "show-shadow";
/// Class of the selected option.
pub const SELECTED: &str = "selected";
/// Positioning classes host stylesheets put on option lists.
pub const POSITION_CLASSES: [&str; 3] = ["dropdown-top", "dropdown-right", "dropdown-left"];

/// Mutable state of one widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WidgetState {
    /// Whether the option list is open.
    pub is_open: bool,
    /// Code of the committed option.
    pub selected_code: String,
    /// Option currently holding focus while open.
    pub focused_index: Option<usize>,
}

/// Where keyboard navigation moves focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FocusStep {
    Next,
    Previous,
    First,
    Last,
}

/// Elements of a wired root.
pub(crate) struct WidgetParts<N> {
    pub(crate) root: N,
    pub(crate) trigger: N,
    pub(crate) listbox: N,
    /// Option elements, aligned with the configured options.
    pub(crate) items: Vec<N>,
    /// Navigation links of language options, aligned with `items`.
    pub(crate) links: Vec<Option<N>>,
    /// Visible code text inside the trigger.
    pub(crate) display: N,
    /// Screen-reader description inside the trigger.
    pub(crate) sr_text: N,
}

pub(crate) struct DropdownController<D: Dom> {
    index: usize,
    config: WidgetConfig,
    parts: WidgetParts<D::Node>,
    state: WidgetState,
    subscriptions: Vec<Subscription<D>>,
}

impl<D: Dom> DropdownController<D> {
    pub(crate) fn new(
        index: usize,
        config: WidgetConfig,
        parts: WidgetParts<D::Node>,
        selected_code: String,
    ) -> Self {
        Self {
            index,
            config,
            parts,
            state: WidgetState {
                is_open: false,
                selected_code,
                focused_index: None,
            },
            subscriptions: Vec::new(),
        }
    }

    pub(crate) const fn kind(&self) -> WidgetKind {
        self.config.kind
    }

    pub(crate) const fn state(&self) -> &WidgetState {
        &self.state
    }

    pub(crate) const fn is_open(&self) -> bool {
        self.state.is_open
    }

    /// Whether `node` lies inside this widget's root.
    pub(crate) fn contains(&self, dom: &D, node: &D::Node) -> bool {
        dom.contains(&self.parts.root, node)
    }

    /// Subscribe to trigger and option events.
    pub(crate) fn attach(&mut self, dom: &mut D, session: &mut UiSessionState<D>) {
        let index = self.index;
        let trigger = self.parts.trigger.clone();
        for event in [EventType::Click, EventType::KeyDown] {
            let subscription =
                session.subscribe(dom, ListenTarget::Node(&trigger), event, Route::Trigger(index));
            self.subscriptions.extend(subscription);
        }
        for (position, item) in self.parts.items.iter().enumerate() {
            for event in [EventType::Click, EventType::KeyDown] {
                let subscription = session.subscribe(
                    dom,
                    ListenTarget::Node(item),
                    event,
                    Route::Option(index, position),
                );
                self.subscriptions.extend(subscription);
            }
        }
        tracing::debug!(
            kind = self.kind().as_str(),
            options = self.parts.items.len(),
            "controller attached"
        );
    }

    /// Cancel every subscription of this widget.
    pub(crate) fn detach(&mut self, dom: &mut D, session: &mut UiSessionState<D>) {
        for subscription in self.subscriptions.drain(..) {
            session.unsubscribe(dom, subscription);
        }
    }

    pub(crate) fn open(&mut self, dom: &mut D, session: &mut UiSessionState<D>) {
        self.cancel_stages(session);
        dom.add_class(&self.parts.root, SHOW_OPTIONS);
        dom.set_attribute(&self.parts.trigger, "aria-expanded", "true");

        let selected = self.selected_index();
        if let Some(id) = selected.and_then(|position| self.item_id(dom, position)) {
            dom.set_attribute(&self.parts.listbox, "aria-activedescendant", &id);
        }
        if dom.viewport_is_mobile() {
            session.acquire_overlay(dom);
        }

        let owner = Owner::Widget(self.index);
        session.schedule(dom, REVEAL_OPTIONS_MS, owner, Task::RevealOptions);
        session.schedule(dom, REVEAL_SHADOW_MS, owner, Task::RevealShadow);

        let focus = selected.or_else(|| (!self.parts.items.is_empty()).then_some(0));
        if let Some(item) = focus.and_then(|position| self.parts.items.get(position)) {
            dom.focus(item);
        }
        self.state.focused_index = focus;
        self.state.is_open = true;
        session.open_widget = Some(self.index);
        tracing::debug!(
            kind = self.kind().as_str(),
            focus = ?focus,
            "dropdown opened"
        );
    }

    pub(crate) fn close(&mut self, dom: &mut D, session: &mut UiSessionState<D>) {
        if !self.state.is_open {
            return;
        }
        self.cancel_stages(session);
        dom.remove_class(&self.parts.root, ANIM_OPTIONS);
        dom.remove_class(&self.parts.root, SHOW_SHADOW);
        dom.set_attribute(&self.parts.trigger, "aria-expanded", "false");
        dom.remove_attribute(&self.parts.listbox, "aria-activedescendant");
        session.release_overlay(dom);
        session.schedule(
            dom,
            FINISH_CLOSE_MS,
            Owner::Widget(self.index),
            Task::FinishClose,
        );

        self.state.is_open = false;
        self.state.focused_index = None;
        if session.open_widget == Some(self.index) {
            session.open_widget = None;
        }
        tracing::debug!(kind = self.kind().as_str(), "dropdown closed");
    }

    /// Apply a presentational stage if the state still calls for it.
    pub(crate) fn apply_stage(&self, dom: &mut D, task: &Task) {
        match task {
            Task::RevealOptions if self.state.is_open => {
                dom.add_class(&self.parts.root, ANIM_OPTIONS);
            }
            Task::RevealShadow if self.state.is_open => {
                dom.add_class(&self.parts.root, SHOW_SHADOW);
            }
            Task::FinishClose if !self.state.is_open => {
                dom.remove_class(&self.parts.root, SHOW_OPTIONS);
            }
            _ => {}
        }
    }

    pub(crate) fn focus_trigger(&self, dom: &mut D) {
        dom.focus(&self.parts.trigger);
    }

    pub(crate) fn move_focus(&mut self, dom: &mut D, from: usize, step: FocusStep) {
        let len = self.parts.items.len();
        if len == 0 {
            return;
        }
        let target = match step {
            FocusStep::Next => (from + 1) % len,
            FocusStep::Previous => (from + len - 1) % len,
            FocusStep::First => 0,
            FocusStep::Last => len - 1,
        };
        if let Some(item) = self.parts.items.get(target) {
            dom.focus(item);
        }
        if let Some(id) = self.item_id(dom, target) {
            dom.set_attribute(&self.parts.listbox, "aria-activedescendant", &id);
        }
        self.state.focused_index = Some(target);
    }

    /// Commit a currency option, close and hand the change to the host.
    pub(crate) fn commit_currency(
        &mut self,
        dom: &mut D,
        session: &mut UiSessionState<D>,
        position: usize,
    ) -> Option<Effect<D::Node>> {
        let Some(option) = self.config.options.get(position).cloned() else {
            self.close(dom, session);
            self.focus_trigger(dom);
            return None;
        };
        let code = option.code.to_uppercase();
        dom.set_text(&self.parts.display, &self.config.display_text(&option.code));
        dom.set_text(&self.parts.sr_text, &format!("Current currency: {code}"));
        self.mark_selected(dom, position);
        self.state.selected_code.clone_from(&option.code);
        session.announce(dom, &format!("Currency changed to {code}"));
        tracing::debug!(currency = %option.code, "currency committed");

        self.close(dom, session);
        self.focus_trigger(dom);
        Some(Effect::CurrencyChanged(option.code))
    }

    /// Announce navigation to a language and close. Keyboard selection also schedules
    /// the link activation.
    pub(crate) fn select_language(
        &mut self,
        dom: &mut D,
        session: &mut UiSessionState<D>,
        position: usize,
        keyboard: bool,
    ) {
        if let Some(option) = self.config.options.get(position) {
            session.announce(dom, &format!("Navigating to {}", option.label));
            tracing::debug!(language = %option.code, keyboard, "language selected");
        }
        self.close(dom, session);
        if keyboard && self.link(position).is_some() {
            session.schedule(
                dom,
                FOLLOW_LINK_MS,
                Owner::Widget(self.index),
                Task::FollowLink { option: position },
            );
        }
    }

    /// Navigation link of a language option.
    pub(crate) fn link(&self, position: usize) -> Option<&D::Node> {
        self.parts.links.get(position).and_then(Option::as_ref)
    }

    /// Return the root to its closed visual state.
    pub(crate) fn reset(&mut self, dom: &mut D) {
        for class in [SHOW_OPTIONS, ANIM_OPTIONS, SHOW_SHADOW] {
            dom.remove_class(&self.parts.root, class);
        }
        for class in POSITION_CLASSES {
            dom.remove_class(&self.parts.listbox, class);
        }
        dom.set_attribute(&self.parts.trigger, "aria-expanded", "false");
        dom.remove_attribute(&self.parts.listbox, "aria-activedescendant");
        self.state.is_open = false;
        self.state.focused_index = None;
    }

    fn selected_index(&self) -> Option<usize> {
        self.config
            .position_of(&self.state.selected_code)
            .filter(|position| *position < self.parts.items.len())
    }

    fn mark_selected(&self, dom: &mut D, position: usize) {
        for (current, item) in self.parts.items.iter().enumerate() {
            let selected = current == position;
            if selected {
                dom.add_class(item, SELECTED);
            } else {
                dom.remove_class(item, SELECTED);
            }
            dom.set_attribute(item, "aria-selected", if selected { "true" } else { "false" });
        }
    }

    fn item_id(&self, dom: &D, position: usize) -> Option<String> {
        let item = self.parts.items.get(position)?;
        dom.attribute(item, "id").filter(|id| !id.is_empty())
    }

    fn cancel_stages(&self, session: &mut UiSessionState<D>) {
        let owner = Owner::Widget(self.index);
        session
            .timers
            .cancel_where(|timer| timer.owner == owner && timer.task.is_stage());
    }
}
