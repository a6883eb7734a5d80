//! Host-neutral event model and what the engine asks the host to do in response.

use serde::Serialize;

/// Keys the dropdowns react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Key {
    /// `Enter`.
    Enter,
    /// The space bar.
    Space,
    /// `Escape`.
    Escape,
    /// `ArrowUp`.
    ArrowUp,
    /// `ArrowDown`.
    ArrowDown,
    /// `Home`.
    Home,
    /// `End`.
    End,
    /// Anything else.
    Other,
}

impl Key {
    /// Map a `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Enter" => Self::Enter,
            " " | "Spacebar" => Self::Space,
            "Escape" | "Esc" => Self::Escape,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            _ => Self::Other,
        }
    }

    /// Whether the key activates the focused control.
    #[must_use]
    pub const fn is_activation(self) -> bool {
        matches!(self, Self::Enter | Self::Space)
    }
}

/// Pointer details needed to tell real clicks from keyboard-synthesised ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerInfo {
    /// `Event.isTrusted`.
    pub trusted: bool,
    /// `MouseEvent.clientX`.
    pub client_x: i32,
    /// `MouseEvent.clientY`.
    pub client_y: i32,
}

impl PointerInfo {
    /// A user-generated click at the given viewport coordinates.
    #[must_use]
    pub const fn trusted_at(client_x: i32, client_y: i32) -> Self {
        Self {
            trusted: true,
            client_x,
            client_y,
        }
    }

    /// A click dispatched by script, e.g. `HTMLElement.click()`.
    #[must_use]
    pub const fn synthetic() -> Self {
        Self {
            trusted: false,
            client_x: 0,
            client_y: 0,
        }
    }

    /// Untrusted clicks and clicks at the origin are treated as keyboard-synthesised.
    #[must_use]
    pub const fn looks_synthetic(self) -> bool {
        !self.trusted || (self.client_x == 0 && self.client_y == 0)
    }
}

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiEventKind {
    /// Pointer activation.
    Click(PointerInfo),
    /// Key press.
    KeyDown(Key),
    /// The mobile breakpoint started or stopped matching.
    ViewportChange {
        /// Whether the viewport is now mobile-sized.
        mobile: bool,
    },
}

/// An event delivered to one registered listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UiEvent<N> {
    /// Event payload.
    pub kind: UiEventKind,
    /// Element the event was dispatched at, when there is one.
    pub target: Option<N>,
}

impl<N> UiEvent<N> {
    /// Click on `target`.
    pub const fn click(target: N, pointer: PointerInfo) -> Self {
        Self {
            kind: UiEventKind::Click(pointer),
            target: Some(target),
        }
    }

    /// Key press on `target`.
    pub const fn key(target: N, key: Key) -> Self {
        Self {
            kind: UiEventKind::KeyDown(key),
            target: Some(target),
        }
    }

    /// Breakpoint change.
    #[must_use]
    pub const fn viewport(mobile: bool) -> Self {
        Self {
            kind: UiEventKind::ViewportChange { mobile },
            target: None,
        }
    }
}

/// Side effect the host performs once the engine has returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect<N> {
    /// A currency was committed; invoke the page's change callback with the code.
    CurrencyChanged(String),
    /// Activate a language link as if it were clicked.
    ActivateLink(N),
}

/// Outcome of handling one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch<N> {
    /// Suppress the browser's default action.
    pub prevent_default: bool,
    /// Stop the event from reaching further listeners.
    pub stop_propagation: bool,
    /// Host work to run after the engine releases its state.
    pub effects: Vec<Effect<N>>,
}

impl<N> Default for Dispatch<N> {
    fn default() -> Self {
        Self {
            prevent_default: false,
            stop_propagation: false,
            effects: Vec::new(),
        }
    }
}

impl<N> Dispatch<N> {
    /// Nothing to do.
    #[must_use]
    pub fn ignored() -> Self {
        Self::default()
    }

    /// The event was consumed: no default action and no further propagation.
    #[must_use]
    pub fn consumed() -> Self {
        Self {
            prevent_default: true,
            stop_propagation: true,
            effects: Vec::new(),
        }
    }

    /// Attach an effect.
    #[must_use]
    pub fn with_effect(mut self, effect: Effect<N>) -> Self {
        self.effects.push(effect);
        self
    }
}
