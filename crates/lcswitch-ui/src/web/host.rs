//! Page-wide switcher instance and the timer pump that drives it.
//!
//! # Design
//! - The switcher lives in a thread-local cell. Listener callbacks borrow it with
//!   `try_borrow_mut`, so an event raised while the engine runs is dropped instead of
//!   re-entering it.
//! - One `Timeout` is armed for the earliest pending continuation and re-armed after
//!   every engine entry.

use std::cell::RefCell;

use gloo_timers::callback::Timeout;
use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement};

use crate::dom::ListenerId;
use crate::events::{Dispatch, Effect, UiEvent};
use crate::registry::Switcher;
use crate::web::dom::WebDom;

thread_local! {
    static SWITCHER: RefCell<Option<Switcher<WebDom>>> = const { RefCell::new(None) };
    static PUMP: RefCell<Option<Timeout>> = const { RefCell::new(None) };
}

/// Run `operation` against the page switcher, creating it on first use.
///
/// Returns `None` when the switcher is busy or there is no browser document.
pub(crate) fn with_switcher<R>(operation: impl FnOnce(&mut Switcher<WebDom>) -> R) -> Option<R> {
    let result = SWITCHER.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            tracing::warn!("switcher busy; call dropped");
            return Err(());
        };
        if slot.is_none() {
            *slot = WebDom::from_window().map(Switcher::new);
        }
        Ok(slot.as_mut().map(operation))
    });
    let result = result.ok()?;
    rearm_pump();
    result
}

/// Hand an event to the switcher.
pub(crate) fn deliver(listener: ListenerId, event: &UiEvent<Element>) -> Option<Dispatch<Element>> {
    with_switcher(|switcher| switcher.handle(listener, event))
}

/// Perform host effects once the switcher is released.
pub(crate) fn run_effects(effects: Vec<Effect<Element>>) {
    for effect in effects {
        match effect {
            Effect::CurrencyChanged(code) => notify_currency_change(&code),
            Effect::ActivateLink(link) => {
                if let Some(link) = link.dyn_ref::<HtmlElement>() {
                    link.click();
                }
            }
        }
    }
}

fn notify_currency_change(code: &str) {
    let window = gloo::utils::window();
    let callback = Reflect::get(&window, &JsValue::from_str("onCurrencyChange"))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok());
    let Some(callback) = callback else {
        return;
    };
    if let Err(err) = callback.call1(&window, &JsValue::from_str(code)) {
        tracing::error!(error = ?err, "onCurrencyChange threw");
    }
}

fn rearm_pump() {
    let delay = SWITCHER.with(|cell| {
        cell.try_borrow()
            .ok()
            .and_then(|slot| slot.as_ref().and_then(Switcher::next_timer_delay))
    });
    let next = delay.map(|delay| {
        let delay = u32::try_from(delay).unwrap_or(u32::MAX);
        Timeout::new(delay, fire_pump)
    });
    PUMP.with(|pump| {
        // Replacing the handle cancels any earlier timeout.
        *pump.borrow_mut() = next;
    });
}

fn fire_pump() {
    if let Some(fired) = PUMP.with(|pump| pump.borrow_mut().take()) {
        // Dropping the handle of the running timeout would free its closure mid-call.
        let _ = fired.forget();
    }
    let effects = with_switcher(Switcher::run_due_timers).unwrap_or_default();
    run_effects(effects);
}
