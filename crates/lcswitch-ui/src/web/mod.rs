//! Browser bindings: the `LCSwitcher` JavaScript surface.

mod dom;
mod host;

use lcswitch_config::SwitcherOptions;
use lcswitch_config::defaults::AUTO_INIT_LANGUAGES;
use wasm_bindgen::prelude::*;

pub use dom::WebDom;

/// Install console logging once per page.
fn ensure_logging() {
    thread_local! {
        static INSTALLED: std::cell::Cell<bool> = const { std::cell::Cell::new(false) };
    }
    INSTALLED.with(|installed| {
        if !installed.replace(true) {
            if let Err(err) = lcswitch_telemetry::init_console_logging(
                lcswitch_telemetry::DEFAULT_LOG_LEVEL,
            ) {
                gloo::console::warn!(err.to_string());
            }
        }
    });
}

fn options_from_js(options: &JsValue) -> SwitcherOptions {
    if options.is_undefined() || options.is_null() {
        return SwitcherOptions::default();
    }
    let decoded = js_sys::JSON::stringify(options)
        .ok()
        .and_then(|json| json.as_string())
        .map(|json| SwitcherOptions::from_json(&json));
    match decoded {
        Some(Ok(options)) => options,
        Some(Err(err)) => {
            tracing::error!(error = %err, "invalid switcher options; using defaults");
            SwitcherOptions::default()
        }
        None => {
            tracing::error!("switcher options could not be serialised; using defaults");
            SwitcherOptions::default()
        }
    }
}

/// Wire every switcher on the page. Returns the init report as a plain object.
#[wasm_bindgen]
pub fn init(options: JsValue) -> JsValue {
    ensure_logging();
    let options = options_from_js(&options);
    host::with_switcher(|switcher| switcher.init(&options))
        .and_then(|report| serde_json::to_string(&report).ok())
        .and_then(|json| js_sys::JSON::parse(&json).ok())
        .unwrap_or(JsValue::UNDEFINED)
}

/// Remove every listener and page-wide element the switcher created.
#[wasm_bindgen]
pub fn destroy() {
    host::with_switcher(crate::registry::Switcher::destroy);
}

/// Turn verbose console logging on.
#[wasm_bindgen(js_name = enableDebug)]
pub fn enable_debug() {
    ensure_logging();
    crate::registry::enable_debug();
}

/// Turn verbose console logging off.
#[wasm_bindgen(js_name = disableDebug)]
pub fn disable_debug() {
    crate::registry::disable_debug();
}

/// Diagnostic summary as a plain object.
#[wasm_bindgen]
pub fn status() -> JsValue {
    host::with_switcher(|switcher| serde_json::to_string(&switcher.status()).ok())
        .flatten()
        .and_then(|json| js_sys::JSON::parse(&json).ok())
        .unwrap_or(JsValue::UNDEFINED)
}

/// Initialise with the stock page defaults: the page language and the standard list.
#[wasm_bindgen(js_name = autoInit)]
pub fn auto_init() {
    ensure_logging();
    let language = gloo::utils::document()
        .document_element()
        .and_then(|html| html.get_attribute("lang"));
    let options = SwitcherOptions {
        language,
        languages: Some(AUTO_INIT_LANGUAGES.iter().map(ToString::to_string).collect()),
        allow_currency_change: Some(true),
        debug: Some(false),
        ..SwitcherOptions::default()
    };
    host::with_switcher(|switcher| switcher.init(&options));
}
