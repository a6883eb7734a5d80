//! Errors raised while wiring widget roots.

use lcswitch_config::WidgetKind;
use thiserror::Error;

/// A widget root lacks structure the controller needs; only that widget is skipped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WiringError {
    /// The root has no `.current` trigger.
    #[error("{} switcher root has no `.current` trigger", kind.as_str())]
    MissingTrigger {
        /// Kind of the root.
        kind: WidgetKind,
    },
    /// The root has no `[role=listbox]` container.
    #[error("{} switcher root has no `[role=listbox]` container", kind.as_str())]
    MissingListbox {
        /// Kind of the root.
        kind: WidgetKind,
    },
    /// The document refused to create an element.
    #[error("{} switcher could not create a `<{tag}>` element", kind.as_str())]
    CreateElement {
        /// Kind of the root.
        kind: WidgetKind,
        /// Requested tag.
        tag: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_widget_kind() {
        let err = WiringError::MissingListbox {
            kind: WidgetKind::Currency,
        };
        assert_eq!(
            err.to_string(),
            "currency switcher root has no `[role=listbox]` container"
        );
    }
}
