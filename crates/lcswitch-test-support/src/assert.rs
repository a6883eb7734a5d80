//! Queries and assertions over rendered switchers.

use anyhow::{Context, Result, ensure};
use lcswitch_ui::dom::memory::{MemoryDom, NodeId};
use lcswitch_ui::dom::{Dom, OPTION};
use lcswitch_ui::{LIVE_REGION_ID, OVERLAY_CLASS, SELECTED, Switcher};

/// Option of `listbox` whose `attribute` equals `code`.
///
/// # Errors
///
/// Fails when no option carries the code.
pub fn option_by_code(
    dom: &MemoryDom,
    listbox: NodeId,
    attribute: &str,
    code: &str,
) -> Result<NodeId> {
    dom.find_all(&listbox, &OPTION)
        .into_iter()
        .find(|item| dom.attribute(item, attribute).as_deref() == Some(code))
        .with_context(|| format!("no option with {attribute}={code}"))
}

/// Codes of every option marked selected.
#[must_use]
pub fn selected_codes(dom: &MemoryDom, listbox: NodeId, attribute: &str) -> Vec<String> {
    dom.find_all(&listbox, &OPTION)
        .into_iter()
        .filter(|item| dom.has_class(item, SELECTED))
        .filter_map(|item| dom.attribute(&item, attribute))
        .collect()
}

/// Number of mobile overlays attached to the body.
#[must_use]
pub fn overlay_count(dom: &MemoryDom) -> usize {
    let body = dom.body();
    dom.children(&body)
        .iter()
        .filter(|node| dom.has_class(node, OVERLAY_CLASS))
        .count()
}

/// Text of the live region, if present.
#[must_use]
pub fn live_region_text(dom: &MemoryDom) -> Option<String> {
    dom.element_by_id(LIVE_REGION_ID)
        .map(|region| dom.text(&region))
}

/// First child of `parent` carrying `class`.
///
/// # Errors
///
/// Fails when no child carries the class.
pub fn child_with_class(dom: &MemoryDom, parent: NodeId, class: &str) -> Result<NodeId> {
    dom.children(&parent)
        .into_iter()
        .find(|child| dom.has_class(child, class))
        .with_context(|| format!("no child with class {class}"))
}

/// Check that no more than one widget is open.
///
/// # Errors
///
/// Fails when several widgets report open.
pub fn ensure_single_open(switcher: &Switcher<MemoryDom>) -> Result<()> {
    let open = switcher.open_count();
    ensure!(open <= 1, "{open} widgets open at once");
    Ok(())
}
