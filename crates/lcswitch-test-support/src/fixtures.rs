//! Host page markup as the server renders it.

use lcswitch_ui::Switcher;
use lcswitch_ui::dom::Dom;
use lcswitch_ui::dom::memory::{MemoryDom, NodeId};

/// Elements of one `.switch` root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootFixture {
    /// The `.switch` element.
    pub root: NodeId,
    /// The `.current` trigger button.
    pub trigger: NodeId,
    /// The `[role=listbox]` option list.
    pub listbox: NodeId,
}

fn switch_root(dom: &mut MemoryDom, marker: &str) -> RootFixture {
    let body = dom.body();
    let root = dom.append_element(body, "div");
    dom.set_attribute(&root, "class", &format!("switch {marker}"));
    let trigger = dom.append_element(root, "button");
    dom.add_class(&trigger, "current");
    dom.set_attribute(&trigger, "aria-haspopup", "listbox");
    dom.set_attribute(&trigger, "aria-expanded", "false");
    let listbox = dom.append_element(root, "ul");
    dom.add_class(&listbox, "options");
    dom.set_attribute(&listbox, "role", "listbox");
    RootFixture {
        root,
        trigger,
        listbox,
    }
}

/// Append an empty `.switch.lang` root; its options are generated by `init`.
pub fn language_root(dom: &mut MemoryDom) -> RootFixture {
    switch_root(dom, "lang")
}

/// Append a `.switch.currency` root with one `[role=option][data-currency]` per code.
pub fn currency_root(dom: &mut MemoryDom, currencies: &[&str]) -> RootFixture {
    let fixture = switch_root(dom, "currency");
    for code in currencies {
        let item = dom.append_element(fixture.listbox, "li");
        dom.set_attribute(&item, "role", "option");
        dom.set_attribute(&item, "data-currency", code);
        dom.set_text(&item, &code.to_uppercase());
    }
    fixture
}

/// Append an unrelated paragraph used as an outside-click target.
pub fn outside_element(dom: &mut MemoryDom) -> NodeId {
    let body = dom.body();
    let paragraph = dom.append_element(body, "p");
    dom.set_text(&paragraph, "Page content");
    paragraph
}

/// A page with one language switcher, one currency switcher (EUR, USD, CZK) and
/// some content, wrapped in an uninitialised [`Switcher`].
pub struct StandardPage {
    /// Registry over the page.
    pub switcher: Switcher<MemoryDom>,
    /// The language root.
    pub language: RootFixture,
    /// The currency root.
    pub currency: RootFixture,
    /// Content outside both roots.
    pub outside: NodeId,
}

impl StandardPage {
    /// Currencies rendered into the currency root.
    pub const CURRENCIES: [&'static str; 3] = ["eur", "usd", "czk"];

    /// Build the page with a desktop viewport.
    #[must_use]
    pub fn new() -> Self {
        crate::logging::install();
        let mut dom = MemoryDom::new();
        let language = language_root(&mut dom);
        let currency = currency_root(&mut dom, &Self::CURRENCIES);
        let outside = outside_element(&mut dom);
        Self {
            switcher: Switcher::new(dom),
            language,
            currency,
            outside,
        }
    }

    /// Build the page with a phone-sized viewport.
    #[must_use]
    pub fn mobile() -> Self {
        let mut page = Self::new();
        page.switcher.dom_mut().set_viewport_width(375);
        page
    }
}

impl Default for StandardPage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_root_renders_items() {
        let mut dom = MemoryDom::new();
        let fixture = currency_root(&mut dom, &["eur", "usd"]);
        let items = dom.children(&fixture.listbox);
        assert_eq!(items.len(), 2);
        assert_eq!(dom.text(&items[1]), "USD");
        assert!(dom.contains(&fixture.root, &fixture.trigger));
    }

    #[test]
    fn standard_page_starts_uninitialised() {
        let page = StandardPage::mobile();
        assert!(!page.switcher.is_initialized());
        assert!(page.switcher.dom().viewport_is_mobile());
    }
}
