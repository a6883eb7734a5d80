//! Responsive breakpoint the switchers react to.

/// Width range with an inclusive minimum and optional inclusive maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Breakpoint {
    /// Identifier used in logs.
    pub name: &'static str,
    /// Smallest matching width in CSS pixels.
    pub min_width: u16,
    /// Largest matching width in CSS pixels.
    pub max_width: Option<u16>,
}

impl Breakpoint {
    /// Whether `width` falls inside the range.
    #[must_use]
    pub fn contains(self, width: u16) -> bool {
        width >= self.min_width && self.max_width.is_none_or(|max| width <= max)
    }
}

/// Phones and narrow tablets; open dropdowns get the shared overlay here.
pub const MOBILE: Breakpoint = Breakpoint {
    name: "mobile",
    min_width: 0,
    max_width: Some(768),
};

/// Media query equivalent of [`MOBILE`].
pub const MOBILE_QUERY: &str = "(max-width: 768px)";

/// Whether a viewport of `width` pixels is considered mobile.
#[must_use]
pub fn is_mobile_width(width: u16) -> bool {
    MOBILE.contains(width)
}
