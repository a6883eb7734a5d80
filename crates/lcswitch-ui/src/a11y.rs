//! Screen-reader announcements through a single polite live region.

use crate::dom::Dom;
use crate::timers::{ANNOUNCE_DELAY_MS, Owner, Task, TimerQueue};

/// Id of the page-wide live region.
pub const LIVE_REGION_ID: &str = "a11y-live";

/// Owner of the live region element.
#[derive(Debug)]
pub struct Announcer<N> {
    region: Option<N>,
}

impl<N> Default for Announcer<N> {
    fn default() -> Self {
        Self { region: None }
    }
}

impl<N: Clone + PartialEq> Announcer<N> {
    /// Clear the live region now and queue `message` for delivery.
    pub fn announce<D>(&mut self, dom: &mut D, timers: &mut TimerQueue, message: &str)
    where
        D: Dom<Node = N>,
    {
        if let Some(region) = self.ensure_region(dom) {
            dom.set_text(&region, "");
        }
        timers.schedule(
            dom.now_ms(),
            ANNOUNCE_DELAY_MS,
            Owner::Session,
            Task::Announce(message.to_string()),
        );
        tracing::debug!(announcement = message, "announcement queued");
    }

    /// Write `message` into the live region.
    pub fn deliver<D>(&mut self, dom: &mut D, message: &str)
    where
        D: Dom<Node = N>,
    {
        if let Some(region) = self.ensure_region(dom) {
            dom.set_text(&region, message);
        }
    }

    /// Remove the live region from the page.
    pub fn teardown<D>(&mut self, dom: &mut D)
    where
        D: Dom<Node = N>,
    {
        let region = self
            .region
            .take()
            .or_else(|| dom.element_by_id(LIVE_REGION_ID));
        if let Some(region) = region {
            dom.remove(&region);
        }
    }

    fn ensure_region<D>(&mut self, dom: &mut D) -> Option<N>
    where
        D: Dom<Node = N>,
    {
        if let Some(existing) = dom.element_by_id(LIVE_REGION_ID) {
            self.region = Some(existing.clone());
            return Some(existing);
        }
        let region = dom.create_element("div")?;
        dom.set_attribute(&region, "id", LIVE_REGION_ID);
        dom.add_class(&region, "sr-only");
        dom.set_attribute(&region, "aria-live", "polite");
        dom.append_to_body(&region);
        tracing::debug!("live region created");
        self.region = Some(region.clone());
        Some(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDom;

    #[test]
    fn announce_clears_then_delivers() {
        let mut dom = MemoryDom::new();
        let mut timers = TimerQueue::new();
        let mut announcer = Announcer::default();

        announcer.announce(&mut dom, &mut timers, "Currency changed to USD");
        let region = dom.element_by_id(LIVE_REGION_ID);
        assert!(region.is_some());
        let Some(region) = region else { return };
        assert_eq!(dom.text(&region), "");
        assert_eq!(dom.attribute(&region, "aria-live").as_deref(), Some("polite"));
        assert_eq!(timers.next_due(), Some(ANNOUNCE_DELAY_MS));

        let due = timers.pop_due(ANNOUNCE_DELAY_MS).map(|timer| timer.task);
        assert_eq!(due, Some(Task::Announce("Currency changed to USD".into())));
        announcer.deliver(&mut dom, "Currency changed to USD");
        assert_eq!(dom.text(&region), "Currency changed to USD");
    }

    #[test]
    fn repeated_message_is_cleared_before_redelivery() {
        let mut dom = MemoryDom::new();
        let mut timers = TimerQueue::new();
        let mut announcer = Announcer::default();
        let message = "Currency changed to EUR";

        announcer.announce(&mut dom, &mut timers, message);
        announcer.deliver(&mut dom, message);
        let Some(region) = dom.element_by_id(LIVE_REGION_ID) else {
            panic!("live region missing after delivery");
        };
        assert_eq!(dom.text(&region), message);
        assert!(timers.pop_due(ANNOUNCE_DELAY_MS).is_some());

        announcer.announce(&mut dom, &mut timers, message);
        assert_eq!(dom.text(&region), "");
        let due = timers.pop_due(2 * ANNOUNCE_DELAY_MS).map(|timer| timer.task);
        assert_eq!(due, Some(Task::Announce(message.into())));
        announcer.deliver(&mut dom, message);
        assert_eq!(dom.text(&region), message);
    }

    #[test]
    fn region_is_reused_and_removed_on_teardown() {
        let mut dom = MemoryDom::new();
        let mut timers = TimerQueue::new();
        let mut announcer = Announcer::default();
        announcer.announce(&mut dom, &mut timers, "one");
        announcer.announce(&mut dom, &mut timers, "two");
        let body = dom.body();
        assert_eq!(dom.children(&body).len(), 1);

        announcer.teardown(&mut dom);
        assert!(dom.element_by_id(LIVE_REGION_ID).is_none());
    }
}
