//! Event system connecting independently constructed managers.
//!
//! Managers for the three resource types do not reference each other; they
//! communicate by publishing domain events (`ticket.created`,
//! `subscriber.created`, `media.uploaded`, ...) onto a shared bus. Delivery is
//! synchronous fan-out to currently registered subscribers in publish order;
//! there is no replay, so a subscriber attached after an event was published
//! never sees it.

mod event_bus;
mod event_types;

pub use event_bus::{BusEvent, EventBus};
pub use event_types::{Action, Category};
