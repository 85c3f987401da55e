//! Engine systems, one per tick phase.
//!
//! 1. `advance_roles` (Roles) flips every agent whose period elapsed
//! 2. `propagate_signals` (Signals) delivers emitter signals to in-range receivers
//! 3. `expire_links` (Expiry) closes episodes whose deadline passed
//! 4. `deliver_link_events` (Delivery) hands the tick's events to the sink

mod delivery;
mod roles;
mod signals;

pub use delivery::deliver_link_events;
pub use roles::advance_roles;
pub use signals::{expire_links, propagate_signals};
