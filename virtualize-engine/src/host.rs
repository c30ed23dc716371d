use alloc::vec::Vec;
use core::fmt;

use virtualize::ItemMeasurement;

/// Opaque identity of a host-side list instance.
///
/// Every bundle of observers is looked up by this handle, never by its sentinel elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostHandle(pub u64);

impl fmt::Display for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Payload of a sentinel visibility notification.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SentinelVisible {
    /// How far the viewport (plus root margin) reaches into the sentinel.
    pub penetration_offset: f64,
    /// Bounding height of everything rendered between the two sentinels.
    pub gap_between_sentinels: f64,
    /// Height of the observation root, when the platform reports it.
    pub viewport_size: Option<f64>,
    pub measurements: Vec<ItemMeasurement>,
}

/// The item provider. It reacts to notifications by changing the rendered window.
///
/// Notifications are fire-and-forget: the engine does not wait for the host to re-render.
pub trait VirtualizeHost {
    fn on_leading_sentinel_visible(&mut self, event: SentinelVisible);

    fn on_trailing_sentinel_visible(&mut self, event: SentinelVisible);
}
