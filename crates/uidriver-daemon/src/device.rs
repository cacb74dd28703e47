//! The seam to the device-automation layer.
//!
//! The daemon never performs gestures itself; it resolves targets and hands
//! points to a [`UiBackend`]. Backends may block for as long as the device
//! takes. The daemon imposes no extra timeout and reports whatever failure
//! the backend surfaces as a normal error response.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use uidriver_core::Point;
use uidriver_core::Rect;
use uidriver_core::Selector;

/// Failures surfaced by the device-automation layer.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The target was resolved but the gesture could not be completed
    /// against it (disabled, obscured, mid-transition).
    #[error("invalid element state: {0}")]
    InvalidState(String),
    /// The element no longer exists in the UI tree.
    #[error("stale element")]
    Stale,
    /// Anything else the automation layer reports, timeouts included.
    #[error("{0}")]
    Failure(String),
}

/// Gesture and inspection primitives executed against the device under
/// test. One backend instance per session; calls are serialized by the
/// session lock.
pub trait UiBackend: Send {
    fn tap(&mut self, point: Point) -> Result<(), DeviceError>;

    fn double_tap(&mut self, point: Point) -> Result<(), DeviceError>;

    fn long_tap(&mut self, point: Point, duration: Duration) -> Result<(), DeviceError>;

    fn touch_down(&mut self, point: Point) -> Result<(), DeviceError>;

    fn touch_up(&mut self, point: Point) -> Result<(), DeviceError>;

    fn touch_move(&mut self, point: Point) -> Result<(), DeviceError>;

    fn drag(&mut self, from: Point, to: Point, steps: u32) -> Result<(), DeviceError>;

    /// Locate the first element matching `selector` and report its bounds.
    /// `Ok(None)` means the lookup ran but nothing matched.
    fn find_element(&mut self, selector: &Selector) -> Result<Option<Rect>, DeviceError>;

    /// Re-read the bounds of a previously located element. `Err(Stale)`
    /// when the element has left the UI tree.
    fn element_bounds(&mut self, selector: &Selector) -> Result<Rect, DeviceError>;
}

/// Opens a fresh backend for each new session.
pub type BackendFactory = Box<dyn Fn() -> Result<Box<dyn UiBackend>, DeviceError> + Send + Sync>;

/// Stand-in backend for builds without a device integration: gestures
/// succeed without touching anything and the UI tree is empty. Lets the
/// protocol surface be exercised end to end.
#[derive(Debug, Default)]
pub struct NoopBackend;

impl UiBackend for NoopBackend {
    fn tap(&mut self, point: Point) -> Result<(), DeviceError> {
        debug!(%point, "noop tap");
        Ok(())
    }

    fn double_tap(&mut self, point: Point) -> Result<(), DeviceError> {
        debug!(%point, "noop double tap");
        Ok(())
    }

    fn long_tap(&mut self, point: Point, duration: Duration) -> Result<(), DeviceError> {
        debug!(%point, duration_ms = duration.as_millis() as u64, "noop long tap");
        Ok(())
    }

    fn touch_down(&mut self, point: Point) -> Result<(), DeviceError> {
        debug!(%point, "noop touch down");
        Ok(())
    }

    fn touch_up(&mut self, point: Point) -> Result<(), DeviceError> {
        debug!(%point, "noop touch up");
        Ok(())
    }

    fn touch_move(&mut self, point: Point) -> Result<(), DeviceError> {
        debug!(%point, "noop touch move");
        Ok(())
    }

    fn drag(&mut self, from: Point, to: Point, steps: u32) -> Result<(), DeviceError> {
        debug!(%from, %to, steps, "noop drag");
        Ok(())
    }

    fn find_element(&mut self, _selector: &Selector) -> Result<Option<Rect>, DeviceError> {
        Ok(None)
    }

    fn element_bounds(&mut self, _selector: &Selector) -> Result<Rect, DeviceError> {
        Err(DeviceError::Stale)
    }
}
