use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::geometry::Rect;
use crate::selector::Selector;

/// Generate a new opaque element reference id.
///
/// Ids are random, so an id retired by invalidation is never handed out
/// again for a different element within the session's lifetime.
pub fn generate_element_id() -> String {
    Uuid::new_v4().to_string()[..8].to_string()
}

/// A cached reference to an on-screen element: the opaque id handed to
/// clients, the last-known bounding rectangle, and the selector that
/// located it (kept so the element can be re-checked later).
///
/// The bounds are a snapshot; the underlying element can disappear at any
/// time. Staleness is only discovered when the handle is next used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementHandle {
    pub id: String,
    pub bounds: Rect,
    pub selector: Option<Selector>,
}

impl ElementHandle {
    pub fn new(bounds: Rect) -> Self {
        Self {
            id: generate_element_id(),
            bounds,
            selector: None,
        }
    }

    pub fn with_selector(bounds: Rect, selector: Selector) -> Self {
        Self {
            id: generate_element_id(),
            bounds,
            selector: Some(selector),
        }
    }
}
