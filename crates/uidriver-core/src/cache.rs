use std::collections::HashMap;

use crate::element::ElementHandle;
use crate::element::generate_element_id;
use crate::geometry::Rect;

/// Session-scoped registry mapping an opaque reference id to an element
/// handle.
///
/// Lookup of an unknown or invalidated id returns `None`; callers decide
/// whether that is an error. Ids are random, so a retired id is never
/// reassigned to a different live element within the session.
#[derive(Debug, Default)]
pub struct ElementCache {
    entries: HashMap<String, ElementHandle>,
}

impl ElementCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&ElementHandle> {
        self.entries.get(id)
    }

    /// Register a handle, assigning an id if the handle carries none, and
    /// return the id under which it is reachable. Re-putting a handle with
    /// a known id replaces that entry.
    pub fn put(&mut self, mut handle: ElementHandle) -> String {
        if handle.id.is_empty() {
            handle.id = generate_element_id();
        }
        let id = handle.id.clone();
        self.entries.insert(id.clone(), handle);
        id
    }

    /// Drop an entry. Later `get` calls for the id report a miss.
    pub fn invalidate(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Refresh the recorded bounds of a live entry.
    pub fn update_bounds(&mut self, id: &str, bounds: Rect) -> bool {
        match self.entries.get_mut(id) {
            Some(handle) => {
                handle.bounds = bounds;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let mut cache = ElementCache::new();
        let handle = ElementHandle::new(Rect::new(0, 0, 10, 10));
        let id = cache.put(handle.clone());
        assert_eq!(id, handle.id);
        assert_eq!(cache.get(&id), Some(&handle));
    }

    #[test]
    fn test_get_is_idempotent() {
        let mut cache = ElementCache::new();
        let id = cache.put(ElementHandle::new(Rect::new(1, 2, 3, 4)));
        let first = cache.get(&id).cloned();
        let second = cache.get(&id).cloned();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_id_is_a_miss() {
        let cache = ElementCache::new();
        assert!(cache.get("nope").is_none());
    }

    #[test]
    fn test_get_after_invalidate_is_a_miss() {
        let mut cache = ElementCache::new();
        let id = cache.put(ElementHandle::new(Rect::new(0, 0, 4, 4)));
        assert!(cache.invalidate(&id));
        assert!(cache.get(&id).is_none());
        // consistently missing, not just once
        assert!(cache.get(&id).is_none());
        assert!(!cache.invalidate(&id));
    }

    #[test]
    fn test_put_assigns_id_when_absent() {
        let mut cache = ElementCache::new();
        let mut handle = ElementHandle::new(Rect::new(0, 0, 1, 1));
        handle.id = String::new();
        let id = cache.put(handle);
        assert!(!id.is_empty());
        assert!(cache.get(&id).is_some());
    }

    #[test]
    fn test_put_same_id_replaces() {
        let mut cache = ElementCache::new();
        let id = cache.put(ElementHandle::new(Rect::new(0, 0, 4, 4)));
        let mut updated = cache.get(&id).cloned().unwrap();
        updated.bounds = Rect::new(0, 0, 8, 8);
        let id2 = cache.put(updated);
        assert_eq!(id, id2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&id).unwrap().bounds, Rect::new(0, 0, 8, 8));
    }

    #[test]
    fn test_update_bounds() {
        let mut cache = ElementCache::new();
        let id = cache.put(ElementHandle::new(Rect::new(0, 0, 4, 4)));
        assert!(cache.update_bounds(&id, Rect::new(2, 2, 6, 6)));
        assert_eq!(cache.get(&id).unwrap().bounds, Rect::new(2, 2, 6, 6));
        assert!(!cache.update_bounds("missing", Rect::new(0, 0, 1, 1)));
    }

    #[test]
    fn test_clear() {
        let mut cache = ElementCache::new();
        cache.put(ElementHandle::new(Rect::new(0, 0, 1, 1)));
        cache.put(ElementHandle::new(Rect::new(0, 0, 2, 2)));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
