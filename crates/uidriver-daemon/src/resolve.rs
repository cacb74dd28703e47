//! Target resolution: turning command parameters into a concrete point.

use serde::Deserialize;
use serde_json::Value;

use uidriver_core::ElementCache;
use uidriver_core::Point;

use crate::error::CommandError;

/// The target portion of a command's parameter bag: an element reference,
/// an explicit coordinate pair, or both. Coordinates stay as raw JSON until
/// resolution so a malformed value can be reported against its field name.
#[derive(Debug, Default, Deserialize)]
pub struct TargetParams {
    #[serde(default, alias = "elementId")]
    pub element: Option<String>,
    #[serde(default)]
    pub x: Option<Value>,
    #[serde(default)]
    pub y: Option<Value>,
}

impl TargetParams {
    /// Parse from a request's params object. Absent params are an empty
    /// target (resolution will then fail naming the first missing field).
    pub fn from_params(params: Option<&Value>) -> Result<Self, CommandError> {
        match params {
            None => Ok(Self::default()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|_| CommandError::malformed("params", "an object")),
        }
    }
}

fn require_int(value: Option<&Value>, field: &str) -> Result<i32, CommandError> {
    let value = value.ok_or_else(|| CommandError::missing(field))?;
    let n = value
        .as_i64()
        .ok_or_else(|| CommandError::malformed(field, "an integer"))?;
    i32::try_from(n).map_err(|_| CommandError::malformed(field, "an integer in pixel range"))
}

/// Resolve the point a command acts on.
///
/// The element reference is consulted only when both coordinates are
/// absent, so explicit coordinates win over a simultaneous reference. An
/// unknown or invalidated reference is `ElementNotFound`; a missing or
/// non-integer coordinate is `InvalidArgument` naming the offending field.
pub fn resolve_point(params: &TargetParams, cache: &ElementCache) -> Result<Point, CommandError> {
    if let Some(element) = &params.element {
        if params.x.is_none() && params.y.is_none() {
            let handle = cache
                .get(element)
                .ok_or_else(|| CommandError::ElementNotFound(element.clone()))?;
            return Ok(handle.bounds.center());
        }
    }
    let x = require_int(params.x.as_ref(), "x")?;
    let y = require_int(params.y.as_ref(), "y")?;
    Ok(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uidriver_core::ElementHandle;
    use uidriver_core::Rect;

    fn params(value: Value) -> TargetParams {
        TargetParams::from_params(Some(&value)).unwrap()
    }

    fn cache_with(bounds: Rect) -> (ElementCache, String) {
        let mut cache = ElementCache::new();
        let id = cache.put(ElementHandle::new(bounds));
        (cache, id)
    }

    #[test]
    fn test_element_resolves_to_center() {
        let (cache, id) = cache_with(Rect::new(0, 0, 10, 10));
        let point = resolve_point(&params(json!({ "element": id })), &cache).unwrap();
        assert_eq!(point, Point::new(5, 5));
    }

    #[test]
    fn test_element_center_floors_odd_sum() {
        let (cache, id) = cache_with(Rect::new(1, 1, 10, 10));
        let point = resolve_point(&params(json!({ "element": id })), &cache).unwrap();
        assert_eq!(point, Point::new(5, 5));
    }

    #[test]
    fn test_element_id_wire_alias() {
        let (cache, id) = cache_with(Rect::new(0, 0, 4, 4));
        let point = resolve_point(&params(json!({ "elementId": id })), &cache).unwrap();
        assert_eq!(point, Point::new(2, 2));
    }

    #[test]
    fn test_explicit_coordinates() {
        let cache = ElementCache::new();
        let point = resolve_point(&params(json!({ "x": 20, "y": 30 })), &cache).unwrap();
        assert_eq!(point, Point::new(20, 30));
    }

    #[test]
    fn test_explicit_coordinates_win_over_element() {
        let (cache, id) = cache_with(Rect::new(0, 0, 10, 10));
        let point =
            resolve_point(&params(json!({ "element": id, "x": 20, "y": 30 })), &cache).unwrap();
        assert_eq!(point, Point::new(20, 30));
    }

    #[test]
    fn test_neither_element_nor_coordinates() {
        let cache = ElementCache::new();
        let err = resolve_point(&TargetParams::default(), &cache).unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidArgument { ref field, .. } if field == "x"
        ));
    }

    #[test]
    fn test_missing_y_named() {
        let cache = ElementCache::new();
        let err = resolve_point(&params(json!({ "x": 5 })), &cache).unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidArgument { ref field, .. } if field == "y"
        ));
    }

    #[test]
    fn test_element_with_partial_coordinates_requires_both() {
        // An element ref does not rescue a half-specified coordinate pair.
        let (cache, id) = cache_with(Rect::new(0, 0, 10, 10));
        let err = resolve_point(&params(json!({ "element": id, "x": 5 })), &cache).unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidArgument { ref field, .. } if field == "y"
        ));
    }

    #[test]
    fn test_non_integer_coordinate_named() {
        let cache = ElementCache::new();
        let err = resolve_point(&params(json!({ "x": "20", "y": 30 })), &cache).unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidArgument { ref field, .. } if field == "x"
        ));

        let err = resolve_point(&params(json!({ "x": 20, "y": 1.5 })), &cache).unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidArgument { ref field, .. } if field == "y"
        ));
    }

    #[test]
    fn test_coordinate_out_of_pixel_range() {
        let cache = ElementCache::new();
        let err =
            resolve_point(&params(json!({ "x": 5_000_000_000i64, "y": 0 })), &cache).unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument { .. }));
    }

    #[test]
    fn test_unknown_element_is_not_found() {
        let cache = ElementCache::new();
        let err = resolve_point(&params(json!({ "element": "zzzz" })), &cache).unwrap_err();
        assert!(matches!(err, CommandError::ElementNotFound(ref id) if id == "zzzz"));
    }

    #[test]
    fn test_invalidated_element_is_not_found() {
        let (mut cache, id) = cache_with(Rect::new(0, 0, 4, 4));
        cache.invalidate(&id);
        let err = resolve_point(&params(json!({ "element": id })), &cache).unwrap_err();
        assert!(matches!(err, CommandError::ElementNotFound(_)));
    }

    #[test]
    fn test_malformed_params_object() {
        let err = TargetParams::from_params(Some(&json!("not an object"))).unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidArgument { ref field, .. } if field == "params"
        ));
    }
}
