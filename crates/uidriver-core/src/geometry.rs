use serde::Deserialize;
use serde::Serialize;

/// A resolved target coordinate in integer device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An element's extent on screen: left/top/right/bottom edges in integer
/// device pixels. Right and bottom edges are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Center point under floor division, so an odd edge sum rounds toward
    /// the lower bound. (1,1,10,10) centers at (5,5), not (6,6).
    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right).div_euclid(2),
            (self.top + self.bottom).div_euclid(2),
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.left, self.top, self.right, self.bottom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_center_even_bounds() {
        assert_eq!(Rect::new(0, 0, 10, 10).center(), Point::new(5, 5));
    }

    #[test]
    fn test_center_odd_sum_rounds_down() {
        // (1+10)/2 = 5.5, floors to 5
        assert_eq!(Rect::new(1, 1, 10, 10).center(), Point::new(5, 5));
    }

    #[test]
    fn test_center_negative_bounds_floor() {
        // (-5+0)/2 = -2.5, floors to -3 rather than truncating to -2
        assert_eq!(Rect::new(-5, -5, 0, 0).center(), Point::new(-3, -3));
    }

    #[test]
    fn test_width_height() {
        let r = Rect::new(2, 3, 12, 8);
        assert_eq!(r.width(), 10);
        assert_eq!(r.height(), 5);
    }

    #[test]
    fn test_contains_edges() {
        let r = Rect::new(0, 0, 4, 4);
        assert!(r.contains(Point::new(0, 0)));
        assert!(r.contains(Point::new(3, 3)));
        assert!(!r.contains(Point::new(4, 4)));
        assert!(!r.contains(Point::new(-1, 0)));
    }

    #[test]
    fn test_serde_round_trip() {
        let r = Rect::new(1, 2, 3, 4);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(serde_json::from_str::<Rect>(&json).unwrap(), r);
    }

    proptest! {
        #[test]
        fn prop_center_inside_nonempty_rect(
            left in -1000i32..1000,
            top in -1000i32..1000,
            w in 1i32..1000,
            h in 1i32..1000,
        ) {
            let r = Rect::new(left, top, left + w, top + h);
            let c = r.center();
            prop_assert!(c.x >= r.left && c.x < r.right);
            prop_assert!(c.y >= r.top && c.y < r.bottom);
        }

        #[test]
        fn prop_center_matches_float_floor(
            left in -1000i32..1000,
            top in -1000i32..1000,
            w in 0i32..1000,
            h in 0i32..1000,
        ) {
            let r = Rect::new(left, top, left + w, top + h);
            let c = r.center();
            let fx = ((r.left + r.right) as f64 / 2.0).floor() as i32;
            let fy = ((r.top + r.bottom) as f64 / 2.0).floor() as i32;
            prop_assert_eq!(c, Point::new(fx, fy));
        }
    }
}
