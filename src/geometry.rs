/// A position in canvas space, in pixels, y pointing down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: Point) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point { x: v.0, y: v.1 }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(500.0, 400.0);
        let b = Point::new(500.0, 520.0);
        assert_eq!(a.distance(b), 120.0);
        assert_eq!(a.distance_squared(b), 14400.0);
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_tuple_conversion() {
        let p: Point = (1.5, -2.0).into();
        assert_eq!(p, Point::new(1.5, -2.0));
        let t: (f64, f64) = p.into();
        assert_eq!(t, (1.5, -2.0));
    }
}
