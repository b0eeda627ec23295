use serde::{Deserialize, Serialize};

/// Complex number as a `(re, im)` pair. Operations return new values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct C {
    pub re: f64,
    pub im: f64,
}

impl C {
    pub fn new(re: f64, im: f64) -> Self {
        C { re, im }
    }

    pub fn abs_sq(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    pub fn magnitude(&self) -> f64 {
        self.abs_sq().sqrt()
    }

    pub fn add(&self, other: C) -> C {
        C::new(self.re + other.re, self.im + other.im)
    }

    pub fn mul(&self, other: C) -> C {
        C::new(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re
        )
    }

    /// `z * z`, expanded so the imaginary part is a single product.
    pub fn square(&self) -> C {
        C::new(self.re * self.re - self.im * self.im, 2.0 * self.re * self.im)
    }
}

impl From<(f64, f64)> for C {
    fn from((re, im): (f64, f64)) -> Self {
        C::new(re, im)
    }
}

impl From<Point2D> for C {
    fn from(p: Point2D) -> Self {
        C::new(p.x, p.y)
    }
}

/// Pan center of the view.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Point2D { x, y }
    }
}

pub fn square_dist(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    dx * dx + dy * dy
}
