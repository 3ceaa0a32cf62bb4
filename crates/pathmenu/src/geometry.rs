//! Plane geometry and the angle helpers shared by layout and rotation.

use derive_more::Display;
use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Default, Display)]
#[display("({x:.3}, {y:.3})")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset of length `radius` in direction `angle`.
    pub fn polar(radius: f64, angle: f64) -> Self {
        Self::new(radius * angle.cos(), radius * angle.sin())
    }

    pub fn offset(self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub fn negated(self) -> Self {
        Self::new(-self.x, -self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Display)]
#[display("{width}x{height}")]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn midpoint(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn center(&self) -> Point {
        self.origin.offset(self.size.midpoint())
    }
}

/// Row-vector 2D affine transform `[a b; c d; tx ty]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Applies `angle` before the existing transform.
    pub fn rotated(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            a: cos * self.a + sin * self.c,
            b: cos * self.b + sin * self.d,
            c: cos * self.c - sin * self.a,
            d: cos * self.d - sin * self.b,
            tx: self.tx,
            ty: self.ty,
        }
    }

    /// Rotation component in `(-PI, PI]`.
    pub fn rotation_angle(&self) -> f64 {
        self.b.atan2(self.a)
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }
}

/// Remainder of `angle` by a full turn, keeping the sign of `angle`.
pub fn normalize(angle: f64) -> f64 {
    angle % TAU
}

/// Shortest signed equivalent of an angular step, in `(-PI, PI]`.
pub fn wrap_delta(delta: f64) -> f64 {
    let wrapped = delta.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

pub fn point_to_angle(point: Point, origin: Point) -> f64 {
    (point.y - origin.y).atan2(point.x - origin.x)
}

/// Angular half-width occupied by an item whose center sits on a circle of
/// `radius`.
pub fn boundary_margin(item_half_width: f64, radius: f64, item_half_height: f64) -> f64 {
    normalize(item_half_width.atan2(radius - item_half_height))
}
