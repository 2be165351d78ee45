//! 2D geometric primitives shared by the clipper, cut composer, and
//! coordinate transforms.
//!
//! A [`Point`] carries no unit of its own: the same struct is used for
//! screen pixels, sheet-local units, and real-world coordinates. The
//! editor keeps those spaces apart at its API seams: functions name
//! which space they take and return, and conversions go through the
//! viewport or the coordinate mapper, never through arithmetic alone.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// A point or vector in 2D.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin (0, 0).
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Dot product with another vector.
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D scalar cross product (z component of the 3D cross product).
    /// Positive when `other` lies counter-clockwise of `self`.
    pub fn cross(&self, other: &Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Scales both components by `s`.
    pub fn scale(&self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s)
    }

    /// Euclidean length of the vector.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Distance to another point.
    pub fn distance_to(&self, other: &Self) -> f64 {
        (*other - *self).length()
    }

    /// Midpoint between this point and another.
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Rotates the vector by `angle_rad` radians (counter-clockwise in a
    /// y-up frame; clockwise on a y-down canvas).
    pub fn rotated(&self, angle_rad: f64) -> Self {
        let (sin, cos) = angle_rad.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Rounds both components to the nearest integer.
    pub fn round(&self) -> Self {
        Self::new(self.x.round(), self.y.round())
    }

    /// Returns true when both components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}
