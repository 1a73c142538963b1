//! Basic building blocks.
//!
//! Lengths are meters and angles radians throughout. Headings are measured counter-clockwise from
//! the positive x-axis, so east is 0 and north is a quarter turn.

use std::{
    f64::consts::{PI, TAU},
    ops::{Add, Mul, Neg, Sub},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `length` from the origin in the direction of `angle`.
    pub fn polar(length: f64, angle: Angle) -> Self {
        Self::new(length * angle.0.cos(), length * angle.0.sin())
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn distance(&self, position: Self) -> f64 {
        ((self.x - position.x).powi(2) + (self.y - position.y).powi(2)).sqrt()
    }

    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn rotate_vector(&self, angle: Angle) -> Position {
        Position::new(
            self.x * angle.0.cos() - self.y * angle.0.sin(),
            self.x * angle.0.sin() + self.y * angle.0.cos(),
        )
    }
}

impl From<Position> for (f64, f64) {
    fn from(value: Position) -> Self {
        (value.x, value.y)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f64> for Position {
    type Output = Position;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Angle(f64);

impl Angle {
    pub const fn new(radians: f64) -> Self {
        Self(radians)
    }

    pub fn from_deg(degree: f64) -> Self {
        Self(degree * PI / 180.0)
    }

    pub fn radians(self) -> f64 {
        self.0
    }

    pub fn to_deg(self) -> f64 {
        (self.0 * (180.0 / PI)).rem_euclid(360.0)
    }

    /// Equivalent angle in [0, 2π).
    pub fn normalized(self) -> Self {
        let radians = self.0.rem_euclid(TAU);
        // rem_euclid may round up to exactly TAU for tiny negative inputs
        Self(if radians >= TAU { 0.0 } else { radians })
    }

    /// Shortest signed rotation from `from` to `self`, in (-π, π].
    pub fn signed_difference(self, from: Angle) -> Angle {
        let difference = (self.0 - from.0).rem_euclid(TAU);
        Self(if difference > PI {
            difference - TAU
        } else {
            difference
        })
    }
}

impl Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Angle(-self.0)
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Angle {
    type Output = Angle;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl From<Angle> for f64 {
    fn from(value: Angle) -> Self {
        value.0
    }
}

/// Rotational speed in radians per second. Used both for wheel speeds and the mouse's yaw rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct AngularVelocity(f64);

impl AngularVelocity {
    pub const fn new(radians_per_second: f64) -> Self {
        Self(radians_per_second)
    }

    pub fn to_deg_per_sec(self) -> f64 {
        self.0 * (180.0 / PI)
    }
}

impl Add for AngularVelocity {
    type Output = AngularVelocity;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Neg for AngularVelocity {
    type Output = Self;

    fn neg(self) -> Self::Output {
        AngularVelocity(-self.0)
    }
}

impl From<AngularVelocity> for f64 {
    fn from(value: AngularVelocity) -> Self {
        value.0
    }
}
