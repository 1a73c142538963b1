//! Simple polygons used for sensor footprints and fields of view.

use std::f64::consts::TAU;

use super::{Angle, Position};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    vertices: Vec<Position>,
}

impl Polygon {
    pub fn new(vertices: Vec<Position>) -> Self {
        Self { vertices }
    }

    /// Regular polygon approximating a circle.
    pub fn circle(center: Position, radius: f64, edges: usize) -> Self {
        Self::new(
            (0..edges)
                .map(|i| center + Position::polar(radius, Angle::new(TAU * i as f64 / edges as f64)))
                .collect(),
        )
    }

    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    /// Unsigned area by the shoelace formula.
    pub fn area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        (0..n)
            .map(|i| {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                a.x() * b.y() - b.x() * a.y()
            })
            .sum::<f64>()
            .abs()
            / 2.0
    }
}
