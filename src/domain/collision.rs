//! Collision detection between the mouse body and maze walls.

use super::Position;

pub trait HasCollision {
    fn has_collision(&self, other: &dyn HasCollision) -> bool {
        self.shape().has_intersection(&other.shape())
    }

    fn shape(&self) -> Shape;
}

/// Rectangles are axis-aligned and described by their center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Rectangle {
        position: Position,
        x_length: f64,
        y_length: f64,
    },
    Circle {
        position: Position,
        radius: f64,
    },
}

impl Shape {
    pub fn has_intersection(&self, other: &Shape) -> bool {
        match (self, other) {
            (
                Shape::Circle { position, radius },
                Shape::Circle {
                    position: other_position,
                    radius: other_radius,
                },
            ) => position.distance(*other_position) < radius + other_radius,
            (
                Shape::Circle { position, radius },
                Shape::Rectangle {
                    position: other_position,
                    x_length: other_x_length,
                    y_length: other_y_length,
                },
            )
            | (
                Shape::Rectangle {
                    position: other_position,
                    x_length: other_x_length,
                    y_length: other_y_length,
                },
                Shape::Circle { position, radius },
            ) => {
                let closest = Position::new(
                    position.x().clamp(
                        other_position.x() - other_x_length / 2.0,
                        other_position.x() + other_x_length / 2.0,
                    ),
                    position.y().clamp(
                        other_position.y() - other_y_length / 2.0,
                        other_position.y() + other_y_length / 2.0,
                    ),
                );
                position.distance(closest) < *radius
            }
            (
                Shape::Rectangle {
                    position,
                    x_length,
                    y_length,
                },
                Shape::Rectangle {
                    position: other_position,
                    x_length: other_x_length,
                    y_length: other_y_length,
                },
            ) => {
                (position.x() - other_position.x()).abs() + f64::EPSILON
                    < (x_length + other_x_length) / 2.0
                    && (position.y() - other_position.y()).abs() + f64::EPSILON
                        < (y_length + other_y_length) / 2.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn wall() -> Shape {
        Shape::Rectangle {
            position: Position::new(0.0, 0.0),
            x_length: 0.18,
            y_length: 0.012,
        }
    }

    #[rstest]
    #[case::above_edge(Position::new(0.0, 0.05), 0.05, true)]
    #[case::clear_above(Position::new(0.0, 0.07), 0.05, false)]
    #[case::beside_end(Position::new(0.13, 0.0), 0.05, true)]
    #[case::clear_of_corner(Position::new(0.13, 0.05), 0.05, false)]
    #[case::center_inside(Position::new(0.0, 0.0), 0.01, true)]
    fn test_circle_rectangle_intersection(
        #[case] position: Position,
        #[case] radius: f64,
        #[case] expected: bool,
    ) {
        let circle = Shape::Circle { position, radius };
        assert_eq!(circle.has_intersection(&wall()), expected);
        assert_eq!(wall().has_intersection(&circle), expected);
    }

    #[rstest]
    #[case(Position::new(0.0, 0.0), true)]
    #[case(Position::new(0.5, 0.5), false)]
    #[case(Position::new(0.09, 0.0), true)]
    fn test_rectangle_rectangle_intersection(#[case] position: Position, #[case] expected: bool) {
        let other = Shape::Rectangle {
            position,
            x_length: 0.012,
            y_length: 0.18,
        };
        assert_eq!(wall().has_intersection(&other), expected);
    }

    #[test]
    fn test_circle_circle_intersection() {
        let a = Shape::Circle {
            position: Position::new(0.0, 0.0),
            radius: 1.0,
        };
        let b = Shape::Circle {
            position: Position::new(1.5, 0.0),
            radius: 0.6,
        };
        let c = Shape::Circle {
            position: Position::new(2.0, 0.0),
            radius: 0.6,
        };
        assert!(a.has_intersection(&b));
        assert!(!a.has_intersection(&c));
    }
}
