use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{
    config::{Color, DisplayConfig},
    shape::{Rect, Shape},
};

/// Vertical distance between the ink circle and the backdrop circle that
/// carves the crescent.
const CRESCENT_OVERLAY_OFFSET: f32 = 150.0;
/// Extra radius of the carving circle.
const CRESCENT_OVERLAY_GROWTH: f32 = 60.0;
const STAR_POINTS: usize = 10;
const STAR_INNER_RATIO: f32 = 0.4;

/// Which visual recipe to draw this frame, with the parameters it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expression {
    Normal,
    Laughing { offset: f32 },
    Smiling,
    Stars { scale: f32 },
}

/// Renderer-agnostic drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    RoundedRect {
        rect: Rect,
        color: Color,
        radius: f32,
    },
    Circle {
        center: (f32, f32),
        radius: f32,
        color: Color,
    },
    Polygon {
        points: Vec<(f32, f32)>,
        color: Color,
    },
}

/// The two eyes plus their shared colours.
#[derive(Debug, Clone)]
pub struct ExpressionPair {
    pub left: Shape,
    pub right: Shape,
    pub ink: Color,
    pub backdrop: Color,
    pub accent: Color,
    pub corner_radius: f32,
    pub smile_offset: f32,
}

impl ExpressionPair {
    pub fn new(left: Rect, right: Rect) -> Self {
        Self {
            left: Shape::new(left),
            right: Shape::new(right),
            ink: Color::BLACK,
            backdrop: Color::WHITE,
            accent: Color::YELLOW,
            corner_radius: 30.0,
            smile_offset: 10.0,
        }
    }

    /// Builds a pair laid out and coloured from display settings.
    pub fn from_display(display: &DisplayConfig) -> Self {
        let (left, right) = display.eye_rects();
        Self {
            ink: display.ink,
            backdrop: display.backdrop,
            accent: display.accent,
            corner_radius: display.corner_radius,
            ..Self::new(left, right)
        }
    }

    pub fn with_smile_offset(mut self, offset: f32) -> Self {
        self.smile_offset = offset;
        self
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    pub fn is_at_rest(&self) -> bool {
        self.left.is_at_rest() && self.right.is_at_rest()
    }

    pub fn recipe(&self, expression: Expression) -> Vec<DrawCommand> {
        match expression {
            Expression::Normal => self.draw_normal(),
            Expression::Laughing { offset } => self.draw_laughing(offset),
            Expression::Smiling => self.draw_smiling(),
            Expression::Stars { scale } => self.draw_stars(scale),
        }
    }

    pub fn draw_normal(&self) -> Vec<DrawCommand> {
        [&self.left, &self.right]
            .into_iter()
            .map(|eye| DrawCommand::RoundedRect {
                rect: eye.current,
                color: self.ink,
                radius: self.corner_radius,
            })
            .collect()
    }

    pub fn draw_laughing(&self, vertical_offset: f32) -> Vec<DrawCommand> {
        let mut commands = Vec::with_capacity(4);
        for eye in [&self.left, &self.right] {
            commands.extend(self.crescent(eye, vertical_offset));
        }
        commands
    }

    pub fn draw_smiling(&self) -> Vec<DrawCommand> {
        self.draw_laughing(self.smile_offset)
    }

    pub fn draw_stars(&self, scale: f32) -> Vec<DrawCommand> {
        [&self.left, &self.right]
            .into_iter()
            .map(|eye| DrawCommand::Polygon {
                points: star_points(eye, scale),
                color: self.accent,
            })
            .collect()
    }

    fn crescent(&self, eye: &Shape, vertical_offset: f32) -> [DrawCommand; 2] {
        let (cx, cy) = eye.center();
        let cy = cy + vertical_offset;
        let radius = eye.current.height / 2.0;
        [
            DrawCommand::Circle {
                center: (cx, cy),
                radius,
                color: self.ink,
            },
            DrawCommand::Circle {
                center: (cx, cy + CRESCENT_OVERLAY_OFFSET),
                radius: radius + CRESCENT_OVERLAY_GROWTH,
                color: self.backdrop,
            },
        ]
    }
}

/// Ten points alternating between the outer and inner radius, starting
/// straight up from the centre.
fn star_points(eye: &Shape, scale: f32) -> Vec<(f32, f32)> {
    let (cx, cy) = eye.center();
    let outer = eye.current.width.min(eye.current.height) / 2.0 * scale;
    let inner = outer * STAR_INNER_RATIO;
    (0..STAR_POINTS)
        .map(|i| {
            let angle = PI * 2.0 * i as f32 / STAR_POINTS as f32 - PI / 2.0;
            let radius = if i % 2 == 0 { outer } else { inner };
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pair() -> ExpressionPair {
        ExpressionPair::new(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Rect::new(300.0, 0.0, 200.0, 100.0),
        )
    }

    fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
        ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
    }

    #[test]
    fn normal_draws_two_rounded_rects() {
        let commands = pair().draw_normal();
        assert_eq!(
            commands,
            vec![
                DrawCommand::RoundedRect {
                    rect: Rect::new(0.0, 0.0, 200.0, 100.0),
                    color: Color::BLACK,
                    radius: 30.0,
                },
                DrawCommand::RoundedRect {
                    rect: Rect::new(300.0, 0.0, 200.0, 100.0),
                    color: Color::BLACK,
                    radius: 30.0,
                },
            ]
        );
    }

    #[test]
    fn laughing_carves_crescent_below_ink() {
        let commands = pair().draw_laughing(5.0);
        assert_eq!(commands.len(), 4);
        assert_eq!(
            commands[0],
            DrawCommand::Circle {
                center: (100.0, 55.0),
                radius: 50.0,
                color: Color::BLACK,
            }
        );
        assert_eq!(
            commands[1],
            DrawCommand::Circle {
                center: (100.0, 205.0),
                radius: 110.0,
                color: Color::WHITE,
            }
        );
    }

    #[test]
    fn smiling_uses_fixed_offset() {
        let eyes = pair();
        assert_eq!(eyes.draw_smiling(), eyes.draw_laughing(10.0));
    }

    #[test]
    fn star_alternates_outer_and_inner_radius() {
        let eyes = pair();
        let commands = eyes.draw_stars(0.5);
        let DrawCommand::Polygon { points, color } = &commands[0] else {
            panic!("expected polygon, got {:?}", commands[0]);
        };
        assert_eq!(*color, Color::YELLOW);
        assert_eq!(points.len(), 10);

        let center = eyes.left.center();
        // min(200, 100) / 2 * 0.5
        let outer = 25.0;
        for (i, point) in points.iter().enumerate() {
            let expected = if i % 2 == 0 { outer } else { outer * 0.4 };
            assert!((distance(*point, center) - expected).abs() < 1e-3);
        }
        // first point straight up
        assert!((points[0].0 - center.0).abs() < 1e-3);
        assert!(points[0].1 < center.1);
    }

    #[test]
    fn recipe_dispatches_on_expression() {
        let eyes = pair();
        assert_eq!(eyes.recipe(Expression::Normal), eyes.draw_normal());
        assert_eq!(eyes.recipe(Expression::Smiling), eyes.draw_smiling());
        assert_eq!(
            eyes.recipe(Expression::Stars { scale: 1.0 }),
            eyes.draw_stars(1.0)
        );
    }

    #[test]
    fn reset_restores_both_eyes() {
        let mut eyes = pair();
        eyes.left.grow(0.0, -50.0);
        eyes.right.move_by(12.0, 0.0);
        assert!(!eyes.is_at_rest());
        eyes.reset();
        assert!(eyes.is_at_rest());
    }
}
