use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A single eye: the rectangle currently drawn plus the rest rectangle it
/// returns to between expressions. The rest rectangle is fixed at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub current: Rect,
    rest: Rect,
}

impl Shape {
    pub fn new(rest: Rect) -> Self {
        Self {
            current: rest,
            rest,
        }
    }

    pub fn rest(&self) -> Rect {
        self.rest
    }

    /// Inflates the shape around its centre. Negative deltas shrink.
    pub fn grow(&mut self, dw: f32, dh: f32) {
        self.current.x -= dw / 2.0;
        self.current.y -= dh / 2.0;
        self.current.width += dw;
        self.current.height += dh;
    }

    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.current.x += dx;
        self.current.y += dy;
    }

    pub fn reset_position(&mut self) {
        self.current.x = self.rest.x;
        self.current.y = self.rest.y;
    }

    pub fn reset_size(&mut self) {
        self.current.width = self.rest.width;
        self.current.height = self.rest.height;
    }

    pub fn reset(&mut self) {
        self.reset_position();
        self.reset_size();
    }

    pub fn center(&self) -> (f32, f32) {
        self.current.center()
    }

    pub fn is_at_rest(&self) -> bool {
        self.current == self.rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye() -> Shape {
        Shape::new(Rect::new(100.0, 50.0, 240.0, 240.0))
    }

    #[test]
    fn grow_keeps_centre() {
        let mut shape = eye();
        let before = shape.center();
        shape.grow(10.0, -30.0);
        assert_eq!(shape.center(), before);
        assert_eq!(shape.current.width, 250.0);
        assert_eq!(shape.current.height, 210.0);
    }

    #[test]
    fn resets_position_and_size_independently() {
        let mut shape = eye();
        shape.move_by(25.0, -5.0);
        shape.grow(0.0, -100.0);

        shape.reset_size();
        assert_eq!(shape.current.height, 240.0);
        assert_ne!(shape.current.x, shape.rest().x);

        shape.reset_position();
        assert!(shape.is_at_rest());
    }

    #[test]
    fn rest_survives_mutation() {
        let mut shape = eye();
        shape.grow(40.0, 40.0);
        shape.move_by(-300.0, 0.0);
        assert_eq!(shape.rest(), Rect::new(100.0, 50.0, 240.0, 240.0));
        shape.reset();
        assert_eq!(shape.current, shape.rest());
    }
}
