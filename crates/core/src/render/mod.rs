use crate::{config::Color, expression::DrawCommand, shape::Rect, EyesError, Result};

/// Rendering backend abstraction. Window creation, the actual drawing and
/// frame pacing live behind this trait; the core only hands it primitives.
pub trait Renderer {
    fn fill_background(&mut self, color: Color) -> Result<()>;

    fn draw_rounded_rect(&mut self, rect: Rect, color: Color, radius: f32) -> Result<()>;

    fn draw_circle(&mut self, center: (f32, f32), radius: f32, color: Color) -> Result<()>;

    fn draw_polygon(&mut self, points: &[(f32, f32)], color: Color) -> Result<()>;

    fn present_frame(&mut self) -> Result<()>;

    /// Monotonic clock in milliseconds.
    fn now_millis(&self) -> u64;

    /// Waits out the remainder of the current frame at `hz` frames per second.
    fn tick_at(&mut self, hz: u32);

    /// Draws a whole recipe in order.
    fn submit(&mut self, commands: &[DrawCommand]) -> Result<()> {
        for command in commands {
            match command {
                DrawCommand::RoundedRect {
                    rect,
                    color,
                    radius,
                } => self.draw_rounded_rect(*rect, *color, *radius)?,
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                } => self.draw_circle(*center, *radius, *color)?,
                DrawCommand::Polygon { points, color } => self.draw_polygon(points, *color)?,
            }
        }
        Ok(())
    }
}

/// One presented frame as seen by [`RecordingRenderer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedFrame {
    pub background: Option<Color>,
    pub commands: Vec<DrawCommand>,
}

/// In-memory backend with a manual clock. Every `tick_at` advances the clock
/// by one frame, so a driver loop runs deterministically without a window.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: Vec<RecordedFrame>,
    pending: RecordedFrame,
    clock_ms: u64,
    fail_at_frame: Option<usize>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(clock_ms: u64) -> Self {
        Self {
            clock_ms,
            ..Self::default()
        }
    }

    /// Makes `present_frame` fail once `frame` frames have been presented.
    pub fn failing_at(mut self, frame: usize) -> Self {
        self.fail_at_frame = Some(frame);
        self
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }
}

impl Renderer for RecordingRenderer {
    fn fill_background(&mut self, color: Color) -> Result<()> {
        self.pending.background = Some(color);
        Ok(())
    }

    fn draw_rounded_rect(&mut self, rect: Rect, color: Color, radius: f32) -> Result<()> {
        self.pending.commands.push(DrawCommand::RoundedRect {
            rect,
            color,
            radius,
        });
        Ok(())
    }

    fn draw_circle(&mut self, center: (f32, f32), radius: f32, color: Color) -> Result<()> {
        self.pending.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
        Ok(())
    }

    fn draw_polygon(&mut self, points: &[(f32, f32)], color: Color) -> Result<()> {
        self.pending.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
        Ok(())
    }

    fn present_frame(&mut self) -> Result<()> {
        if self.fail_at_frame == Some(self.frames.len()) {
            return Err(EyesError::render("display surface lost"));
        }
        self.frames.push(std::mem::take(&mut self.pending));
        Ok(())
    }

    fn now_millis(&self) -> u64 {
        self.clock_ms
    }

    fn tick_at(&mut self, hz: u32) {
        self.clock_ms += 1000 / u64::from(hz.max(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_dispatches_every_primitive() {
        let mut renderer = RecordingRenderer::new();
        let commands = vec![
            DrawCommand::RoundedRect {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                color: Color::BLACK,
                radius: 3.0,
            },
            DrawCommand::Circle {
                center: (5.0, 5.0),
                radius: 2.0,
                color: Color::WHITE,
            },
            DrawCommand::Polygon {
                points: vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)],
                color: Color::YELLOW,
            },
        ];
        renderer.fill_background(Color::WHITE).unwrap();
        renderer.submit(&commands).unwrap();
        renderer.present_frame().unwrap();

        let frame = renderer.last_frame().unwrap();
        assert_eq!(frame.background, Some(Color::WHITE));
        assert_eq!(frame.commands, commands);
    }

    #[test]
    fn tick_advances_clock_by_one_frame() {
        let mut renderer = RecordingRenderer::starting_at(100);
        renderer.tick_at(60);
        assert_eq!(renderer.now_millis(), 116);
        renderer.tick_at(50);
        assert_eq!(renderer.now_millis(), 136);
    }

    #[test]
    fn scripted_failure_on_present() {
        let mut renderer = RecordingRenderer::new().failing_at(1);
        assert!(renderer.present_frame().is_ok());
        let err = renderer.present_frame().unwrap_err();
        assert!(matches!(err, EyesError::Render(_)));
    }
}
