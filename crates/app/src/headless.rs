use std::time::{Duration, Instant};

use monkey_eyes_core::{Color, Rect, Renderer, Result};

/// Window-less backend: counts primitives per frame, reports them at trace
/// level and paces frames with the real clock.
pub struct TraceRenderer {
    started: Instant,
    frame_started: Instant,
    primitives: usize,
    frames: u64,
}

impl TraceRenderer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            frame_started: now,
            primitives: 0,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for TraceRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TraceRenderer {
    fn fill_background(&mut self, _color: Color) -> Result<()> {
        self.primitives = 0;
        Ok(())
    }

    fn draw_rounded_rect(&mut self, rect: Rect, _color: Color, _radius: f32) -> Result<()> {
        tracing::trace!(x = rect.x, y = rect.y, w = rect.width, h = rect.height, "rect");
        self.primitives += 1;
        Ok(())
    }

    fn draw_circle(&mut self, center: (f32, f32), radius: f32, _color: Color) -> Result<()> {
        tracing::trace!(cx = center.0, cy = center.1, radius, "circle");
        self.primitives += 1;
        Ok(())
    }

    fn draw_polygon(&mut self, points: &[(f32, f32)], _color: Color) -> Result<()> {
        tracing::trace!(points = points.len(), "polygon");
        self.primitives += 1;
        Ok(())
    }

    fn present_frame(&mut self) -> Result<()> {
        self.frames += 1;
        tracing::trace!(frame = self.frames, primitives = self.primitives, "present");
        Ok(())
    }

    fn now_millis(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn tick_at(&mut self, hz: u32) {
        let frame = Duration::from_secs_f64(1.0 / f64::from(hz.max(1)));
        if let Some(remaining) = frame.checked_sub(self.frame_started.elapsed()) {
            std::thread::sleep(remaining);
        }
        self.frame_started = Instant::now();
    }
}
