//! Expression state machine.
//!
//! [`AnimationController`] owns the [`ExpressionPair`] and is the only thing
//! that mutates it. Each call to [`AnimationController::update`] advances the
//! active state's geometry program by one tick. Step sizes are configured per
//! nominal tick and scaled by the wall-clock time that actually passed, so the
//! animation speed does not depend on the achieved frame rate.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    command::Command,
    config::AnimationConfig,
    expression::{Expression, ExpressionPair},
    shape::Shape,
};

/// Upper bound on the per-tick step multiplier. Keeps a stalled frame from
/// teleporting the eyes across the screen.
const MAX_STEP_SCALE: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    Idle,
    Blinking,
    Laughing,
    Smiling,
    Star,
    Concentrating,
    Moving,
}

impl AnimationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Blinking => "blinking",
            Self::Laughing => "laughing",
            Self::Smiling => "smiling",
            Self::Star => "star",
            Self::Concentrating => "concentrating",
            Self::Moving => "moving",
        }
    }
}

/// How long a concentrate squint is held once the floor is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hold {
    Until(u64),
    Indefinite,
    /// Cancelled by `stop_concentrate`; the deadline counts as passed.
    Released,
}

#[derive(Debug, Clone, Copy)]
struct Look {
    direction: f32,
    travelled: f32,
    moving_away: bool,
    paused_at: Option<u64>,
}

impl Default for Look {
    fn default() -> Self {
        Self {
            direction: 1.0,
            travelled: 0.0,
            moving_away: true,
            paused_at: None,
        }
    }
}

#[derive(Debug)]
pub struct AnimationController {
    eyes: ExpressionPair,
    config: AnimationConfig,
    frame_ms: f32,
    rng: StdRng,

    state: AnimationState,
    previous_state: AnimationState,
    state_entered_at: u64,
    now: u64,
    last_update: Option<u64>,
    step_scale: f32,

    // blink and concentrate share the shrink/grow direction
    shrinking: bool,
    last_blink_at: u64,
    blink_interval_ms: f32,

    laugh_up: bool,
    laugh_offset: f32,
    laugh_cycles: u32,

    smile_started_at: u64,
    smile_duration_ms: u64,

    star_started_at: u64,
    star_duration_ms: u64,
    star_growing: bool,
    star_scale: f32,

    hold: Hold,
    concentrate_duration_ms: u64,

    last_look_at: u64,
    look_interval_ms: f32,
    look: Look,
}

impl AnimationController {
    /// Creates a controller ticking at `tick_hz` nominal frames per second.
    pub fn new(eyes: ExpressionPair, config: AnimationConfig, tick_hz: u32) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let blink_interval_ms = draw_interval(&mut rng, config.blink_interval_ms);
        let look_interval_ms = draw_interval(&mut rng, config.look_interval_ms);
        let eyes = eyes.with_smile_offset(config.smile_offset);

        Self {
            eyes,
            frame_ms: frame_ms(tick_hz),
            rng,
            state: AnimationState::Idle,
            previous_state: AnimationState::Idle,
            state_entered_at: 0,
            now: 0,
            last_update: None,
            step_scale: 1.0,
            shrinking: true,
            last_blink_at: 0,
            blink_interval_ms,
            laugh_up: true,
            laugh_offset: 0.0,
            laugh_cycles: 0,
            smile_started_at: 0,
            smile_duration_ms: config.smile_duration_ms,
            star_started_at: 0,
            star_duration_ms: config.star_duration_ms,
            star_growing: true,
            star_scale: 0.0,
            hold: Hold::Until(0),
            concentrate_duration_ms: config.concentrate_duration_ms,
            last_look_at: 0,
            look_interval_ms,
            look: Look::default(),
            config,
        }
    }

    /// Anchors the clock and the idle timers at `now`. Called implicitly by
    /// the first [`update`](Self::update).
    pub fn start(&mut self, now: u64) {
        self.now = now;
        self.state_entered_at = now;
        self.last_update = Some(now);
        self.last_blink_at = now;
        self.last_look_at = now;
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn previous_state(&self) -> AnimationState {
        self.previous_state
    }

    pub fn state_entered_at(&self) -> u64 {
        self.state_entered_at
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn eyes(&self) -> &ExpressionPair {
        &self.eyes
    }

    pub fn laugh_offset(&self) -> f32 {
        self.laugh_offset
    }

    pub fn laugh_cycles(&self) -> u32 {
        self.laugh_cycles
    }

    pub fn star_scale(&self) -> f32 {
        self.star_scale
    }

    pub fn is_concentrate_indefinite(&self) -> bool {
        self.hold == Hold::Indefinite
    }

    /// Recipe parameters for the current frame.
    pub fn expression(&self) -> Expression {
        match self.state {
            AnimationState::Laughing => Expression::Laughing {
                offset: self.laugh_offset,
            },
            AnimationState::Smiling => Expression::Smiling,
            AnimationState::Star => Expression::Stars {
                scale: self.star_scale,
            },
            _ => Expression::Normal,
        }
    }

    /// Routes a parsed command to the matching trigger. `Quit` belongs to the
    /// driver and is ignored here.
    pub fn apply(&mut self, command: Command) {
        tracing::info!(%command, state = self.state.as_str(), "trigger");
        match command {
            Command::Laugh => self.trigger_laugh(),
            Command::Smile { duration_ms } => self.trigger_smile(duration_ms),
            Command::Star { duration_ms } => self.trigger_star(duration_ms),
            Command::Concentrate {
                duration_ms,
                indefinite,
            } => self.trigger_concentrate(duration_ms, indefinite),
            Command::StopConcentrate => self.stop_concentrate(),
            Command::Quit => {}
        }
    }

    /// Advances the active state by one tick.
    pub fn update(&mut self, now: u64) {
        let Some(previous) = self.last_update else {
            self.start(now);
            self.run_tick();
            return;
        };
        let elapsed = now.saturating_sub(previous) as f32;
        self.step_scale = (elapsed / self.frame_ms).clamp(0.0, MAX_STEP_SCALE);
        self.now = now;
        self.last_update = Some(now);
        self.run_tick();
    }

    fn run_tick(&mut self) {
        if self.state == AnimationState::Idle {
            self.schedule_idle();
        }

        match self.state {
            AnimationState::Idle => {}
            AnimationState::Blinking => self.animate_blink(),
            AnimationState::Laughing => self.animate_laugh(),
            AnimationState::Smiling => {
                if self.now.saturating_sub(self.smile_started_at) > self.smile_duration_ms {
                    self.set_state(AnimationState::Idle);
                }
            }
            AnimationState::Star => self.animate_star(),
            AnimationState::Concentrating => self.animate_concentrate(),
            AnimationState::Moving => self.animate_look(),
        }
    }

    fn schedule_idle(&mut self) {
        let since_blink = self.now.saturating_sub(self.last_blink_at) as f32;
        let since_look = self.now.saturating_sub(self.last_look_at) as f32;
        if since_blink > self.blink_interval_ms {
            self.trigger_blink();
        } else if self.config.idle_look && since_look > self.look_interval_ms {
            self.trigger_look();
        }
    }

    fn set_state(&mut self, next: AnimationState) {
        if next == self.state {
            return;
        }
        self.previous_state = self.state;
        self.state = next;
        self.state_entered_at = self.now;
        if self.previous_state != AnimationState::Idle {
            self.eyes.reset();
        }
        tracing::debug!(
            from = self.previous_state.as_str(),
            to = next.as_str(),
            at = self.now,
            "state transition"
        );
    }

    pub fn trigger_laugh(&mut self) {
        self.set_state(AnimationState::Laughing);
        self.laugh_up = true;
        self.laugh_cycles = 0;
        self.laugh_offset = 0.0;
    }

    pub fn trigger_smile(&mut self, duration_ms: Option<u64>) {
        self.set_state(AnimationState::Smiling);
        self.smile_started_at = self.now;
        self.smile_duration_ms = duration_ms.unwrap_or(self.config.smile_duration_ms);
    }

    pub fn trigger_star(&mut self, duration_ms: Option<u64>) {
        self.set_state(AnimationState::Star);
        self.star_started_at = self.now;
        self.star_growing = true;
        self.star_scale = 0.0;
        self.star_duration_ms = duration_ms.unwrap_or(self.config.star_duration_ms);
    }

    /// Starts a squint. With `indefinite` the squint holds until
    /// [`stop_concentrate`](Self::stop_concentrate); `duration_ms` is then
    /// ignored.
    pub fn trigger_concentrate(&mut self, duration_ms: Option<u64>, indefinite: bool) {
        self.set_state(AnimationState::Concentrating);
        self.shrinking = true;
        self.concentrate_duration_ms = match duration_ms {
            Some(ms) if !indefinite => ms,
            _ => self.config.concentrate_duration_ms,
        };
        self.hold = if indefinite {
            Hold::Indefinite
        } else {
            Hold::Until(self.now.saturating_add(self.concentrate_duration_ms))
        };
    }

    /// Ends a concentrate squint early. Observed on the next tick, which
    /// starts growing the eyes back; the grow-back always plays out.
    pub fn stop_concentrate(&mut self) {
        if self.state != AnimationState::Concentrating {
            tracing::debug!(state = self.state.as_str(), "stop_concentrate ignored");
            return;
        }
        self.hold = Hold::Released;
        self.shrinking = false;
    }

    /// Autonomous blink. Only acts from idle.
    pub fn trigger_blink(&mut self) {
        if self.state != AnimationState::Idle {
            return;
        }
        self.set_state(AnimationState::Blinking);
        self.shrinking = true;
        self.last_blink_at = self.now;
        self.blink_interval_ms = draw_interval(&mut self.rng, self.config.blink_interval_ms);
    }

    /// Autonomous sideways glance. Only acts from idle.
    pub fn trigger_look(&mut self) {
        if self.state != AnimationState::Idle {
            return;
        }
        self.set_state(AnimationState::Moving);
        self.look = Look {
            direction: if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 },
            ..Look::default()
        };
        self.last_look_at = self.now;
        self.look_interval_ms = draw_interval(&mut self.rng, self.config.look_interval_ms);
    }

    fn scaled(&self, step: f32) -> f32 {
        step * self.step_scale
    }

    fn animate_blink(&mut self) {
        let step = self.scaled(self.config.blink_speed);
        if self.shrinking {
            if shrink_both(&mut self.eyes, step, self.config.blink_floor) {
                self.shrinking = false;
            }
        } else if grow_both(&mut self.eyes, step) {
            self.set_state(AnimationState::Idle);
        }
    }

    fn animate_laugh(&mut self) {
        let step = self.scaled(self.config.laugh_speed);
        if self.laugh_up {
            self.laugh_offset = (self.laugh_offset + step).min(self.config.laugh_max_offset);
            if self.laugh_offset >= self.config.laugh_max_offset {
                self.laugh_up = false;
            }
        } else {
            self.laugh_offset = (self.laugh_offset - step).max(0.0);
            if self.laugh_offset <= 0.0 {
                self.laugh_up = true;
                self.laugh_cycles += 1;
                if self.laugh_cycles >= self.config.laugh_cycles {
                    self.set_state(AnimationState::Idle);
                }
            }
        }
    }

    fn animate_star(&mut self) {
        let elapsed = self.now.saturating_sub(self.star_started_at) as f32;
        if self.star_growing && elapsed >= self.star_duration_ms as f32 / 2.0 {
            self.star_growing = false;
        }

        let step = self.scaled(self.config.star_speed);
        if self.star_growing {
            self.star_scale = (self.star_scale + step).min(1.0);
        } else {
            self.star_scale = (self.star_scale - step).max(0.0);
            if self.star_scale <= 0.0 {
                self.set_state(AnimationState::Idle);
            }
        }
    }

    fn animate_concentrate(&mut self) {
        let step = self.scaled(self.config.blink_speed);
        if self.shrinking {
            if shrink_both(&mut self.eyes, step, self.config.concentrate_floor) {
                self.shrinking = false;
            }
            return;
        }

        let released = match self.hold {
            Hold::Until(deadline) => self.now > deadline,
            Hold::Indefinite => false,
            Hold::Released => true,
        };
        if released && grow_both(&mut self.eyes, step) {
            self.set_state(AnimationState::Idle);
        }
    }

    fn animate_look(&mut self) {
        if let Some(paused_at) = self.look.paused_at {
            if self.now.saturating_sub(paused_at) > self.config.look_pause_ms {
                self.look.paused_at = None;
            }
            return;
        }

        let speed = self.scaled(self.config.look_speed);
        let squint = self.scaled(self.config.look_squint);
        let direction = self.look.direction;
        let rest_height = self.eyes.left.rest().height;

        if self.look.moving_away {
            self.eyes.left.move_by(speed * direction, 0.0);
            self.eyes.right.move_by(speed * direction, 0.0);
            self.look.travelled += speed;

            if self.look.travelled < self.config.look_bulge_distance {
                let floor = rest_height - self.config.look_squint_depth;
                shrink_both(&mut self.eyes, squint, floor);
            } else {
                heal_height(&mut self.eyes.left, squint);
                heal_height(&mut self.eyes.right, squint);
                let bulge = self.scaled(self.config.look_bulge);
                self.leading_eye().grow(bulge, bulge);
            }

            if self.look.travelled >= self.config.look_max_distance {
                self.look.moving_away = false;
                self.look.paused_at = Some(self.now);
            }
            return;
        }

        let back = speed.min(self.look.travelled);
        self.eyes.left.move_by(-back * direction, 0.0);
        self.eyes.right.move_by(-back * direction, 0.0);
        self.look.travelled -= back;

        heal_height(&mut self.eyes.left, squint);
        heal_height(&mut self.eyes.right, squint);
        let unbulge = self.scaled(self.config.look_unbulge);
        let eye = self.leading_eye();
        let excess = (eye.current.width - eye.rest().width).max(0.0);
        let shrink = unbulge.min(excess);
        eye.grow(-shrink, -shrink);

        if self.look.travelled < speed.max(f32::EPSILON) {
            self.set_state(AnimationState::Idle);
        }
    }

    /// The eye on the side the glance points to.
    fn leading_eye(&mut self) -> &mut Shape {
        if self.look.direction > 0.0 {
            &mut self.eyes.right
        } else {
            &mut self.eyes.left
        }
    }
}

/// Nominal duration of one tick in milliseconds.
fn frame_ms(tick_hz: u32) -> f32 {
    1000.0 / tick_hz.max(1) as f32
}

fn draw_interval(rng: &mut StdRng, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Shrinks both eyes' height by `step`, never below `floor`. Returns true
/// once the left eye sits at or below the floor.
fn shrink_both(eyes: &mut ExpressionPair, step: f32, floor: f32) -> bool {
    for eye in [&mut eyes.left, &mut eyes.right] {
        let room = (eye.current.height - floor).max(0.0);
        eye.grow(0.0, -step.min(room));
    }
    eyes.left.current.height <= floor
}

/// Grows both eyes' height back toward rest by `step`. Returns true once the
/// left eye is back at rest height.
fn grow_both(eyes: &mut ExpressionPair, step: f32) -> bool {
    heal_height(&mut eyes.left, step);
    heal_height(&mut eyes.right, step);
    eyes.left.current.height >= eyes.left.rest().height
}

fn heal_height(eye: &mut Shape, step: f32) {
    let missing = (eye.rest().height - eye.current.height).max(0.0);
    eye.grow(0.0, step.min(missing));
}
