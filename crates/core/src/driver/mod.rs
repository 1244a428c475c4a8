//! The render loop: drain commands, advance the controller, draw, pace.

use crate::{
    animation::{AnimationController, AnimationState},
    command::{Command, CommandReceiver},
    config::{AppConfig, Color},
    expression::ExpressionPair,
    render::Renderer,
    timeline::{Script, ScriptPlayer},
    Result,
};

/// What a finished run looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub final_state: AnimationState,
}

pub struct EyesApp<R: Renderer> {
    controller: AnimationController,
    renderer: R,
    commands: CommandReceiver,
    script: Option<ScriptPlayer>,
    backdrop: Color,
    tick_hz: u32,
    started_at: Option<u64>,
    ticks: u64,
    tick_limit: Option<u64>,
    running: bool,
}

impl<R: Renderer> EyesApp<R> {
    pub fn new(config: &AppConfig, renderer: R, commands: CommandReceiver) -> Self {
        let eyes = ExpressionPair::from_display(&config.display);
        let controller =
            AnimationController::new(eyes, config.animation.clone(), config.display.tick_hz);
        Self {
            controller,
            renderer,
            commands,
            script: None,
            backdrop: config.display.backdrop,
            tick_hz: config.display.tick_hz,
            started_at: None,
            ticks: 0,
            tick_limit: None,
            running: true,
        }
    }

    pub fn with_script(mut self, script: Script) -> Self {
        self.script = Some(ScriptPlayer::new(script));
        self
    }

    /// Stops the loop after `ticks` ticks even without a `quit` command.
    pub fn with_tick_limit(mut self, ticks: u64) -> Self {
        self.tick_limit = Some(ticks);
        self
    }

    pub fn controller(&self) -> &AnimationController {
        &self.controller
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Runs until `quit`, the tick limit, or a renderer failure. Renderer
    /// failures are fatal and returned to the caller.
    pub fn run(&mut self) -> Result<RunSummary> {
        tracing::info!(tick_hz = self.tick_hz, "render loop started");
        while self.running {
            if let Err(err) = self.step() {
                tracing::error!(error = %err, ticks = self.ticks, "render loop aborted");
                self.running = false;
                return Err(err);
            }
        }
        let summary = RunSummary {
            ticks: self.ticks,
            final_state: self.controller.state(),
        };
        tracing::info!(ticks = summary.ticks, "render loop stopped");
        Ok(summary)
    }

    /// Runs a single tick. A `quit` seen during the tick lets the tick finish
    /// and then clears [`is_running`](Self::is_running).
    pub fn step(&mut self) -> Result<()> {
        let now = self.renderer.now_millis();
        let started_at = match self.started_at {
            Some(at) => at,
            None => {
                self.controller.start(now);
                self.started_at = Some(now);
                now
            }
        };

        let mut incoming = self.commands.drain();
        if let Some(player) = self.script.as_mut() {
            incoming.extend(player.due(now.saturating_sub(started_at)));
        }
        for raw in incoming {
            if !self.dispatch(&raw) {
                break;
            }
        }

        self.controller.update(now);

        self.renderer.fill_background(self.backdrop)?;
        let recipe = self
            .controller
            .eyes()
            .recipe(self.controller.expression());
        self.renderer.submit(&recipe)?;
        self.renderer.present_frame()?;
        tracing::trace!(
            tick = self.ticks,
            state = self.controller.state().as_str(),
            primitives = recipe.len(),
            "frame"
        );

        self.ticks += 1;
        if self.tick_limit.is_some_and(|limit| self.ticks >= limit) {
            self.running = false;
        }
        self.renderer.tick_at(self.tick_hz);
        Ok(())
    }

    /// Returns false once a quit has been seen; later commands in the same
    /// batch are dropped.
    fn dispatch(&mut self, raw: &str) -> bool {
        match Command::parse_input(raw) {
            Ok(Command::Quit) => {
                tracing::info!("quit requested");
                self.running = false;
                false
            }
            Ok(command) => {
                self.controller.apply(command);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring command");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{command, render::RecordingRenderer, timeline::ScheduledCommand};

    fn app() -> (EyesApp<RecordingRenderer>, command::CommandSender) {
        let mut config = AppConfig::default();
        config.animation.seed = Some(5);
        let (tx, rx) = command::channel();
        (EyesApp::new(&config, RecordingRenderer::new(), rx), tx)
    }

    #[test]
    fn quit_finishes_current_tick() {
        let (mut app, tx) = app();
        tx.trigger_laugh().unwrap();
        tx.quit().unwrap();
        tx.trigger_smile(None).unwrap();

        let summary = app.run().unwrap();
        assert_eq!(summary.ticks, 1);
        assert_eq!(summary.final_state, AnimationState::Laughing);
        assert_eq!(app.renderer().frames().len(), 1);
    }

    #[test]
    fn malformed_commands_are_ignored() {
        let (mut app, tx) = app();
        tx.send_raw("flibber").unwrap();
        tx.send_raw("smile:later").unwrap();
        app.step().unwrap();
        assert_eq!(app.controller().state(), AnimationState::Idle);
        assert!(app.is_running());
    }

    #[test]
    fn draws_recipe_for_current_state() {
        let (mut app, tx) = app();
        app.step().unwrap();
        let idle = app.renderer().last_frame().unwrap().clone();
        assert_eq!(idle.background, Some(Color::WHITE));
        assert_eq!(idle.commands.len(), 2);

        tx.trigger_star(Some(1000)).unwrap();
        app.step().unwrap();
        let star = app.renderer().last_frame().unwrap();
        assert!(matches!(
            star.commands[0],
            crate::expression::DrawCommand::Polygon { .. }
        ));
    }

    #[test]
    fn tick_limit_stops_loop() {
        let (app, _tx) = app();
        let mut app = app.with_tick_limit(10);
        let summary = app.run().unwrap();
        assert_eq!(summary.ticks, 10);
    }

    #[test]
    fn renderer_failure_is_fatal() {
        let mut config = AppConfig::default();
        config.animation.seed = Some(5);
        let (_tx, rx) = command::channel();
        let mut app = EyesApp::new(&config, RecordingRenderer::new().failing_at(3), rx);
        assert!(app.run().is_err());
        assert!(!app.is_running());
        assert_eq!(app.ticks(), 3);
    }

    #[test]
    fn script_fires_on_schedule() {
        let (app, _tx) = app();
        let mut app = app.with_script(Script::new(vec![
            ScheduledCommand::new(100, "smile:5000"),
            ScheduledCommand::new(400, "quit"),
        ]));

        while app.controller().state() == AnimationState::Idle {
            app.step().unwrap();
            assert!(app.ticks() < 20);
        }
        assert_eq!(app.controller().state(), AnimationState::Smiling);
        // 16 ms ticks: the eighth tick is the first at or past 100 ms
        assert_eq!(app.ticks(), 8);

        let summary = app.run().unwrap();
        assert_eq!(summary.final_state, AnimationState::Smiling);
    }

    fn app_at(clock_ms: u64) -> (EyesApp<RecordingRenderer>, command::CommandSender) {
        let mut config = AppConfig::default();
        config.animation.seed = Some(5);
        let (tx, rx) = command::channel();
        (
            EyesApp::new(&config, RecordingRenderer::starting_at(clock_ms), rx),
            tx,
        )
    }

    #[test]
    fn max_smile_duration_holds_without_overflow() {
        let (mut app, tx) = app_at(5_000);
        tx.send_raw(format!("smile:{}", u64::MAX)).unwrap();
        for _ in 0..30 {
            app.step().unwrap();
            assert_eq!(app.controller().state(), AnimationState::Smiling);
        }
    }

    #[test]
    fn max_concentrate_duration_holds_without_overflow() {
        let (mut app, tx) = app_at(5_000);
        tx.send_raw(format!("concentrate:{}", u64::MAX)).unwrap();
        for _ in 0..60 {
            app.step().unwrap();
            assert_eq!(app.controller().state(), AnimationState::Concentrating);
        }
        assert!(!app.controller().is_concentrate_indefinite());
    }
}
