use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// A command string due at a fixed offset from the start of playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledCommand {
    pub at_ms: u64,
    pub command: String,
}

impl ScheduledCommand {
    pub fn new(at_ms: u64, command: impl Into<String>) -> Self {
        Self {
            at_ms,
            command: command.into(),
        }
    }
}

/// Ordered list of scheduled commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub events: Vec<ScheduledCommand>,
}

impl Script {
    pub fn new(mut events: Vec<ScheduledCommand>) -> Self {
        events.sort_by_key(|event| event.at_ms);
        Self { events }
    }

    /// Walks through every expression once and quits.
    pub fn demo() -> Self {
        Self::new(vec![
            ScheduledCommand::new(2_000, "smile:2000"),
            ScheduledCommand::new(5_000, "laugh"),
            ScheduledCommand::new(8_000, "star:3000"),
            ScheduledCommand::new(12_000, "concentrate:indefinite"),
            ScheduledCommand::new(16_000, "stop_concentrate"),
            ScheduledCommand::new(20_000, "quit"),
        ])
    }

    /// Loads a JSON script: `{ "events": [{ "at_ms": 0, "command": "laugh" }] }`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let script: Script = serde_json::from_str(&raw)?;
        Ok(Self::new(script.events))
    }
}

/// Replays a [`Script`] against elapsed playback time.
#[derive(Debug, Default)]
pub struct ScriptPlayer {
    script: Script,
    next_event: usize,
}

impl ScriptPlayer {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            next_event: 0,
        }
    }

    /// Returns every command whose time has come since the previous call.
    pub fn due(&mut self, elapsed_ms: u64) -> Vec<String> {
        let mut due = Vec::new();
        while let Some(event) = self.script.events.get(self.next_event) {
            if elapsed_ms < event.at_ms {
                break;
            }
            due.push(event.command.clone());
            self.next_event += 1;
        }
        due
    }

    pub fn is_finished(&self) -> bool {
        self.next_event >= self.script.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_sorted_on_construction() {
        let script = Script::new(vec![
            ScheduledCommand::new(500, "laugh"),
            ScheduledCommand::new(100, "smile"),
        ]);
        assert_eq!(script.events[0].command, "smile");
    }

    #[test]
    fn player_releases_each_event_once() {
        let mut player = ScriptPlayer::new(Script::new(vec![
            ScheduledCommand::new(0, "smile"),
            ScheduledCommand::new(100, "laugh"),
            ScheduledCommand::new(100, "star"),
        ]));
        assert_eq!(player.due(0), vec!["smile"]);
        assert!(player.due(99).is_empty());
        assert_eq!(player.due(150), vec!["laugh", "star"]);
        assert!(player.due(1_000).is_empty());
        assert!(player.is_finished());
    }

    #[test]
    fn demo_ends_with_quit() {
        let demo = Script::demo();
        assert_eq!(demo.events.last().map(|e| e.command.as_str()), Some("quit"));
    }

    #[test]
    fn parses_json_script() {
        let script: Script = serde_json::from_str(
            r#"{ "events": [ { "at_ms": 10, "command": "laugh" } ] }"#,
        )
        .unwrap();
        assert_eq!(script.events, vec![ScheduledCommand::new(10, "laugh")]);
    }
}
