//! Trigger commands and the hand-off queue that carries them to the render
//! loop.
//!
//! Commands travel as `verb[:arg]` strings so any producer (stdin, a script,
//! another thread) can speak the same small protocol. Parsing happens on the
//! render side, where bad input is logged and dropped.

use std::{fmt, str::FromStr};

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use serde::{Deserialize, Serialize};

use crate::{EyesError, Result};

/// A validated trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Laugh,
    Smile {
        duration_ms: Option<u64>,
    },
    Star {
        duration_ms: Option<u64>,
    },
    Concentrate {
        duration_ms: Option<u64>,
        indefinite: bool,
    },
    StopConcentrate,
    Quit,
}

impl Command {
    /// Single-key shortcuts for interactive use.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'l' => Some(Self::Laugh),
            's' => Some(Self::Smile { duration_ms: None }),
            't' => Some(Self::Star { duration_ms: None }),
            'c' => Some(Self::Concentrate {
                duration_ms: None,
                indefinite: false,
            }),
            'x' => Some(Self::StopConcentrate),
            'q' | '\u{1b}' => Some(Self::Quit),
            _ => None,
        }
    }

    /// Parses either a full command string or a single-key shortcut.
    pub fn parse_input(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let mut chars = trimmed.chars();
        if let (Some(key), None) = (chars.next(), chars.next()) {
            if let Some(command) = Self::from_key(key) {
                return Ok(command);
            }
        }
        trimmed.parse()
    }
}

fn parse_duration(input: &str, arg: Option<&str>) -> Result<Option<u64>> {
    match arg {
        None => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| EyesError::command(input, format!("`{raw}` is not a duration in ms"))),
    }
}

impl FromStr for Command {
    type Err = EyesError;

    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let (verb, arg) = match trimmed.split_once(':') {
            Some((verb, arg)) => (verb, Some(arg)),
            None => (trimmed, None),
        };

        let no_arg = |command: Command| match arg {
            None => Ok(command),
            Some(_) => Err(EyesError::command(input, format!("`{verb}` takes no argument"))),
        };

        match verb {
            "laugh" => no_arg(Self::Laugh),
            "stop_concentrate" => no_arg(Self::StopConcentrate),
            "quit" => no_arg(Self::Quit),
            "smile" => Ok(Self::Smile {
                duration_ms: parse_duration(input, arg)?,
            }),
            "star" => Ok(Self::Star {
                duration_ms: parse_duration(input, arg)?,
            }),
            "concentrate" if arg == Some("indefinite") => Ok(Self::Concentrate {
                duration_ms: None,
                indefinite: true,
            }),
            "concentrate" => Ok(Self::Concentrate {
                duration_ms: parse_duration(input, arg)?,
                indefinite: false,
            }),
            "" => Err(EyesError::command(input, "empty command")),
            _ => Err(EyesError::command(input, "unknown command")),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Laugh => f.write_str("laugh"),
            Self::Smile { duration_ms: None } => f.write_str("smile"),
            Self::Smile {
                duration_ms: Some(ms),
            } => write!(f, "smile:{ms}"),
            Self::Star { duration_ms: None } => f.write_str("star"),
            Self::Star {
                duration_ms: Some(ms),
            } => write!(f, "star:{ms}"),
            Self::Concentrate {
                indefinite: true, ..
            } => f.write_str("concentrate:indefinite"),
            Self::Concentrate {
                duration_ms: None, ..
            } => f.write_str("concentrate"),
            Self::Concentrate {
                duration_ms: Some(ms),
                ..
            } => write!(f, "concentrate:{ms}"),
            Self::StopConcentrate => f.write_str("stop_concentrate"),
            Self::Quit => f.write_str("quit"),
        }
    }
}

/// Creates a connected sender/receiver pair.
pub fn channel() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = unbounded();
    (CommandSender { tx }, CommandReceiver { rx })
}

/// Producer half. Cheap to clone and safe to move to other threads.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<String>,
}

impl CommandSender {
    /// Sends a raw command string. Validation happens on the receiving side.
    pub fn send_raw(&self, raw: impl Into<String>) -> Result<()> {
        let raw = raw.into();
        self.tx
            .send(raw)
            .map_err(|err| EyesError::msg(format!("render loop is gone, dropped `{}`", err.0)))
    }

    pub fn send(&self, command: Command) -> Result<()> {
        self.send_raw(command.to_string())
    }

    pub fn trigger_laugh(&self) -> Result<()> {
        self.send(Command::Laugh)
    }

    pub fn trigger_smile(&self, duration_ms: Option<u64>) -> Result<()> {
        self.send(Command::Smile { duration_ms })
    }

    pub fn trigger_star(&self, duration_ms: Option<u64>) -> Result<()> {
        self.send(Command::Star { duration_ms })
    }

    pub fn trigger_concentrate(&self, duration_ms: Option<u64>, indefinite: bool) -> Result<()> {
        self.send(Command::Concentrate {
            duration_ms,
            indefinite,
        })
    }

    pub fn stop_concentrate(&self) -> Result<()> {
        self.send(Command::StopConcentrate)
    }

    pub fn quit(&self) -> Result<()> {
        self.send(Command::Quit)
    }
}

/// Consumer half, owned by the render loop.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: Receiver<String>,
}

impl CommandReceiver {
    /// Takes every pending command string without blocking.
    pub fn drain(&self) -> Vec<String> {
        let mut pending = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(raw) => pending.push(raw),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_verb() {
        assert_eq!("laugh".parse::<Command>().unwrap(), Command::Laugh);
        assert_eq!(
            "smile:3000".parse::<Command>().unwrap(),
            Command::Smile {
                duration_ms: Some(3000)
            }
        );
        assert_eq!(
            "star".parse::<Command>().unwrap(),
            Command::Star { duration_ms: None }
        );
        assert_eq!(
            "concentrate:indefinite".parse::<Command>().unwrap(),
            Command::Concentrate {
                duration_ms: None,
                indefinite: true
            }
        );
        assert_eq!(
            "concentrate:1500".parse::<Command>().unwrap(),
            Command::Concentrate {
                duration_ms: Some(1500),
                indefinite: false
            }
        );
        assert_eq!(
            " stop_concentrate \n".parse::<Command>().unwrap(),
            Command::StopConcentrate
        );
        assert_eq!("quit".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn rejects_unknown_verb() {
        let err = "flibber".parse::<Command>().unwrap_err();
        assert!(matches!(err, EyesError::Command { .. }));
        assert!(format!("{err}").contains("flibber"));
    }

    #[test]
    fn rejects_non_numeric_duration() {
        assert!("smile:soon".parse::<Command>().is_err());
        assert!("star:-5".parse::<Command>().is_err());
        assert!("laugh:3".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn display_matches_wire_format() {
        for raw in [
            "laugh",
            "smile",
            "smile:250",
            "star:3000",
            "concentrate",
            "concentrate:900",
            "concentrate:indefinite",
            "stop_concentrate",
            "quit",
        ] {
            let command: Command = raw.parse().unwrap();
            assert_eq!(command.to_string(), raw);
        }
    }

    #[test]
    fn key_shortcuts() {
        assert_eq!(Command::parse_input("l").unwrap(), Command::Laugh);
        assert_eq!(Command::parse_input("T").unwrap(), Command::Star { duration_ms: None });
        assert_eq!(Command::parse_input("q\n").unwrap(), Command::Quit);
        assert!(Command::parse_input("z").is_err());
    }

    #[test]
    fn queue_drains_in_order_without_blocking() {
        let (tx, rx) = channel();
        assert!(rx.drain().is_empty());

        tx.trigger_smile(Some(500)).unwrap();
        tx.send_raw("flibber").unwrap();
        tx.trigger_concentrate(None, true).unwrap();

        assert_eq!(
            rx.drain(),
            vec!["smile:500", "flibber", "concentrate:indefinite"]
        );
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn sending_after_receiver_dropped_errors() {
        let (tx, rx) = channel();
        drop(rx);
        assert!(tx.trigger_laugh().is_err());
    }

    #[test]
    fn cloned_senders_feed_one_queue_across_threads() {
        let (tx, rx) = channel();
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let tx = tx.clone();
                std::thread::spawn(move || tx.trigger_laugh().unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(rx.drain(), vec!["laugh"; 3]);

        drop(tx);
        assert!(rx.drain().is_empty());
    }
}
