//! Core library for the Monkey Eyes animation display.
//!
//! A pair of stylised eyes idles, blinks, glances sideways, laughs, smiles,
//! shows star eyes and concentrates. The crate holds the geometry model
//! ([`Shape`], [`ExpressionPair`]), the expression state machine
//! ([`AnimationController`]) and the thin driver loop that feeds it commands
//! and hands the resulting draw recipe to a [`Renderer`]. Windowing and the
//! actual pixels stay behind the renderer trait.

pub mod animation;
pub mod command;
pub mod config;
pub mod driver;
pub mod error;
pub mod expression;
pub mod render;
pub mod shape;
pub mod timeline;

pub use animation::{AnimationController, AnimationState};
pub use command::{channel, Command, CommandReceiver, CommandSender};
pub use config::{AnimationConfig, AppConfig, Color, DisplayConfig};
pub use driver::{EyesApp, RunSummary};
pub use error::{EyesError, Result};
pub use expression::{DrawCommand, Expression, ExpressionPair};
pub use render::{RecordedFrame, RecordingRenderer, Renderer};
pub use shape::{Rect, Shape};
pub use timeline::{ScheduledCommand, Script, ScriptPlayer};
