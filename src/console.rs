//! Line-oriented stand-in for the widget toolkit.
//!
//! Commands typed on a terminal become [`ViewerEvent`]s, and the widget
//! state the controller writes is kept in [`ConsoleSurface`] for `status`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::{error, info};

use crate::controller::ViewerEvent;
use crate::enums::{ColorChoice, ColorTarget, Control, Label, Orientation, ParseEnumError, SlotId};
use crate::interaction::InteractionSurface;

pub const HELP: &str = "\
commands:
  load <1|2> <directory>
  slice <axial|coronal|sagittal> <index>
  opacity <1|2> <0-100>
  color <1|2> <grayscale|hot|bone|rainbow>
  slice-color <1|2> <grayscale|hot|bone|rainbow>
  status
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(ViewerEvent),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("`{0}` expects {1} argument(s)")]
    Arity(String, usize),

    #[error("{0}")]
    Argument(#[from] ParseEnumError),

    #[error("`{0}` is not an integer")]
    Integer(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map(|(name, rest)| (name, rest.trim()))
            .unwrap_or((line, ""));
        let args: Vec<&str> = rest.split_whitespace().collect();

        let expect = |count: usize| {
            if args.len() == count {
                Ok(())
            } else {
                Err(ParseCommandError::Arity(name.to_owned(), count))
            }
        };
        let integer = |s: &str| {
            s.parse::<i32>()
                .map_err(|_| ParseCommandError::Integer(s.to_owned()))
        };

        let event = match name {
            "" => return Err(ParseCommandError::Empty),
            "status" => return Ok(Command::Status),
            "help" => return Ok(Command::Help),
            "quit" | "exit" => return Ok(Command::Quit),
            "load" => {
                // the directory is the rest of the line so it may contain spaces
                let (slot, directory) = rest
                    .split_once(char::is_whitespace)
                    .map(|(slot, dir)| (slot, dir.trim()))
                    .unwrap_or((rest, ""));
                if slot.is_empty() {
                    return Err(ParseCommandError::Arity("load".into(), 2));
                }
                ViewerEvent::LoadRequested {
                    slot: slot.parse()?,
                    directory: PathBuf::from(directory),
                }
            }
            "slice" => {
                expect(2)?;
                ViewerEvent::SliceChanged {
                    plane: args[0].parse::<Orientation>()?,
                    value: integer(args[1])?,
                }
            }
            "opacity" => {
                expect(2)?;
                ViewerEvent::OpacityChanged {
                    slot: args[0].parse()?,
                    value: integer(args[1])?,
                }
            }
            "color" => {
                expect(2)?;
                ViewerEvent::ColorChoiceChanged {
                    slot: args[0].parse()?,
                    choice: args[1].parse()?,
                }
            }
            "slice-color" => {
                expect(2)?;
                ViewerEvent::SliceColorChoiceChanged {
                    slot: args[0].parse()?,
                    choice: args[1].parse()?,
                }
            }
            other => return Err(ParseCommandError::UnknownCommand(other.to_owned())),
        };
        Ok(Command::Event(event))
    }
}

/// Widget state mirrored from the controller's setter calls.
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    ranges: BTreeMap<String, (i32, i32)>,
    values: BTreeMap<String, i32>,
    labels: BTreeMap<String, String>,
    names: BTreeMap<String, String>,
    colors: BTreeMap<String, ColorChoice>,
    messages: Vec<String>,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slider_value(&self, control: Control) -> Option<i32> {
        self.values.get(&control_key(control)).copied()
    }

    pub fn slider_range(&self, control: Control) -> Option<(i32, i32)> {
        self.ranges.get(&control_key(control)).copied()
    }

    pub fn label(&self, label: Label) -> Option<&str> {
        self.labels.get(&label_key(label)).map(String::as_str)
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

fn control_key(control: Control) -> String {
    match control {
        Control::Slice(plane) => format!("{plane} slider"),
        Control::Opacity(slot) => format!("{slot} opacity"),
    }
}

fn label_key(label: Label) -> String {
    match label {
        Label::SliceIndex(plane) => format!("{plane} slice"),
        Label::Opacity(slot) => format!("{slot} opacity"),
    }
}

impl InteractionSurface for ConsoleSurface {
    fn set_slider_range(&mut self, control: Control, min: i32, max: i32) {
        self.ranges.insert(control_key(control), (min, max));
    }

    fn set_slider_value(&mut self, control: Control, value: i32) {
        self.values.insert(control_key(control), value);
    }

    fn set_label_text(&mut self, label: Label, text: &str) {
        info!("{}: {text}", label_key(label));
        self.labels.insert(label_key(label), text.to_owned());
    }

    fn set_display_name(&mut self, slot: SlotId, text: &str) {
        info!("{slot}: {text}");
        self.names.insert(slot.to_string(), text.to_owned());
    }

    fn set_color_choice(&mut self, slot: SlotId, target: ColorTarget, choice: ColorChoice) {
        let key = match target {
            ColorTarget::Slices => format!("{slot} slice colour"),
            ColorTarget::Volume => format!("{slot} volume colour"),
        };
        self.colors.insert(key, choice);
    }

    fn show_message(&mut self, text: &str) {
        error!("{text}");
        self.messages.push(text.to_owned());
    }
}

impl fmt::Display for ConsoleSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (slot, name) in &self.names {
            writeln!(f, "{slot}: {name}")?;
        }
        for (control, value) in &self.values {
            match self.ranges.get(control) {
                Some((min, max)) => writeln!(f, "{control}: {value} in [{min}, {max}]")?,
                None => writeln!(f, "{control}: {value}")?,
            }
        }
        for (target, choice) in &self.colors {
            writeln!(f, "{target}: {choice}")?;
        }
        Ok(())
    }
}
