//! Key bindings for polygon drawing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use eframe::egui;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    None,
    Ctrl,
    Alt,
    Shift,
    CtrlAlt,
    CtrlShift,
    AltShift,
}

impl Modifier {
    /// Exact match against egui's modifier state. `Ctrl` also accepts the
    /// command key so that bindings behave on macOS.
    pub fn matches(&self, m: &egui::Modifiers) -> bool {
        let ctrl = m.ctrl || m.command;
        let want = match self {
            Modifier::None => (false, false, false),
            Modifier::Ctrl => (true, false, false),
            Modifier::Alt => (false, true, false),
            Modifier::Shift => (false, false, true),
            Modifier::CtrlAlt => (true, true, false),
            Modifier::CtrlShift => (true, false, true),
            Modifier::AltShift => (false, true, true),
        };
        want == (ctrl, m.alt, m.shift)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Modifier::None => "",
            Modifier::Ctrl => "Ctrl",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
            Modifier::CtrlAlt => "Ctrl+Alt",
            Modifier::CtrlShift => "Ctrl+Shift",
            Modifier::AltShift => "Alt+Shift",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Modifier {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lowers: Vec<String> = s
            .split('+')
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .map(|p| if p == "control" { "ctrl".to_string() } else { p })
            .collect();
        lowers.sort();
        let refs: Vec<&str> = lowers.iter().map(String::as_str).collect();
        match refs.as_slice() {
            [] => Ok(Modifier::None),
            ["ctrl"] => Ok(Modifier::Ctrl),
            ["alt"] => Ok(Modifier::Alt),
            ["shift"] => Ok(Modifier::Shift),
            ["alt", "ctrl"] => Ok(Modifier::CtrlAlt),
            ["ctrl", "shift"] => Ok(Modifier::CtrlShift),
            ["alt", "shift"] => Ok(Modifier::AltShift),
            other => Err(format!("unknown modifier combo '{:?}'", other)),
        }
    }
}

/// A key plus modifier, e.g. `Escape` or `Ctrl+Enter`. The key is stored by
/// its egui name so that YAML stays readable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotkey {
    pub modifier: Modifier,
    pub key: String,
}

impl Hotkey {
    pub fn new(modifier: Modifier, key: &str) -> Self {
        Self {
            modifier,
            key: key.to_string(),
        }
    }

    pub fn egui_key(&self) -> Option<egui::Key> {
        egui::Key::from_name(&self.key)
    }

    /// Whether this hotkey was pressed during the current frame.
    pub fn pressed(&self, input: &egui::InputState) -> bool {
        match self.egui_key() {
            Some(key) => input.key_pressed(key) && self.modifier.matches(&input.modifiers),
            None => false,
        }
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifier == Modifier::None {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifier, self.key)
        }
    }
}

impl FromStr for Hotkey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty hotkey".to_string());
        }
        let (mods, key) = match s.rfind('+') {
            Some(pos) if pos + 1 < s.len() => (&s[..pos], s[pos + 1..].trim()),
            _ => ("", s),
        };
        if egui::Key::from_name(key).is_none() {
            return Err(format!("unknown key '{}'", key));
        }
        Ok(Hotkey {
            modifier: mods.parse()?,
            key: key.to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorKeys {
    /// Close the polygon under construction.
    pub finish: Hotkey,
    /// Discard the draft and start a new polygon.
    pub cancel: Hotkey,
    /// Held while dragging to move the whole draft.
    pub translate: Modifier,
    /// Held while dragging to move the nearest vertex.
    pub move_vertex: Modifier,
}

impl Default for SelectorKeys {
    fn default() -> Self {
        Self {
            finish: Hotkey::new(Modifier::None, "Enter"),
            cancel: Hotkey::new(Modifier::None, "Escape"),
            translate: Modifier::Shift,
            move_vertex: Modifier::Ctrl,
        }
    }
}

impl SelectorKeys {
    /// One-line usage hint shown under the plot.
    pub fn help_text(&self) -> String {
        format!(
            "Click to add vertices, click the first vertex or press {} to close. \
             {} starts a new polygon. Hold {} and drag to move the polygon, \
             {} and drag to move one vertex. Close the window when done.",
            self.finish, self.cancel, self.translate, self.move_vertex
        )
    }
}
