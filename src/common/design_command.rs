//! Keyword interpretation of typed design commands.
//!
//! This is deliberately literal: a command is lower-cased and scanned for
//! known keywords with plain substring checks. There is no tokenizer and no
//! grammar, so "redesign" matches "red". Both the design studio and the
//! backend `process-command` route use it.

use serde::{Deserialize, Serialize};

pub const DEFAULT_COLOR: &str = "gray";
pub const DEFAULT_MATERIAL: &str = "plastic";
pub const DEFAULT_FINISH: &str = "matte";

pub const SCALE_STEP: f64 = 0.1;
pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 2.0;

/// Checked in order; the first hit wins.
const COLORS: &[(&str, &str)] = &[
    ("red", "#e53935"),
    ("blue", "#1e88e5"),
    ("green", "#43a047"),
    ("yellow", "#fdd835"),
    ("orange", "#fb8c00"),
    ("purple", "#8e24aa"),
    ("pink", "#d81b60"),
    ("black", "#212121"),
    ("white", "#fafafa"),
    ("brown", "#6d4c41"),
    ("gray", "#9e9e9e"),
    ("grey", "#9e9e9e"),
];

const MATERIALS: &[&str] = &["wood", "metal", "plastic", "glass"];
const FINISHES: &[&str] = &["glossy", "matte"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignState {
    pub color: String,
    pub material: String,
    pub finish: String,
    pub scale: f64,
}

impl Default for DesignState {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            material: DEFAULT_MATERIAL.to_string(),
            finish: DEFAULT_FINISH.to_string(),
            scale: 1.0,
        }
    }
}

impl DesignState {
    pub fn color_hex(&self) -> &'static str {
        color_hex(&self.color).unwrap_or("#9e9e9e")
    }

    pub fn apply(&mut self, adjustment: &DesignAdjustment) {
        match adjustment {
            DesignAdjustment::Color(color) => self.color = color.clone(),
            DesignAdjustment::Material(material) => self.material = material.clone(),
            DesignAdjustment::Finish(finish) => self.finish = finish.clone(),
            DesignAdjustment::Resize(delta) => {
                let scaled = (self.scale + delta).clamp(MIN_SCALE, MAX_SCALE);
                // keep one decimal so repeated steps don't drift
                self.scale = (scaled * 10.0).round() / 10.0;
            }
        }
    }

    pub fn apply_all(&mut self, adjustments: &[DesignAdjustment]) {
        for adjustment in adjustments {
            self.apply(adjustment);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DesignAdjustment {
    Color(String),
    Material(String),
    Finish(String),
    Resize(f64),
}

impl DesignAdjustment {
    pub fn describe(&self) -> String {
        match self {
            DesignAdjustment::Color(c) => format!("Changed color to {}", c),
            DesignAdjustment::Material(m) => format!("Changed material to {}", m),
            DesignAdjustment::Finish(f) => format!("Applied {} finish", f),
            DesignAdjustment::Resize(d) if *d > 0.0 => "Made the design larger".to_string(),
            DesignAdjustment::Resize(_) => "Made the design smaller".to_string(),
        }
    }
}

pub fn color_hex(name: &str) -> Option<&'static str> {
    COLORS.iter().find(|(n, _)| *n == name).map(|(_, hex)| *hex)
}

/// Scan a command for known keywords. At most one adjustment per kind.
pub fn interpret(command: &str) -> Vec<DesignAdjustment> {
    let text = command.to_lowercase();
    let mut adjustments = Vec::new();

    if let Some((color, _)) = COLORS.iter().find(|(name, _)| text.contains(name)) {
        let color = if *color == "grey" { "gray" } else { color };
        adjustments.push(DesignAdjustment::Color(color.to_string()));
    }
    if let Some(material) = MATERIALS.iter().find(|m| text.contains(*m)) {
        adjustments.push(DesignAdjustment::Material(material.to_string()));
    }
    if let Some(finish) = FINISHES.iter().find(|f| text.contains(*f)) {
        adjustments.push(DesignAdjustment::Finish(finish.to_string()));
    }
    if text.contains("larger") || text.contains("bigger") {
        adjustments.push(DesignAdjustment::Resize(SCALE_STEP));
    } else if text.contains("smaller") {
        adjustments.push(DesignAdjustment::Resize(-SCALE_STEP));
    }

    adjustments
}

/// Human readable reply for a set of adjustments.
pub fn describe(adjustments: &[DesignAdjustment]) -> String {
    if adjustments.is_empty() {
        return "Sorry, I didn't understand that. Try a color (\"make it red\"), a material (\"wood\", \"metal\"), \"glossy\", or \"larger\"/\"smaller\".".to_string();
    }
    let parts: Vec<String> = adjustments.iter().map(DesignAdjustment::describe).collect();
    format!("{}.", parts.join(". "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_up_color_material_and_finish() {
        let adj = interpret("Make it RED with a glossy Metal body");
        assert_eq!(
            adj,
            vec![
                DesignAdjustment::Color("red".into()),
                DesignAdjustment::Material("metal".into()),
                DesignAdjustment::Finish("glossy".into()),
            ]
        );
    }

    #[test]
    fn matching_is_plain_substring() {
        assert_eq!(interpret("redesign the handle"), vec![DesignAdjustment::Color("red".into())]);
        assert!(interpret("rotate it a bit").is_empty());
    }

    #[test]
    fn grey_is_normalized() {
        assert_eq!(interpret("grey please"), vec![DesignAdjustment::Color("gray".into())]);
    }

    #[test]
    fn resize_is_clamped() {
        let mut state = DesignState::default();
        for _ in 0..20 {
            state.apply_all(&interpret("larger"));
        }
        assert_eq!(state.scale, MAX_SCALE);
        for _ in 0..30 {
            state.apply_all(&interpret("smaller"));
        }
        assert_eq!(state.scale, MIN_SCALE);
    }

    #[test]
    fn describe_unknown_command() {
        assert!(describe(&[]).starts_with("Sorry"));
        let text = describe(&interpret("wood, larger"));
        assert_eq!(text, "Changed material to wood. Made the design larger.");
    }

    #[test]
    fn color_hex_lookup() {
        let state = DesignState { color: "blue".into(), ..DesignState::default() };
        assert_eq!(state.color_hex(), "#1e88e5");
        assert_eq!(color_hex("teal"), None);
    }
}
