//! Runtime parameters read by the audio manager and scenes every frame.
//!
//! The inspection panel is described by a declarative schema instead of
//! reflecting over the struct: [`Config::schema`] lists every option with its
//! kind, bounds and default, and [`Config::set`] validates writes against it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, VizError};

/// Live runtime configuration shared by the frame loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Silences every playable source without stopping analysis.
    pub muted: bool,
    /// Average microphone volume that maps onto the top of every range.
    pub max_mic_volume: f32,
    /// Clamp normalised volume to `[0, 1]` before mapping.
    pub clamp_mapping: bool,
    /// Blend background colours channel by channel instead of interpolating
    /// the packed hex values.
    pub per_channel_background: bool,
    /// Initial vertical field of view of the shared camera, in degrees.
    pub fov: f32,
    /// Far plane of the shared camera.
    pub render_distance: f32,
    /// Word used by the navigation indicator ("Scene 2 of 7").
    pub indicator_label: String,
    /// Scene updates are paused while audio analysis continues.
    pub frozen: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            muted: true,
            max_mic_volume: 175.0,
            clamp_mapping: false,
            per_channel_background: false,
            fov: 75.0,
            render_distance: 1000.0,
            indicator_label: "Scene".to_string(),
            frozen: false,
        }
    }
}

/// Kind of widget and validation rule attached to an option.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionKind {
    Number { min: f64, max: f64 },
    Toggle,
    Text,
}

/// Dynamically typed option value used by the panel surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Toggle(bool),
    Number(f64),
    Text(String),
}

impl ConfigValue {
    fn kind_name(&self) -> &'static str {
        match self {
            ConfigValue::Toggle(_) => "toggle",
            ConfigValue::Number(_) => "number",
            ConfigValue::Text(_) => "text",
        }
    }
}

/// Declarative description of a single config option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub kind: OptionKind,
    pub default: ConfigValue,
    /// Options driven by dedicated controls stay out of the panel.
    pub in_panel: bool,
}

impl OptionSpec {
    /// Human readable label derived from the camel-case key.
    pub fn label(&self) -> String {
        camel_case_label(self.name)
    }
}

/// One row of the generated panel. Consecutive toggles share a row.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRow {
    pub options: Vec<OptionSpec>,
}

impl Config {
    /// Loads a configuration from a JSON file. Missing fields keep defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Ordered option schema consumed by the panel builder.
    pub fn schema() -> Vec<OptionSpec> {
        let defaults = Config::default();
        vec![
            OptionSpec {
                name: "muted",
                kind: OptionKind::Toggle,
                default: ConfigValue::Toggle(defaults.muted),
                in_panel: true,
            },
            OptionSpec {
                name: "clampMapping",
                kind: OptionKind::Toggle,
                default: ConfigValue::Toggle(defaults.clamp_mapping),
                in_panel: true,
            },
            OptionSpec {
                name: "perChannelBackground",
                kind: OptionKind::Toggle,
                default: ConfigValue::Toggle(defaults.per_channel_background),
                in_panel: true,
            },
            OptionSpec {
                name: "maxMicVolume",
                kind: OptionKind::Number {
                    min: 1.0,
                    max: 255.0,
                },
                default: ConfigValue::Number(defaults.max_mic_volume as f64),
                in_panel: true,
            },
            OptionSpec {
                name: "fov",
                kind: OptionKind::Number {
                    min: 1.0,
                    max: 179.0,
                },
                default: ConfigValue::Number(defaults.fov as f64),
                in_panel: true,
            },
            OptionSpec {
                name: "renderDistance",
                kind: OptionKind::Number {
                    min: 1.0,
                    max: 100_000.0,
                },
                default: ConfigValue::Number(defaults.render_distance as f64),
                in_panel: true,
            },
            OptionSpec {
                name: "indicatorLabel",
                kind: OptionKind::Text,
                default: ConfigValue::Text(defaults.indicator_label),
                in_panel: true,
            },
            OptionSpec {
                name: "frozen",
                kind: OptionKind::Toggle,
                default: ConfigValue::Toggle(defaults.frozen),
                in_panel: false,
            },
        ]
    }

    /// Groups the visible schema into panel rows.
    pub fn panel_rows() -> Vec<PanelRow> {
        let mut rows: Vec<PanelRow> = Vec::new();
        for spec in Self::schema().into_iter().filter(|spec| spec.in_panel) {
            let joins_previous = spec.kind == OptionKind::Toggle
                && rows
                    .last()
                    .and_then(|row| row.options.last())
                    .map(|last| last.kind == OptionKind::Toggle)
                    .unwrap_or(false);

            match rows.last_mut() {
                Some(row) if joins_previous => row.options.push(spec),
                _ => rows.push(PanelRow {
                    options: vec![spec],
                }),
            }
        }
        rows
    }

    /// Reads the current value of a named option.
    pub fn get(&self, name: &str) -> Option<ConfigValue> {
        let value = match name {
            "muted" => ConfigValue::Toggle(self.muted),
            "clampMapping" => ConfigValue::Toggle(self.clamp_mapping),
            "perChannelBackground" => ConfigValue::Toggle(self.per_channel_background),
            "maxMicVolume" => ConfigValue::Number(self.max_mic_volume as f64),
            "fov" => ConfigValue::Number(self.fov as f64),
            "renderDistance" => ConfigValue::Number(self.render_distance as f64),
            "indicatorLabel" => ConfigValue::Text(self.indicator_label.clone()),
            "frozen" => ConfigValue::Toggle(self.frozen),
            _ => return None,
        };
        Some(value)
    }

    /// Writes a named option after validating it against the schema.
    pub fn set(&mut self, name: &str, value: ConfigValue) -> Result<()> {
        let spec = Self::schema()
            .into_iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| VizError::UnknownOption(name.to_string()))?;

        match (spec.kind, value) {
            (OptionKind::Toggle, ConfigValue::Toggle(flag)) => match spec.name {
                "muted" => self.muted = flag,
                "clampMapping" => self.clamp_mapping = flag,
                "perChannelBackground" => self.per_channel_background = flag,
                _ => self.frozen = flag,
            },
            (OptionKind::Number { min, max }, ConfigValue::Number(number)) => {
                if !(min..=max).contains(&number) {
                    return Err(VizError::OptionRange {
                        name: spec.name,
                        value: number,
                        min,
                        max,
                    });
                }
                match spec.name {
                    "maxMicVolume" => self.max_mic_volume = number as f32,
                    "fov" => self.fov = number as f32,
                    _ => self.render_distance = number as f32,
                }
            }
            (OptionKind::Text, ConfigValue::Text(text)) => self.indicator_label = text,
            (_, _) => {
                return Err(VizError::OptionType {
                    name: spec.name,
                    expected: spec.default.kind_name(),
                })
            }
        }
        Ok(())
    }

    /// Flips the freeze flag and returns the new state.
    pub fn toggle_frozen(&mut self) -> bool {
        self.frozen = !self.frozen;
        self.frozen
    }

    fn validate(&self) -> Result<()> {
        for spec in Self::schema() {
            if let (OptionKind::Number { min, max }, Some(ConfigValue::Number(value))) =
                (spec.kind, self.get(spec.name))
            {
                if !(min..=max).contains(&value) {
                    return Err(VizError::OptionRange {
                        name: spec.name,
                        value,
                        min,
                        max,
                    });
                }
            }
        }
        Ok(())
    }
}

fn camel_case_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    for (index, ch) in key.chars().enumerate() {
        if index == 0 {
            label.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            label.push(' ');
            label.push(ch);
        } else {
            label.push(ch);
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_schema() {
        let config = Config::default();
        for spec in Config::schema() {
            assert_eq!(config.get(spec.name), Some(spec.default.clone()));
        }
    }

    #[test]
    fn labels_split_camel_case() {
        let spec = Config::schema()
            .into_iter()
            .find(|spec| spec.name == "maxMicVolume")
            .unwrap();
        assert_eq!(spec.label(), "Max Mic Volume");
    }

    #[test]
    fn consecutive_toggles_share_a_row() {
        let rows = Config::panel_rows();
        let names: Vec<Vec<&str>> = rows
            .iter()
            .map(|row| row.options.iter().map(|spec| spec.name).collect())
            .collect();

        assert_eq!(names[0], vec!["muted", "clampMapping", "perChannelBackground"]);
        assert!(names.iter().all(|row| !row.contains(&"frozen")));
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn set_validates_kind_and_range() {
        let mut config = Config::default();

        config.set("maxMicVolume", ConfigValue::Number(120.0)).unwrap();
        assert_eq!(config.max_mic_volume, 120.0);

        let err = config.set("maxMicVolume", ConfigValue::Number(0.0)).unwrap_err();
        assert!(matches!(err, VizError::OptionRange { .. }));

        let err = config.set("muted", ConfigValue::Number(1.0)).unwrap_err();
        assert!(matches!(err, VizError::OptionType { expected: "toggle", .. }));

        let err = config.set("volume", ConfigValue::Toggle(true)).unwrap_err();
        assert!(format!("{err}").contains("volume"));
    }

    #[test]
    fn loads_partial_json_with_defaults() {
        let config = Config::from_json_str(r#"{ "muted": false, "maxMicVolume": 90 }"#).unwrap();
        assert!(!config.muted);
        assert_eq!(config.max_mic_volume, 90.0);
        assert_eq!(config.fov, 75.0);
        assert!(!config.frozen);
        assert!(!config.per_channel_background);
    }

    #[test]
    fn background_blend_mode_is_settable() {
        let mut config = Config::from_json_str(r#"{ "perChannelBackground": true }"#).unwrap();
        assert!(config.per_channel_background);

        config.set("perChannelBackground", ConfigValue::Toggle(false)).unwrap();
        assert_eq!(config.get("perChannelBackground"), Some(ConfigValue::Toggle(false)));
    }

    #[test]
    fn rejects_out_of_range_json() {
        let err = Config::from_json_str(r#"{ "fov": 400 }"#).unwrap_err();
        assert!(matches!(err, VizError::OptionRange { name: "fov", .. }));
    }

    #[test]
    fn toggles_freeze() {
        let mut config = Config::default();
        assert!(config.toggle_frozen());
        assert!(!config.toggle_frozen());
    }
}
