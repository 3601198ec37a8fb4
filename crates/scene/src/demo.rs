use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arena::ArenaConfig;
use crate::error::SceneError;
use crate::rig::MultiCameraRig;

/// The four demos the applications can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Demo {
    /// Six scissored bands on one surface.
    #[default]
    Stacked,
    /// Fifty bands copied into dedicated canvases.
    CopyOut,
    /// Fifty bands, switchable between the two modes.
    Toggle,
    /// One scene seen by six cameras in a 2x3 grid.
    Grid,
}

impl Demo {
    pub const ALL: [Demo; 4] = [Demo::Stacked, Demo::CopyOut, Demo::Toggle, Demo::Grid];

    pub fn name(self) -> &'static str {
        match self {
            Demo::Stacked => "stacked",
            Demo::CopyOut => "copy-out",
            Demo::Toggle => "toggle",
            Demo::Grid => "grid",
        }
    }

    /// Arena preset for the stacked demos; `None` for the grid.
    pub fn arena_config(self) -> Option<ArenaConfig> {
        match self {
            Demo::Stacked => Some(ArenaConfig::stacked()),
            Demo::CopyOut => Some(ArenaConfig::copy_out()),
            Demo::Toggle => Some(ArenaConfig::toggle()),
            Demo::Grid => None,
        }
    }

    /// The copy-out and toggle demos only redraw on resize and mode switches.
    pub fn animates_by_default(self) -> bool {
        matches!(self, Demo::Stacked | Demo::Grid)
    }
}

impl fmt::Display for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Demo {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Demo::ALL
            .into_iter()
            .find(|demo| demo.name() == s)
            .ok_or_else(|| SceneError::UnknownDemo(s.to_string()))
    }
}

/// Settings shared by the desktop app and the CLI. Every field has a
/// default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub demo: Demo,
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    /// `None` keeps the demo's own default.
    pub animate: Option<bool>,
    pub grid_rows: usize,
    pub grid_cols: usize,
    /// Clear color of even bands, `0xRRGGBB`.
    pub even_color: u32,
    /// Clear color of odd bands.
    pub odd_color: u32,
    /// Single clear color of the grid demo.
    pub grid_color: u32,
    /// Overrides the demo's arena preset.
    pub arena: Option<ArenaConfig>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            demo: Demo::default(),
            seed: 42,
            width: 1280,
            height: 720,
            animate: None,
            grid_rows: 2,
            grid_cols: 3,
            even_color: 0xc0c0c0,
            odd_color: 0xe0e0e0,
            grid_color: 0xe0e0e0,
            arena: None,
        }
    }
}

impl DemoConfig {
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        serde_json::from_str(text).map_err(|e| SceneError::InvalidConfig(e.to_string()))
    }

    pub fn animate(&self) -> bool {
        self.animate.unwrap_or_else(|| self.demo.animates_by_default())
    }

    /// The arena to generate: the explicit override, else the demo preset.
    pub fn arena_config(&self) -> Option<ArenaConfig> {
        self.arena.or_else(|| self.demo.arena_config())
    }

    /// Cameras the grid demo needs, one per cell.
    pub fn grid_camera_count(&self) -> Result<usize, SceneError> {
        let count = self.grid_rows.saturating_mul(self.grid_cols);
        if count > MultiCameraRig::MAX_CAMERAS {
            return Err(SceneError::InvalidConfig(format!(
                "grid of {}x{} cells needs more than {} cameras",
                self.grid_rows,
                self.grid_cols,
                MultiCameraRig::MAX_CAMERAS
            )));
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for demo in Demo::ALL {
            assert_eq!(demo.name().parse::<Demo>().unwrap(), demo);
        }
        assert!(matches!(
            "spiral".parse::<Demo>(),
            Err(SceneError::UnknownDemo(name)) if name == "spiral"
        ));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DemoConfig::from_json(r#"{ "demo": "copy-out", "seed": 7 }"#).unwrap();
        assert_eq!(config.demo, Demo::CopyOut);
        assert_eq!(config.seed, 7);
        assert_eq!(config.width, 1280);
        assert_eq!(config.odd_color, 0xe0e0e0);
        assert_eq!(config.arena_config(), Some(ArenaConfig::copy_out()));
    }

    #[test]
    fn malformed_json_is_an_invalid_config() {
        assert!(matches!(
            DemoConfig::from_json("{ demo: "),
            Err(SceneError::InvalidConfig(_))
        ));
    }

    #[test]
    fn copy_out_and_toggle_are_still_unless_asked() {
        for demo in [Demo::CopyOut, Demo::Toggle] {
            let mut config = DemoConfig {
                demo,
                ..DemoConfig::default()
            };
            assert!(!config.animate(), "{demo} animates by default");
            config.animate = Some(true);
            assert!(config.animate());
        }
        assert!(DemoConfig::default().animate());
        assert!(Demo::Grid.animates_by_default());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let config = DemoConfig {
            demo: Demo::Grid,
            grid_rows: usize::MAX,
            grid_cols: usize::MAX,
            ..DemoConfig::default()
        };
        assert!(matches!(
            config.grid_camera_count(),
            Err(SceneError::InvalidConfig(_))
        ));
        assert_eq!(DemoConfig::default().grid_camera_count(), Ok(6));
    }

    #[test]
    fn grid_has_no_arena() {
        assert_eq!(Demo::Grid.arena_config(), None);
    }
}
