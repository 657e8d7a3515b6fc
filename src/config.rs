//! Scene table: which frame sequences exist, where their controls appear and
//! where those controls lead.
//!
//! The built-in table describes the three forest scenes. A TOML file with the
//! same shape can replace it:
//!
//! ```toml
//! [[scenes]]
//! name = "Scene1"
//! route = "/forestVeda/Scene1"
//! prefix = "Scene1"
//!
//! [[scenes.controls]]
//! id = "next"
//! label = "Next Step"
//! zone = [160, 199]
//! fade_ms = 500
//! action = { kind = "navigate", target = "/forestVeda/Scene2" }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::FRAME_COUNT;
use crate::error::{SceneError, SceneResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperienceConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub asset_root: Option<PathBuf>,
    pub scenes: Vec<SceneConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    pub name: String,
    pub route: String,
    /// Frame folder prefix, `{prefix}_PC` / `{prefix}_MO`.
    pub prefix: String,
    #[serde(default = "default_frame_count")]
    pub frame_count: usize,
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Shortest time the loading screen stays up, even if frames load faster.
    #[serde(default)]
    pub min_loader_ms: u64,
    #[serde(default = "default_loader_fade_ms")]
    pub loader_fade_ms: u64,
    #[serde(default = "default_true")]
    pub particles: bool,
    #[serde(default)]
    pub controls: Vec<ControlConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlConfig {
    pub id: String,
    pub label: String,
    /// Inclusive frame range over which the control is shown.
    pub zone: [usize; 2],
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,
    /// Controls hidden at once while this one is shown.
    #[serde(default)]
    pub hides: Vec<String>,
    pub action: ControlAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlAction {
    Navigate { target: String },
    HoldToBegin,
}

fn default_title() -> String {
    "Forest Experience".to_string()
}

fn default_frame_count() -> usize {
    FRAME_COUNT
}

fn default_extension() -> String {
    "webp".to_string()
}

fn default_loader_fade_ms() -> u64 {
    800
}

fn default_fade_ms() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

impl ExperienceConfig {
    pub fn builtin() -> Self {
        let scene = |name: &str, controls: Vec<ControlConfig>| SceneConfig {
            name: name.to_string(),
            route: format!("/forestVeda/{name}"),
            prefix: name.to_string(),
            frame_count: FRAME_COUNT,
            extension: default_extension(),
            min_loader_ms: 0,
            loader_fade_ms: default_loader_fade_ms(),
            particles: true,
            controls,
        };

        let mut scene1 = scene(
            "Scene1",
            vec![ControlConfig {
                id: "next".to_string(),
                label: "Next Step".to_string(),
                zone: [160, FRAME_COUNT - 1],
                fade_ms: 500,
                hides: Vec::new(),
                action: ControlAction::Navigate {
                    target: "/forestVeda/Scene2".to_string(),
                },
            }],
        );
        scene1.loader_fade_ms = 500;

        let mut scene2 = scene(
            "Scene2",
            vec![
                ControlConfig {
                    id: "hold".to_string(),
                    label: "HOLD TO BEGIN".to_string(),
                    zone: [100, 130],
                    fade_ms: 300,
                    hides: vec!["next".to_string()],
                    action: ControlAction::HoldToBegin,
                },
                ControlConfig {
                    id: "next".to_string(),
                    label: "EVERY PRODUCT, A MOMENT OF CALM".to_string(),
                    zone: [170, 200],
                    fade_ms: 300,
                    hides: Vec::new(),
                    action: ControlAction::Navigate {
                        target: "/forestVeda/Scene3".to_string(),
                    },
                },
            ],
        );
        scene2.min_loader_ms = 3000;

        let mut scene3 = scene("Scene3", Vec::new());
        scene3.particles = false;

        Self {
            title: default_title(),
            asset_root: None,
            scenes: vec![scene1, scene2, scene3],
        }
    }

    pub fn from_toml_str(text: &str) -> SceneResult<Self> {
        let config: ExperienceConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> SceneResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn scene_index(&self, route: &str) -> Option<usize> {
        self.scenes
            .iter()
            .position(|s| s.route.eq_ignore_ascii_case(route))
    }

    pub fn validate(&self) -> SceneResult<()> {
        if self.scenes.is_empty() {
            return Err(SceneError::config("no scenes configured"));
        }

        let mut routes = HashSet::new();
        for scene in &self.scenes {
            if !routes.insert(scene.route.to_ascii_lowercase()) {
                return Err(SceneError::config(format!(
                    "route '{}' is used by more than one scene",
                    scene.route
                )));
            }
        }

        for scene in &self.scenes {
            scene.validate(self)?;
        }
        Ok(())
    }
}

impl SceneConfig {
    fn validate(&self, experience: &ExperienceConfig) -> SceneResult<()> {
        if self.frame_count == 0 {
            return Err(SceneError::config(format!("{}: frame_count must be >= 1", self.name)));
        }
        if !self.route.starts_with('/') {
            return Err(SceneError::config(format!(
                "{}: route '{}' must start with '/'",
                self.name, self.route
            )));
        }

        let mut ids = HashSet::new();
        let mut holds = 0;
        for control in &self.controls {
            if !ids.insert(control.id.as_str()) {
                return Err(SceneError::config(format!(
                    "{}: duplicate control id '{}'",
                    self.name, control.id
                )));
            }

            let [start, end] = control.zone;
            if start > end {
                return Err(SceneError::config(format!(
                    "{}: control '{}' zone [{start}, {end}] is reversed",
                    self.name, control.id
                )));
            }
            if start >= self.frame_count {
                return Err(SceneError::config(format!(
                    "{}: control '{}' zone starts past the last frame {}",
                    self.name,
                    control.id,
                    self.frame_count - 1
                )));
            }

            match &control.action {
                ControlAction::Navigate { target } => {
                    if target != "/" && experience.scene_index(target).is_none() {
                        return Err(SceneError::config(format!(
                            "{}: control '{}' targets unknown route '{target}'",
                            self.name, control.id
                        )));
                    }
                }
                ControlAction::HoldToBegin => holds += 1,
            }
        }

        if holds > 1 {
            return Err(SceneError::config(format!(
                "{}: at most one hold_to_begin control per scene",
                self.name
            )));
        }

        for control in &self.controls {
            if let Some(missing) = control.hides.iter().find(|id| !ids.contains(id.as_str())) {
                return Err(SceneError::config(format!(
                    "{}: control '{}' hides unknown control '{missing}'",
                    self.name, control.id
                )));
            }
        }
        Ok(())
    }

    pub fn has_breathing(&self) -> bool {
        self.controls
            .iter()
            .any(|c| c.action == ControlAction::HoldToBegin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        let config = ExperienceConfig::builtin();
        config.validate().unwrap();
        assert_eq!(config.scenes.len(), 3);
        assert_eq!(config.scenes[1].min_loader_ms, 3000);
        assert!(config.scenes[1].has_breathing());
        assert!(!config.scenes[2].particles);
    }

    #[test]
    fn scene_lookup_ignores_case() {
        let config = ExperienceConfig::builtin();
        assert_eq!(config.scene_index("/forestveda/scene2"), Some(1));
        assert_eq!(config.scene_index("/forestVeda/Scene9"), None);
    }

    #[test]
    fn toml_fills_defaults() {
        let config = ExperienceConfig::from_toml_str(
            r#"
            [[scenes]]
            name = "Intro"
            route = "/intro"
            prefix = "Intro"

            [[scenes.controls]]
            id = "begin"
            label = "Hold"
            zone = [10, 20]
            action = { kind = "hold_to_begin" }

            [[scenes.controls]]
            id = "home"
            label = "Back"
            zone = [150, 199]
            fade_ms = 500
            action = { kind = "navigate", target = "/" }
            "#,
        )
        .unwrap();

        let scene = &config.scenes[0];
        assert_eq!(config.title, "Forest Experience");
        assert_eq!(scene.frame_count, 200);
        assert_eq!(scene.extension, "webp");
        assert!(scene.particles);
        assert_eq!(scene.controls[0].fade_ms, 300);
        assert_eq!(scene.controls[0].action, ControlAction::HoldToBegin);
        assert_eq!(
            scene.controls[1].action,
            ControlAction::Navigate { target: "/".to_string() }
        );
    }

    #[test]
    fn reversed_zone_is_rejected() {
        let err = ExperienceConfig::from_toml_str(
            r#"
            [[scenes]]
            name = "A"
            route = "/a"
            prefix = "A"

            [[scenes.controls]]
            id = "x"
            label = "x"
            zone = [50, 40]
            action = { kind = "hold_to_begin" }
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("reversed"), "{err}");
    }

    #[test]
    fn unknown_target_is_rejected() {
        let mut config = ExperienceConfig::builtin();
        config.scenes[0].controls[0].action = ControlAction::Navigate {
            target: "/nowhere".to_string(),
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown route"), "{err}");
    }

    #[test]
    fn unknown_hidden_control_is_rejected() {
        let mut config = ExperienceConfig::builtin();
        config.scenes[1].controls[0].hides = vec!["ghost".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_fields_fail_to_parse() {
        let err = ExperienceConfig::from_toml_str(
            r#"
            [[scenes]]
            name = "A"
            route = "/a"
            prefix = "A"
            colour = "green"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::Parse(_)));
    }
}
