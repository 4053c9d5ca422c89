use std::path::Path;

use glonax_core::LinkDimensions;
use serde::de::DeserializeOwned;

#[derive(Debug)]
pub enum Error {
    /// Configuration file could not be read.
    Io(std::io::Error),
    /// Configuration file is malformed.
    Parse(toml::de::Error),
    /// Arm dimension out of range.
    InvalidDimension(glonax_core::InvalidDimension),
    /// Configuration value out of range.
    InvalidValue(&'static str),
    /// Key name is not known.
    UnknownKey(String),
    /// Key is bound to more than one action.
    DuplicateKey(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "failed to read configuration: {}", e),
            Error::Parse(e) => write!(f, "failed to parse configuration: {}", e),
            Error::InvalidDimension(e) => write!(f, "{}", e),
            Error::InvalidValue(name) => write!(f, "configuration value '{}' out of range", name),
            Error::UnknownKey(key) => write!(f, "unknown key '{}'", key),
            Error::DuplicateKey(key) => write!(f, "key '{}' is bound more than once", key),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Parse(e) => Some(e),
            Error::InvalidDimension(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Error::Parse(value)
    }
}

impl From<glonax_core::InvalidDimension> for Error {
    fn from(value: glonax_core::InvalidDimension) -> Self {
        Error::InvalidDimension(value)
    }
}

/// Read a configuration from a TOML file.
pub fn from_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, Error> {
    let contents = std::fs::read_to_string(path)?;

    Ok(toml::from_str(&contents)?)
}

#[derive(Clone, Debug, PartialEq, serde_derive::Deserialize)]
#[serde(default)]
pub struct ArmConfig {
    /// Link dimensions.
    #[serde(flatten)]
    pub dimensions: LinkDimensions,
    /// Rotation speed, a key press rotates a joint by ten times this value in degrees.
    pub rotation_speed: f32,
    /// Distance the target descends per frame.
    pub descent_step: f32,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            dimensions: LinkDimensions::default(),
            rotation_speed: 0.3,
            descent_step: 0.005,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde_derive::Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Initial target position.
    pub position: [f32; 3],
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.05, 1.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde_derive::Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Frames per second.
    pub frame_rate: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_rate: crate::consts::DEFAULT_FRAME_RATE,
        }
    }
}

impl RuntimeConfig {
    /// Interval between two frames.
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

/// Key bindings by key name.
#[derive(Clone, Debug, PartialEq, Eq, serde_derive::Deserialize)]
#[serde(default)]
pub struct KeymapConfig {
    pub slew_increase: String,
    pub slew_decrease: String,
    pub boom_increase: String,
    pub boom_decrease: String,
    pub arm_increase: String,
    pub arm_decrease: String,
    pub descent: String,
    pub capture: String,
    pub exit: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            slew_increase: "U".to_string(),
            slew_decrease: "J".to_string(),
            boom_increase: "K".to_string(),
            boom_decrease: "I".to_string(),
            arm_increase: "L".to_string(),
            arm_decrease: "O".to_string(),
            descent: "G".to_string(),
            capture: "SPACE".to_string(),
            exit: "ESC".to_string(),
        }
    }
}

/// Simulator configuration.
#[derive(Clone, Debug, Default, PartialEq, serde_derive::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Arm configuration.
    pub arm: ArmConfig,
    /// Target configuration.
    pub target: TargetConfig,
    /// Runtime configuration.
    pub runtime: RuntimeConfig,
    /// Key bindings.
    pub keymap: KeymapConfig,
}

impl Config {
    /// Validate the configuration.
    ///
    /// Configuration errors are fatal and must be caught before the
    /// runtime starts.
    pub fn validate(&self) -> Result<(), Error> {
        self.arm.dimensions.validate()?;

        if !self.arm.rotation_speed.is_finite() {
            return Err(Error::InvalidValue("arm.rotation_speed"));
        }
        if !self.arm.descent_step.is_finite() || self.arm.descent_step < 0.0 {
            return Err(Error::InvalidValue("arm.descent_step"));
        }
        if self.target.position.iter().any(|v| !v.is_finite())
            || self.target.position[1] < self.arm.dimensions.target_floor()
        {
            return Err(Error::InvalidValue("target.position"));
        }
        if self.runtime.frame_rate == 0 {
            return Err(Error::InvalidValue("runtime.frame_rate"));
        }

        crate::input::Keymap::try_from(&self.keymap)?;

        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dimensions = &self.arm.dimensions;

        write!(
            f,
            "Links: {:?}; Base: {:.2}; Hinge: {:.2}; Tolerance: {:.2}; Rotation speed: {:.2}; Frame rate: {}",
            dimensions.link_lengths,
            dimensions.base_height,
            dimensions.hinge_radius,
            dimensions.tolerance,
            self.arm.rotation_speed,
            self.runtime.frame_rate
        )
    }
}
