use std::{collections::VecDeque, path::Path, time::Duration};

use glonax_core::{
    input::{ButtonState, Direction, Scancode},
    Joint,
};
use glonax_keyboard::{keys, KeyState, Keyboard};
use tokio::sync::mpsc;

use crate::config::KeymapConfig;

#[derive(Debug)]
pub enum Error {
    /// Input device failed.
    Io(std::io::Error),
    /// Script file is malformed.
    Script(serde_json::Error),
    /// Key name is not known.
    UnknownKey(String),
    /// Input source has no more events.
    EndOfInput,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "input device error: {}", e),
            Error::Script(e) => write!(f, "invalid script: {}", e),
            Error::UnknownKey(key) => write!(f, "unknown key '{}'", key),
            Error::EndOfInput => write!(f, "end of input"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Script(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Script(value)
    }
}

/// Action bound to a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Binding {
    Rotate(Joint, Direction),
    Descent,
    Capture,
    Exit,
}

impl Binding {
    fn scancode(self, state: ButtonState) -> Scancode {
        match self {
            Binding::Rotate(joint, direction) => Scancode::Rotate(joint, direction, state),
            Binding::Descent => Scancode::Descent(state),
            Binding::Capture => Scancode::Capture(state),
            Binding::Exit => Scancode::Exit(state),
        }
    }
}

/// Maps raw key codes to scancodes.
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: Vec<(u16, Binding)>,
}

impl Keymap {
    /// Map a key transition to a scancode.
    ///
    /// Keys without a binding yield no scancode.
    pub fn map(&self, code: u16, state: ButtonState) -> Option<Scancode> {
        let scancode = self
            .bindings
            .iter()
            .find(|(key, _)| *key == code)
            .map(|(_, binding)| binding.scancode(state));

        if scancode.is_none() {
            log::trace!("Key {} not mapped", keys::name(code).unwrap_or("?"));
        }

        scancode
    }

    /// Map a named key transition to a scancode.
    pub fn map_name(&self, name: &str, state: ButtonState) -> Result<Option<Scancode>, Error> {
        let code = keys::code(name).ok_or_else(|| Error::UnknownKey(name.to_string()))?;

        Ok(self.map(code, state))
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            bindings: vec![
                (keys::KEY_U, Binding::Rotate(Joint::Slew, Direction::Increase)),
                (keys::KEY_J, Binding::Rotate(Joint::Slew, Direction::Decrease)),
                (keys::KEY_K, Binding::Rotate(Joint::Boom, Direction::Increase)),
                (keys::KEY_I, Binding::Rotate(Joint::Boom, Direction::Decrease)),
                (keys::KEY_L, Binding::Rotate(Joint::Arm, Direction::Increase)),
                (keys::KEY_O, Binding::Rotate(Joint::Arm, Direction::Decrease)),
                (keys::KEY_G, Binding::Descent),
                (keys::KEY_SPACE, Binding::Capture),
                (keys::KEY_ESC, Binding::Exit),
            ],
        }
    }
}

impl TryFrom<&KeymapConfig> for Keymap {
    type Error = crate::config::Error;

    fn try_from(config: &KeymapConfig) -> Result<Self, Self::Error> {
        let lookup = |name: &str| {
            keys::code(name).ok_or_else(|| crate::config::Error::UnknownKey(name.to_string()))
        };

        let bindings = [
            (
                &config.slew_increase,
                Binding::Rotate(Joint::Slew, Direction::Increase),
            ),
            (
                &config.slew_decrease,
                Binding::Rotate(Joint::Slew, Direction::Decrease),
            ),
            (
                &config.boom_increase,
                Binding::Rotate(Joint::Boom, Direction::Increase),
            ),
            (
                &config.boom_decrease,
                Binding::Rotate(Joint::Boom, Direction::Decrease),
            ),
            (
                &config.arm_increase,
                Binding::Rotate(Joint::Arm, Direction::Increase),
            ),
            (
                &config.arm_decrease,
                Binding::Rotate(Joint::Arm, Direction::Decrease),
            ),
            (&config.descent, Binding::Descent),
            (&config.capture, Binding::Capture),
            (&config.exit, Binding::Exit),
        ];

        let mut keymap = Keymap {
            bindings: Vec::with_capacity(bindings.len()),
        };

        for (name, binding) in bindings {
            let code = lookup(name)?;

            if keymap.bindings.iter().any(|(key, _)| *key == code) {
                return Err(crate::config::Error::DuplicateKey(name.to_string()));
            }

            keymap.bindings.push((code, binding));
        }

        Ok(keymap)
    }
}

/// Source of scancodes.
#[async_trait::async_trait]
pub trait InputDevice {
    /// Wait for the next scancode.
    ///
    /// Returns `Error::EndOfInput` when the source is exhausted.
    async fn next(&mut self) -> Result<Scancode, Error>;
}

/// Keyboard input device.
pub struct KeyboardInput {
    driver: Keyboard,
    keymap: Keymap,
}

impl KeyboardInput {
    pub async fn new(path: &Path, keymap: Keymap) -> Result<Self, Error> {
        Ok(Self {
            driver: Keyboard::new(path).await?,
            keymap,
        })
    }
}

#[async_trait::async_trait]
impl InputDevice for KeyboardInput {
    async fn next(&mut self) -> Result<Scancode, Error> {
        loop {
            match self.driver.next_key().await {
                Ok((code, state)) => {
                    let state = match state {
                        KeyState::Pressed => ButtonState::Pressed,
                        KeyState::Released => ButtonState::Released,
                        KeyState::Repeat => ButtonState::Repeat,
                    };

                    if let Some(scancode) = self.keymap.map(code, state) {
                        break Ok(scancode);
                    }
                }
                Err(e) => {
                    log::error!("Keyboard {}: {}", self.driver.node_path().display(), e);
                    break Err(e.into());
                }
            }
        }
    }
}

/// Scripted key event.
#[derive(Clone, Debug, PartialEq, Eq, serde_derive::Deserialize)]
pub struct ScriptEvent {
    /// Delay before the event in milliseconds.
    #[serde(default)]
    pub delay: u64,
    /// Key name.
    pub key: String,
    /// Key transition.
    pub action: ButtonState,
}

/// Input device playing back a script of key events.
pub struct ScriptInput {
    events: VecDeque<(Duration, Scancode)>,
}

impl ScriptInput {
    /// Construct script input from parsed events.
    ///
    /// Events on unbound keys are dropped, unknown key names are rejected.
    pub fn new(events: Vec<ScriptEvent>, keymap: &Keymap) -> Result<Self, Error> {
        let mut queue = VecDeque::with_capacity(events.len());

        for event in events {
            if let Some(scancode) = keymap.map_name(&event.key, event.action)? {
                queue.push_back((Duration::from_millis(event.delay), scancode));
            }
        }

        Ok(Self { events: queue })
    }

    /// Parse a script from a JSON string.
    pub fn parse(script: &str, keymap: &Keymap) -> Result<Self, Error> {
        Self::new(serde_json::from_str(script)?, keymap)
    }

    /// Read a script from a JSON file.
    pub fn from_file(path: &Path, keymap: &Keymap) -> Result<Self, Error> {
        Self::parse(&std::fs::read_to_string(path)?, keymap)
    }

    /// Number of remaining events.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[async_trait::async_trait]
impl InputDevice for ScriptInput {
    async fn next(&mut self) -> Result<Scancode, Error> {
        let (delay, scancode) = self.events.pop_front().ok_or(Error::EndOfInput)?;

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        Ok(scancode)
    }
}

/// Forward scancodes from an input device into the input queue.
///
/// Returns when the device is exhausted or fails, or when the queue is closed.
pub async fn forward<D: InputDevice + ?Sized>(device: &mut D, queue: mpsc::Sender<Scancode>) {
    loop {
        match device.next().await {
            Ok(scancode) => {
                if queue.send(scancode).await.is_err() {
                    log::debug!("Input queue closed");
                    break;
                }
            }
            Err(Error::EndOfInput) => {
                log::debug!("Input source exhausted");
                break;
            }
            Err(e) => {
                log::error!("Input source failed: {}", e);
                break;
            }
        }
    }
}
