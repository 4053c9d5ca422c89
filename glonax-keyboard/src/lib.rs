use std::path::{Path, PathBuf};

use tokio::{fs::File, io::AsyncReadExt};

pub mod keys;

/// Synchronization event.
const EV_SYN: u16 = 0x00;
/// Key or button state change.
const EV_KEY: u16 = 0x01;

/// Key transition reported by the kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyState {
    /// Key released.
    Released,
    /// Key pressed.
    Pressed,
    /// Key held down, auto repeat.
    Repeat,
}

impl TryFrom<i32> for KeyState {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(KeyState::Released),
            1 => Ok(KeyState::Pressed),
            2 => Ok(KeyState::Repeat),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventType {
    /// End of an event batch.
    Sync,
    /// Key state change.
    Key(u16, KeyState),
    /// Any other event class, not handled by this driver.
    Other(u16),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    /// Event timestamp in microseconds.
    pub time: u64,
    /// Event type.
    pub ty: EventType,
}

impl Event {
    /// Decode an event from a raw kernel `input_event`.
    ///
    /// The buffer must hold at least one full `input_event`.
    pub fn decode(buffer: &[u8]) -> Option<Self> {
        if buffer.len() < std::mem::size_of::<libc::input_event>() {
            return None;
        }

        let event: libc::input_event =
            unsafe { std::ptr::read_unaligned(buffer.as_ptr() as *const libc::input_event) };

        let time = (event.time.tv_sec as u64) * 1_000_000 + event.time.tv_usec as u64;

        let ty = match event.type_ {
            EV_SYN => EventType::Sync,
            EV_KEY => match KeyState::try_from(event.value) {
                Ok(state) => EventType::Key(event.code, state),
                Err(_) => EventType::Other(event.type_),
            },
            other => EventType::Other(other),
        };

        Some(Self { time, ty })
    }
}

/// Keyboard driver on top of a Linux event device.
pub struct Keyboard {
    reader: tokio::io::BufReader<File>,
    node_path: PathBuf,
}

impl Keyboard {
    /// Construct new keyboard driver.
    pub async fn new(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            reader: tokio::io::BufReader::with_capacity(
                16 * std::mem::size_of::<libc::input_event>(),
                File::open(path).await?,
            ),
            node_path: path.to_path_buf(),
        })
    }

    /// Device node of this keyboard.
    #[inline]
    pub fn node_path(&self) -> &Path {
        &self.node_path
    }

    /// Return the next event from the keyboard.
    pub async fn next_event(&mut self) -> std::io::Result<Event> {
        let mut buf = [0; std::mem::size_of::<libc::input_event>()];

        self.reader.read_exact(&mut buf).await?;

        Event::decode(&buf).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, "short input event")
        })
    }

    /// Return the next key transition, skipping all other events.
    pub async fn next_key(&mut self) -> std::io::Result<(u16, KeyState)> {
        loop {
            if let EventType::Key(code, state) = self.next_event().await?.ty {
                break Ok((code, state));
            }
        }
    }
}

/// Discover keyboard device nodes on the host.
///
/// Returns the event device nodes udev tags as keyboard.
pub fn discover() -> std::io::Result<Vec<PathBuf>> {
    let mut enumerator = udev::Enumerator::new()?;

    enumerator.match_is_initialized()?;
    enumerator.match_subsystem("input")?;
    enumerator.match_property("ID_INPUT_KEYBOARD", "1")?;

    let mut nodes: Vec<PathBuf> = enumerator
        .scan_devices()?
        .filter_map(|device| device.devnode().map(Path::to_path_buf))
        .filter(|node| {
            node.file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.starts_with("event"))
        })
        .collect();

    nodes.sort();

    log::trace!("Discovered {} keyboard node(s)", nodes.len());

    Ok(nodes)
}
