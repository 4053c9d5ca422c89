// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

//! The `glonax` library provides the runtime for the articulated arm simulator.
//!
//! The `controller` module owns the simulation state and applies the capture
//! and descent policy on each tick. Key events arrive through the `input`
//! module, either from a keyboard or from a script, and each tick is handed
//! to a `render` sink. The `runtime` module drives the frame loop.

pub mod config;
pub mod controller;
pub mod input;
pub mod render;
pub mod runtime;

pub use self::config::{from_file, Config};
pub use self::controller::{CaptureState, Controller};
pub use self::runtime::Runtime;

pub use glonax_core as core;

/// Glonax runtime module containing various constants.
pub mod consts {
    /// Glonax runtime version.
    ///
    /// # Example
    ///
    /// ```
    /// use glonax::consts::VERSION;
    ///
    /// println!("Glonax runtime version: {}", VERSION);
    /// ```
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Glonax default configuration file.
    pub const DEFAULT_CONFIG_PATH: &str = "/etc/glonax/arm.toml";

    /// Glonax default queue size for input events.
    ///
    /// # Remarks
    ///
    /// Input sources block when the queue is full, events are never dropped.
    pub const QUEUE_SIZE_INPUT: usize = 32;

    /// Glonax default frame rate in frames per second.
    pub const DEFAULT_FRAME_RATE: u32 = 60;
}
