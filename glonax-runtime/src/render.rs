use std::io::Write;

use glonax_core::{nalgebra::Point3, ArmPose, JointAngles};

use crate::controller::CaptureState;

/// Per tick snapshot handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Tick count.
    pub iteration: u64,
    /// Joint angles in degrees.
    pub angles: JointAngles,
    /// Target position.
    pub target: Point3<f32>,
    /// Target descent is enabled.
    pub descent_enabled: bool,
    /// Capture state of the tick.
    pub state: CaptureState,
    /// World pose of the arm.
    pub pose: ArmPose,
}

impl Frame {
    /// Frame as a JSON value.
    ///
    /// Segments are reported by their world location.
    pub fn to_json(&self) -> serde_json::Value {
        let segments: serde_json::Map<String, serde_json::Value> = self
            .pose
            .segments()
            .iter()
            .map(|(segment, transform)| {
                let location = transform.transform_point(&Point3::origin());
                (
                    format!("{:?}", segment).to_lowercase(),
                    serde_json::json!([location.x, location.y, location.z]),
                )
            })
            .collect();

        let effector = self.pose.effector();

        serde_json::json!({
            "iteration": self.iteration,
            "angles": self.angles.as_array(),
            "target": [self.target.x, self.target.y, self.target.z],
            "effector": [effector.x, effector.y, effector.z],
            "descent": self.descent_enabled,
            "state": self.state,
            "segments": segments,
        })
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let effector = self.pose.effector();

        write!(
            f,
            "#{} Angles: {}; Effector: ({:.3}, {:.3}, {:.3}); Target: ({:.3}, {:.3}, {:.3}); State: {}",
            self.iteration,
            self.angles,
            effector.x,
            effector.y,
            effector.z,
            self.target.x,
            self.target.y,
            self.target.z,
            self.state
        )
    }
}

/// Render sink.
pub trait Renderer {
    /// Render a single frame.
    fn render(&mut self, frame: &Frame) -> std::io::Result<()>;
}

/// Renderer writing frames to the log.
///
/// Every frame is logged at trace level, target movement and capture
/// state changes at debug level.
#[derive(Default)]
pub struct LogRenderer {
    last_target: Option<Point3<f32>>,
    last_state: Option<CaptureState>,
}

impl Renderer for LogRenderer {
    fn render(&mut self, frame: &Frame) -> std::io::Result<()> {
        log::trace!("{}", frame);

        if self.last_state != Some(frame.state) {
            log::debug!("State: {}", frame.state);
            self.last_state = Some(frame.state);
        }

        if self.last_target != Some(frame.target) {
            log::debug!(
                "Target: ({:.3}, {:.3}, {:.3})",
                frame.target.x,
                frame.target.y,
                frame.target.z
            );
            self.last_target = Some(frame.target);
        }

        Ok(())
    }
}

/// Renderer writing one JSON object per frame.
pub struct JsonRenderer<W: Write> {
    writer: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the renderer and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, frame: &Frame) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, &frame.to_json())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}
