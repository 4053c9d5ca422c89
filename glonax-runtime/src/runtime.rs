use std::time::Duration;

use glonax_core::input::Scancode;
use tokio::sync::{broadcast, mpsc};

use crate::{
    config::Config,
    controller::Controller,
    input::{self, InputDevice},
    render::Renderer,
};

/// Runtime builder.
///
/// The runtime builder configures the frame loop based on the
/// configuration and the command line.
pub struct Builder {
    frame_interval: Duration,
    frame_limit: Option<u64>,
    stop_on_input_end: bool,
    shutdown_on_signal: bool,
}

impl Builder {
    /// Construct runtime builder from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            frame_interval: config.runtime.frame_interval(),
            frame_limit: None,
            stop_on_input_end: false,
            shutdown_on_signal: false,
        }
    }

    /// Stop after a number of frames.
    pub fn with_frame_limit(mut self, frame_limit: u64) -> Self {
        self.frame_limit = Some(frame_limit);
        self
    }

    /// Stop when all input sources are exhausted.
    pub fn with_stop_on_input_end(mut self) -> Self {
        self.stop_on_input_end = true;
        self
    }

    /// Shutdown on termination signal.
    pub fn with_shutdown(mut self) -> Self {
        self.shutdown_on_signal = true;
        self
    }

    /// Build the runtime.
    ///
    /// Must be called from within a tokio runtime when the shutdown
    /// signal is enabled.
    pub fn build(self) -> Runtime {
        let runtime = Runtime {
            input: mpsc::channel(crate::consts::QUEUE_SIZE_INPUT),
            shutdown: broadcast::channel(1),
            frame_interval: self.frame_interval,
            frame_limit: self.frame_limit,
            stop_on_input_end: self.stop_on_input_end,
        };

        if self.shutdown_on_signal {
            runtime.enable_term_shutdown();
        }

        runtime
    }
}

/// Frame loop runtime.
pub struct Runtime {
    /// Input queue.
    input: (mpsc::Sender<Scancode>, mpsc::Receiver<Scancode>),
    /// Runtime shutdown signal.
    shutdown: (broadcast::Sender<()>, broadcast::Receiver<()>),
    frame_interval: Duration,
    frame_limit: Option<u64>,
    stop_on_input_end: bool,
}

impl Runtime {
    /// Sender side of the input queue.
    pub fn input_sender(&self) -> mpsc::Sender<Scancode> {
        self.input.0.clone()
    }

    /// Listen for shutdown signal.
    pub fn shutdown_signal(&self) -> broadcast::Receiver<()> {
        self.shutdown.0.subscribe()
    }

    fn enable_term_shutdown(&self) {
        log::debug!("Enable signals shutdown");

        let shutdown = self.shutdown.0.clone();

        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for termination signal: {}", e);
                return;
            }

            log::info!("Termination requested");

            shutdown.send(()).ok();
        });
    }

    /// Spawn an input device in the background.
    ///
    /// The device feeds the input queue until it is exhausted or the
    /// runtime is shutdown.
    pub fn spawn_input_device<D>(&self, mut device: D)
    where
        D: InputDevice + Send + 'static,
    {
        let queue = self.input_sender();
        let mut shutdown = self.shutdown_signal();

        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.recv() => {
                    log::debug!("Shutting down input device");
                }
                _ = input::forward(&mut device, queue) => {}
            }
        });
    }

    /// Run the frame loop.
    ///
    /// Each frame drains the input queue, ticks the controller and renders
    /// the frame. Returns the number of frames rendered.
    pub async fn run<R: Renderer>(
        self,
        controller: &mut Controller,
        renderer: &mut R,
    ) -> std::io::Result<u64> {
        let Runtime {
            input: (input_tx, mut input_rx),
            shutdown: (shutdown_tx, _),
            frame_interval,
            frame_limit,
            stop_on_input_end,
        } = self;

        let mut shutdown = shutdown_tx.subscribe();

        // The queue closes once every input source is gone, unless the
        // runtime holds on to a sender.
        let _input_tx = (!stop_on_input_end).then_some(input_tx);

        let mut interval = tokio::time::interval(frame_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut frames = 0;

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.recv() => {
                    log::debug!("Runtime shutdown");
                    break;
                }
            }

            let mut input_closed = false;

            loop {
                match input_rx.try_recv() {
                    Ok(scancode) => controller.handle_key_event(scancode),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        input_closed = true;
                        break;
                    }
                }
            }

            if controller.is_shutdown_requested() {
                log::info!("Exit requested");
                break;
            }

            let tick_start = std::time::Instant::now();

            controller.tick();
            renderer.render(&controller.frame())?;

            let tick_duration = tick_start.elapsed();
            if tick_duration > frame_interval {
                log::warn!("Frame is delaying execution: {:?}", tick_duration);
            }

            frames += 1;

            if let Some(limit) = frame_limit {
                if frames >= limit {
                    log::debug!("Frame limit reached");
                    break;
                }
            }

            if input_closed {
                log::info!("Input ended");
                break;
            }
        }

        shutdown_tx.send(()).ok();

        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use glonax_core::{input::ButtonState, input::Direction, Joint};

    use super::*;
    use crate::{
        controller::CaptureState,
        input::{Keymap, ScriptInput},
        render::JsonRenderer,
    };

    fn config() -> Config {
        let mut config = Config::default();
        config.runtime.frame_rate = 1000;
        config
    }

    #[tokio::test]
    async fn test_frame_limit() {
        let config = config();
        let mut controller = Controller::from(&config);
        let mut renderer = JsonRenderer::new(Vec::new());

        let runtime = Builder::from_config(&config).with_frame_limit(5).build();

        let frames = runtime.run(&mut controller, &mut renderer).await.unwrap();

        assert_eq!(frames, 5);
        assert_eq!(controller.iteration(), 5);
        assert_eq!(String::from_utf8(renderer.into_inner()).unwrap().lines().count(), 5);
    }

    #[tokio::test]
    async fn test_queued_input() {
        let config = config();
        let mut controller = Controller::from(&config);
        let mut renderer = JsonRenderer::new(Vec::new());

        let runtime = Builder::from_config(&config).with_frame_limit(3).build();

        let queue = runtime.input_sender();
        for state in [ButtonState::Pressed, ButtonState::Repeat, ButtonState::Released] {
            queue
                .send(Scancode::Rotate(Joint::Boom, Direction::Increase, state))
                .await
                .unwrap();
        }
        queue.send(Scancode::Descent(ButtonState::Released)).await.unwrap();

        let frames = runtime.run(&mut controller, &mut renderer).await.unwrap();

        assert_eq!(frames, 3);
        assert!((controller.angles().get(Joint::Boom) - 3.0).abs() < 1e-6);
        assert!(controller.target().descent_enabled);
        assert_eq!(controller.state(), CaptureState::Resting);
    }

    #[tokio::test]
    async fn test_exit_key() {
        let config = config();
        let mut controller = Controller::from(&config);
        let mut renderer = JsonRenderer::new(Vec::new());

        let runtime = Builder::from_config(&config).with_frame_limit(100).build();

        runtime
            .input_sender()
            .send(Scancode::Exit(ButtonState::Pressed))
            .await
            .unwrap();

        let frames = runtime.run(&mut controller, &mut renderer).await.unwrap();

        assert_eq!(frames, 0);
        assert!(controller.is_shutdown_requested());
    }

    #[tokio::test]
    async fn test_shutdown_signal() {
        let config = config();
        let mut controller = Controller::from(&config);
        let mut renderer = JsonRenderer::new(Vec::new());

        let runtime = Builder::from_config(&config).build();
        let shutdown = runtime.shutdown.0.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            shutdown.send(()).ok();
        });

        let frames = runtime.run(&mut controller, &mut renderer).await.unwrap();

        assert!(frames > 0);
        assert_eq!(controller.iteration(), frames);
    }

    #[tokio::test]
    async fn test_scripted_input() {
        let config = config();
        let mut controller = Controller::from(&config);
        let mut renderer = JsonRenderer::new(Vec::new());

        let script = ScriptInput::parse(
            r#"[
                { "key": "U", "action": "press" },
                { "key": "U", "action": "release" },
                { "key": "U", "action": "press" },
                { "key": "U", "action": "release" },
                { "key": "O", "action": "press" },
                { "key": "O", "action": "repeat" },
                { "key": "O", "action": "release" }
            ]"#,
            &Keymap::default(),
        )
        .unwrap();

        let runtime = Builder::from_config(&config)
            .with_stop_on_input_end()
            .with_frame_limit(1000)
            .build();

        runtime.spawn_input_device(script);

        let frames = runtime.run(&mut controller, &mut renderer).await.unwrap();

        assert!(frames < 1000);
        assert!((controller.angles().get(Joint::Slew) - 6.0).abs() < 1e-5);
        assert!((controller.angles().get(Joint::Arm) + 3.0).abs() < 1e-5);
        assert_eq!(controller.angles().get(Joint::Boom), 0.0);
    }
}
