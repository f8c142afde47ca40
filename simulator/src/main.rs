//! Desktop simulator for the e-paper dashboard.
//!
//! Runs the real scheduler and widgets against a panel that forwards frames
//! to an SDL window. The scheduler lives on a worker thread because the
//! window must be pumped from the main thread.
//!
//! Keys:
//! - `Q` / close window: shutdown (panel is put to sleep first)
//!
//! Settings come from `dashboard.toml` like the real binary, except the
//! refresh interval, which defaults to [`DEFAULT_INTERVAL_SECS`] and can be
//! changed with `SIM_INTERVAL_SECS`.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{BinaryColorTheme, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use epd_dashboard::canvas::Canvas;
use epd_dashboard::config::{SCREEN_SIZE, Settings};
use epd_dashboard::fetch::{Fetch, HttpFetcher};
use epd_dashboard::widgets::standard_widgets;
use epd_dashboard::{Dashboard, DisplayError, Panel, Scheduler, Shutdown, logging};
use tracing::{info, warn};

const DEFAULT_INTERVAL_SECS: u64 = 10;

/// Window event poll period.
const FRAME_TIME: Duration = Duration::from_millis(50);

/// Panel messages sent to the window thread.
enum PanelMessage {
    Frame(Canvas),
    Sleep,
}

/// Panel that hands each frame to the window thread.
struct WindowPanel {
    frames: Sender<PanelMessage>,
    awake: bool,
}

impl Panel for WindowPanel {
    fn size(&self) -> Size { SCREEN_SIZE }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.awake = true;
        Ok(())
    }

    fn display(
        &mut self,
        frame: &Canvas,
    ) -> Result<(), DisplayError> {
        if !self.awake {
            return Err(DisplayError::Asleep);
        }
        self.frames
            .send(PanelMessage::Frame(frame.clone()))
            .map_err(|_| DisplayError::Output("simulator window closed".into()))
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        self.awake = false;
        // Window may already be gone during shutdown
        self.frames.send(PanelMessage::Sleep).ok();
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let _log_guard = logging::init();

    let mut settings = Settings::load().context("loading settings")?;
    settings.schedule.interval_secs = std::env::var("SIM_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_INTERVAL_SECS);

    let shutdown = Shutdown::new();
    let (tx, rx) = mpsc::channel();
    let worker = spawn_scheduler(settings, shutdown.clone(), tx)?;

    run_window(&rx, &shutdown);
    shutdown.request();

    match worker.join() {
        Ok(result) => result.context("scheduler failed"),
        Err(_) => anyhow::bail!("scheduler thread panicked"),
    }
}

fn spawn_scheduler(
    settings: Settings,
    shutdown: Shutdown,
    frames: Sender<PanelMessage>,
) -> anyhow::Result<thread::JoinHandle<Result<(), DisplayError>>> {
    let fetch: Arc<dyn Fetch> = Arc::new(
        HttpFetcher::new(settings.http.timeout(), &settings.http.user_agent).context("building HTTP client")?,
    );

    thread::Builder::new()
        .name("scheduler".into())
        .spawn(move || {
            let dashboard = Dashboard::new(standard_widgets(&settings, &fetch));
            let panel = WindowPanel { frames, awake: false };
            Scheduler::new(
                panel,
                dashboard,
                settings.schedule.settle(),
                settings.schedule.interval(),
                shutdown,
            )
            .run()
        })
        .context("spawning scheduler thread")
}

/// Pump the window until it is closed or the scheduler stops.
fn run_window(
    frames: &Receiver<PanelMessage>,
    shutdown: &Shutdown,
) {
    let mut display: SimulatorDisplay<BinaryColor> = SimulatorDisplay::new(SCREEN_SIZE);
    let output_settings = OutputSettingsBuilder::new()
        .theme(BinaryColorTheme::Inverted)
        .build();
    let mut window = Window::new("E-Paper Dashboard Sim", &output_settings);

    // Blank panel is all paper
    display.clear(BinaryColor::Off).ok();
    window.update(&display);

    loop {
        loop {
            match frames.try_recv() {
                Ok(PanelMessage::Frame(frame)) => {
                    display.draw_iter(frame.pixels()).ok();
                    info!("Frame shown");
                }
                Ok(PanelMessage::Sleep) => {}
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("Scheduler stopped");
                    return;
                }
            }
        }

        window.update(&display);

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => return,
                SimulatorEvent::KeyDown { keycode: Keycode::Q, .. } => return,
                _ => {}
            }
        }

        if shutdown.wait(FRAME_TIME) {
            return;
        }
    }
}
