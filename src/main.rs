//! E-paper dashboard for a Waveshare 7.5" panel on a Raspberry Pi.
//!
//! Shows a clock, BBC News headlines and the latest post of one social-feed
//! account, refreshed once per interval (60 s by default).
//!
//! # Configuration
//!
//! Read from `dashboard.toml` or the file named by `DASHBOARD_CONFIG`; see
//! [`Settings`]. `NEWS_CATEGORY`, `TWITTER_BEARER_TOKEN` and
//! `TWITTER_SCREEN_NAME` override the file.
//!
//! # Panels
//!
//! - `driver = "waveshare"`: real panel over spidev (needs `--features hardware`)
//! - `driver = "png"`: every frame written to `display.output`
//! - `driver = "auto"`: Waveshare on ARM builds with `hardware`, PNG otherwise
//!
//! Ctrl-C or SIGTERM puts the panel to sleep and exits.

use std::sync::Arc;

use anyhow::Context;
use epd_dashboard::config::{DriverKind, Settings};
use epd_dashboard::display::png::PngPanel;
use epd_dashboard::fetch::{Fetch, HttpFetcher};
use epd_dashboard::widgets::standard_widgets;
use epd_dashboard::{Dashboard, Panel, Scheduler, Shutdown, logging};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let _log_guard = logging::init();

    let settings = Settings::load().context("loading settings")?;

    let shutdown = Shutdown::new();
    let handler = shutdown.clone();
    ctrlc::set_handler(move || handler.request()).context("installing signal handler")?;

    let fetch: Arc<dyn Fetch> = Arc::new(
        HttpFetcher::new(settings.http.timeout(), &settings.http.user_agent).context("building HTTP client")?,
    );
    let dashboard = Dashboard::new(standard_widgets(&settings, &fetch));

    let driver = settings.display.driver.resolve();
    info!(?driver, version = env!("CARGO_PKG_VERSION"), "Starting dashboard");

    match driver {
        DriverKind::Waveshare => run_waveshare(dashboard, &settings, shutdown),
        // resolve() never yields Auto
        DriverKind::Png | DriverKind::Auto => {
            run(PngPanel::new(&settings.display.output), dashboard, &settings, shutdown)
        }
    }
}

fn run<P: Panel>(
    panel: P,
    dashboard: Dashboard,
    settings: &Settings,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    let mut scheduler = Scheduler::new(
        panel,
        dashboard,
        settings.schedule.settle(),
        settings.schedule.interval(),
        shutdown,
    );
    scheduler.run().context("panel failure")?;
    info!(cycles = scheduler.cycles(), "Exiting");
    Ok(())
}

#[cfg(feature = "hardware")]
fn run_waveshare(
    dashboard: Dashboard,
    settings: &Settings,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    let panel = epd_dashboard::display::linux::open(&settings.display).context("opening Waveshare panel")?;
    run(panel, dashboard, settings, shutdown)
}

#[cfg(not(feature = "hardware"))]
fn run_waveshare(
    _dashboard: Dashboard,
    _settings: &Settings,
    _shutdown: Shutdown,
) -> anyhow::Result<()> {
    anyhow::bail!("driver \"waveshare\" requires a build with `--features hardware`")
}
