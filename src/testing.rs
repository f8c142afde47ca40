//! Test doubles shared by the unit tests.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use crate::canvas::Canvas;
use crate::colors::INK;
use crate::config::SCREEN_SIZE;
use crate::display::{DisplayError, Panel, check_frame_size};
use crate::fetch::{Fetch, FetchError};
use crate::scheduler::Shutdown;
use crate::widgets::{Provider, WidgetError};

// =============================================================================
// FakeFetch
// =============================================================================

#[derive(Clone)]
enum Response {
    Body(Vec<u8>),
    Error(FetchError),
}

/// Scripted [`Fetch`]: fixed responses per URL, everything else refused.
#[derive(Default)]
pub struct FakeFetch {
    responses: Mutex<HashMap<String, Response>>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeFetch {
    pub fn new() -> Self { Self::default() }

    pub fn with_text(
        self,
        url: &str,
        body: &str,
    ) -> Self {
        self.script(url, Response::Body(body.as_bytes().to_vec()));
        self
    }

    pub fn with_bytes(
        self,
        url: &str,
        body: Vec<u8>,
    ) -> Self {
        self.script(url, Response::Body(body));
        self
    }

    pub fn with_error(
        self,
        url: &str,
        error: FetchError,
    ) -> Self {
        self.script(url, Response::Error(error));
        self
    }

    /// Make later requests to `url` fail.
    pub fn fail(
        &self,
        url: &str,
        error: FetchError,
    ) {
        self.script(url, Response::Error(error));
    }

    fn script(
        &self,
        url: &str,
        response: Response,
    ) {
        self.responses.lock().unwrap().insert(url.to_owned(), response);
    }

    /// URLs requested so far, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.iter().map(|(url, _)| url.clone()).collect())
            .unwrap_or_default()
    }

    /// Headers sent with the most recent request to `url`.
    pub fn headers_for(
        &self,
        url: &str,
    ) -> Option<Vec<(String, String)>> {
        let requests = self.requests.lock().ok()?;
        requests.iter().rev().find(|(u, _)| u == url).map(|(_, h)| h.clone())
    }

    fn respond(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<Vec<u8>, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            let headers = headers.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
            requests.push((url.to_owned(), headers));
        }
        let response = self.responses.lock().unwrap().get(url).cloned();
        match response {
            Some(Response::Body(body)) => Ok(body),
            Some(Response::Error(error)) => Err(error),
            None => Err(FetchError::Transport {
                url: url.to_owned(),
                message: "connection refused".into(),
            }),
        }
    }
}

impl Fetch for FakeFetch {
    fn fetch_text(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        let body = self.respond(url, headers)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn fetch_bytes(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<Vec<u8>, FetchError> {
        self.respond(url, headers)
    }
}

// =============================================================================
// StubProvider
// =============================================================================

/// Provider returning scripted results; renders by filling its whole target.
///
/// The fill deliberately overshoots the target on every side so bleed
/// tests catch missing clipping.
#[derive(Default)]
pub struct StubProvider {
    script: VecDeque<Result<u32, WidgetError>>,
    render_error: Option<WidgetError>,
    renders: Cell<usize>,
}

impl StubProvider {
    pub fn new() -> Self { Self::default() }

    pub fn then_ok(
        mut self,
        value: u32,
    ) -> Self {
        self.script.push_back(Ok(value));
        self
    }

    pub fn then_err(
        mut self,
        error: WidgetError,
    ) -> Self {
        self.script.push_back(Err(error));
        self
    }

    /// Make every render draw partially and then fail.
    pub fn failing_render(
        mut self,
        error: WidgetError,
    ) -> Self {
        self.render_error = Some(error);
        self
    }

    pub fn render_count(&self) -> usize { self.renders.get() }
}

impl Provider for StubProvider {
    type Data = u32;

    const NAME: &'static str = "stub";

    fn fetch(&mut self) -> Result<u32, WidgetError> {
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(WidgetError::Fetch("script exhausted".into())))
    }

    fn summarize(
        &self,
        data: &u32,
    ) -> String {
        format!("value {data}")
    }

    fn render<D>(
        &self,
        _data: &u32,
        target: &mut D,
    ) -> Result<(), WidgetError>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        self.renders.set(self.renders.get() + 1);
        let size = target.bounding_box().size;
        Rectangle::new(Point::new(-20, -20), size + Size::new(40, 40))
            .into_styled(PrimitiveStyle::with_fill(INK))
            .draw(target)
            .ok();
        match &self.render_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

// =============================================================================
// RecordingPanel
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    Init,
    Display,
    Sleep,
}

/// In-memory panel that logs every lifecycle call and keeps each frame.
pub struct RecordingPanel {
    events: Vec<PanelEvent>,
    frames: Vec<Canvas>,
    awake: bool,
    fail_display: bool,
    interrupt_on_display: Option<(usize, Shutdown)>,
    interrupt_on_sleep: Option<(usize, Shutdown)>,
}

impl RecordingPanel {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            frames: Vec::new(),
            awake: false,
            fail_display: false,
            interrupt_on_display: None,
            interrupt_on_sleep: None,
        }
    }

    /// Request shutdown while handling the `n`th `display()` call (1-based).
    pub fn interrupt_on_display(
        mut self,
        n: usize,
        shutdown: Shutdown,
    ) -> Self {
        self.interrupt_on_display = Some((n, shutdown));
        self
    }

    /// Request shutdown while handling the `n`th `sleep()` call (1-based).
    pub fn interrupt_on_sleep(
        mut self,
        n: usize,
        shutdown: Shutdown,
    ) -> Self {
        self.interrupt_on_sleep = Some((n, shutdown));
        self
    }

    pub fn failing_display(mut self) -> Self {
        self.fail_display = true;
        self
    }

    pub fn events(&self) -> &[PanelEvent] { &self.events }

    pub fn frames(&self) -> &[Canvas] { &self.frames }

    fn count(
        &self,
        event: PanelEvent,
    ) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }
}

impl Panel for RecordingPanel {
    fn size(&self) -> Size { SCREEN_SIZE }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.events.push(PanelEvent::Init);
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
        check_frame_size(SCREEN_SIZE, frame)?;
        if self.fail_display {
            return Err(DisplayError::Spi("bus fault".into()));
        }
        self.events.push(PanelEvent::Display);
        self.frames.push(frame.clone());
        let calls = self.count(PanelEvent::Display);
        if let Some((n, shutdown)) = &self.interrupt_on_display {
            if calls == *n {
                shutdown.request();
            }
        }
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        self.events.push(PanelEvent::Sleep);
        self.awake = false;
        let calls = self.count(PanelEvent::Sleep);
        if let Some((n, shutdown)) = &self.interrupt_on_sleep {
            if calls == *n {
                shutdown.request();
            }
        }
        Ok(())
    }
}
