//! Refresh loop and panel lifecycle.
//!
//! E-paper panels must not be left powered between refreshes, so every cycle
//! wakes the panel, pushes one frame, gives it time to finish the physical
//! refresh, and puts it back to sleep before idling:
//!
//! ```text
//! Init -> Awake -> Render -> (settle) -> Asleep -> Wait -> Init -> ...
//!                                                  \
//!                                                   `-> Shutdown
//! ```
//!
//! # Shutdown
//!
//! [`Shutdown`] is a flag plus condition variable. The signal handler only
//! calls [`Shutdown::request`]; the loop observes it at the top of a cycle
//! and while waiting (settle delay and interval), never in the middle of a
//! device operation. On shutdown the panel is put to sleep if it is awake.
//! An interrupt during `Wait` finds the panel already asleep, so no extra
//! `sleep()` and no further `display()` is issued.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info};

use crate::dashboard::Dashboard;
use crate::display::{DisplayError, Panel};

// =============================================================================
// Shutdown
// =============================================================================

/// Cloneable, thread-safe shutdown request.
#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Shutdown {
    pub fn new() -> Self { Self::default() }

    /// Ask the loop to stop and wake any pending wait.
    pub fn request(&self) {
        let (lock, condvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        condvar.notify_all();
    }

    pub fn is_requested(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for up to `timeout`. Returns `true` if shutdown was requested
    /// before or during the wait.
    pub fn wait(
        &self,
        timeout: Duration,
    ) -> bool {
        let (lock, condvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = condvar
            .wait_timeout_while(guard, timeout, |requested| !*requested)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Position in the panel lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Awake,
    Render,
    Asleep,
    Wait,
    Shutdown,
}

pub struct Scheduler<P: Panel> {
    panel: P,
    dashboard: Dashboard,
    settle: Duration,
    interval: Duration,
    shutdown: Shutdown,
    phase: Phase,
    cycles: u64,
}

impl<P: Panel> Scheduler<P> {
    pub const fn new(
        panel: P,
        dashboard: Dashboard,
        settle: Duration,
        interval: Duration,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            panel,
            dashboard,
            settle,
            interval,
            shutdown,
            phase: Phase::Init,
            cycles: 0,
        }
    }

    pub const fn phase(&self) -> Phase { self.phase }

    /// Completed render cycles.
    pub const fn cycles(&self) -> u64 { self.cycles }

    pub const fn panel(&self) -> &P { &self.panel }

    /// Run until shutdown is requested. Panel failures end the loop.
    pub fn run(&mut self) -> Result<(), DisplayError> {
        self.enter(Phase::Init);
        self.panel.init()?;
        self.enter(Phase::Awake);
        info!(interval = ?self.interval, "Panel ready");

        loop {
            if self.shutdown.is_requested() {
                break;
            }

            self.enter(Phase::Render);
            self.dashboard.render(&mut self.panel)?;
            self.cycles += 1;

            // Let the panel finish its refresh before powering it down
            if self.shutdown.wait(self.settle) {
                break;
            }

            self.panel.sleep()?;
            self.enter(Phase::Asleep);

            self.enter(Phase::Wait);
            if self.shutdown.wait(self.interval) {
                info!(cycles = self.cycles, "Shutdown while idle, panel already asleep");
                self.enter(Phase::Shutdown);
                return Ok(());
            }

            self.enter(Phase::Init);
            self.panel.init()?;
            self.enter(Phase::Awake);
        }

        info!(cycles = self.cycles, "Shutdown requested, putting panel to sleep");
        self.panel.sleep()?;
        self.enter(Phase::Shutdown);
        Ok(())
    }

    fn enter(
        &mut self,
        phase: Phase,
    ) {
        debug!(from = ?self.phase, to = ?phase, "Phase");
        self.phase = phase;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Instant;

    use super::*;
    use crate::config::Bounds;
    use crate::testing::{PanelEvent, RecordingPanel, StubProvider};
    use crate::widgets::Slot;

    use PanelEvent::{Display, Init, Sleep};

    fn dashboard() -> Dashboard {
        let widget = Slot::new(StubProvider::new().then_ok(1).then_ok(2), Bounds::new(0, 0, 50, 50));
        Dashboard::new(vec![Box::new(widget)])
    }

    fn scheduler(
        panel: RecordingPanel,
        shutdown: &Shutdown,
    ) -> Scheduler<RecordingPanel> {
        Scheduler::new(panel, dashboard(), Duration::ZERO, Duration::ZERO, shutdown.clone())
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    #[test]
    fn test_shutdown_wait_times_out() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.wait(Duration::from_millis(10)));
        assert!(!shutdown.is_requested());
    }

    #[test]
    fn test_shutdown_wait_returns_immediately_when_requested() {
        let shutdown = Shutdown::new();
        shutdown.request();
        let start = Instant::now();
        assert!(shutdown.wait(Duration::from_secs(60)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_shutdown_wakes_waiter_from_other_thread() {
        let shutdown = Shutdown::new();
        let remote = shutdown.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.request();
        });
        assert!(shutdown.wait(Duration::from_secs(60)));
        handle.join().unwrap();
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    #[test]
    fn test_interrupt_during_wait_sleeps_once() {
        let shutdown = Shutdown::new();
        let panel = RecordingPanel::new().interrupt_on_sleep(1, shutdown.clone());
        let mut scheduler = scheduler(panel, &shutdown);

        scheduler.run().unwrap();

        assert_eq!(scheduler.panel().events(), &[Init, Display, Sleep]);
        assert_eq!(scheduler.phase(), Phase::Shutdown);
        assert_eq!(scheduler.cycles(), 1);
    }

    #[test]
    fn test_interrupt_during_settle_sleeps_then_exits() {
        let shutdown = Shutdown::new();
        let panel = RecordingPanel::new().interrupt_on_display(1, shutdown.clone());
        let mut scheduler = scheduler(panel, &shutdown);

        scheduler.run().unwrap();
        assert_eq!(scheduler.panel().events(), &[Init, Display, Sleep]);
    }

    #[test]
    fn test_shutdown_before_first_cycle() {
        let shutdown = Shutdown::new();
        shutdown.request();
        let mut scheduler = scheduler(RecordingPanel::new(), &shutdown);

        scheduler.run().unwrap();
        assert_eq!(scheduler.panel().events(), &[Init, Sleep]);
        assert_eq!(scheduler.cycles(), 0);
    }

    #[test]
    fn test_cycles_reinit_after_sleep() {
        let shutdown = Shutdown::new();
        let panel = RecordingPanel::new().interrupt_on_sleep(2, shutdown.clone());
        let mut scheduler = scheduler(panel, &shutdown);

        scheduler.run().unwrap();
        assert_eq!(scheduler.panel().events(), &[Init, Display, Sleep, Init, Display, Sleep]);
        assert_eq!(scheduler.panel().frames().len(), 2);
    }

    #[test]
    fn test_panel_error_is_fatal() {
        let shutdown = Shutdown::new();
        let mut scheduler = scheduler(RecordingPanel::new().failing_display(), &shutdown);

        let err = scheduler.run().unwrap_err();
        assert!(matches!(err, DisplayError::Spi(_)));
        assert_eq!(scheduler.phase(), Phase::Render);
        assert_eq!(scheduler.panel().events(), &[Init]);
    }
}
