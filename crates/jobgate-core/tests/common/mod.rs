#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use jobgate_core::EVENTS_TARGET;
use jobgate_core::app::{App, AppBuilder};
use jobgate_core::client::RetryPolicy;
use jobgate_core::domain::{ProcessFile, Task, TaskStatus, Timestamp};
use jobgate_core::impls::{InMemoryInterruption, InMemoryTaskState, RecordingPublisher};
use jobgate_core::ports::SystemClock;
use tracing::Level;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

/// Log lines written while the capture is installed.
#[derive(Clone, Default)]
pub struct CapturedEvents {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedEvents {
    /// Install a thread-local subscriber recording every target at WARN and
    /// above, inside the coordinators' spans.
    pub fn install() -> (Self, DefaultGuard) {
        let captured = Self::default();
        let targets = Targets::new()
            .with_default(Level::WARN)
            .with_target(EVENTS_TARGET, Level::WARN)
            .with_target("jobgate_core::app", Level::INFO);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(captured.clone())
            .with_ansi(false)
            .with_filter(targets);
        let guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(layer));
        (captured, guard)
    }

    pub fn lines(&self) -> Vec<String> {
        let buf = self.buf.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(str::to_owned)
            .collect()
    }

    /// Lines emitted on the business-event target.
    pub fn events(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.contains(EVENTS_TARGET))
            .collect()
    }

    /// WARN lines from any target, retry loop and clients included.
    pub fn warnings(&self) -> usize {
        self.lines().iter().filter(|l| l.contains(" WARN ")).count()
    }
}

impl io::Write for CapturedEvents {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedEvents {
    type Writer = CapturedEvents;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub struct Harness {
    pub app: App,
    pub state: Arc<InMemoryTaskState>,
    pub server: Arc<InMemoryInterruption>,
    pub publisher: RecordingPublisher,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_interruption(InMemoryInterruption::acknowledging())
    }

    pub fn with_interruption(server: InMemoryInterruption) -> Self {
        let state = Arc::new(InMemoryTaskState::new());
        let server = Arc::new(server);
        let publisher = RecordingPublisher::new();
        let app = AppBuilder::new()
            .task_state(state.clone())
            .interruption(server.clone())
            .publisher(Arc::new(publisher.clone()))
            .clock(Arc::new(SystemClock))
            .retry(RetryPolicy::immediate(3))
            .build()
            .unwrap();
        Self {
            app,
            state,
            server,
            publisher,
        }
    }

    pub fn seed(&self, status: TaskStatus) -> Task {
        let task = Task::new(ts(), status).with_inputs(vec![
            ProcessFile::new("CGM", "cgm.uct"),
            ProcessFile::new("CRAC", "crac.json"),
        ]);
        self.state.insert(task.clone());
        task
    }
}

pub fn ts() -> Timestamp {
    "2024-09-13T09:30Z".parse().unwrap()
}
