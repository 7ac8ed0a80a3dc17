#![allow(dead_code)]

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use folio_core::content::Portfolio;
use folio_core::contact::{FormTransport, SubmitOutcome, Submission, TransportError};
use folio_tui::app::App;
use folio_tui::cli::Opts;
use folio_tui::links::LinkOpener;

pub const FRAME: Duration = Duration::from_millis(16);

/// Records every address it is asked to open.
#[derive(Clone, Default)]
pub struct RecordingOpener(pub Rc<RefCell<Vec<String>>>);

impl LinkOpener for RecordingOpener {
    fn open(&mut self, target: &str) -> io::Result<()> {
        self.0.borrow_mut().push(target.to_string());
        Ok(())
    }
}

/// Answers every submission with a fixed result.
pub struct FakeTransport {
    pub answer: Result<SubmitOutcome, TransportError>,
    pub calls: AtomicUsize,
    pub last: Mutex<Option<(String, Submission)>>,
}

impl FakeTransport {
    pub fn answering(answer: Result<SubmitOutcome, TransportError>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FormTransport for FakeTransport {
    fn submit(
        &self,
        endpoint: &str,
        submission: &Submission,
    ) -> Result<SubmitOutcome, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((endpoint.to_string(), submission.clone()));
        self.answer.clone()
    }
}

pub struct Harness {
    pub app: App,
    pub opened: Rc<RefCell<Vec<String>>>,
    pub transport: Arc<FakeTransport>,
    pub now: Duration,
}

impl Harness {
    pub fn new(width: u16, height: u16) -> Self {
        Self::with(Opts::default(), width, height, Ok(SubmitOutcome::Accepted))
    }

    pub fn with(
        opts: Opts,
        width: u16,
        height: u16,
        answer: Result<SubmitOutcome, TransportError>,
    ) -> Self {
        let opener = RecordingOpener::default();
        let opened = Rc::clone(&opener.0);
        let transport = FakeTransport::answering(answer);
        let shared: Arc<dyn FormTransport + Send + Sync> = transport.clone();
        let app = App::new(
            Portfolio::builtin().unwrap(),
            &opts,
            (width, height),
            shared,
            Box::new(opener),
        );
        Self {
            app,
            opened,
            transport,
            now: Duration::ZERO,
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
        self.app.tick(self.now);
    }

    /// Tick frames until no smooth scroll is in flight.
    pub fn settle(&mut self) {
        for _ in 0..1_000 {
            self.advance(FRAME);
            if !self.app.page().document().is_scrolling() {
                return;
            }
        }
        panic!("smooth scroll never settled");
    }

    /// Wait for the background submission to report.
    pub fn await_submission(&mut self) {
        for _ in 0..500 {
            if self.app.poll_submission() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("submission never finished");
    }
}
