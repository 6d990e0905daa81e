use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use treeheat_core::scanner::{ScanMsg, ScanOptions, Scanner, WeightMetric};
use treeheat_core::{search, Progress, Session, Transition, TreemapConfig, WeightUnit};

pub struct AppState {
    pub config: TreemapConfig,
    pub session: Option<Session>,
    pub source: Option<PathBuf>,
    pub cancel: Arc<AtomicBool>,
    pub paused: Arc<AtomicBool>,
    pub scan_rx: Option<Receiver<ScanMsg>>,
    pub scan_options: ScanOptions,
    pub progress: Progress,
    pub scan_errors: usize,
    pub search: String,
    pub status: Option<String>,
}

impl AppState {
    pub fn new(config: TreemapConfig) -> Self {
        Self {
            config,
            session: None,
            source: None,
            cancel: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
            scan_rx: None,
            scan_options: ScanOptions::default(),
            progress: Progress::default(),
            scan_errors: 0,
            search: String::new(),
            status: None,
        }
    }

    /// Replace the current dataset with the one in `path`. A dataset that fails to
    /// load leaves the previous one in place.
    pub fn open_dataset(&mut self, path: &Path) {
        let loaded = std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|text| Ok(Session::load(&text, self.config.clone())?));
        match loaded {
            Ok(session) => {
                tracing::info!(path = %path.display(), nodes = session.tree().len(), "opened dataset");
                self.session = Some(session);
                self.source = Some(path.to_path_buf());
                self.status = None;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to open dataset");
                self.status = Some(format!("{}: {e}", path.display()));
            }
        }
    }

    pub fn start_scan(&mut self, root: PathBuf) {
        self.source = Some(root.clone());
        self.progress = Progress::default();
        self.scan_errors = 0;
        self.session = None;
        self.status = None;
        self.cancel.store(false, Ordering::Relaxed);
        self.paused.store(false, Ordering::Relaxed);
        self.config.weight_unit = match self.scan_options.weight {
            WeightMetric::Bytes => WeightUnit::Bytes,
            WeightMetric::Lines => WeightUnit::Count,
        };

        let (tx, rx): (Sender<ScanMsg>, Receiver<ScanMsg>) = unbounded();
        self.scan_rx = Some(rx);
        let cancel = self.cancel.clone();
        let paused = self.paused.clone();
        let options = self.scan_options.clone();

        std::thread::spawn(move || {
            let scanner = Scanner::new(cancel, paused, options);
            scanner.scan(root, tx);
        });
    }

    pub fn cancel_scan(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn toggle_pause(&self) {
        let now = !self.paused.load(Ordering::Relaxed);
        self.paused.store(now, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn is_scanning(&self) -> bool {
        self.scan_rx.is_some()
    }

    /// Drain scanner messages. Returns true when anything arrived.
    pub fn poll_scan(&mut self) -> bool {
        // Take ownership of the receiver to avoid borrowing while we might assign to it.
        let Some(rx) = self.scan_rx.take() else {
            return false;
        };
        let mut had_msg = false;
        let mut finished = false;
        while let Ok(msg) = rx.try_recv() {
            had_msg = true;
            match msg {
                ScanMsg::Progress(p) => self.progress = p,
                ScanMsg::Done(raw) => {
                    self.session = Some(Session::from_raw(raw, self.config.clone()));
                    finished = true;
                    break;
                }
                ScanMsg::Error(_) => self.scan_errors += 1,
            }
        }
        if !finished {
            // Put the receiver back to keep polling next frame
            self.scan_rx = Some(rx);
        }
        had_msg
    }

    /// Config edits apply to the open session too.
    pub fn set_config(&mut self, config: TreemapConfig) {
        if let Some(session) = &mut self.session {
            *session.config_mut() = config.clone();
        }
        self.config = config;
    }

    pub fn jump_to(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        match search::find(session.tree(), self.search.trim()) {
            Some(id) => {
                if session.expand(id) == Transition::Unchanged {
                    self.status = Some(format!("{} cannot be expanded", self.search.trim()));
                } else {
                    self.status = None;
                }
            }
            None => self.status = Some(format!("nothing matches {:?}", self.search.trim())),
        }
    }
}
