use crossbeam_channel::Sender;
use ignore::{WalkBuilder, WalkState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

use crate::builder::RawNode;
use crate::history::{History, DEFAULT_HISTORY_DEPTH};
use crate::progress::Progress;
use std::io::Read;
use std::thread::sleep;
use std::time::{Duration, SystemTime};

/// What a file's area stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightMetric {
    #[default]
    Bytes,
    Lines,
}

/// What a file's color stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeatMetric {
    #[default]
    None,
    /// Days since the file was last modified.
    Age,
    /// Recent commits that touched the file.
    Frequency,
    /// Lines added plus deleted by recent commits.
    LocChanges,
}

impl HeatMetric {
    fn needs_history(self) -> bool {
        matches!(self, HeatMetric::Frequency | HeatMetric::LocChanges)
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub weight: WeightMetric,
    pub heat: HeatMetric,
    /// Directory or file names that are never descended into.
    pub skip: Vec<String>,
    /// Commits read for the history based heat metrics.
    pub history_depth: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            weight: WeightMetric::default(),
            heat: HeatMetric::default(),
            skip: vec![".git".to_string()],
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ScanMsg {
    Progress(Progress),
    Done(RawNode),
    Error(String),
}

#[derive(Debug, Clone)]
struct FileEntry {
    path: PathBuf,
    weight: f64,
    heat: Option<f64>,
}

pub struct Scanner {
    cancel: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    options: ScanOptions,
}

impl Scanner {
    pub fn new(cancel: Arc<AtomicBool>, paused: Arc<AtomicBool>, options: ScanOptions) -> Self {
        Self {
            cancel,
            paused,
            options,
        }
    }

    /// Walk `root` and send the resulting dataset as [`ScanMsg::Done`]. A cancelled
    /// scan still sends whatever it collected.
    pub fn scan(&self, root: PathBuf, tx: Sender<ScanMsg>) {
        use parking_lot::Mutex;

        let cancel = self.cancel.clone();
        let paused = self.paused.clone();
        let options = self.options.clone();

        // Shared progress counters
        let discovered = Arc::new(AtomicU64::new(0));
        let scanned = Arc::new(AtomicU64::new(0));
        let weight = Arc::new(Mutex::new(0f64));

        let files: Arc<Mutex<Vec<FileEntry>>> = Arc::new(Mutex::new(Vec::with_capacity(4096)));
        let dirs: Arc<Mutex<Vec<PathBuf>>> = Arc::new(Mutex::new(Vec::new()));

        // A root outside any repository still scans; files just carry no heat.
        let history = if options.heat.needs_history() {
            match History::collect(&root, options.history_depth) {
                Ok(h) => Some(Arc::new(h)),
                Err(e) => {
                    tracing::warn!(root = %root.display(), error = %e, "no git history for heat");
                    let _ = tx.send(ScanMsg::Error(e.to_string()));
                    None
                }
            }
        } else {
            None
        };

        let skip = options.skip.clone();
        let mut builder = WalkBuilder::new(&root);
        builder
            .hidden(false)
            .git_global(false)
            .follow_links(false)
            .filter_entry(move |e| !skip.iter().any(|s| e.file_name() == s.as_str()))
            .threads(num_cpus::get());

        let walker = builder.build_parallel();
        walker.run(|| {
            let paused_outer = paused.clone();
            let cancel = cancel.clone();
            let tx = tx.clone();
            let discovered = discovered.clone();
            let scanned = scanned.clone();
            let weight = weight.clone();
            let files = files.clone();
            let dirs = dirs.clone();
            let options = options.clone();
            let history = history.clone();
            Box::new(move |entry| {
                while paused_outer.load(Ordering::Relaxed) {
                    if cancel.load(Ordering::Relaxed) {
                        return WalkState::Quit;
                    }
                    sleep(Duration::from_millis(40));
                }
                if cancel.load(Ordering::Relaxed) {
                    return WalkState::Quit;
                }
                match entry {
                    Ok(ent) => {
                        let file_type = ent.file_type();
                        if file_type.map(|ft| ft.is_dir()).unwrap_or(false) {
                            dirs.lock().push(ent.path().to_path_buf());
                        } else if file_type.map(|ft| ft.is_file()).unwrap_or(false) {
                            discovered.fetch_add(1, Ordering::Relaxed);
                            let path = ent.path().to_path_buf();
                            match measure_file(&path, &options, history.as_deref()) {
                                Ok(file) => {
                                    scanned.fetch_add(1, Ordering::Relaxed);
                                    {
                                        let mut w = weight.lock();
                                        *w += file.weight;
                                        let _ = tx.send(ScanMsg::Progress(Progress {
                                            scanned: scanned.load(Ordering::Relaxed),
                                            discovered: discovered.load(Ordering::Relaxed),
                                            weight: *w,
                                        }));
                                    }
                                    files.lock().push(file);
                                }
                                Err(e) => {
                                    // Still count as scanned, but no weight
                                    scanned.fetch_add(1, Ordering::Relaxed);
                                    tracing::debug!(path = %path.display(), error = %e, "unreadable file");
                                    let _ = tx.send(ScanMsg::Error(format!("{}: {e}", path.display())));
                                }
                            }
                        }
                        WalkState::Continue
                    }
                    Err(e) => {
                        let _ = tx.send(ScanMsg::Error(e.to_string()));
                        WalkState::Continue
                    }
                }
            })
        });

        let files = Arc::try_unwrap(files)
            .map(|m| m.into_inner())
            .unwrap_or_else(|arc| arc.lock().clone());
        let dirs = Arc::try_unwrap(dirs)
            .map(|m| m.into_inner())
            .unwrap_or_else(|arc| arc.lock().clone());
        tracing::debug!(root = %root.display(), files = files.len(), dirs = dirs.len(), "scan finished");
        let dataset = build_dataset(&root, dirs, files);
        let _ = tx.send(ScanMsg::Done(dataset));
    }
}

fn measure_file(path: &Path, options: &ScanOptions, history: Option<&History>) -> std::io::Result<FileEntry> {
    let md = std::fs::metadata(path)?;
    let weight = match options.weight {
        WeightMetric::Bytes => md.len() as f64,
        WeightMetric::Lines => count_lines(std::fs::File::open(path)?)? as f64,
    };
    let heat = match options.heat {
        HeatMetric::None => None,
        HeatMetric::Age => md.modified().ok().map(age_in_days),
        HeatMetric::Frequency => history.map(|h| h.churn(path).commits as f64),
        HeatMetric::LocChanges => history.map(|h| h.churn(path).changed_lines as f64),
    };
    Ok(FileEntry {
        path: path.to_path_buf(),
        weight,
        heat,
    })
}

/// Newlines in `reader`, read in fixed-size chunks.
fn count_lines(mut reader: impl Read) -> std::io::Result<u64> {
    let mut buf = [0u8; 64 * 1024];
    let mut lines = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(lines),
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        lines += buf[..n].iter().filter(|&&b| b == b'\n').count() as u64;
    }
}

fn age_in_days(modified: SystemTime) -> f64 {
    let modified: chrono::DateTime<chrono::Utc> = modified.into();
    let age = chrono::Utc::now().signed_duration_since(modified);
    (age.num_seconds().max(0) as f64) / 86_400.0
}

struct DirEntry {
    name: String,
    kind: &'static str,
    weight: f64,
    heat: Option<f64>,
    children: Vec<usize>,
}

/// Assemble the nested dataset from the walked directories and files. Directory
/// weights are the sum of the files beneath them, so empty directories weigh 0;
/// directories carry no heat.
fn build_dataset(root: &Path, dirs: Vec<PathBuf>, files: Vec<FileEntry>) -> RawNode {
    let root = root.to_path_buf();
    let mut nodes: Vec<DirEntry> = Vec::with_capacity(1024);
    let mut id_by_path: HashMap<PathBuf, usize> = HashMap::new();

    // Helper to ensure a directory node exists (and link it to its parent)
    fn ensure_dir(
        path: &Path,
        root: &Path,
        nodes: &mut Vec<DirEntry>,
        id_by_path: &mut HashMap<PathBuf, usize>,
    ) -> usize {
        if let Some(id) = id_by_path.get(path).cloned() {
            return id;
        }
        let parent_id = if path == root {
            None
        } else {
            let parent = path.parent().unwrap_or(root);
            Some(ensure_dir(parent, root, nodes, id_by_path))
        };
        let id = nodes.len();
        nodes.push(DirEntry {
            name: display_name(path),
            kind: "DIR",
            weight: 0.0,
            heat: None,
            children: Vec::new(),
        });
        id_by_path.insert(path.to_path_buf(), id);
        if let Some(pid) = parent_id {
            nodes[pid].children.push(id);
        }
        id
    }

    let root_id = ensure_dir(&root, &root, &mut nodes, &mut id_by_path);
    for dir in &dirs {
        ensure_dir(dir, &root, &mut nodes, &mut id_by_path);
    }

    // Add files and propagate weights
    for file in files {
        let parent_dir = file.path.parent().unwrap_or(&root).to_path_buf();
        let pid = ensure_dir(&parent_dir, &root, &mut nodes, &mut id_by_path);
        let id = nodes.len();
        nodes.push(DirEntry {
            name: display_name(&file.path),
            kind: "FILE",
            weight: file.weight,
            heat: file.heat,
            children: Vec::new(),
        });
        nodes[pid].children.push(id);

        let mut cur = Some(parent_dir);
        while let Some(dir) = cur {
            if let Some(&did) = id_by_path.get(&dir) {
                nodes[did].weight += file.weight;
            }
            if dir == root {
                break;
            }
            cur = dir.parent().map(|p| p.to_path_buf());
        }
    }

    to_raw(&nodes, root_id)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_else(|| path.as_os_str().to_str().unwrap_or(""))
        .to_string()
}

fn to_raw(nodes: &[DirEntry], id: usize) -> RawNode {
    let node = &nodes[id];
    RawNode {
        name: Some(node.name.clone()),
        weight: Some(node.weight),
        heat: node.heat,
        kind: Some(node.kind.to_string()),
        children: Some(node.children.iter().map(|&c| to_raw(nodes, c)).collect()),
    }
}
