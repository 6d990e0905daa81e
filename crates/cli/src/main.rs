use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use treeheat_core::history::DEFAULT_HISTORY_DEPTH;
use treeheat_core::scanner::{HeatMetric, ScanMsg, ScanOptions, Scanner, WeightMetric};
use treeheat_core::{export, search, AverageCharMeasure, ColorMode, Rect, Session, TreemapConfig};

#[derive(Parser, Debug)]
#[command(name = "treeheat", about = "Heat-colored treemaps of hierarchical datasets")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk a directory and write it out as a dataset
    Scan {
        /// Root directory to scan
        root: PathBuf,
        #[arg(long, value_enum, default_value_t = Weight::Bytes)]
        weight: Weight,
        #[arg(long, value_enum, default_value_t = Heat::None)]
        heat: Heat,
        /// Commits read for the frequency and loc-changes heat metrics
        #[arg(long, default_value_t = DEFAULT_HISTORY_DEPTH)]
        history_depth: usize,
        /// Output dataset path; stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Lay out a dataset and export the resulting frame
    Render {
        /// Dataset JSON file
        dataset: PathBuf,
        #[arg(long, default_value_t = 1200.0)]
        width: f64,
        #[arg(long, default_value_t = 800.0)]
        height: f64,
        /// Drill into a node by path (`a/b`) or name before rendering; repeatable
        #[arg(long)]
        expand: Vec<String>,
        #[arg(long, value_enum)]
        color: Option<Color>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Output path; stdout when omitted (required for pdf)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Treemap config JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Weight {
    Bytes,
    Lines,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Heat {
    None,
    Age,
    Frequency,
    LocChanges,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Color {
    Heat,
    RelativeSize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Csv,
    Pdf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Scan {
            root,
            weight,
            heat,
            history_depth,
            out,
        } => scan(root, weight, heat, history_depth, out),
        Command::Render {
            dataset,
            width,
            height,
            expand,
            color,
            format,
            out,
            config,
        } => {
            let mut cfg = match config {
                Some(path) => TreemapConfig::from_file(&path)?,
                None => TreemapConfig::default(),
            };
            if let Some(color) = color {
                cfg.color_mode = match color {
                    Color::Heat => ColorMode::Heat,
                    Color::RelativeSize => ColorMode::RelativeSize,
                };
            }
            render(dataset, Rect::new(0.0, 0.0, width, height), &expand, cfg, format, out)
        }
    }
}

fn scan(
    root: PathBuf,
    weight: Weight,
    heat: Heat,
    history_depth: usize,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let options = ScanOptions {
        weight: match weight {
            Weight::Bytes => WeightMetric::Bytes,
            Weight::Lines => WeightMetric::Lines,
        },
        heat: match heat {
            Heat::None => HeatMetric::None,
            Heat::Age => HeatMetric::Age,
            Heat::Frequency => HeatMetric::Frequency,
            Heat::LocChanges => HeatMetric::LocChanges,
        },
        history_depth,
        ..ScanOptions::default()
    };
    let cancel = Arc::new(AtomicBool::new(false));
    let paused = Arc::new(AtomicBool::new(false));
    let (tx, rx) = crossbeam_channel::unbounded::<ScanMsg>();
    let scanner = Scanner::new(cancel, paused, options);
    std::thread::spawn({
        let root = root.clone();
        move || scanner.scan(root, tx)
    });

    let mut files = 0u64;
    let mut discovered = 0u64;
    let mut total = 0f64;
    let mut errors = 0usize;
    let mut dataset = None;
    while let Ok(msg) = rx.recv() {
        match msg {
            ScanMsg::Progress(p) => {
                files = p.scanned;
                discovered = p.discovered;
                total = p.weight;
            }
            ScanMsg::Done(raw) => {
                dataset = Some(raw);
                break;
            }
            ScanMsg::Error(e) => {
                errors += 1;
                tracing::warn!("{e}");
            }
        }
    }
    let Some(dataset) = dataset else {
        bail!("scan of {} ended without a result", root.display());
    };

    let json = serde_json::to_string_pretty(&dataset)?;
    match out {
        Some(path) => std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    eprintln!(
        "Scanned {} / {} files, total weight {}, {} errors",
        files,
        discovered.max(files),
        total,
        errors
    );
    Ok(())
}

fn render(
    dataset: PathBuf,
    viewport: Rect,
    expand: &[String],
    config: TreemapConfig,
    format: Format,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&dataset).with_context(|| format!("reading {}", dataset.display()))?;
    let mut session = Session::load(&text, config).with_context(|| format!("loading {}", dataset.display()))?;

    for query in expand {
        let Some(id) = search::find(session.tree(), query) else {
            bail!("no node matches {query:?}");
        };
        if !session.expand(id).is_changed() {
            tracing::warn!(%id, query = %query, "node cannot be expanded");
        }
    }

    let frame = session.frame(viewport, &AverageCharMeasure::default());
    match (format, out) {
        (Format::Json, Some(path)) => {
            std::fs::write(&path, serde_json::to_string_pretty(&export::to_json(&frame))?)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        (Format::Json, None) => println!("{}", serde_json::to_string_pretty(&export::to_json(&frame))?),
        (Format::Csv, Some(path)) => {
            let file = std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            export::to_csv(&frame, file)?;
        }
        (Format::Csv, None) => export::to_csv(&frame, std::io::stdout().lock())?,
        (Format::Pdf, Some(path)) => export::to_pdf(&frame, session.config(), &path)?,
        (Format::Pdf, None) => bail!("pdf output needs --out"),
    }
    eprintln!("{} | {} nodes", frame.trail, frame.len());
    Ok(())
}
