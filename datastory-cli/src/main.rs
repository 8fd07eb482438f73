use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use datastory::{NavStep, Phase, Story, StorySession, SvgSurface};

#[derive(Parser, Debug)]
#[command(name = "datastory", version)]
struct Cli {
    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a story and load its datasets.
    Check(CheckArgs),
    /// Write the joined records of a story as JSON.
    Join(JoinArgs),
    /// Render every scene to `scene-NN.svg`.
    Render(RenderArgs),
    /// Replay navigation steps and write the final chart.
    Navigate(NavigateArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input story JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct JoinArgs {
    /// Input story JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output JSON path. Defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Keep only records that carry every loaded measure.
    #[arg(long, default_value_t = false)]
    complete: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input story JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// Also write `scene-NN.png` next to each SVG.
    #[arg(long, default_value_t = false)]
    png: bool,
}

#[derive(Parser, Debug)]
struct NavigateArgs {
    /// Input story JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Comma-separated steps: next, previous, home.
    #[arg(long, value_delimiter = ',')]
    steps: Vec<NavStep>,

    /// Output SVG path; a `.png` extension rasterizes instead.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Join(args) => cmd_join(args),
        Command::Render(args) => cmd_render(args),
        Command::Navigate(args) => cmd_navigate(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn base_dir(in_path: &Path) -> &Path {
    in_path.parent().unwrap_or_else(|| Path::new("."))
}

fn open_session(in_path: &Path) -> anyhow::Result<StorySession<SvgSurface>> {
    let story = Story::from_path(in_path)?;
    story
        .validate()
        .with_context(|| format!("invalid story '{}'", in_path.display()))?;
    let surface = SvgSurface::new(story.layout()?);
    let sess = StorySession::new(story, base_dir(in_path), surface)?;
    if sess.controller().phase() == Phase::Failed {
        let msg = sess.controller().failure().unwrap_or("unknown error").to_owned();
        anyhow::bail!("data failed to load: {msg}");
    }
    Ok(sess)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let sess = open_session(&args.in_path)?;
    let data = sess
        .data()
        .context("story loaded without data")?;
    for m in data.measures() {
        let rows = data.table(m).map_or(0, |t| t.len());
        eprintln!("{m}: {rows} rows");
    }
    eprintln!(
        "ok: {} scenes, {} joined records",
        sess.controller().len(),
        data.joined().len()
    );
    Ok(())
}

fn cmd_join(args: JoinArgs) -> anyhow::Result<()> {
    let story = Story::from_path(&args.in_path)?;
    story
        .validate()
        .with_context(|| format!("invalid story '{}'", args.in_path.display()))?;
    let data = datastory::load_sources(story.sources(), base_dir(&args.in_path), story.primary())?;

    let mut records = data.joined().to_vec();
    if args.complete {
        let required: Vec<_> = data.measures().collect();
        datastory::retain_complete(&mut records, &required);
    }

    let json = serde_json::to_string_pretty(&records).context("serialize joined records")?;
    match &args.out {
        Some(out) => {
            ensure_parent(out)?;
            std::fs::write(out, json + "\n")
                .with_context(|| format!("write json '{}'", out.display()))?;
            eprintln!("wrote {} ({} records)", out.display(), records.len());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut sess = open_session(&args.in_path)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let container = sess.story().container().to_owned();
    for i in 0..sess.controller().len() {
        sess.controller_mut()
            .go_to(i)
            .with_context(|| format!("render scene {i}"))?;
        let surface = sess.controller().surface();

        let svg_path = args.out_dir.join(format!("scene-{:02}.svg", i + 1));
        surface.write_svg(&container, &svg_path)?;
        eprintln!("wrote {}", svg_path.display());

        if args.png {
            let png_path = svg_path.with_extension("png");
            surface.write_png(&container, &png_path)?;
            eprintln!("wrote {}", png_path.display());
        }
    }
    Ok(())
}

fn cmd_navigate(args: NavigateArgs) -> anyhow::Result<()> {
    let mut sess = open_session(&args.in_path)?;
    for step in &args.steps {
        sess.step(*step)
            .with_context(|| format!("apply step {step:?}"))?;
    }
    eprintln!(
        "phase {:?}, scene {} of {}",
        sess.controller().phase(),
        sess.controller().current_index() + 1,
        sess.controller().len()
    );

    ensure_parent(&args.out)?;
    let container = sess.story().container().to_owned();
    let surface = sess.controller().surface();
    let is_png = args
        .out
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    if is_png {
        surface.write_png(&container, &args.out)?;
    } else {
        surface.write_svg(&container, &args.out)?;
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
