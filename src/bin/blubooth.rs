use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use blubooth::{
    ComposeOpts, CompositeEngine, CustomizationState, DirSaver, ExportAdapter, ExportMode,
    Filter, FsFetcher, ImageSource, LayoutRegistry, LogoLanguage, RecordingClient,
    TimestampFormat,
};

#[derive(Parser, Debug)]
#[command(name = "blubooth", version)]
struct Cli {
    /// Layout registry JSON; the built-in layouts are used when omitted.
    #[arg(long, global = true)]
    layouts: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available layouts.
    Layouts,
    /// Composite photos into a strip and write it as a JPEG.
    Compose(ComposeArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Layout id, e.g. `strip_4`.
    #[arg(long)]
    layout: String,

    /// Photo for the next slot, in order. Use `-` to leave a slot empty.
    #[arg(long = "frame")]
    frames: Vec<String>,

    /// Root directory for frame art and other asset references.
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Frame art id from the layout's catalog, or an asset reference.
    #[arg(long)]
    frame_art: Option<String>,

    /// none, bw, sepia, vivid or fade.
    #[arg(long, default_value = "none")]
    filter: String,

    #[arg(long, default_value_t = false)]
    no_logo: bool,

    /// en or vi.
    #[arg(long, default_value = "en")]
    logo_language: String,

    /// Print a timestamp: date, time or datetime.
    #[arg(long)]
    timestamp: Option<String>,

    /// Output multiplier over the layout's print size.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// TTF/OTF used for the logo and timestamp.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output JPEG path.
    #[arg(long, conflicts_with = "export_dir")]
    out: Option<PathBuf>,

    /// Save through the export adapter into this directory instead of `--out`.
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Print the composite report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    report: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = match &cli.layouts {
        Some(path) => LayoutRegistry::from_path(path)?,
        None => LayoutRegistry::builtin(),
    };
    match cli.cmd {
        Command::Layouts => cmd_layouts(&registry),
        Command::Compose(args) => cmd_compose(registry, args),
    }
}

fn cmd_layouts(registry: &LayoutRegistry) -> anyhow::Result<()> {
    for layout in registry.layouts() {
        let px = layout.output_pixels()?;
        println!(
            "{:<12} {:<28} frames={} {}x{}px",
            layout.id, layout.name, layout.frame_count, px.width, px.height
        );
    }
    Ok(())
}

fn parse_custom(args: &ComposeArgs, registry: &LayoutRegistry) -> anyhow::Result<CustomizationState> {
    let layout = registry.resolve(&args.layout)?;
    let mut custom = CustomizationState {
        show_logo: !args.no_logo,
        ..CustomizationState::default()
    };
    custom.filter = Filter::parse(&args.filter)
        .with_context(|| format!("unknown filter '{}'", args.filter))?;
    custom.logo_language = LogoLanguage::parse(&args.logo_language)
        .with_context(|| format!("unknown logo language '{}'", args.logo_language))?;
    if let Some(ts) = &args.timestamp {
        custom.show_timestamp = true;
        custom.timestamp_format = TimestampFormat::parse(ts)
            .with_context(|| format!("unknown timestamp format '{ts}'"))?;
    }
    custom.frame_art = args.frame_art.as_deref().map(|art| match layout.frame_art(art) {
        Some(entry) => ImageSource::from_reference(&entry.source),
        None => ImageSource::from_reference(art),
    });
    Ok(custom)
}

fn read_frames(args: &ComposeArgs, frame_count: usize) -> anyhow::Result<Vec<Option<ImageSource>>> {
    if args.frames.len() > frame_count {
        anyhow::bail!(
            "layout '{}' takes {} frames, got {}",
            args.layout,
            frame_count,
            args.frames.len()
        );
    }
    let mut frames = Vec::with_capacity(frame_count);
    for f in &args.frames {
        if f == "-" {
            frames.push(None);
            continue;
        }
        let bytes = std::fs::read(f).with_context(|| format!("read frame '{f}'"))?;
        frames.push(Some(ImageSource::encoded(bytes)));
    }
    frames.resize(frame_count, None);
    Ok(frames)
}

fn cmd_compose(registry: LayoutRegistry, args: ComposeArgs) -> anyhow::Result<()> {
    let custom = parse_custom(&args, &registry)?;
    let frame_count = registry.resolve(&args.layout)?.frame_count;
    let frames = read_frames(&args, frame_count)?;

    let font = match &args.font {
        Some(path) => Some(Arc::new(
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?,
        )),
        None => None,
    };
    let opts = ComposeOpts {
        scale: args.scale,
        font,
        ..ComposeOpts::default()
    };

    let engine = CompositeEngine::new(registry, Arc::new(FsFetcher::new(&args.assets)));
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("build tokio runtime")?;
    let result = rt.block_on(engine.compose_frames(
        &args.layout,
        &frames,
        Some(chrono::Utc::now()),
        &custom,
        &opts,
    ))?;

    if let Some(dir) = &args.export_dir {
        let mut adapter = ExportAdapter::new(
            Box::new(DirSaver::new(dir)),
            Box::new(RecordingClient::new()),
        );
        let report = adapter.finalize(&result, ExportMode::Download);
        match report.local_path {
            Some(path) => eprintln!("wrote {}", path.display()),
            None => anyhow::bail!(
                "export failed: {}",
                report.local_error.unwrap_or_default()
            ),
        }
    } else {
        let out = args
            .out
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.jpg", args.layout)));
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(&out, &result.encoded)
            .with_context(|| format!("write jpeg '{}'", out.display()))?;
        eprintln!(
            "wrote {} ({}x{})",
            out.display(),
            result.pixel_width,
            result.pixel_height
        );
    }

    if args.report {
        println!("{}", serde_json::to_string_pretty(&result.report)?);
    }
    Ok(())
}
