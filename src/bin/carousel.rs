use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use carousel::{
    CanvasState, Color, CpuSurface, CpuSurfaceOpts, DirArchive, EncodedImage,
    ExportOpts, ImageEncoding, ImageStore, InMemoryArchive, LAYOUT_TEMPLATES, LayerKind,
    LayerPatch, SlideAspect, SlideGrid, SnapshotOpts,
};
use clap::{Parser, Subcommand, ValueEnum};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "carousel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the layout template catalog.
    Templates,
    /// Print the layers a template expands to, as JSON.
    Layout(LayoutArgs),
    /// Rasterize every slide and write them as `<out>/<name>/slide-N.<ext>`.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Template id (see `templates`).
    #[arg(long)]
    template: String,

    /// Target slide (0-based).
    #[arg(long, default_value_t = 0)]
    slide: u32,

    /// Slide aspect.
    #[arg(long, value_enum, default_value_t = AspectChoice::Square)]
    aspect: AspectChoice,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Canvas document JSON. When omitted, a fresh canvas is built from the flags below.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Template applied before export.
    #[arg(long)]
    template: Option<String>,

    /// Slide the template is applied to (0-based).
    #[arg(long, default_value_t = 0)]
    slide: u32,

    /// Images filling the template's empty frames in order; extra images are uploaded.
    #[arg(long = "image")]
    images: Vec<PathBuf>,

    /// Number of slides (fresh canvas only).
    #[arg(long, default_value_t = 3)]
    slides: u32,

    /// Slide aspect (fresh canvas only).
    #[arg(long, value_enum, default_value_t = AspectChoice::Square)]
    aspect: AspectChoice,

    /// Background color as `#rrggbb`.
    #[arg(long)]
    background: Option<Color>,

    /// Font file used for text layers. Text is skipped without one.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output root directory.
    #[arg(long)]
    out: PathBuf,

    /// Archive name (subdirectory under `--out`).
    #[arg(long, default_value = carousel::encode::archive::DEFAULT_ARCHIVE_NAME)]
    name: String,

    /// Encode slides as PNG instead of JPEG.
    #[arg(long)]
    png: bool,

    /// Supersampling factor.
    #[arg(long, default_value_t = carousel::EXPORT_PIXEL_RATIO)]
    pixel_ratio: f64,

    /// Render without packaging; only prints what would be written.
    #[arg(long)]
    preview: bool,

    /// Print the SHA-256 of every encoded slide.
    #[arg(long)]
    digests: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AspectChoice {
    Square,
    Portrait,
}

impl From<AspectChoice> for SlideAspect {
    fn from(value: AspectChoice) -> Self {
        match value {
            AspectChoice::Square => SlideAspect::Square,
            AspectChoice::Portrait => SlideAspect::Portrait,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Templates => cmd_templates(),
        Command::Layout(args) => cmd_layout(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn cmd_templates() -> anyhow::Result<()> {
    for t in LAYOUT_TEMPLATES {
        println!("{:<16} {:<24} {} slots", t.id, t.name, t.items.len());
    }
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    if carousel::find_template(&args.template).is_none() {
        anyhow::bail!("unknown template '{}'", args.template);
    }
    let grid = SlideGrid::new(args.slide + 1, args.aspect.into())?;
    let layers = carousel::scene::template::apply_template(
        &args.template,
        args.slide,
        grid.slide_width(),
        grid.slide_height(),
    );
    println!("{}", serde_json::to_string_pretty(&layers)?);
    Ok(())
}

fn read_canvas_json(path: &Path) -> anyhow::Result<CanvasState> {
    let f = File::open(path).with_context(|| format!("open canvas '{}'", path.display()))?;
    let r = BufReader::new(f);
    let state: CanvasState =
        serde_json::from_reader(r).with_context(|| "parse canvas JSON")?;
    Ok(state)
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut state = match &args.in_path {
        Some(path) => read_canvas_json(path)?,
        None => {
            let mut state = CanvasState::new();
            state.set_slide_count(args.slides)?;
            state.set_aspect(args.aspect.into());
            state
        }
    };
    if let Some(bg) = args.background {
        state.set_background(bg);
    }

    let mut images = ImageStore::new();
    let mut loaded = Vec::with_capacity(args.images.len());
    for path in &args.images {
        loaded.push(images.load_file(path)?);
    }

    let mut frames = Vec::new();
    if let Some(id) = &args.template {
        if carousel::find_template(id).is_none() {
            anyhow::bail!("unknown template '{id}'");
        }
        frames = state
            .apply_template(id, args.slide)
            .into_iter()
            .filter(|lid| {
                matches!(
                    state.layer(lid).map(|l| &l.kind),
                    Some(LayerKind::Image(img)) if img.source.is_none()
                )
            })
            .collect();
    }

    let mut loaded = loaded.into_iter();
    for (frame, (key, _)) in frames.iter().zip(loaded.by_ref()) {
        let patch = LayerPatch {
            source: Some(key),
            ..LayerPatch::default()
        };
        state.update_layer(frame, &patch)?;
    }
    for (key, natural) in loaded {
        state.upload_image(natural, key)?;
    }

    let font_bytes = args
        .font
        .as_ref()
        .map(|p| std::fs::read(p).with_context(|| format!("read font '{}'", p.display())))
        .transpose()?;
    let surface_opts = CpuSurfaceOpts::default().with_font_bytes(font_bytes);
    let mut surface = CpuSurface::new(surface_opts)?;
    surface.attach(&state, &images);

    let encoding = if args.png {
        ImageEncoding::Png
    } else {
        ImageEncoding::Jpeg
    };
    let snapshot = SnapshotOpts::default()
        .with_encoding(encoding)
        .with_pixel_ratio(args.pixel_ratio);

    if args.preview {
        let slides = carousel::preview_carousel(&mut surface, state.slides(), &snapshot)?;
        let mut sink = InMemoryArchive::new();
        let names = carousel::encode::archive::package_slides(&mut sink, &args.name, &slides)?;
        report(&names, &slides, args.digests);
        eprintln!("preview only; nothing written");
        return Ok(());
    }

    let mut sink = DirArchive::new(&args.out);
    let opts = ExportOpts {
        snapshot,
        archive_name: args.name.clone(),
    };
    let stats = carousel::export_carousel(
        &mut surface,
        state.slides(),
        &mut sink,
        &opts,
    )?;
    if args.digests {
        for (name, path) in stats.entries.iter().zip(sink.written()) {
            let bytes =
                std::fs::read(path).with_context(|| format!("read back '{}'", path.display()))?;
            println!("{name} {}", sha256_hex(&bytes));
        }
    }

    match sink.archive_dir() {
        Some(dir) => eprintln!("wrote {} slides to {}", stats.entries.len(), dir.display()),
        None => eprintln!("nothing exported"),
    }
    Ok(())
}

fn report(names: &[String], slides: &[EncodedImage], digests: bool) {
    for (name, image) in names.iter().zip(slides) {
        if digests {
            println!(
                "{name} {}x{} {}",
                image.width,
                image.height,
                sha256_hex(&image.bytes)
            );
        } else {
            println!("{name} {}x{} {} bytes", image.width, image.height, image.bytes.len());
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
