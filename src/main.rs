use anyhow::{bail, Context};
use clap::Parser;
use pixelnote::ppm::{self, Variant};
use pixelnote::EditorSession;
use std::fs::File;
use std::io::BufWriter;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;

fn main() -> anyhow::Result<()> {
    let args = cli::CliOpts::parse();
    init_logger(&args);

    match args.command {
        cli::Command::New(opts) => new_canvas(&opts),
        cli::Command::Paint(opts) => edit_canvas(&opts.canvas, |session| {
            session.choose_color(opts.color);
            for coordinate in &opts.at {
                session.paint(coordinate.x, coordinate.y);
            }
            Ok(())
        }),
        cli::Command::Erase(opts) => edit_canvas(&opts.canvas, |session| {
            session.use_eraser();
            for coordinate in &opts.at {
                session.paint(coordinate.x, coordinate.y);
            }
            Ok(())
        }),
        cli::Command::Annotate(opts) => edit_canvas(&opts.canvas, |session| {
            if !session.annotate(opts.at.x, opts.at.y, &opts.text) {
                bail!("Cannot annotate {} with {:?}", opts.at, opts.text);
            }
            Ok(())
        }),
        cli::Command::Fill(opts) => edit_canvas(&opts.canvas, |session| {
            session.choose_color(opts.color);
            session.fill_area(opts.from, opts.to, opts.text.as_deref());
            Ok(())
        }),
        cli::Command::Inspect(opts) => inspect(&opts),
        cli::Command::Convert(opts) => convert(&opts),
    }
}

/// Configure a tracing subscriber whose level is derived from the `-v` and `-q` flags
fn init_logger(args: &cli::CliOpts) {
    let level = match 2 + args.verbose as i16 - args.quiet as i16 {
        i16::MIN..=-1 => LevelFilter::OFF,
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        4..=i16::MAX => LevelFilter::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();
}

fn new_canvas(opts: &cli::NewData) -> anyhow::Result<()> {
    let path = &opts.canvas.file;
    if path.exists() && !opts.force {
        bail!("{} already exists, pass --force to overwrite it", path.display());
    }

    let session = EditorSession::new(opts.canvas.width, opts.canvas.height)?;
    session.save_file(path, opts.canvas.variant.unwrap_or(Variant::P3))
}

/// Load a canvas file, apply `edit` to it and save it back into the same file
fn edit_canvas<F>(opts: &cli::CanvasOpts, edit: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut EditorSession) -> anyhow::Result<()>,
{
    let mut session = EditorSession::new(opts.width, opts.height)?;
    let file_variant = session.open_file(&opts.file)?;
    edit(&mut session)?;
    session.save_file(&opts.file, opts.variant.unwrap_or(file_variant))
}

fn inspect(opts: &cli::InspectData) -> anyhow::Result<()> {
    let file = File::open(&opts.file).with_context(|| format!("Could not open {}", opts.file.display()))?;
    let image = ppm::read(file, None).with_context(|| format!("Could not decode {}", opts.file.display()))?;

    println!("{}", opts.file.display());
    println!("  variant:     {}", image.variant);
    println!("  size:        {}x{}", image.width, image.height);
    println!("  annotations: {}", image.metadata.len());
    let canvas = image.into_canvas()?;
    for (coordinate, text) in canvas.metadata() {
        println!(
            "    {} {} {}",
            coordinate,
            canvas.get_pixel(coordinate.x, coordinate.y),
            text
        );
    }
    Ok(())
}

fn convert(opts: &cli::ConvertData) -> anyhow::Result<()> {
    let input = File::open(&opts.input).with_context(|| format!("Could not open {}", opts.input.display()))?;
    let image = ppm::read(input, None).with_context(|| format!("Could not decode {}", opts.input.display()))?;
    tracing::debug!("Converting {} file {} into {}", image.variant, opts.input.display(), opts.variant);

    let output = File::create(&opts.output).with_context(|| format!("Could not create {}", opts.output.display()))?;
    ppm::encode_to(&image.into_canvas()?, opts.variant, BufWriter::new(output))
        .with_context(|| format!("Could not write {}", opts.output.display()))?;
    tracing::info!("Wrote {} as {}", opts.output.display(), opts.variant);
    Ok(())
}
