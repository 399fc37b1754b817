use anyhow::{anyhow, Context};
use clap::{ArgAction, Args, Parser, Subcommand};
use pixelnote::ppm::Variant;
use pixelnote::{Color, Coordinate};
use std::path::PathBuf;

/// Command-Line arguments as a well formatted struct, parsed using clap.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub(crate) struct CliOpts {
    #[command(subcommand)]
    pub command: Command,

    /// Increase program verbosity
    ///
    /// The default verbosity level is INFO.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, default_value = "0")]
    pub verbose: u8,

    /// Decrease program verbosity
    ///
    /// The default verbosity level is INFO.
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, default_value = "0")]
    pub quiet: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Create a new blank canvas file
    New(NewData),
    /// Paint pixels of an existing canvas file with a color
    Paint(PaintData),
    /// Erase pixels of an existing canvas file, dropping their annotations
    Erase(EraseData),
    /// Attach an annotation to one pixel of an existing canvas file
    Annotate(AnnotateData),
    /// Paint (and optionally annotate) a rectangular area of an existing canvas file
    Fill(FillData),
    /// Print size, encoding and annotations of a canvas file
    Inspect(InspectData),
    /// Rewrite a canvas file using a different pixel encoding
    Convert(ConvertData),
}

/// Options describing the canvas that files are loaded into
#[derive(Args, Debug, Clone)]
pub(crate) struct CanvasOpts {
    /// Path of the canvas file
    pub file: PathBuf,

    /// width of the canvas
    ///
    /// Files with a different width are refused.
    #[arg(short = 'x', long = "width", default_value = "32")]
    pub width: usize,

    /// height of the canvas
    ///
    /// Files with a different height are refused.
    #[arg(short = 'y', long = "height", default_value = "26")]
    pub height: usize,

    /// Pixel encoding with which the file is saved
    ///
    /// Possible values: ["P3", "P6"]. Defaults to the encoding the file already uses.
    #[arg(long = "variant")]
    pub variant: Option<Variant>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct NewData {
    #[command(flatten)]
    pub canvas: CanvasOpts,

    /// Overwrite the file if it already exists
    #[arg(long = "force")]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct PaintData {
    #[command(flatten)]
    pub canvas: CanvasOpts,

    /// Pixels that should be painted, given as `X,Y`
    #[arg(long = "at", required = true, num_args = 1.., value_parser = parse_coordinate)]
    pub at: Vec<Coordinate>,

    /// The color to paint with, given as `#RRGGBB`
    #[arg(short = 'c', long = "color")]
    pub color: Color,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct EraseData {
    #[command(flatten)]
    pub canvas: CanvasOpts,

    /// Pixels that should be erased, given as `X,Y`
    #[arg(long = "at", required = true, num_args = 1.., value_parser = parse_coordinate)]
    pub at: Vec<Coordinate>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct AnnotateData {
    #[command(flatten)]
    pub canvas: CanvasOpts,

    /// Pixel that should be annotated, given as `X,Y`
    #[arg(long = "at", value_parser = parse_coordinate)]
    pub at: Coordinate,

    /// The annotation text
    #[arg(short = 't', long = "text")]
    pub text: String,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct FillData {
    #[command(flatten)]
    pub canvas: CanvasOpts,

    /// One corner of the area, given as `X,Y`
    #[arg(long = "from", value_parser = parse_coordinate)]
    pub from: Coordinate,

    /// The opposite corner of the area, given as `X,Y`
    #[arg(long = "to", value_parser = parse_coordinate)]
    pub to: Coordinate,

    /// The color to fill the area with, given as `#RRGGBB`
    #[arg(short = 'c', long = "color", default_value = "#000000")]
    pub color: Color,

    /// An annotation that is attached to every pixel of the area
    #[arg(short = 't', long = "text")]
    pub text: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct InspectData {
    /// Path of the canvas file
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ConvertData {
    /// Path of the file that should be converted
    pub input: PathBuf,

    /// Path at which the converted file is written
    pub output: PathBuf,

    /// Pixel encoding of the converted file
    ///
    /// Possible values: ["P3", "P6"]
    #[arg(long = "variant")]
    pub variant: Variant,
}

/// Parse a grid coordinate given as `X,Y`
fn parse_coordinate(s: &str) -> anyhow::Result<Coordinate> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| anyhow!("coordinate '{}' is not of the form X,Y", s))?;
    let x = x.trim().parse().with_context(|| format!("invalid x coordinate in '{}'", s))?;
    let y = y.trim().parse().with_context(|| format!("invalid y coordinate in '{}'", s))?;
    Ok(Coordinate::new(x, y))
}
