use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use atlas_prep_core::font::trim::glyph_trim_rects;
use atlas_prep_core::prelude::*;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

mod command_file;

use command_file::CommandFile;

#[derive(Parser, Debug)]
#[command(
    name = "atlas-prep",
    about = "Resolve atlas commands and normalize bitmap fonts",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a YAML/JSON command file against a source tree
    Resolve(ResolveArgs),
    /// Normalize a single BMFont (.fnt) or msdf-atlas-gen (.json) font
    Font(FontArgs),
}

#[derive(Parser, Debug, Clone)]
struct ResolveArgs {
    /// Command file (.yaml/.yml or .json)
    commands: PathBuf,
    /// Root the command paths are relative to
    #[arg(long, default_value = ".")]
    src: PathBuf,
    /// Output root used for license destinations
    #[arg(long, default_value = "out")]
    dst: PathBuf,
    /// Report format: json|yaml
    #[arg(long, default_value = "json")]
    format: String,
    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
struct FontArgs {
    /// Font descriptor (.fnt or .json)
    input: PathBuf,
    /// Font type: bitmap|sdf|msdf|mtsdf
    #[arg(long = "type", default_value = "bitmap", help_heading = "Font")]
    font_type: String,
    /// DPI the font was rendered for
    #[arg(long, default_value_t = 160, help_heading = "Font")]
    dpi: u16,
    /// Output name (defaults to the input file stem)
    #[arg(long, help_heading = "Font")]
    name: Option<String>,

    /// Desired baseline in px (0 keeps the source baseline)
    #[arg(long, default_value_t = 0, help_heading = "Tweak")]
    base_line: u16,
    /// Line spacing in px (0 keeps the derived value)
    #[arg(long, default_value_t = 0, help_heading = "Tweak")]
    line_spacing: u16,
    /// Char id whose height is checked against --measure-height
    #[arg(long, default_value_t = 0, help_heading = "Tweak")]
    measure_char: u32,
    /// Expected height of --measure-char in px
    #[arg(long, default_value_t = 0, help_heading = "Tweak")]
    measure_height: u16,

    /// SDF spread override (0 keeps the descriptor value)
    #[arg(long, help_heading = "SDF")]
    sdf_spread: Option<f32>,
    /// Desired SDF baseline in px
    #[arg(long, default_value_t = 0, help_heading = "SDF")]
    sdf_base_line: u16,

    /// Emit the range-compressed basic font instead of the full model
    #[arg(long, default_value_t = false, help_heading = "Output")]
    basic: bool,
    /// Glyph texture used to trim basic font records
    #[arg(long, help_heading = "Output")]
    texture: Option<PathBuf>,
    /// Alpha threshold for glyph trimming (0..=255)
    #[arg(long, default_value_t = 0, help_heading = "Output")]
    trim_threshold: u8,
    /// Write JSON to a file instead of stdout
    #[arg(short, long, help_heading = "Output")]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Resolve(args) => run_resolve(args),
        Commands::Font(args) => run_font(args),
    }
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    commands: &'a [ResolvedAtlasCommand],
    licenses: &'a [LicenseRecord],
}

fn run_resolve(args: &ResolveArgs) -> anyhow::Result<()> {
    let file = CommandFile::load(&args.commands)?;
    let image_extensions = file.image_extensions();
    let commands = file.commands()?;

    let mut licenses = LicenseRecorder::default();
    let resolved = {
        let mut ctx = ResolveContext {
            src_root: args.src.clone(),
            dst_root: args.dst.clone(),
            path_resolver: PathResolver::new(),
            filename_analyzer: &ConventionFilenameAnalyzer,
            license_manager: &mut licenses,
            image_extensions,
        };
        resolve_commands(&commands, &mut ctx)
            .with_context(|| format!("resolve {}", args.commands.display()))?
    };

    let report = ResolveReport {
        commands: &resolved,
        licenses: licenses.records(),
    };
    let text = match args.format.to_ascii_lowercase().as_str() {
        "json" => serde_json::to_string_pretty(&report)?,
        "yaml" | "yml" => serde_yaml::to_string(&report)?,
        other => return Err(anyhow!("unknown format: {other} (expected json|yaml)")),
    };
    info!(
        commands = resolved.len(),
        licenses = licenses.records().len(),
        "resolve finished"
    );
    write_output(args.out.as_deref(), &text)
}

fn run_font(args: &FontArgs) -> anyhow::Result<()> {
    let font_type: BitmapFontType = args
        .font_type
        .parse()
        .map_err(|_| anyhow!("unknown font type: {}", args.font_type))?;
    let src_root = args
        .input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("invalid font path: {}", args.input.display()))?;

    let tweak = BitmapFontTweakConfig {
        base_line_px: args.base_line,
        line_spacing_px: args.line_spacing,
        measure_char_id: args.measure_char,
        measure_height_px: args.measure_height,
    };
    let sdf = args.sdf_spread.map(|spread| SdfFontConfig {
        spread,
        desired_base_line_px: args.sdf_base_line,
    });
    let format = if args.basic {
        FontOutputFormat::Basic
    } else {
        FontOutputFormat::Json
    };
    let element = AtlasElementConfig::builder().default_dpi(args.dpi).build();
    let cmd = AtlasCommand::AddBitmapFont(AtlasCommandAddBitmapFont::new(
        element,
        file_name,
        font_type,
        BTreeSet::from([format]),
        args.name.clone(),
        tweak,
        sdf,
    )?);

    let mut licenses = LicenseRecorder::default();
    let resolved = {
        let mut ctx = ResolveContext {
            src_root,
            dst_root: PathBuf::from("."),
            path_resolver: PathResolver::new(),
            filename_analyzer: &ConventionFilenameAnalyzer,
            license_manager: &mut licenses,
            image_extensions: ImageExtensions::default(),
        };
        cmd.resolve(&mut ctx)?
    };
    let font_cmd = match resolved {
        ResolvedAtlasCommand::AddBitmapFont(cmd) => cmd,
        other => return Err(anyhow!("font command resolved into {other:?}")),
    };

    let font = load_bitmap_font(&font_cmd)
        .with_context(|| format!("load font {}", args.input.display()))?;
    info!(
        name = %font.name,
        chars = font.chars.len(),
        base_line = font.base_line_px,
        line_spacing = font.line_spacing_px,
        "font normalized"
    );

    let text = if args.basic {
        let trim_rects = match &args.texture {
            Some(path) => {
                let texture = image::open(path)
                    .with_context(|| format!("open texture {}", path.display()))?
                    .to_rgba8();
                glyph_trim_rects(&font, &texture, args.trim_threshold)
            }
            None => HashMap::new(),
        };
        let basic = to_basic_font(&font, &trim_rects);
        info!(
            ranges = basic.ranges.len(),
            glyphs = basic.kernings.len(),
            "basic font built"
        );
        serde_json::to_string_pretty(&basic)?
    } else {
        serde_json::to_string_pretty(&font)?
    };
    write_output(args.out.as_deref(), &text)
}

fn write_output(out: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("create dir {}", dir.display()))?;
            }
            fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "wrote output");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
