//! bindery - EPUB 3 package builder

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bindery::io::DirSource;
use bindery::util::escape_xml;
use bindery::{DepthPolicy, EpubAssembler, EpubConfig, OutlineEntry, Package, verify_epub_file};

#[derive(Parser)]
#[command(name = "bindery")]
#[command(version, about = "EPUB 3 package builder", long_about = None)]
#[command(after_help = "EXAMPLES:
    bindery build book.json -o book.epub    Package a built document tree
    bindery check book.epub                 Verify an existing package")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Suppress output messages
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a package from a JSON project description
    Build {
        /// Project description (metadata, manifest, spine, guide, outline)
        #[arg(value_name = "PROJECT")]
        project: PathBuf,

        /// Output file (defaults to the project's `output`)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Directory holding the manifest files (defaults to the project's `source_dir`)
        #[arg(short, long, value_name = "DIR")]
        source: Option<PathBuf>,

        /// Cap outline entries that skip levels instead of failing
        #[arg(long)]
        clamp: bool,
    },
    /// Verify the container invariants of an EPUB file
    Check {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

/// Build options carried in the project file.
#[derive(Deserialize, Default)]
#[serde(default)]
struct ProjectOptions {
    compression_level: Option<u32>,
    content_dir: Option<String>,
    depth_policy: DepthPolicy,
    toc_depth: Option<usize>,
    nav_in_spine: Option<bool>,
}

/// JSON project description. Text fields are plain and get escaped here.
#[derive(Deserialize)]
struct Project {
    #[serde(default)]
    source_dir: Option<PathBuf>,
    #[serde(default)]
    output: Option<PathBuf>,
    #[serde(default)]
    options: ProjectOptions,
    #[serde(flatten)]
    package: Package,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let result = match cli.command {
        Command::Build {
            project,
            output,
            source,
            clamp,
        } => build(&project, output, source, clamp, cli.quiet),
        Command::Check { input } => check(&input, cli.quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "bindery=warn" } else { "bindery=info" };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build(
    project_path: &Path,
    output: Option<PathBuf>,
    source: Option<PathBuf>,
    clamp: bool,
    quiet: bool,
) -> Result<(), String> {
    let text = std::fs::read_to_string(project_path).map_err(|e| e.to_string())?;
    let project: Project = serde_json::from_str(&text).map_err(|e| e.to_string())?;
    let base = project_path.parent().unwrap_or(Path::new("."));

    let source_dir = source
        .or(project.source_dir.map(|dir| base.join(dir)))
        .unwrap_or_else(|| base.to_path_buf());
    let output = output
        .or(project.output.map(|out| base.join(out)))
        .ok_or("no output path given (use -o or set \"output\")")?;

    let options = project.options;
    let defaults = EpubConfig::default();
    let config = EpubConfig {
        compression_level: options.compression_level,
        content_dir: options.content_dir.unwrap_or(defaults.content_dir),
        depth_policy: if clamp {
            DepthPolicy::Clamp
        } else {
            options.depth_policy
        },
        toc_depth: options.toc_depth,
        nav_in_spine: options.nav_in_spine.unwrap_or(defaults.nav_in_spine),
        ..defaults
    };

    let package = escape_package(project.package);
    EpubAssembler::new()
        .with_config(config)
        .write_to_path(&package, &DirSource::new(&source_dir), &output)
        .map_err(|e| e.to_string())?;

    if !quiet {
        println!("Wrote {}", output.display());
    }
    Ok(())
}

fn check(path: &Path, quiet: bool) -> Result<(), String> {
    let report = verify_epub_file(path).map_err(|e| e.to_string())?;
    if !quiet {
        println!("File: {}", path.display());
        println!("Package document: {}", report.package_path);
        println!("Navigation document: {}", report.nav_path);
        println!("Unique identifier: {}", report.unique_identifier);
        println!("Manifest items: {}", report.manifest_items);
        println!("Spine items: {}", report.spine_items);
        println!("Archive entries: {}", report.archive_entries);
    }
    Ok(())
}

/// Escape the human-written text of a project for markup.
fn escape_package(mut package: Package) -> Package {
    let meta = &mut package.metadata;
    for field in [
        &mut meta.language,
        &mut meta.title,
        &mut meta.creator,
        &mut meta.publisher,
        &mut meta.rights,
        &mut meta.identifier,
        &mut meta.date,
        &mut meta.modified,
        &mut meta.toc_title,
    ] {
        *field = escape_xml(field);
    }
    for reference in &mut package.guide {
        reference.title = escape_xml(&reference.title);
    }
    package.outline = package
        .outline
        .entries()
        .iter()
        .map(|e| OutlineEntry::new(e.depth, escape_xml(&e.title), escape_xml(&e.target)))
        .collect();
    package
}
