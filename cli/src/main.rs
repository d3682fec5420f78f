use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jsonschema_descriptor_core::{compile, compile_pointer, list_components, CompileOptions};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "jsonschema-descriptor")]
#[command(about = "Compile any JSON Schema into a runtime-validator descriptor")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON Schema file to descriptor text
    Compile {
        /// Input JSON Schema file
        input: PathBuf,

        /// Output descriptor file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compile only the component at this JSON Pointer, resolving local
        /// $refs against the whole document
        #[arg(long)]
        pointer: Option<String>,

        /// Re-entry budget for self-referential schemas (cycles unroll this
        /// many times before degrading to the accept-anything descriptor)
        #[arg(long)]
        depth_limit: Option<usize>,

        /// Drop description annotations from the output
        #[arg(long)]
        suppress_descriptions: bool,

        /// Drop defaultValue annotations from the output
        #[arg(long)]
        suppress_defaults: bool,

        /// Re-serialize the descriptor with indentation
        #[arg(long)]
        pretty: bool,
    },

    /// List the component pointers a schema document declares
    Components {
        /// Input JSON Schema file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for descriptor output
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compile {
            input,
            output,
            pointer,
            depth_limit,
            suppress_descriptions,
            suppress_defaults,
            pretty,
        } => {
            let schema = read_schema(&input)?;

            let options = CompileOptions {
                depth_limit,
                suppress_descriptions,
                suppress_defaults,
                parser_override: None,
            };

            let descriptor = match pointer {
                Some(pointer) => compile_pointer(&schema, &pointer, &options)
                    .with_context(|| format!("Failed to compile component at {pointer}"))?,
                None => compile(&schema, &options),
            };

            write_descriptor(&descriptor, output.as_ref(), pretty)?;
        }
        Commands::Components { input } => {
            let schema = read_schema(&input)?;
            let mut writer = BufWriter::new(io::stdout());
            for pointer in list_components(&schema) {
                writeln!(writer, "{pointer}").context("Failed to write component list")?;
            }
        }
    }

    Ok(())
}

fn read_schema(input: &PathBuf) -> Result<serde_json::Value> {
    let file = File::open(input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse schema from: {}", input.display()))
}

fn write_descriptor(descriptor: &str, path: Option<&PathBuf>, pretty: bool) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    if pretty {
        // The descriptor is one JSON expression; round-trip it through Value
        // for indentation.
        let parsed: serde_json::Value =
            serde_json::from_str(descriptor).context("Descriptor text is not valid JSON")?;
        serde_json::to_writer_pretty(&mut writer, &parsed)
            .context("Failed to write descriptor")?;
    } else {
        writer
            .write_all(descriptor.as_bytes())
            .context("Failed to write descriptor")?;
    }

    // Ensure trailing newline
    writeln!(writer).context("Failed to write trailing newline")?;

    Ok(())
}
