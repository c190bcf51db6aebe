use clap::{Parser, Subcommand};
use passprint::{archive, config, output, render};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "passprint")]
#[command(about = "Render wallet passes (.pkpass) as printable PDFs")]
#[command(long_about = "\
Render wallet passes (.pkpass) as printable PDFs

A .pkpass file is a ZIP archive:

  Event.pkpass
  ├── pass.json          # Manifest: style, fields, barcode, colors (required)
  ├── logo.png           # Header logo (@2x/@3x variants preferred)
  ├── icon.png           # Not drawn; listed by inspect
  ├── strip.png          # Full-width banner under the header
  ├── thumbnail.png      # Right side of the header
  ├── footer.png         # Above the barcode
  └── signature          # Ignored

The PDF has one page, or two when the back fields don't fit under the
barcode. Layout constants (page size, type sizes, page-break threshold)
can be overridden with --config.

Run 'passprint gen-config' to generate a documented passprint.toml.")]
#[command(version)]
struct Cli {
    /// Layout overrides (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log what was skipped or degraded (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a pass archive to PDF
    Convert {
        /// Pass archive (.pkpass)
        input: PathBuf,
        /// Output PDF (defaults to the input path with a .pdf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the normalized contents of a pass archive
    Inspect {
        /// Pass archive (.pkpass)
        input: PathBuf,
    },
    /// Print a stock passprint.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Convert { input, output } => {
            let render_config = config::load_or_default(cli.config.as_deref())?;
            let pass = archive::parse_file(&input)?;
            let output = output.unwrap_or_else(|| default_output_path(&input));

            // Render fully in memory so a failed run leaves no partial file behind.
            let mut document = Vec::new();
            let summary = render::render(&pass, &render_config, &mut document)?;
            std::fs::write(&output, &document)?;
            output::print_convert_summary(&input, &output, &summary);
        }
        Command::Inspect { input } => {
            let pass = archive::parse_file(&input)?;
            output::print_pass_summary(&pass);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("pdf")
}
