//! Exports an app icon set from a marketing image.
//!
//! ```shell
//! appicon marketing.png -o Icons
//! appicon marketing.png --builtin mac -m extra.json --deliver-to ~/Desktop
//! ```

use appicon::{CopyDelivery, Delivery, ExportOptions, IconExportEngine, Image,
              ManifestSource, SizePolicy};
use clap::Parser;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Parser)]
#[command(name = "appicon",
          version,
          about = "Export app icons for iPhone, iPad, Watch and Mac")]
struct Args {
    /// Source marketing image (PNG or JPEG).
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Output directory; recreated on every run.
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Manifest file to load (repeatable).
    #[arg(short, long = "manifest", value_name = "FILE")]
    manifests: Vec<PathBuf>,

    /// Built-in manifest to load: app, watch or mac (repeatable).
    #[arg(long = "builtin", value_name = "NAME")]
    builtins: Vec<String>,

    /// Treat every size as square, using only its first dimension.
    #[arg(long)]
    square: bool,

    /// Render icons in parallel.
    #[arg(long)]
    parallel: bool,

    /// Copy the finished icon directory into this directory.
    #[arg(long, value_name = "DIR")]
    deliver_to: Option<PathBuf>,

    /// Log every written file.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn sources(&self) -> Vec<ManifestSource> {
        let mut sources: Vec<ManifestSource> = self.builtins
            .iter()
            .map(|name| ManifestSource::Builtin(name.clone()))
            .collect();
        sources.extend(self.manifests.iter().cloned().map(ManifestSource::File));
        if sources.is_empty() {
            sources = ManifestSource::defaults();
        }
        sources
    }

    fn options(&self) -> ExportOptions {
        ExportOptions {
            size_policy: if self.square {
                SizePolicy::Square
            } else {
                SizePolicy::Explicit
            },
            parallel: self.parallel,
        }
    }

    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

fn run(args: &Args) -> appicon::Result<()> {
    let output = args.output
                     .clone()
                     .unwrap_or_else(|| std::env::temp_dir().join("Icons"));
    let sources = args.sources();
    let image = Image::open(&args.image)?;

    let mut engine = IconExportEngine::new(image, output)
        .with_options(args.options());
    engine.load(&sources)?;
    let summary = engine.generate_icons()?;
    log::debug!("{} written, {} skipped",
                summary.written.len(),
                summary.skipped.len());

    if let Some(destination) = &args.deliver_to {
        CopyDelivery.deliver(engine.output_root(), destination)?;
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level()),
    ).init();

    if let Err(err) = run(&args) {
        log::error!("{}", err);
        process::exit(1);
    }
}
