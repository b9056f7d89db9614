use clap::{Parser, Subcommand};
use serde::Serialize;
use srcset_pick::config::{self, PickConfig};
use srcset_pick::{Candidate, ImageSource, QueryPoint, Step, output, parse};
use std::path::{Path, PathBuf};

/// Shared flag for commands that can emit JSON.
#[derive(clap::Args, Clone)]
struct OutputArgs {
    /// Print machine-readable JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct SelectArgs {
    /// Descriptor string, e.g. "small.jpg 600w, large.jpg 1200w"
    srcset: String,

    /// Viewport width in CSS pixels
    #[arg(long, allow_negative_numbers = true)]
    width: Option<f64>,

    /// Viewport height in CSS pixels
    #[arg(long, allow_negative_numbers = true)]
    height: Option<f64>,

    /// Device pixel ratio
    #[arg(long, visible_alias = "dpr", allow_negative_numbers = true)]
    pixel_ratio: Option<f64>,

    /// Start from a viewport preset defined in the config
    #[arg(long)]
    preset: Option<String>,

    /// The element's own src, competing as a 1x candidate
    #[arg(long)]
    src: Option<String>,

    /// Show the survivors of every filter step
    #[arg(long)]
    explain: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser)]
#[command(name = "srcset-pick")]
#[command(about = "Pick the best image candidate from a srcset for a viewport")]
#[command(long_about = "\
Pick the best image candidate from a srcset for a viewport

Descriptor strings are comma-separated `url descriptor...` groups, where each
descriptor is a width (800w), a height (600h) or a pixel ratio (2x):

  small.jpg 600w, large.jpg 1200w, large@2x.jpg 1200w 2x

Malformed groups are skipped. Selection first drops candidates smaller than
the viewport (keeping the largest when none is big enough), then keeps the
smallest of what is left, for width, height and pixel ratio in that order.

Viewport values come from, in order of priority: --width/--height/--pixel-ratio,
--preset, the [viewport] section of the config, stock defaults.

Run 'srcset-pick gen-config' to generate a documented srcset-pick.toml.")]
#[command(version)]
struct Cli {
    /// Config file [default: ./srcset-pick.toml when present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log skipped candidate groups and other details to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the candidates parsed from a descriptor string
    Parse {
        /// Descriptor string
        srcset: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the candidate URL selected for a viewport
    Select(SelectArgs),
    /// Print a stock srcset-pick.toml with all options documented
    GenConfig,
}

#[derive(Serialize)]
struct SelectReport<'a> {
    /// `None` when the set was empty and the viewport was never checked.
    query: Option<QueryPoint>,
    selected: Option<&'a Candidate>,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<Vec<Step<'a>>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Parse { srcset, output: out } => {
            let set = parse(srcset.as_str());
            if out.json {
                println!("{}", serde_json::to_string_pretty(&set)?);
            } else {
                output::print_parse_output(&set);
            }
        }
        Command::Select(args) => {
            let config = load_cli_config(cli.config.as_deref())?;

            let mut source = ImageSource::new(args.src.as_deref())
                .with_placeholder(config.output.placeholder.clone());
            source.set_srcset(Some(args.srcset.as_str()));

            // An empty set resolves to the placeholder for any viewport, so
            // the viewport is only validated once there is something to pick.
            let query = if source.candidates().is_empty() {
                None
            } else {
                Some(resolve_query(&config, &args)?)
            };

            let url = match &query {
                Some(query) => source.resolve(query),
                None => source.placeholder(),
            };
            let steps = args.explain.then(|| match &query {
                Some(query) => source.candidates().trace(query),
                None => Vec::new(),
            });

            if args.output.json {
                let report = SelectReport {
                    selected: query.as_ref().and_then(|q| source.select(q)),
                    query,
                    url,
                    steps,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if let Some(steps) = steps {
                output::print_explain_output(query.as_ref(), &steps, url);
            } else {
                println!("{}", url);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Route `log` records to stderr, keeping stdout for results.
///
/// `RUST_LOG` sets the baseline; `--verbose`/`--quiet` override it.
fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

/// Load the config named by `--config` (which must exist), or the optional
/// `srcset-pick.toml` in the working directory.
fn load_cli_config(path: Option<&Path>) -> Result<PickConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) if !path.exists() => {
            Err(format!("Config file not found: {}", path.display()).into())
        }
        Some(path) => Ok(config::load_config(path)?),
        None => Ok(config::load_config(Path::new(config::DEFAULT_CONFIG_FILE))?),
    }
}

/// Explicit flags override the preset (or default viewport) field by field.
fn resolve_query(
    config: &PickConfig,
    args: &SelectArgs,
) -> Result<QueryPoint, Box<dyn std::error::Error>> {
    let base = config.viewport_for(args.preset.as_deref())?;
    let query = QueryPoint::new(
        args.width.unwrap_or(f64::from(base.width)),
        args.height.unwrap_or(f64::from(base.height)),
        args.pixel_ratio.unwrap_or(base.pixel_ratio),
    )?;
    Ok(query)
}
