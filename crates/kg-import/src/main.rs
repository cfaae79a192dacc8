use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Parser;
use kg_default_nodes::{
    ConversionContext, Html5Documents, ImportOptions, KoenigNode, default_conversions, import_html,
};
use miette::{IntoDiagnostic, Result};
use serde_json::Value;

mod config;

use config::Config;

#[derive(Parser)]
#[command(version, about = "Convert HTML into Koenig editor node JSON", long_about = None)]
struct Cli {
    /// HTML file to import. Reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, env = "KG_IMPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Clean caption markup before joining multiple captions
    #[arg(long)]
    sanitize_captions: bool,

    /// Only emit code blocks, dropping the paragraph fallback
    #[arg(long)]
    code_only: bool,

    /// Log at debug level when RUST_LOG is unset
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Flags win over the config file.
    fn import_options(&self, config: &Config) -> ImportOptions {
        let mut options = config.import.clone();
        if self.sanitize_captions {
            options.sanitize_captions = true;
        }
        if self.code_only {
            options.paragraph_fallback = false;
        }
        options
    }
}

fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    let options = cli.import_options(&config);
    let pretty = cli.pretty || config.output.pretty;
    tracing::debug!(?options, pretty, "resolved import options");

    let html = read_input(cli.input.as_deref())?;
    let ctx = ConversionContext::new(&Html5Documents, &options);
    let nodes = import_html(&html, &default_conversions(), &ctx);
    tracing::info!(
        nodes = nodes.len(),
        code_blocks = nodes.iter().filter(|n| n.as_code_block().is_some()).count(),
        "import finished"
    );

    let exported: Vec<Value> = nodes.iter().map(KoenigNode::export_json).collect();
    let json = if pretty {
        serde_json::to_string_pretty(&exported)
    } else {
        serde_json::to_string(&exported)
    }
    .into_diagnostic()?;
    println!("{json}");

    Ok(())
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => {
            tracing::debug!(path = %path.display(), "reading input file");
            std::fs::read_to_string(path)
                .into_diagnostic()
                .map_err(|err| err.wrap_err(format!("failed to read {}", path.display())))
        }
        _ => {
            let mut html = String::new();
            std::io::stdin()
                .read_to_string(&mut html)
                .into_diagnostic()?;
            Ok(html)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .context_lines(3)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from(["kg-import", "--sanitize-captions", "--code-only", "in.html"]);
        let options = cli.import_options(&Config::default());
        assert!(options.sanitize_captions);
        assert!(!options.paragraph_fallback);
        assert_eq!(cli.input.as_deref(), Some(Path::new("in.html")));
    }

    #[test]
    fn test_config_used_without_flags() {
        let cli = Cli::parse_from(["kg-import"]);
        let mut config = Config::default();
        config.import.sanitize_captions = true;
        let options = cli.import_options(&config);
        assert!(options.sanitize_captions);
        assert!(options.paragraph_fallback);
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
