//! `abbrex` command line: expand one abbreviation, list the loaded
//! resources, write a starter config, or open the live preview.

mod preview;

use std::io::{self, Read};
use std::path::PathBuf;

use abbrex_config::{Config, ConfigLayers};
use abbrex_engine::registry::KeyKind;
use abbrex_engine::{ExpandRequest, Expander, FieldOutput, Registry, SnippetValue, Syntax};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::debug;

#[derive(Parser)]
#[command(name = "abbrex")]
#[command(about = "Expand markup and stylesheet abbreviations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Document syntax
    #[arg(short, long, global = true, default_value = "html")]
    syntax: Syntax,

    /// Output profile (html, xhtml, xml, plain)
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Print `${1:placeholder}` tabstops instead of bare placeholders
    #[arg(short, long, global = true)]
    tabstops: bool,

    /// Config file to use instead of ~/.config/abbrex/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Ignore all config files
    #[arg(long, global = true, conflicts_with = "config")]
    no_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand an abbreviation and print the result
    Expand {
        abbreviation: String,

        /// Text to wrap with the abbreviation
        #[arg(short, long, conflicts_with = "stdin")]
        wrap: Option<String>,

        /// Read the text to wrap from standard input
        #[arg(long)]
        stdin: bool,

        /// Indentation level of the insertion point
        #[arg(short, long, default_value_t = 0)]
        level: usize,
    },
    /// List loaded abbreviations, snippets or variables
    List {
        #[arg(value_enum, default_value_t = Resource::Abbreviations)]
        resource: Resource,
    },
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Type abbreviations and watch them expand
    Preview,
}

#[derive(Clone, Copy, ValueEnum)]
enum Resource {
    Abbreviations,
    Snippets,
    Stylesheet,
    Variables,
}

impl Cli {
    fn layers(&self) -> Result<ConfigLayers> {
        if self.no_config {
            return Ok(ConfigLayers::default());
        }
        let global = self.config.clone().unwrap_or_else(Config::config_path);
        let mut paths = vec![global];
        let cwd = std::env::current_dir().context("cannot read the working directory")?;
        paths.extend(Config::find_project_file(&cwd));
        debug!("config files: {paths:?}");
        Ok(ConfigLayers::from_paths(paths)?)
    }

    fn expander(&self, layers: &ConfigLayers, syntax: Syntax) -> Result<Expander> {
        let mut expander = layers.expander(syntax, self.profile.as_deref())?;
        if self.tabstops {
            expander.profile.fields = FieldOutput::Tabstops;
        }
        Ok(expander)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Expand {
            abbreviation,
            wrap,
            stdin,
            level,
        } => {
            let layers = cli.layers()?;
            let expander = cli.expander(&layers, cli.syntax)?;
            let text = if *stdin {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .context("cannot read standard input")?;
                Some(text)
            } else {
                wrap.clone()
            };

            let mut request = ExpandRequest::new(abbreviation);
            request.text = text.as_deref();
            request.level = *level;
            let output = expander
                .expand_with(&request)
                .with_context(|| format!("cannot expand {abbreviation:?}"))?;
            println!("{output}");
        }
        Commands::List { resource } => {
            let layers = cli.layers()?;
            let expander = cli.expander(&layers, cli.syntax)?;
            let registry = match resource {
                Resource::Abbreviations => &expander.abbreviations,
                Resource::Snippets => &expander.snippets,
                Resource::Stylesheet => &expander.stylesheet_snippets,
                Resource::Variables => &expander.variables,
            };
            print_registry(registry);
        }
        Commands::Init { force } => {
            let path = cli.config.clone().unwrap_or_else(Config::config_path);
            if path.exists() && !force {
                bail!("{} already exists, use --force to overwrite", path.display());
            }
            Config::starter().save_to_path(&path)?;
            println!("Wrote {}", path.display());
        }
        Commands::Preview => {
            let layers = cli.layers()?;
            preview::run(&cli, layers)?;
        }
    }
    Ok(())
}

fn print_registry(registry: &Registry) {
    for snippet in registry.all(KeyKind::Any) {
        let key = snippet.key.as_str();
        let key = if snippet.key.is_pattern() {
            format!("/{key}/")
        } else {
            key.to_string()
        };
        match &snippet.value {
            SnippetValue::Text(text) => println!("{key}\t{}", text.replace('\n', "\\n")),
            SnippetValue::Function(_) => println!("{key}\t(generated)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["abbrex", "expand", "ul>li*3", "--syntax", "xhtml", "-t"]);
        assert_eq!(cli.syntax, Syntax::Xhtml);
        assert!(cli.tabstops);
        assert!(matches!(
            cli.command,
            Commands::Expand { ref abbreviation, .. } if abbreviation == "ul>li*3"
        ));
    }

    #[test]
    fn no_config_uses_builtins() {
        let cli = Cli::parse_from(["abbrex", "--no-config", "expand", "a"]);
        let layers = cli.layers().unwrap();
        let expander = cli.expander(&layers, cli.syntax).unwrap();
        assert_eq!(expander.expand("a").unwrap(), "<a href=\"\"></a>");
    }

    #[test]
    fn unknown_syntax_is_rejected() {
        assert!(Cli::try_parse_from(["abbrex", "-s", "jade", "preview"]).is_err());
    }
}
