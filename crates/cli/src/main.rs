use anyhow::Context;
use autochar_core::config::max_level_from_env_value;
use autochar_core::constants::DEFAULT_CAVEAT_TITLE;
use autochar_core::{Compendium, CompilerConfig, RulesCompiler, Selection, SheetIds};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PREVIEW_CHARACTER_ID: &str = "preview-character";
const PREVIEW_CLASS_ID: &str = "preview-class";

#[derive(Parser)]
#[command(name = "autochar")]
#[command(about = "Render rules markup and compile characters from rules data")]
struct Cli {
    /// Directory holding races.json, classes.json, backgrounds.json and spells.json
    #[arg(long, env = "AUTOCHAR_DATA_DIR", default_value = "rules-data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON entry tree to markdown
    Render {
        /// JSON file holding an entry or a list of entries
        file: PathBuf,
        /// Join top-level entries with markdown hard line breaks
        #[arg(long)]
        md_breaks: bool,
    },
    /// Expand inline macros in a piece of text
    Expand { text: String },
    /// List selectable races, classes, subclasses and backgrounds
    Options,
    /// List spells with the index used to add them to a spellbook
    Spells {
        /// Only spells whose class list mentions this class
        #[arg(long)]
        class: Option<String>,
        #[arg(long)]
        level: Option<u8>,
    },
    /// Compile a character and print the records as JSON
    Compile {
        #[arg(long)]
        race: String,
        #[arg(long)]
        class: String,
        #[arg(long)]
        subclass: Option<String>,
        #[arg(long)]
        background: String,
        #[arg(long)]
        level: u8,
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("autochar=info".parse()?)
                .add_directive("markup=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Render { file, md_breaks }) => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let value: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", file.display()))?;
            println!("{}", markup::render_value(&value, md_breaks));
        }
        Some(Commands::Expand { text }) => {
            println!("{}", markup::expand(&text));
        }
        Some(Commands::Options) => {
            let compendium = load_compendium(&cli.data_dir)?;
            println!("{}", serde_json::to_string_pretty(&compendium.options())?);
        }
        Some(Commands::Spells { class, level }) => {
            let compendium = load_compendium(&cli.data_dir)?;
            let class = class.map(|c| c.to_lowercase());
            let spells: Vec<_> = compendium
                .spell_options()
                .into_iter()
                .filter(|s| class.as_deref().map_or(true, |c| s.classes.contains(c)))
                .filter(|s| level.map_or(true, |l| s.level == l))
                .collect();
            println!("{}", serde_json::to_string_pretty(&spells)?);
        }
        Some(Commands::Compile {
            race,
            class,
            subclass,
            background,
            level,
            pretty,
        }) => {
            let max_level = max_level_from_env_value(std::env::var("AUTOCHAR_MAX_LEVEL").ok())?;
            let compiler = RulesCompiler::new(CompilerConfig::new(max_level, DEFAULT_CAVEAT_TITLE)?);

            let compendium = load_compendium(&cli.data_dir)?;
            let selection = Selection::from_compendium(
                &compendium,
                &race,
                &class,
                subclass.as_deref(),
                &background,
                level,
            )?;
            let ids = SheetIds::new(PREVIEW_CHARACTER_ID, PREVIEW_CLASS_ID);
            let compiled = compiler.compile(&selection, &ids)?;

            let json = if pretty {
                serde_json::to_string_pretty(&compiled)?
            } else {
                serde_json::to_string(&compiled)?
            };
            println!("{json}");
        }
        None => {
            println!("Use 'autochar --help' for commands");
        }
    }

    Ok(())
}

fn load_compendium(dir: &Path) -> anyhow::Result<Compendium> {
    let read = |name: &str| {
        let path = dir.join(name);
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
    };

    let spells_path = dir.join("spells.json");
    let spells = if spells_path.exists() {
        Some(read("spells.json")?)
    } else {
        tracing::debug!("no spells file at {}", spells_path.display());
        None
    };

    let compendium = Compendium::from_json(
        &read("races.json")?,
        &read("classes.json")?,
        &read("backgrounds.json")?,
        spells.as_deref(),
    )?;
    Ok(compendium)
}
