use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mentions_engine::{Key, MentionsInput, TagTextarea, locate};
use mentions_types::TemplateTag;
use mentions_util::{MentionConfig, char_len};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

const SAMPLE_TAGS: &str = include_str!("../assets/sample_tags.json");

#[derive(Debug, Parser)]
#[command(name = "mentions", version, about = "Locate and track mentions in free-form text")]
struct Cli {
    /// Path to a JSON config file (defaults to MENTIONS_CONFIG_PATH or the config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the char offset of a label occurrence
    Locate {
        #[arg(long)]
        text: String,
        #[arg(long)]
        label: String,
        /// 1-based occurrence of the label
        #[arg(long, default_value_t = 1)]
        occurrence: usize,
        /// All known labels, comma separated (defaults to the label itself)
        #[arg(long, value_delimiter = ',')]
        labels: Vec<String>,
    },
    /// Replay a JSON edit script and print the emitted events
    Replay { script: PathBuf },
    /// Extract template tags from text
    Tags {
        #[arg(long)]
        text: String,
        /// JSON array of {"name", "value"} tags (defaults to a built-in sample)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Filter the catalog by name
        #[arg(long)]
        search: Option<String>,
    },
}

/// Recorded edit session.
#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    text: String,
    #[serde(default)]
    presets: Vec<String>,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Step {
    Keydown { key: Key },
    /// New value of the text control; the caret defaults to the end.
    Input { value: String, caret: Option<usize> },
    /// Keydown + insertion for each char, at the current caret.
    Type { text: String },
    Click { caret: usize },
    Blur,
    Select { choice: String },
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Locate {
            text,
            label,
            occurrence,
            labels,
        } => {
            let labels = if labels.is_empty() { vec![label.clone()] } else { labels };
            match locate(&text, &label, occurrence, &labels) {
                Some(index) => println!("{index}"),
                None => {
                    println!("not found");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Replay { script } => {
            let config = load_config(cli.config)?;
            let raw = std::fs::read_to_string(&script).with_context(|| format!("reading script {}", script.display()))?;
            let script: Script = serde_json::from_str(&raw).with_context(|| format!("parsing script {}", script.display()))?;
            let out = replay(script, config)?;
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Tags { text, catalog, search } => {
            let raw = match &catalog {
                Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading catalog {}", path.display()))?,
                None => SAMPLE_TAGS.to_string(),
            };
            let out = extract_tags(&raw, &text, search.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<PathBuf>) -> Result<MentionConfig> {
    let config = match path {
        Some(path) => MentionConfig::load_from(&path).with_context(|| format!("loading config {}", path.display()))?,
        None => MentionConfig::load().context("loading default config")?,
    };
    debug!(?config, "loaded config");
    Ok(config)
}

fn replay(script: Script, config: MentionConfig) -> Result<Value> {
    let mut input: MentionsInput<String> = MentionsInput::new(config)?;
    let caret = char_len(&script.text);
    input.handle_input(script.text, caret);
    let mut steps = vec![json!({"step": "presets", "events": input.set_selected_choices(script.presets)})];

    for step in script.steps {
        let label = format!("{step:?}");
        let events = match step {
            Step::Keydown { key } => input.handle_keydown(key),
            Step::Input { value, caret } => {
                let caret = caret.unwrap_or_else(|| char_len(&value));
                input.handle_input(value, caret)
            }
            Step::Type { text } => input.type_text(&text),
            Step::Click { caret } => input.handle_click(caret),
            Step::Blur => input.handle_blur(),
            Step::Select { choice } => input.select_choice(choice),
        };
        steps.push(json!({"step": label, "events": events}));
    }

    Ok(json!({
        "steps": steps,
        "text": input.text(),
        "selected": input.selected_choices(),
        "dumped": input.dumped_choices(),
    }))
}

fn extract_tags(catalog: &str, text: &str, search: Option<&str>) -> Result<Value> {
    let tags: Vec<TemplateTag> = serde_json::from_str(catalog).context("parsing tag catalog")?;
    let mut textarea = TagTextarea::new(tags)?;
    textarea.write_value(text);

    let filtered = match search {
        Some(term) => textarea.filter_tags(term).to_vec(),
        None => Vec::new(),
    };
    Ok(json!({
        "selected": textarea.selected_tags(),
        "anchored": textarea.input().selected_choices(),
        "filtered": filtered,
    }))
}
