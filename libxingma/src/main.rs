use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use libxingma::{parse_tokens, Decoded, Engine, Entry, SelectKey, XingmaConfig};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "libxingma")]
#[command(about = "Shape-code input method: code table lookup and keystroke decoding")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Table directory (overrides the configuration file)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive mode: type a code, see its candidates
    Repl,
    /// List ranked candidates for a code
    Match {
        code: String,
        /// Maximum candidates to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Include longer codes starting with CODE
        #[arg(long)]
        prefix: bool,
        #[arg(long)]
        json: bool,
    },
    /// Resolve a code with a selection key (space, ;, ', 0-9)
    Select { code: String, key: String },
    /// Decode key tokens (`w q space , enter`); reads stdin when none are given
    Decode {
        tokens: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show the codes that produce a word
    Reverse { word: String },
    /// Table statistics
    Stats,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<XingmaConfig> {
    let mut config = match &cli.config {
        Some(path) => XingmaConfig::load_toml(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => XingmaConfig::default(),
    };
    if let Some(dir) = &cli.dir {
        config.base.table_dir = dir.clone();
    }
    Ok(config)
}

fn label(idx: usize) -> String {
    SelectKey::for_ordinal(idx)
        .map(|key| key.token().to_string())
        .unwrap_or_else(|| (idx + 1).to_string())
}

fn print_candidate(idx: usize, entry: &Entry, show_source: bool) {
    if show_source {
        println!("{:>6}. {}  [{}]  {}", label(idx), entry.word, entry.code, entry.source_file);
    } else {
        println!("{:>6}. {}  [{}]", label(idx), entry.word, entry.code);
    }
}

fn print_decoded(item: &Decoded, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(item)?);
    } else {
        println!("{item}");
    }
    Ok(())
}

fn handle_match(
    engine: &Engine,
    code: &str,
    limit: Option<usize>,
    prefix: bool,
    json: bool,
    show_source: bool,
) -> Result<()> {
    let limit = limit.unwrap_or(engine.limit());
    if limit == 0 {
        return Ok(());
    }
    let mut found = engine.store().match_code(code, limit - 1, !prefix)?;
    found.truncate(limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else if found.is_empty() {
        println!("  (no candidates found)");
    } else {
        for (i, entry) in found.iter().enumerate() {
            print_candidate(i, entry, show_source);
        }
    }
    Ok(())
}

fn handle_decode(engine: &Engine, tokens: &[String], json: bool) -> Result<()> {
    let mut committed = String::new();
    let mut emit = |item: Decoded| -> Result<()> {
        if let Some(text) = item.text() {
            committed.push_str(text);
        }
        print_decoded(&item, json)
    };

    if tokens.is_empty() {
        // one decoder across all stdin lines, consumed as they arrive
        let keys = io::stdin()
            .lock()
            .lines()
            .map_while(Result::ok)
            .flat_map(|line| parse_tokens(&line));
        for item in engine.store().decode(keys) {
            emit(item?)?;
        }
    } else {
        let keys = tokens.iter().map(|t| libxingma::Key::from_token(t));
        for item in engine.store().decode(keys) {
            emit(item?)?;
        }
    }

    if !json {
        println!("commit: {committed}");
    }
    Ok(())
}

fn run_repl(engine: &Engine, show_source: bool) -> Result<()> {
    println!("libxingma REPL: type a code and press Enter to list its candidates");
    println!("Commands: :reload, :stats. Ctrl-D to exit.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        match input {
            "" => continue,
            ":reload" => {
                let table = engine.store().reload()?;
                println!("reloaded {} entries (generation {})", table.len(), table.generation());
            }
            ":stats" => println!("{:?}", engine.store().stats()?),
            code => {
                let exact = engine.labelled(code)?;
                if exact.is_empty() {
                    println!("  (no candidates found)");
                }
                for (idx, (_, entry)) in exact.iter().enumerate() {
                    print_candidate(idx, entry, show_source);
                }
                let longer: Vec<Entry> = engine
                    .input(code)?
                    .into_iter()
                    .filter(|e| e.code != code)
                    .collect();
                if !longer.is_empty() {
                    let hints: Vec<String> =
                        longer.iter().map(|e| format!("{}[{}]", e.word, e.code)).collect();
                    println!("  more: {}", hints.join(" "));
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let show_source = config.show_source;
    let engine = Engine::new(config);

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => run_repl(&engine, show_source)?,
        Commands::Match {
            code,
            limit,
            prefix,
            json,
        } => handle_match(&engine, &code, limit, prefix, json, show_source)?,
        Commands::Select { code, key } => {
            let key = SelectKey::from_token(&key)
                .ok_or_else(|| anyhow!("`{key}` is not a selection key (space, ;, ', 0-9)"))?;
            print_decoded(&engine.store().select_candidate(&code, key)?, false)?;
        }
        Commands::Decode { tokens, json } => handle_decode(&engine, &tokens, json)?,
        Commands::Reverse { word } => {
            let codes = engine.reverse(&word)?;
            if codes.is_empty() {
                println!("  (no codes found)");
            } else {
                println!("{}", codes.join(" "));
            }
        }
        Commands::Stats => {
            let stats = engine.store().stats()?;
            println!("directory: {}", engine.store().dir().display());
            println!("files:     {}", stats.files);
            println!("entries:   {}", stats.entries);
            println!("codes:     {}", stats.codes);
            println!("boosted:   {}", stats.boosted);
        }
    }
    Ok(())
}
