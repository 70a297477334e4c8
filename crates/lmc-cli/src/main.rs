use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use lmc_cli::{describe_graph, linearize, run_demo, CliConfig, SnapshotReport};
use lmc_persistence::{FilePersistence, PersistenceAdapter};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("lmcanvas")
        .version(lmc_cli::VERSION)
        .about("Branching conversation graph tools")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("linearize")
                .about("Build a linear graph from a JSON transcript")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Transcript file (JSON array of messages)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the graph as JSON instead of an outline"),
                ),
        )
        .subcommand(
            Command::new("inspect-snapshot")
                .about("Validate and summarize a saved view snapshot")
                .arg(
                    Arg::new("key")
                        .long("key")
                        .conflicts_with("file")
                        .help("Snapshot key in the configured directory"),
                )
                .arg(
                    Arg::new("file")
                        .long("file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Raw snapshot file"),
                ),
        )
        .subcommand(
            Command::new("demo")
                .about("Run a scripted echo interaction on a fresh branch")
                .arg(
                    Arg::new("prompt")
                        .long("prompt")
                        .default_value("hello branching world")
                        .help("Message to send"),
                )
                .arg(
                    Arg::new("save")
                        .long("save")
                        .value_name("KEY")
                        .help("Save the resulting view under this key"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn persistence(config: &CliConfig) -> FilePersistence {
    FilePersistence::new(config.persistence.dir.clone())
        .with_config(config.persistence.adapter_config())
}

fn inspect_snapshot(config: &CliConfig, args: &ArgMatches) -> Result<bool> {
    let raw = if let Some(file) = args.get_one::<PathBuf>("file") {
        read(file)?
    } else if let Some(key) = args.get_one::<String>("key") {
        let path = persistence(config).path_for(key);
        read(&path)?
    } else {
        anyhow::bail!("pass --key or --file");
    };

    let report = SnapshotReport::inspect(&raw);
    println!("{report}");
    Ok(report.is_valid())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let config_path = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let config = CliConfig::load_or_default(config_path)?;

    match matches.subcommand() {
        Some(("linearize", args)) => {
            let input = args
                .get_one::<PathBuf>("input")
                .context("missing transcript path")?;
            let graph = linearize(&read(input)?, &config.linear)?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&graph)?);
            } else {
                print!("{}", describe_graph(&graph));
            }
        }
        Some(("inspect-snapshot", args)) => {
            if !inspect_snapshot(&config, args)? {
                std::process::exit(1);
            }
        }
        Some(("demo", args)) => {
            let prompt = args
                .get_one::<String>("prompt")
                .map_or("hello", String::as_str);
            let files = persistence(&config);
            let save = args
                .get_one::<String>("save")
                .map(|key| (&files as &dyn PersistenceAdapter, key.as_str()));

            let report = run_demo(&config, prompt, save).await?;
            println!("node {} ({})", report.node_id, report.outcome.status);
            for message in &report.outcome.messages {
                println!(
                    "  {}: {}",
                    message.role,
                    lmc_message::message_text(Some(message))
                );
            }
            println!("{} nodes in store", report.node_count);
        }
        _ => {}
    }

    Ok(())
}
