//! `deck`: inspect, filter and edit a JSON card catalog

mod config;

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use config::DeckConfig;
use deck_filter::{Condition, Filter, FilterRegistry, Record, STATUS_PROPERTY};
use deck_sync::{CardEditor, CollectionSyncManager, JsonFileStore, ListView};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const TITLE_PROPERTY: &str = "cardTitle";
const CLI_LOCATION: &str = "cli";

fn cli() -> Command {
    let data = Arg::new("data")
        .long("data")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Card catalog (.json)");

    Command::new("deck")
        .version(deck_filter::VERSION)
        .about("Inspect, filter and edit a JSON card catalog")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List cards passing every filter")
                .arg(data.clone())
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .action(ArgAction::Append)
                        .value_parser(parse_filter)
                        .help("Filter as PROPERTY:CONDITION:VALUE (repeatable)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print visible cards as JSON"),
                )
                .arg(
                    Arg::new("display")
                        .long("display")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("json")
                        .help("Print visibility per card id"),
                ),
        )
        .subcommand(
            Command::new("get")
                .about("Print one card as JSON")
                .arg(data.clone())
                .arg(Arg::new("id").long("id").required(true).help("Card id")),
        )
        .subcommand(
            Command::new("set-status")
                .about("Change a card's workflow status and save the catalog")
                .arg(data)
                .arg(Arg::new("id").long("id").required(true).help("Card id"))
                .arg(
                    Arg::new("status")
                        .long("status")
                        .required(true)
                        .help("New workflow status"),
                ),
        )
}

/// One `--filter` argument
#[derive(Debug, Clone, PartialEq)]
struct FilterArg {
    property: String,
    condition: Condition,
    value: String,
}

fn parse_filter(raw: &str) -> Result<FilterArg, String> {
    let mut parts = raw.splitn(3, ':');
    let (Some(property), Some(condition), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected PROPERTY:CONDITION:VALUE, got `{raw}`"));
    };
    if property.is_empty() {
        return Err("filter property is empty".to_string());
    }
    Ok(FilterArg {
        property: property.to_string(),
        condition: Condition::from(condition),
        value: value.to_string(),
    })
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn open_manager(
    args: &ArgMatches,
    config: &DeckConfig,
) -> anyhow::Result<CollectionSyncManager> {
    let path = args
        .get_one::<PathBuf>("data")
        .context("--data is required")?;
    let store = JsonFileStore::open(path).context("opening card catalog")?;
    let (manager, outcome) =
        CollectionSyncManager::connect_with_outcome(Arc::new(store), config.sync.clone()).await;
    if !outcome.is_confirmed() {
        bail!("could not read card catalog {}", path.display());
    }
    Ok(manager)
}

fn print_card_line(card: &Record, id_property: &str) {
    let text = |property: &str| {
        card.get(property)
            .map(deck_filter::value::field_text)
            .unwrap_or_default()
    };
    println!("{}\t{}", text(id_property), text(TITLE_PROPERTY));
}

async fn run_list(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let config = DeckConfig::load(args.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let manager = open_manager(args, &config).await?;

    let registry = Arc::new(FilterRegistry::with_config(config.registry));
    let filters = args
        .get_many::<FilterArg>("filter")
        .into_iter()
        .flatten()
        .enumerate();
    for (index, arg) in filters {
        if !arg.condition.is_recognized() {
            tracing::warn!(property = %arg.property, condition = %arg.condition, "unrecognized condition; filter has no effect");
        }
        if !config.allowed_properties.contains(&arg.property) {
            tracing::warn!(property = %arg.property, "property not in allowed_properties; filter ignored");
        }
        let filter = Filter::new(format!("cli-{index}"), arg.property.clone())
            .with_value(arg.value.clone())
            .with_condition(arg.condition.clone())
            .with_location(CLI_LOCATION);
        registry.register_filter(filter)?;
    }

    let view = ListView::bind(registry, manager, config.allowed_properties.iter().cloned());

    if args.get_flag("display") {
        let display: BTreeMap<String, bool> = view.display_list().into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&display)?);
    } else if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&view.visible())?);
    } else {
        let id_property = &config.sync.id_property;
        for card in view.visible() {
            print_card_line(card, id_property);
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_get(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let config = DeckConfig::default();
    let manager = open_manager(args, &config).await?;
    let raw = args.get_one::<String>("id").context("--id is required")?;

    match manager.get_by_id(raw.as_str()) {
        Some(card) => {
            println!("{}", serde_json::to_string_pretty(&card)?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("no card with id {raw}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_set_status(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let config = DeckConfig::default();
    let manager = open_manager(args, &config).await?;
    let raw = args.get_one::<String>("id").context("--id is required")?;
    let status = args
        .get_one::<String>("status")
        .context("--status is required")?;

    let editor = CardEditor::new(manager.clone());
    if !editor.set_status(raw.as_str(), status).await {
        eprintln!("no card with id {raw}");
        return Ok(ExitCode::FAILURE);
    }

    // confirm against what the file now holds
    manager.fetch().await;
    let saved = manager
        .get_by_id(raw.as_str())
        .and_then(|card| card.get(STATUS_PROPERTY).cloned());
    if saved.as_ref().and_then(Value::as_str) != Some(status.as_str()) {
        eprintln!("card {raw} was not saved");
        return Ok(ExitCode::FAILURE);
    }

    println!("{raw}\t{status}");
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("list", args)) => run_list(args).await,
        Some(("get", args)) => run_get(args).await,
        Some(("set-status", args)) => run_set_status(args).await,
        _ => Ok(ExitCode::FAILURE),
    }
}
