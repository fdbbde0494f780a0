use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use gqm_catalog::{Catalog, CatalogLevel};
use gqm_core::{Finalizer, InMemoryPlanStore, PlannerConfig};
use gqm_planner::{catalog_rows, init_tracing, load_translator, AuthorScript};
use std::path::PathBuf;
use std::sync::Arc;

fn cli() -> Command {
    Command::new("gqm-planner")
        .version(gqm_planner::VERSION)
        .about("Goal-Question-Metric measurement plan authoring")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Planner configuration file (TOML)"),
        )
        .subcommand(
            Command::new("catalog")
                .about("List the predefined catalog entries")
                .arg(
                    Arg::new("level")
                        .long("level")
                        .value_parser(|s: &str| s.parse::<CatalogLevel>())
                        .help("objective, question, metric or measurement"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("author")
                .about("Replay an authoring script and print the persisted plan")
                .arg(
                    Arg::new("script")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to the YAML authoring script"),
                )
                .arg(
                    Arg::new("outline")
                        .long("outline")
                        .action(ArgAction::SetTrue)
                        .help("Print the review outline instead of JSON"),
                ),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => PlannerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    init_tracing(&config.logging)?;
    let translator = load_translator(&config)?;
    let catalog = Catalog::builtin();

    match matches.subcommand() {
        Some(("catalog", args)) => {
            let level = args.get_one::<CatalogLevel>("level").copied();
            let rows = catalog_rows(catalog, level, translator.as_ref());
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in rows {
                    println!("{:<12} {:<40} {}", row.level.to_string(), row.key, row.display);
                }
            }
        }
        Some(("author", args)) => {
            let path = args
                .get_one::<PathBuf>("script")
                .context("script path is required")?;
            let script = AuthorScript::load(path)?;
            let store = Arc::new(InMemoryPlanStore::new());
            let finalizer = Finalizer::new(store, translator.clone()).with_config(&config);

            let outcome = script
                .run(catalog, config.limits, &finalizer, translator.as_ref())
                .await?;
            if args.get_flag("outline") {
                println!("{}", outcome.review.goal_statement);
                print!("{}", outcome.review.render_outline());
            } else {
                println!("{}", serde_json::to_string_pretty(&outcome.plan)?);
            }
        }
        _ => {}
    }
    Ok(())
}
