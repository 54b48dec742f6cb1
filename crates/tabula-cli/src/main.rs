// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;

use anyhow::{Context, Result, anyhow};
use config::Config;
use std::env;
use std::path::PathBuf;
use std::rc::Rc;
use tabula_core::{
    ActionCatalog, BulkAction, LayoutStore, ListenerRegistry, TableController, TableRow,
    TrackingRegistry,
};
use tabula_store::Store;
use tracing::{info, warn};

const DEFAULT_DEMO_ROWS: usize = 240;
const DEMO_TABLE_ID: &str = "pipeline";

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `tabula --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    logging::init(config.log_filter(), &config.log_file()?)?;

    let store = if options.demo {
        Store::open_memory()?
    } else {
        Store::open(&db_path).with_context(|| {
            format!(
                "open layout store {} -- if this path is wrong, set [storage].db_path or TABULA_DB_PATH",
                db_path.display()
            )
        })?
    };
    store.bootstrap()?;

    let mut table = build_demo_table(&config, options.rows.unwrap_or(DEFAULT_DEMO_ROWS))?;
    if restore_layout(&mut table, &store) {
        info!(table = DEMO_TABLE_ID, "saved layout restored");
    }

    if options.check_only {
        info!(db = %db_path.display(), "startup check passed");
        return Ok(());
    }

    let layouts: &dyn LayoutStore = &store;
    tabula_tui::run_app(&mut table, Some(layouts))?;
    table
        .save_layout(layouts)
        .context("save layout on exit")?;
    Ok(())
}

/// Applies the saved layout. An unreadable one is logged and left for the
/// next save to overwrite, so the table starts from its column defaults.
fn restore_layout<R: TableRow>(table: &mut TableController<R>, store: &dyn LayoutStore) -> bool {
    match table.load_layout(store) {
        Ok(found) => found,
        Err(error) => {
            warn!(
                table = DEMO_TABLE_ID,
                error = %format!("{error:#}"),
                "saved layout unreadable; starting from column defaults"
            );
            false
        }
    }
}

fn build_demo_table(
    config: &Config,
    rows: usize,
) -> Result<TableController<tabula_testkit::Opportunity>> {
    let definitions = config.apply_column_defaults(tabula_testkit::opportunity_columns());
    let registry: Rc<dyn ListenerRegistry> = TrackingRegistry::shared();

    let mut catalog = ActionCatalog::with_builtins();
    catalog.push(
        BulkAction::new("reassign", "Reassign owner").with_input(tabula_testkit::reassign_input()),
    )?;

    let table = TableController::new(
        DEMO_TABLE_ID,
        definitions,
        tabula_testkit::sample_opportunities(rows),
        registry,
        config.table_config(),
    )
    .context("build demo table; check the [table] width settings")?;
    Ok(table.with_actions(catalog))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    rows: Option<usize>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
        rows: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--rows" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--rows requires a row count"))?;
                let rows = value.as_ref().parse::<usize>().with_context(|| {
                    format!("--rows expects a whole number, got {:?}", value.as_ref())
                })?;
                options.rows = Some(rows);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("tabula");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved layout database path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with an in-memory layout store");
    println!("  --rows <n>               Number of generated demo rows (default 240)");
    println!("  --check                  Validate config + layout store and exit");
    println!("  --help                   Show this help");
}
