pub mod cli;
pub mod convert;
pub mod identifier;
pub mod infer;
pub mod io_utils;
pub mod options;
pub mod sql;
pub mod types;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{cli::Cli, convert::Converter};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv2sql", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let output_path = cli.output.clone();
    let options = cli.into_options()?;
    info!(
        "Converting '{}' into statements for table '{}'",
        options.input.display(),
        options.table_name
    );

    let conversion = Converter::new(options)?.convert()?;
    if conversion.rows_skipped_sampling > 0 {
        info!(
            "{} row(s) were skipped during type sampling",
            conversion.rows_skipped_sampling
        );
    }

    let text = render_output(&conversion.create_table, &conversion.inserts);
    io_utils::write_output(output_path.as_deref(), &text)
        .context("Writing generated SQL")?;
    info!("Emitted DDL plus {} data row(s)", conversion.rows_emitted);
    Ok(())
}

/// Banner layout matching the tool's historical stdout shape.
fn render_output(create_table: &str, inserts: &str) -> String {
    format!("-- CREATE TABLE STATEMENT --\n{create_table}\n\n-- INSERT STATEMENTS --\n{inserts}")
}
