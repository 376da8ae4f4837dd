use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};

use fieldshift::{MigrationRunner, RedisStore, RunStats, find_migration, registered_migrations};

use crate::output::{GlobalOptions, OutputManager, TableDisplay};

#[derive(Args)]
pub struct RunArgs {
    /// Migration name (see `fieldshift list`)
    pub name: String,

    /// Persist changes; without this flag the run is a dry run
    #[arg(long)]
    pub live: bool,

    /// Redis connection URL
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Key prefix documents are stored under (`prefix:collection:id`)
    #[arg(long, default_value = "app")]
    pub prefix: String,
}

/// Execute one registered migration against the document store.
pub async fn handle_run(args: RunArgs, output: &OutputManager) -> Result<()> {
    let Some(migration) = find_migration(&args.name) else {
        output.error(&format!("unknown migration '{}'", args.name));
        output.info("Available migrations:");
        for known in registered_migrations() {
            output.bullet(known.name);
        }
        anyhow::bail!("unknown migration '{}'", args.name);
    };

    output.heading(&format!("Migration: {}", migration.name));
    output.bullet(migration.description);
    output.key_value("Collection", migration.collection);
    output.key_value("Mode", if args.live { "live" } else { "dry run" });
    if !args.live {
        output.warning("DRY RUN - no changes will be written (pass --live to persist)");
    }

    output.progress("Connecting to Redis");
    let store = RedisStore::connect(&args.redis_url, &args.prefix)
        .await
        .context("failed to connect to Redis")?;
    output.clear_line();

    let mut runner = MigrationRunner::new(store).with_dry_run(!args.live);
    let stats = runner
        .run(&migration)
        .await
        .with_context(|| format!("migration '{}' aborted", migration.name))?;

    output.heading("Summary");
    output.display(&stats)?;
    output.success(&format!(
        "{} document(s) updated, {} skipped",
        stats.updated, stats.skipped
    ));
    Ok(())
}

impl TableDisplay for RunStats {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let output = OutputManager::new(options.clone());
        let mut table = output.table_with_header(&["Field", "Value"]);
        table.add_row(vec![Cell::new("Migration"), Cell::new(&self.migration)]);
        table.add_row(vec![
            Cell::new("Mode"),
            Cell::new(if self.dry_run { "dry run" } else { "live" }),
        ]);
        table.add_row(vec![Cell::new("Scanned"), Cell::new(self.scanned.to_string())]);
        table.add_row(vec![Cell::new("Updated"), Cell::new(self.updated.to_string())]);
        table.add_row(vec![Cell::new("Skipped"), Cell::new(self.skipped.to_string())]);
        table.add_row(vec![
            Cell::new("Unrecognized values"),
            Cell::new(self.unrecognized_values.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Fields staged"),
            Cell::new(self.staged_fields.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Elapsed"),
            Cell::new(format!("{}ms", self.elapsed_ms)),
        ]);
        table.add_row(vec![
            Cell::new("Finished at"),
            Cell::new(self.finished_at.to_rfc3339()),
        ]);
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "{}: {} updated, {} skipped, {} unrecognized{}",
            self.migration,
            self.updated,
            self.skipped,
            self.unrecognized_values,
            if self.dry_run { " (dry run)" } else { "" }
        )
    }
}
