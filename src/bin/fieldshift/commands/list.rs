use anyhow::Result;
use comfy_table::{Cell, Table};
use serde::Serialize;

use fieldshift::registered_migrations;

use crate::output::{GlobalOptions, OutputManager, TableDisplay};

#[derive(Serialize)]
struct MigrationRow {
    name: &'static str,
    collection: &'static str,
    transforms: usize,
    description: &'static str,
}

#[derive(Serialize)]
#[serde(transparent)]
struct MigrationListing(Vec<MigrationRow>);

impl TableDisplay for MigrationListing {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let output = OutputManager::new(options.clone());
        let mut table = output.table_with_header(&["Name", "Collection", "Transforms", "Description"]);
        for row in &self.0 {
            table.add_row(vec![
                Cell::new(row.name),
                Cell::new(row.collection),
                Cell::new(row.transforms.to_string()),
                Cell::new(row.description),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|row| format!("{} ({}, {} transform(s))", row.name, row.collection, row.transforms))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Show every registered migration.
pub fn handle_list(output: &OutputManager) -> Result<()> {
    let listing = MigrationListing(
        registered_migrations()
            .iter()
            .map(|migration| MigrationRow {
                name: migration.name,
                collection: migration.collection,
                transforms: migration.transforms.len(),
                description: migration.description,
            })
            .collect(),
    );

    output.display(&listing)?;
    output.info(&format!("{} migration(s) registered", listing.0.len()));
    Ok(())
}
