//! The migration runner: streams a collection, plans each document, and
//! conditionally persists the staged updates.

use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

use crate::catalog::Migration;
use crate::document::{FieldUpdate, UpdateSet};
use crate::errors::MigrateError;
use crate::store::DocumentStore;
use crate::transform::plan_document;

/// Tally of one migration run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub migration: String,
    /// Documents inspected.
    pub scanned: u64,
    /// Documents with a non-empty plan (written, unless dry run).
    pub updated: u64,
    /// Documents that needed no update.
    pub skipped: u64,
    /// Values outside a transform's recognized domain.
    pub unrecognized_values: u64,
    /// Individual field updates staged across all documents.
    pub staged_fields: u64,
    pub dry_run: bool,
    pub elapsed_ms: u64,
    pub finished_at: DateTime<Utc>,
}

/// Applies a migration across every document in its collection.
///
/// Traversal is sequential: one document is fully planned and written before
/// the next is touched. A store error aborts the run; per-field issues are
/// logged and isolated to the affected field. Partial progress from an
/// aborted run is acceptable because transforms are idempotent, so rerunning
/// is the recovery mechanism.
pub struct MigrationRunner<S> {
    store: S,
    dry_run: bool,
}

impl<S: DocumentStore> MigrationRunner<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            dry_run: false,
        }
    }

    /// Compute and log updates without persisting anything.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Run `migration` to completion, or abort on the first store error.
    pub async fn run(&mut self, migration: &Migration) -> Result<RunStats, MigrateError> {
        let started = Instant::now();
        let mode = if self.dry_run { " (dry run)" } else { "" };
        info!(
            "migration '{}' starting on collection '{}'{mode}",
            migration.name, migration.collection
        );

        let documents = self.store.scan_documents(migration.collection).await?;
        info!("{} document(s) to inspect", documents.len());

        let mut updated = 0u64;
        let mut skipped = 0u64;
        let mut unrecognized_values = 0u64;
        let mut staged_fields = 0u64;

        for doc in &documents {
            let plan = plan_document(doc, &migration.transforms);

            for issue in &plan.unrecognized {
                warn!(
                    "document {}: unrecognized value {} for field '{}'",
                    doc.id, issue.value, issue.path
                );
            }
            unrecognized_values += plan.unrecognized.len() as u64;

            for path in &plan.skipped_paths {
                info!(
                    "document {}: '{path}' missing or not a mapping, nothing to migrate",
                    doc.id
                );
            }

            if plan.is_empty() {
                info!("document {}: no update needed", doc.id);
                skipped += 1;
                continue;
            }

            if !self.dry_run {
                self.store
                    .apply_updates(migration.collection, &doc.id, &plan.updates)
                    .await?;
            }
            let prefix = if self.dry_run { "[dry run] " } else { "" };
            info!("{prefix}document {}: {}", doc.id, describe_updates(&plan.updates));

            staged_fields += plan.updates.len() as u64;
            updated += 1;
        }

        let stats = RunStats {
            migration: migration.name.to_string(),
            scanned: documents.len() as u64,
            updated,
            skipped,
            unrecognized_values,
            staged_fields,
            dry_run: self.dry_run,
            elapsed_ms: started.elapsed().as_millis() as u64,
            finished_at: Utc::now(),
        };
        info!(
            "migration '{}' complete: {} updated, {} skipped{mode}",
            migration.name, stats.updated, stats.skipped
        );
        Ok(stats)
    }
}

fn describe_updates(updates: &UpdateSet) -> String {
    updates
        .iter()
        .map(|(path, update)| match update {
            FieldUpdate::Set(value) => format!("{path} = {value}"),
            FieldUpdate::Delete => format!("{path} (removed)"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
