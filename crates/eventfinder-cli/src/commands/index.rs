//! Index command: publish CMS events to the search index.

use anyhow::{Context, Result};
use clap::Args;

use eventfinder_lib::{
    run_indexing, AlgoliaClient, AlgoliaConfig, Event, IndexReport, IndexWriter, StoryblokClient,
    StoryblokConfig,
};

use crate::commands::CommandContext;
use crate::output::{emit, render_index, IndexOutput, IndexedRecord};

#[derive(Debug, Clone, Args)]
pub struct IndexArgs {
    /// Fetch and transform only; leave the index untouched.
    #[arg(long)]
    pub dry_run: bool,
}

/// Writer used on dry runs; the pipeline never calls it.
struct NoWrites;

impl IndexWriter for NoWrites {
    fn save_objects(&self, _records: &[Event]) -> eventfinder_lib::Result<Vec<String>> {
        Ok(Vec::new())
    }
}

fn summarise(dry_run: bool, report: IndexReport, records: Vec<Event>) -> IndexOutput {
    let records = if dry_run {
        records
            .into_iter()
            .map(|record| IndexedRecord {
                object_id: record.object_id,
                title: record.title,
                geoloc: record.geoloc,
                start_timestamp: record.start_timestamp,
            })
            .collect()
    } else {
        Vec::new()
    };
    IndexOutput {
        dry_run,
        report,
        records,
    }
}

pub fn handle_index(ctx: &CommandContext, args: &IndexArgs) -> Result<()> {
    let cms = StoryblokConfig::from_env().context("CMS is not configured")?;
    let source = StoryblokClient::new(&cms).context("failed to build CMS client")?;

    let (report, records) = if args.dry_run {
        run_indexing(&source, &NoWrites, true)
    } else {
        let admin = AlgoliaConfig::admin_from_env()
            .context("search index writes are not configured")?;
        let writer = AlgoliaClient::new(&admin).context("failed to build search client")?;
        run_indexing(&source, &writer, false)
    }
    .context("indexing failed")?;

    let output = summarise(args.dry_run, report, records);
    emit(ctx.format, &output, render_index).context("failed to write index report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventfinder_lib::Coordinates;

    fn record(id: &str) -> Event {
        Event {
            object_id: id.to_string(),
            title: format!("Event {id}"),
            geoloc: Some(Coordinates::new(53.8, -1.55)),
            ..Event::default()
        }
    }

    #[test]
    fn dry_run_lists_records() {
        let output = summarise(
            true,
            IndexReport {
                fetched: 2,
                indexed: 0,
            },
            vec![record("a"), record("b")],
        );
        assert_eq!(output.records.len(), 2);
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["records"][0]["objectID"], "a");
        assert_eq!(json["report"]["fetched"], 2);
    }

    #[test]
    fn real_run_reports_counts_only() {
        let output = summarise(
            false,
            IndexReport {
                fetched: 2,
                indexed: 2,
            },
            vec![record("a"), record("b")],
        );
        assert!(output.records.is_empty());
        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("records").is_none());
    }
}
