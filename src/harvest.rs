//! The scrape → parse → lookup → normalize → write loop.

use anyhow::{Context, Result};
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::catalog::{SessionCard, SessionSource};
use crate::config::Selection;
use crate::report::{ReportWriter, SessionRecord};
use crate::schedule::{ScheduleInfo, ScheduleLookup, decode};
use crate::utils::log_if_slow;

/// Schedule lookups slower than this are logged.
const SLOW_LOOKUP_THRESHOLD: Duration = Duration::from_secs(2);

/// Counters for one completed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Session rows seen across every (day, venue) search.
    pub cards: usize,
    pub written: usize,
    /// Rows dropped by the session type filter.
    pub filtered: usize,
}

/// Drives one sequential pass over the selected days and venues.
///
/// A session listed under several searches is written once per listing.
pub struct Harvester<'a> {
    source: &'a dyn SessionSource,
    lookup: &'a dyn ScheduleLookup,
    event_year: i32,
}

impl<'a> Harvester<'a> {
    pub fn new(
        source: &'a dyn SessionSource,
        lookup: &'a dyn ScheduleLookup,
        event_year: i32,
    ) -> Self {
        Self {
            source,
            lookup,
            event_year,
        }
    }

    /// Scrape every (day, venue) pair in `selection`, days outermost, writing
    /// rows as they are produced. The first failure aborts the run.
    pub async fn run<W: Write>(
        &self,
        selection: &Selection,
        writer: &mut ReportWriter<W>,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for day in &selection.days {
            for venue in &selection.venues {
                info!(
                    venue = venue.name.as_str(),
                    day = day.name.as_str(),
                    "Getting content"
                );

                let rows = self
                    .source
                    .fetch_rows(day, venue)
                    .await
                    .with_context(|| format!("failed to list sessions at {} on {}", venue.name, day.name))?;

                info!(
                    venue = venue.name.as_str(),
                    day = day.name.as_str(),
                    count = rows.len(),
                    "sessions found"
                );

                for fragment in &rows {
                    summary.cards += 1;

                    let card = SessionCard::parse(fragment).context("failed to parse session row")?;

                    if !wanted(selection, &card) {
                        debug!(
                            number = card.number.as_str(),
                            session_type = card.session_type.as_str(),
                            "skipping session type"
                        );
                        summary.filtered += 1;
                        continue;
                    }

                    let record = self.enrich(&card).await?;
                    writer
                        .write(&record)
                        .context("failed to write report row")?;
                    summary.written += 1;

                    info!(
                        number = record.number.as_str(),
                        title = record.title.as_str(),
                        "wrote session"
                    );
                }
            }
        }

        Ok(summary)
    }

    /// Look up and normalize the schedule for one card.
    async fn enrich(&self, card: &SessionCard) -> Result<SessionRecord> {
        let start = Instant::now();
        let raw = self
            .lookup
            .lookup(&card.id)
            .await
            .with_context(|| format!("schedule lookup failed for session {}", card.id))?;
        log_if_slow(start, SLOW_LOOKUP_THRESHOLD, "schedule lookup");

        let schedule = ScheduleInfo::from_fields(&decode(&raw), self.event_year)
            .with_context(|| format!("bad schedule for {} ({})", card.number, card.id))?;

        Ok(SessionRecord::new(card, &schedule))
    }
}

fn wanted(selection: &Selection, card: &SessionCard) -> bool {
    selection.types.is_empty()
        || selection
            .types
            .iter()
            .any(|kind| kind.eq_ignore_ascii_case(card.session_type.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::config::Facet;
    use crate::schedule::ScheduleError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedSource(Vec<String>);

    #[async_trait]
    impl SessionSource for FixedSource {
        async fn fetch_rows(
            &self,
            _day: &Facet,
            _venue: &Facet,
        ) -> Result<Vec<String>, CatalogError> {
            Ok(self.0.clone())
        }
    }

    struct FixedLookup(HashMap<String, String>);

    #[async_trait]
    impl ScheduleLookup for FixedLookup {
        async fn lookup(&self, session_id: &str) -> Result<String, ScheduleError> {
            Ok(self.0.get(session_id).cloned().unwrap_or_default())
        }
    }

    fn row(id: &str, number: &str, kind: &str) -> String {
        format!(
            r#"<div class="sessionRow" id="session_{id}">
                <span class="abbreviation">{number} - </span>
                <span class="title">Title {id}</span>
                <small class="type">{kind}</small>
            </div>"#
        )
    }

    fn reply(start: &str, end: &str, room: &str) -> String {
        format!(r#"{{\"startTime\":\"{start}\",\"endTime\":\"{end}\",\"room\":\"{room}\"}}"#)
    }

    fn selection(days: usize, types: &[&str]) -> Selection {
        Selection {
            days: (0..days)
                .map(|i| Facet {
                    name: format!("Day{i}"),
                    code: i as u32,
                })
                .collect(),
            venues: vec![Facet {
                name: "Aria".into(),
                code: 22191,
            }],
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn lookup() -> FixedLookup {
        FixedLookup(HashMap::from([
            ("1".to_string(), reply("Monday, Nov 26, 9:00 AM", "10:00 AM", "Aria, Level 3")),
            ("2".to_string(), reply("Monday, Nov 26, 1:00 PM", "2:00 PM", "Aria, Level 1")),
        ]))
    }

    #[tokio::test]
    async fn test_every_search_listing_is_written() {
        let source = FixedSource(vec![row("1", "ARC201", "Session"), row("2", "DEV301", "Workshop")]);
        let lookup = lookup();
        let mut writer = ReportWriter::new(Vec::new()).unwrap();

        let summary = Harvester::new(&source, &lookup, 2018)
            .run(&selection(2, &[]), &mut writer)
            .await
            .unwrap();

        // Same rows under two days: no deduplication.
        assert_eq!(
            summary,
            RunSummary {
                cards: 4,
                written: 4,
                filtered: 0
            }
        );
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert!(text.contains(
            "ARC201|Session|Title 1|False|26/11/2018 09:00:00|10:00:00|Aria, Level 3|Monday"
        ));
    }

    #[tokio::test]
    async fn test_type_filter_skips_other_types() {
        let source = FixedSource(vec![row("1", "ARC201", "Session"), row("2", "DEV301", "Workshop")]);
        let lookup = lookup();
        let mut writer = ReportWriter::new(Vec::new()).unwrap();

        let summary = Harvester::new(&source, &lookup, 2018)
            .run(&selection(1, &["Workshop"]), &mut writer)
            .await
            .unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(summary.filtered, 1);
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.contains("DEV301|Workshop|"));
        assert!(!text.contains("ARC201"));
    }

    #[tokio::test]
    async fn test_missing_schedule_aborts_run() {
        let source = FixedSource(vec![row("1", "ARC201", "Session"), row("3", "NET101", "Session")]);
        let lookup = lookup();
        let mut writer = ReportWriter::new(Vec::new()).unwrap();

        let err = Harvester::new(&source, &lookup, 2018)
            .run(&selection(1, &[]), &mut writer)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("NET101"));
        // The row before the failure is already written.
        assert_eq!(writer.rows(), 1);
    }
}
