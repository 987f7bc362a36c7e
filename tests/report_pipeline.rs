//! End-to-end: session rows and schedule replies in, report file out.

use async_trait::async_trait;
use reinvent_sessions::catalog::{CatalogError, SessionSource};
use reinvent_sessions::config::{Facet, Selection};
use reinvent_sessions::harvest::Harvester;
use reinvent_sessions::report::{HEADER, ReportWriter};
use reinvent_sessions::schedule::{ScheduleError, ScheduleLookup};
use std::collections::HashMap;

/// Serves canned rows per (day code, venue code).
struct CannedCatalog {
    rows: HashMap<(u32, u32), Vec<String>>,
}

#[async_trait]
impl SessionSource for CannedCatalog {
    async fn fetch_rows(&self, day: &Facet, venue: &Facet) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .rows
            .get(&(day.code, venue.code))
            .cloned()
            .unwrap_or_default())
    }
}

/// Serves canned DWR replies per session id.
struct CannedSchedule {
    replies: HashMap<String, String>,
}

#[async_trait]
impl ScheduleLookup for CannedSchedule {
    async fn lookup(&self, session_id: &str) -> Result<String, ScheduleError> {
        Ok(self.replies.get(session_id).cloned().unwrap_or_default())
    }
}

fn facet(name: &str, code: u32) -> Facet {
    Facet {
        name: name.to_owned(),
        code,
    }
}

fn dwr_reply(start: &str, end: &str, room: &str) -> String {
    format!(
        "//#DWR-REPLY\ndwr.engine._remoteHandleCallback('5','0',\"{{\\\"startTime\\\":\\\"{start}\\\",\\\"endTime\\\":\\\"{end}\\\",\\\"room\\\":\\\"{room}\\\"}}\");"
    )
}

#[tokio::test]
async fn writes_header_and_one_line_per_listing() {
    let deep_dive = r##"<div class="sessionRow" id="session_98765">
        <span class="abbreviation">SEC301 - </span>
        <span class="title">Deep Dive <i class="fa fa-headphones"></i></span>
        <small class="type">Session</small>
        <span class="abstract">All about it.</span>
        <a class="interested" href="#">Interested</a>
    </div>"##;
    let chalk_talk = r#"<div class="sessionRow" id="session_4242">
        <span class="abbreviation">ARC210 - </span>
        <span class="title">Serverless Patterns</span>
        <small class="type">Chalk Talk</small>
    </div>"#;

    let catalog = CannedCatalog {
        rows: HashMap::from([
            ((110, 22188), vec![deep_dive.to_owned()]),
            ((110, 22191), vec![chalk_talk.to_owned()]),
        ]),
    };
    let schedule = CannedSchedule {
        replies: HashMap::from([
            (
                "98765".to_owned(),
                dwr_reply("Wednesday, Nov 28, 5:30 PM", "6:30 PM", "Venetian, Murano 3301"),
            ),
            (
                "4242".to_owned(),
                dwr_reply("Wednesday, Nov 28, 11:30 PM", "12:30 AM", "Aria, Level 2"),
            ),
        ]),
    };
    let selection = Selection {
        days: vec![facet("Wednesday", 110)],
        venues: vec![facet("Venetian", 22188), facet("Aria", 22191), facet("MGM", 22190)],
        types: Vec::new(),
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.txt");
    let mut writer = ReportWriter::create(&path).unwrap();

    let summary = Harvester::new(&catalog, &schedule, 2018)
        .run(&selection, &mut writer)
        .await
        .unwrap();
    drop(writer);

    assert_eq!(summary.cards, 2);
    assert_eq!(summary.written, 2);

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            HEADER,
            "SEC301|Session|Deep Dive|True|28/11/2018 17:30:00|18:30:00|Venetian, Murano 3301|Wednesday",
            // End time crosses midnight and is kept as a bare time of day.
            "ARC210|Chalk Talk|Serverless Patterns|False|28/11/2018 23:30:00|00:30:00|Aria, Level 2|Wednesday",
        ]
    );
    assert!(lines.iter().all(|line| line.split('|').count() == 8));
}

#[tokio::test]
async fn rows_before_a_failure_stay_on_disk() {
    let good = r#"<div class="sessionRow" id="session_1">
        <span class="abbreviation">A1</span><span class="title">Good</span>
        <small class="type">Session</small></div>"#;
    let no_id = r#"<div class="sessionRow">
        <span class="abbreviation">A2</span><span class="title">Broken</span>
        <small class="type">Session</small></div>"#;

    let catalog = CannedCatalog {
        rows: HashMap::from([((31, 728), vec![good.to_owned(), no_id.to_owned()])]),
    };
    let schedule = CannedSchedule {
        replies: HashMap::from([(
            "1".to_owned(),
            dwr_reply("Tuesday, Nov 27, 8:00 AM", "9:00 AM", "Encore, Wynn 1"),
        )]),
    };
    let selection = Selection {
        days: vec![facet("Tuesday", 31)],
        venues: vec![facet("Encore", 728)],
        types: Vec::new(),
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.txt");
    let mut writer = ReportWriter::create(&path).unwrap();

    let result = Harvester::new(&catalog, &schedule, 2018)
        .run(&selection, &mut writer)
        .await;
    assert!(result.is_err());

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("A1|Session|Good|False|27/11/2018 08:00:00|09:00:00|Encore, Wynn 1|Tuesday"));
}
