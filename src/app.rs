use crate::catalog::CatalogClient;
use crate::cli::Args;
use crate::config::{Config, Selection};
use crate::harvest::Harvester;
use crate::report::ReportWriter;
use crate::schedule::ScheduleClient;
use crate::utils::fmt_duration;
use anyhow::Context;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};

/// Main application struct: the resolved configuration and what to scrape.
pub struct App {
    config: Config,
    selection: Selection,
}

impl App {
    /// Resolve the command-line filters against the loaded configuration.
    pub fn new(config: Config, args: &Args) -> Result<Self, anyhow::Error> {
        let selection = config
            .select(&args.days, &args.venues, &args.types)
            .context("Invalid search selection")?;

        info!(
            days = selection.days.len(),
            venues = selection.venues.len(),
            types = ?selection.types,
            event_year = config.event_year,
            output = %config.output_path.display(),
            verify_tls = config.verify_tls,
            "configuration loaded"
        );

        Ok(App { config, selection })
    }

    /// Run the scrape and report the outcome as a process exit code.
    pub async fn run(self) -> ExitCode {
        let started = Instant::now();
        match self.scrape().await {
            Ok(()) => {
                info!(duration = fmt_duration(started.elapsed()), "run complete");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(
                    error = ?e,
                    output = %self.config.output_path.display(),
                    "run aborted, rows written so far are kept"
                );
                ExitCode::FAILURE
            }
        }
    }

    async fn scrape(&self) -> Result<(), anyhow::Error> {
        let catalog = CatalogClient::new(&self.config).context("Failed to create catalog client")?;
        let schedule =
            ScheduleClient::new(&self.config).context("Failed to create schedule client")?;

        catalog
            .login(&self.config.credentials)
            .await
            .context("Failed to log in to the catalog")?;

        let mut writer = ReportWriter::create(&self.config.output_path).with_context(|| {
            format!(
                "Failed to create report at {}",
                self.config.output_path.display()
            )
        })?;

        let summary = Harvester::new(&catalog, &schedule, self.config.event_year)
            .run(&self.selection, &mut writer)
            .await?;

        info!(
            cards = summary.cards,
            written = summary.written,
            filtered = summary.filtered,
            output = %self.config.output_path.display(),
            "report written"
        );
        Ok(())
    }
}
