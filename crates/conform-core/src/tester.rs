//! The conformance run: which steps apply to an adapter, in which order.
//!
//! Steps always run in the same order (config check, login, one probe per
//! search mode, empty results, ratio) and the run stops at the first step
//! that fails. That failure is the run's result.

use crate::adapter::Adapter;
use crate::step::{StepOutcome, StepRunner};
use crate::validate::validate_results;
use crate::{Error, Result};
use conform_types::{Category, Query, SearchMode};
use crossterm::style::Color;
use std::io::{Stdout, Write};
use tracing::debug;

/// Series filter that must not match anything on a real site
pub const EMPTY_QUERY: &str = "nothingshouldmatchtheseresults";

/// Results requested per search mode probe
pub const DEFAULT_SEARCH_LIMIT: usize = 3;

/// Categories a TV search is restricted to when the mode declares none
const TV_CATEGORIES: [Category; 2] = [Category::TV_HD, Category::TV_SD];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesterOptions {
    /// Fetch every non-magnet result link during search probes
    pub download: bool,

    /// Colour the status markers
    pub color: bool,

    pub search_limit: usize,

    pub empty_query: String,
}

impl Default for TesterOptions {
    fn default() -> Self {
        Self {
            download: false,
            color: false,
            search_limit: DEFAULT_SEARCH_LIMIT,
            empty_query: EMPTY_QUERY.to_string(),
        }
    }
}

/// Terminal state of a conformance run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    NotRun,
    AllPassed,
    FailedAt { step: String },
}

impl RunOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self, Self::AllPassed)
    }
}

/// Drives the conformance steps against one adapter at a time.
pub struct Tester<W = Stdout> {
    options: TesterOptions,
    runner: StepRunner<W>,
    outcome: RunOutcome,
}

impl Tester<Stdout> {
    /// Tester writing progress to standard output
    #[must_use]
    pub fn new(options: TesterOptions) -> Self {
        Self::with_output(options, std::io::stdout())
    }
}

impl<W: Write> Tester<W> {
    pub fn with_output(options: TesterOptions, out: W) -> Self {
        let runner = StepRunner::new(out).with_color(options.color);
        Self {
            options,
            runner,
            outcome: RunOutcome::NotRun,
        }
    }

    #[must_use]
    pub fn options(&self) -> &TesterOptions {
        &self.options
    }

    /// Outcomes of the steps of the last run, in execution order
    #[must_use]
    pub fn steps(&self) -> &[StepOutcome] {
        self.runner.outcomes()
    }

    #[must_use]
    pub fn outcome(&self) -> &RunOutcome {
        &self.outcome
    }

    #[must_use]
    pub fn output(&self) -> &W {
        self.runner.output()
    }

    pub fn into_output(self) -> W {
        self.runner.into_output()
    }

    /// Run every applicable step against `adapter`, printing a header, one
    /// line per step and a summary.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step, unchanged.
    pub async fn test<A: Adapter>(&mut self, adapter: &A) -> Result<()> {
        self.runner.reset();
        let info = adapter.info();
        self.runner.print(format_args!(
            "→ Testing adapter {} at {}\n",
            info.id, info.link
        ));

        let result = self.run_steps(adapter).await;

        match &result {
            Ok(()) => {
                self.outcome = RunOutcome::AllPassed;
                let ok = self.runner.paint("OK", Color::Green);
                self.runner
                    .print(format_args!("→ Adapter {} is {ok}\n", info.id));
            }
            Err(err) => {
                self.outcome = RunOutcome::FailedAt {
                    step: self
                        .steps()
                        .last()
                        .map(|s| s.label.clone())
                        .unwrap_or_default(),
                };
                let failed = self.runner.paint("FAILED", Color::Red);
                let message = self.runner.paint(&err.to_string(), Color::Red);
                self.runner
                    .print(format_args!("→ Adapter {} {failed} with {message}\n", info.id));
            }
        }

        result
    }

    async fn run_steps<A: Adapter>(&mut self, adapter: &A) -> Result<()> {
        if adapter.requires_login() {
            self.runner
                .run("Testing required config is available", async {
                    adapter.check_has_config()
                })
                .await?;

            self.runner
                .run("Testing login with valid credentials", adapter.login())
                .await?;
        } else {
            debug!("Adapter {} needs no login", adapter.info().id);
        }

        for mode in adapter.capabilities().search_modes {
            let query = self.mode_query(&mode);
            let label = format!("Testing search mode {:?}", mode.key);
            self.runner
                .run(label, probe_search(adapter, query, self.options.download))
                .await?;
        }

        let query = Query::default().with_series(self.options.empty_query.clone());
        self.runner
            .run(
                "Testing empty results are handled",
                probe_empty_results(adapter, query),
            )
            .await?;

        self.runner.run("Testing ratio", probe_ratio(adapter)).await?;

        Ok(())
    }

    /// Fresh query for a search mode probe
    fn mode_query(&self, mode: &SearchMode) -> Query {
        let categories = if !mode.categories.is_empty() {
            mode.categories.clone()
        } else if mode.is_tv() {
            TV_CATEGORIES.to_vec()
        } else {
            Vec::new()
        };

        Query::for_mode(mode.key.clone())
            .with_limit(self.options.search_limit)
            .with_categories(categories)
    }
}

async fn probe_search<A: Adapter>(adapter: &A, query: Query, download: bool) -> Result<()> {
    let results = adapter.search(&query).await?;
    debug!(
        "Search mode {:?} returned {} results",
        query.mode.as_deref().unwrap_or_default(),
        results.len()
    );
    validate_results(adapter, &results, download).await
}

async fn probe_empty_results<A: Adapter>(adapter: &A, query: Query) -> Result<()> {
    let results = adapter.search(&query).await?;
    if results.is_empty() {
        Ok(())
    } else {
        Err(Error::UnexpectedResults(results.len()))
    }
}

async fn probe_ratio<A: Adapter>(adapter: &A) -> Result<()> {
    let ratio = adapter.ratio().await?;
    debug!("Ratio returned {ratio}");
    Ok(())
}

/// Run a full conformance test of `adapter`, writing progress to `out`.
///
/// # Errors
///
/// Returns the error of the first failing step.
pub async fn test_adapter<A: Adapter, W: Write>(
    adapter: &A,
    options: TesterOptions,
    out: W,
) -> Result<()> {
    Tester::with_output(options, out).test(adapter).await
}
