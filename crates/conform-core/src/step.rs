//! Running a single labelled step and reporting how it went.

use crate::Result;
use crossterm::style::{Color, Stylize};
use std::fmt;
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

const SUCCESS_MARKER: &str = "SUCCESS ✓";
const FAILURE_MARKER: &str = "FAILURE ✗";

/// What happened when a step ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub label: String,
    pub elapsed: Duration,
    pub passed: bool,
    /// Error message of a failed step
    pub message: Option<String>,
}

/// Runs steps one after another, writing a status line for each to an
/// output sink and recording the outcomes.
pub struct StepRunner<W> {
    out: W,
    color: bool,
    outcomes: Vec<StepOutcome>,
}

impl<W: Write> StepRunner<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            color: false,
            outcomes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write to the output sink. Write failures are logged, never fatal.
    pub fn print(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|()| self.out.flush()) {
            warn!("Failed to write step output: {e}");
        }
    }

    /// Apply a colour if colour output is enabled
    #[must_use]
    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Run one step. The label is printed before the step starts, the
    /// status and elapsed time once it finishes. The step's result is
    /// returned untouched.
    ///
    /// # Errors
    ///
    /// Returns whatever error the step itself returned.
    pub async fn run<T, F>(&mut self, label: impl Into<String>, step: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let label = label.into();
        self.print(format_args!("  {label} "));

        let timer = Instant::now();
        let result = step.await;
        let elapsed = timer.elapsed();

        let marker = match &result {
            Ok(_) => self.paint(SUCCESS_MARKER, Color::Green),
            Err(_) => self.paint(FAILURE_MARKER, Color::Red),
        };
        let timing = self.paint(&format!("in {elapsed:?}"), Color::White);
        self.print(format_args!("{marker} {timing}\n"));

        self.outcomes.push(StepOutcome {
            label,
            elapsed,
            passed: result.is_ok(),
            message: result.as_ref().err().map(ToString::to_string),
        });

        result
    }

    #[must_use]
    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    /// Forget recorded outcomes, keeping the sink
    pub fn reset(&mut self) {
        self.outcomes.clear();
    }

    #[must_use]
    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }
}
