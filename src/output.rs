// src/output.rs
//! Presentation sink seam
//!
//! The engine hands each [`RunReport`] to a [`PresentationSink`] and never
//! assumes how it is drawn. [`CsvSink`] is the one sink shipped here: it
//! writes the parallel arrays as CSV to any writer.

use crate::analytics::theory::TheoreticalCurve;
use crate::frequency::FrequencySeries;
use crate::histogram::HistogramSnapshot;
use crate::mc::engine::RunReport;
use crate::models::Trajectory;
use std::fmt::Display;
use std::io::{self, Write};

pub trait PresentationSink {
    fn present(&mut self, report: &RunReport) -> io::Result<()>;
}

/// Writes histogram, theory and summary (and optionally trajectories) as CSV
pub struct CsvSink<W: Write> {
    writer: W,
    include_trajectories: bool,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        CsvSink {
            writer,
            include_trajectories: false,
        }
    }

    pub fn with_trajectories(mut self, include: bool) -> Self {
        self.include_trajectories = include;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PresentationSink for CsvSink<W> {
    fn present(&mut self, report: &RunReport) -> io::Result<()> {
        let summary = report.summary();
        writeln!(self.writer, "# process,{}", summary.process)?;
        if let Some(mode) = summary.mode {
            writeln!(self.writer, "# mode,{:?}", mode)?;
        }
        writeln!(self.writer, "# runs,{}", summary.total_runs)?;
        writeln!(self.writer, "# displayed,{}", summary.displayed)?;
        if let Some(reduction) = report.display_reduction() {
            writeln!(
                self.writer,
                "# display_reduced,{} of {}",
                reduction.shown, reduction.available
            )?;
        }
        for notice in report.notices() {
            writeln!(self.writer, "# notice,{}", quote_field(&notice.to_string()))?;
        }
        write_histogram(&mut self.writer, report.histogram(), report.theory())?;
        if let Some(series) = report.as_discrete().and_then(|out| out.frequency.as_ref()) {
            write_frequency(&mut self.writer, series)?;
        }

        if self.include_trajectories {
            match report {
                RunReport::Discrete(out) => write_trajectories(&mut self.writer, &out.trajectories)?,
                RunReport::Continuous(out) => write_trajectories(&mut self.writer, &out.trajectories)?,
            }
        }
        self.writer.flush()
    }
}

pub fn write_histogram<W: Write>(
    writer: &mut W,
    histogram: &HistogramSnapshot,
    theory: &TheoreticalCurve,
) -> io::Result<()> {
    writeln!(writer, "label,count,most_recent,expected")?;
    for (i, label) in histogram.labels.iter().enumerate() {
        let expected = theory.expected.get(i).copied().unwrap_or(0.0);
        writeln!(
            writer,
            "{},{},{},{}",
            label, histogram.counts[i], histogram.most_recent[i], expected
        )?;
    }
    Ok(())
}

pub fn write_frequency<W: Write>(writer: &mut W, series: &FrequencySeries) -> io::Result<()> {
    writeln!(writer, "trials,frequency,mean_frequency")?;
    for point in &series.points {
        writeln!(writer, "{},{},{}", point.trials, point.frequency, series.mean_frequency)?;
    }
    Ok(())
}

/// Quote a CSV field, doubling embedded quotes (RFC 4180)
pub fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

pub fn write_trajectories<W: Write, T: Copy + Display>(
    writer: &mut W,
    trajectories: &[Trajectory<T>],
) -> io::Result<()> {
    writeln!(writer, "trajectory_id,step,value")?;
    for (id, traj) in trajectories.iter().enumerate() {
        for (step, value) in traj.values().iter().enumerate() {
            writeln!(writer, "{},{},{}", id, step, value)?;
        }
    }
    Ok(())
}
