// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

use std::{
    fs::{self, File},
    io,
    path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pika::{counter::CounterWriter, Patcher};
use qsufsort::{Progress, SortOptions};

#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a patch that transforms OLD into NEW
    Diff {
        old: PathBuf,
        new: PathBuf,
        patch: PathBuf,
        /// Suffix-sorting worker threads (default: one per core; 0 sorts on
        /// the main thread only)
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Report time spent on parallel sorting overhead
        #[arg(long)]
        sort_timings: bool,
    },
    /// Apply PATCH to OLD, writing the result to OUT
    Patch {
        old: PathBuf,
        patch: PathBuf,
        out: PathBuf,
    },
}

/// Progress positions are reported in units of one thousandth.
const PROGRESS_SCALE: u64 = 1000;

struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> anyhow::Result<Self> {
        let bar = ProgressBar::new(PROGRESS_SCALE);
        bar.set_style(ProgressStyle::default_bar().template("{msg:24} {wide_bar} {percent:>3}%")?);

        Ok(Self { bar })
    }
}

impl Progress for BarProgress {
    fn set_label(&self, label: &str) {
        self.bar.set_message(label.to_string());
    }

    fn on_progress(&self, fraction: f64) {
        self.bar
            .set_position((fraction * PROGRESS_SCALE as f64) as u64);
    }

    fn debug(&self, message: &str) {
        log::debug!("{message}");
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Diff {
            old,
            new,
            patch,
            jobs,
            sort_timings,
        } => {
            let old_data = fs::read(&old)
                .with_context(|| format!("Failed to read old file '{}'", old.display()))?;
            let new_data = fs::read(&new)
                .with_context(|| format!("Failed to read new file '{}'", new.display()))?;

            let patch_file = File::create(&patch)
                .with_context(|| format!("Failed to create patch file '{}'", patch.display()))?;
            let mut patch_writer = CounterWriter::new(Some(patch_file));

            let sort_options = match jobs {
                None => SortOptions::auto(),
                Some(workers) => SortOptions::with_workers(workers),
            }
            .measure_copy_overhead(sort_timings);
            let progress = BarProgress::new()?;

            pika::diff_with_options(
                &old_data,
                &new_data,
                &mut patch_writer,
                &sort_options,
                &progress,
            )
            .context("I/O error occurred while generating patch file")?;

            progress.bar.finish_and_clear();
            println!("{} ({} bytes)", patch.display(), patch_writer.count());
        }
        Command::Patch { old, patch, out } => {
            let old_file = File::open(&old)
                .with_context(|| format!("Failed to open old file '{}'", old.display()))?;
            let patch_file = File::open(&patch)
                .with_context(|| format!("Failed to open patch file '{}'", patch.display()))?;
            let mut out_file = File::create(&out)
                .with_context(|| format!("Failed to create out file '{}'", out.display()))?;

            let mut patcher =
                Patcher::new(old_file, patch_file).context("Failed to read patch file")?;
            io::copy(&mut patcher, &mut out_file)
                .context("I/O error occurred while applying patch file")?;
        }
    }

    Ok(())
}
