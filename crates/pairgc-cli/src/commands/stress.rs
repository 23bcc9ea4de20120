//! `pairgc stress`: Allocation churn followed by teardown.

use anyhow::Context;
use pairgc_core::{Vm, VmOptions};
use serde::Serialize;
use std::time::Instant;

/// Arguments for the stress command.
pub struct StressArgs {
    pub rounds: usize,
    pub batch: usize,
    pub json: bool,
}

/// Collector statistics gathered over one stress run.
#[derive(Debug, Serialize)]
pub struct StressReport {
    pub rounds: usize,
    pub batch: usize,
    pub collections: usize,
    pub threshold_collections: usize,
    pub objects_allocated: usize,
    pub objects_freed: usize,
    pub peak_live_objects: usize,
    pub final_threshold: usize,
    pub released_at_teardown: usize,
    pub total_pause_us: u128,
    pub avg_pause_us: u128,
    pub max_pause_us: u128,
    pub elapsed_ms: u128,
}

pub fn execute(options: &VmOptions, args: StressArgs) -> anyhow::Result<()> {
    let report = run(options, args.rounds, args.batch)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Push `batch` scalars and pop them again, `rounds` times, then tear down.
pub fn run(options: &VmOptions, rounds: usize, batch: usize) -> anyhow::Result<StressReport> {
    let start = Instant::now();
    let mut vm = Vm::with_options(options.clone());

    for round in 0..rounds {
        for j in 0..batch {
            let value = i32::try_from(j).context("batch does not fit in a scalar")?;
            vm.push_scalar(value)
                .with_context(|| format!("push {} of round {}", j, round))?;
        }
        for _ in 0..batch {
            vm.pop()?;
        }
    }

    let stats = vm.gc_stats().clone();
    let final_threshold = vm.threshold();
    let released_at_teardown = vm.destroy();
    log::debug!("stress run released {} objects at teardown", released_at_teardown);

    Ok(StressReport {
        rounds,
        batch,
        collections: stats.collections,
        threshold_collections: stats.threshold_collections,
        objects_allocated: stats.objects_allocated,
        objects_freed: stats.objects_freed,
        peak_live_objects: stats.peak_live_objects,
        final_threshold,
        released_at_teardown,
        total_pause_us: stats.total_pause_time.as_micros(),
        avg_pause_us: stats.avg_pause_time.as_micros(),
        max_pause_us: stats.max_pause_time.as_micros(),
        elapsed_ms: start.elapsed().as_millis(),
    })
}

fn print_report(report: &StressReport) {
    println!("Rounds:        {} x {}", report.rounds, report.batch);
    println!("Allocated:     {}", report.objects_allocated);
    println!("Freed:         {}", report.objects_freed);
    println!(
        "Collections:   {} ({} threshold)",
        report.collections, report.threshold_collections
    );
    println!("Peak live:     {}", report.peak_live_objects);
    println!("Threshold:     {}", report.final_threshold);
    println!("Teardown:      {} released", report.released_at_teardown);
    println!(
        "Pause:         total {}us, avg {}us, max {}us",
        report.total_pause_us, report.avg_pause_us, report.max_pause_us
    );
    println!("Elapsed:       {}ms", report.elapsed_ms);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_run_stays_bounded() {
        let report = run(&VmOptions::default(), 1000, 20).unwrap();

        assert_eq!(report.objects_allocated, 20_000);
        assert!(report.peak_live_objects <= 40);
        assert!(report.collections > 0);
        assert_eq!(
            report.objects_freed + report.released_at_teardown,
            report.objects_allocated
        );
    }

    #[test]
    fn test_batch_larger_than_stack_is_an_error() {
        let options = VmOptions {
            stack_max: 4,
            ..Default::default()
        };
        let err = run(&options, 1, 5).unwrap_err();
        assert!(format!("{:#}", err).contains("Stack overflow"));
    }
}
