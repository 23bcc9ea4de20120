//! `pairgc scenarios`: Run the demonstration scenarios and report PASS/FAIL.

use crate::output::{self, StyledOutput};
use anyhow::ensure;
use pairgc_core::{Vm, VmOptions};
use std::time::Instant;
use termcolor::Color;

struct Scenario {
    name: &'static str,
    run: fn(&VmOptions) -> anyhow::Result<()>,
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "objects on the stack are preserved",
        run: preserved_on_stack,
    },
    Scenario {
        name: "unreached objects are collected",
        run: unreached_collected,
    },
    Scenario {
        name: "nested objects are reached",
        run: nested_reached,
    },
    Scenario {
        name: "cycles are handled",
        run: cycles_handled,
    },
];

/// Returns false if any scenario failed.
pub fn execute(options: &VmOptions, color: &str) -> anyhow::Result<bool> {
    let mut out = StyledOutput::new(output::resolve_color_choice(color));
    let start = Instant::now();
    let mut failed = 0;

    for scenario in SCENARIOS {
        log::debug!("running scenario: {}", scenario.name);
        match (scenario.run)(options) {
            Ok(()) => {
                out.pass_badge();
                out.plain(&format!(" {}", scenario.name));
            }
            Err(e) => {
                failed += 1;
                out.fail_badge();
                out.plain(&format!(" {} ", scenario.name));
                out.dim(&format!("({})", e));
            }
        }
        out.newline();
    }

    out.newline();
    let passed = SCENARIOS.len() - failed;
    if failed == 0 {
        out.heading(&format!("{} passed", passed), Color::Green);
    } else {
        out.heading(&format!("{} failed", failed), Color::Red);
        out.plain(&format!(", {} passed", passed));
    }
    out.dim(&format!(" ({:.2?})", start.elapsed()));
    out.newline();
    out.flush();

    Ok(failed == 0)
}

fn preserved_on_stack(options: &VmOptions) -> anyhow::Result<()> {
    let mut vm = Vm::with_options(options.clone());
    vm.push_scalar(1)?;
    vm.push_scalar(2)?;

    vm.collect();
    ensure!(
        vm.num_allocated() == 2,
        "expected 2 objects to survive, found {}",
        vm.num_allocated()
    );
    vm.destroy();
    Ok(())
}

fn unreached_collected(options: &VmOptions) -> anyhow::Result<()> {
    let mut vm = Vm::with_options(options.clone());
    vm.push_scalar(1)?;
    vm.push_scalar(2)?;
    vm.pop()?;
    vm.pop()?;

    vm.collect();
    ensure!(
        vm.num_allocated() == 0,
        "expected no objects, found {}",
        vm.num_allocated()
    );
    vm.destroy();
    Ok(())
}

fn nested_reached(options: &VmOptions) -> anyhow::Result<()> {
    let mut vm = Vm::with_options(options.clone());
    vm.push_scalar(1)?;
    vm.push_scalar(2)?;
    vm.push_pair()?;
    vm.push_scalar(3)?;
    vm.push_scalar(4)?;
    vm.push_pair()?;
    vm.push_pair()?;

    vm.collect();
    ensure!(
        vm.num_allocated() == 7,
        "expected 7 objects to survive, found {}",
        vm.num_allocated()
    );
    ensure!(
        vm.stack_depth() == 1,
        "expected a single root, found {}",
        vm.stack_depth()
    );
    vm.destroy();
    Ok(())
}

fn cycles_handled(options: &VmOptions) -> anyhow::Result<()> {
    let mut vm = Vm::with_options(options.clone());
    vm.push_scalar(1)?;
    vm.push_scalar(2)?;
    let a = vm.push_pair()?;
    vm.push_scalar(3)?;
    vm.push_scalar(4)?;
    let b = vm.push_pair()?;

    // Set up a cycle, and also make 2 and 4 unreachable
    vm.set_second(a, b)?;
    vm.set_second(b, a)?;

    vm.collect();
    ensure!(
        vm.num_allocated() == 4,
        "expected 4 objects to survive, found {}",
        vm.num_allocated()
    );
    vm.destroy();
    Ok(())
}
