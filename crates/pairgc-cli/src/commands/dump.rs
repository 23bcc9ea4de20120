//! `pairgc dump`: Print the heap and stack around a collection.

use pairgc_core::{Vm, VmOptions};

pub fn execute(options: &VmOptions) -> anyhow::Result<()> {
    let mut vm = build_cycle(options)?;

    println!("== before collection ==");
    print_state(&vm);

    let freed = vm.collect();
    println!();
    println!("== after collection ({} freed) ==", freed);
    print_state(&vm);

    let released = vm.destroy();
    println!();
    println!("Teardown released {} objects", released);
    Ok(())
}

/// Two pairs pointing at each other, with their initial second
/// operands left unreachable.
fn build_cycle(options: &VmOptions) -> anyhow::Result<Vm> {
    let mut vm = Vm::with_options(options.clone());
    vm.push_scalar(1)?;
    vm.push_scalar(2)?;
    let a = vm.push_pair()?;
    vm.push_scalar(3)?;
    vm.push_scalar(4)?;
    let b = vm.push_pair()?;
    vm.set_second(a, b)?;
    vm.set_second(b, a)?;
    Ok(vm)
}

fn print_state(vm: &Vm) {
    println!("Heap ({} live, threshold {}):", vm.num_allocated(), vm.threshold());
    for entry in vm.heap_dump() {
        println!("  {}", entry);
    }

    println!("Stack ({} deep):", vm.stack_depth());
    for (slot, rendered) in vm.stack_dump().iter().enumerate().rev() {
        println!("  [{}] {}", slot, rendered);
    }
}
