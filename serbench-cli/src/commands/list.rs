// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! List available fixtures and adapters.

use serbench_core::adapter::AdapterConfig;
use serbench_core::{AdapterRegistry, FixtureRegistry, Mode};

pub fn execute() -> anyhow::Result<()> {
    let fixtures = FixtureRegistry::with_builtins();
    let adapters = AdapterRegistry::with_builtin_engines(AdapterConfig::default());

    println!("Fixtures");
    println!("--------");
    for name in fixtures.names() {
        let raw = fixtures.raw(&name)?;
        let dataset = fixtures.load(&name)?;
        println!(
            "  {:<10} {:>8} bytes  {:>4} records",
            name,
            raw.len(),
            dataset.typed.len()
        );
    }

    println!();
    println!("Adapters");
    println!("--------");
    for id in adapters.ids() {
        let Some(adapter) = adapters.get(&id) else {
            continue;
        };
        let caps = adapter.capabilities();
        let modes: Vec<&str> = Mode::ALL
            .iter()
            .filter(|mode| caps.supports(**mode))
            .map(|mode| mode.name())
            .collect();
        println!(
            "  {:<12} modes: {:<16} date format: {}",
            id,
            modes.join(", "),
            adapter.config().date_format.pattern()
        );
    }

    Ok(())
}
