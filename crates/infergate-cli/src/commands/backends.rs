//! Backends command - list supported engines.

use console::style;

use infergate_core::{BackendFactory, EngineKind, NativeProvider};

pub async fn run() -> anyhow::Result<()> {
    let factory = BackendFactory::new(NativeProvider::new());

    println!("{}", style("Supported backends:").bold());
    println!();

    for kind in EngineKind::ALL {
        let status = if factory.is_available(kind) {
            style("linked").green()
        } else {
            style("external").dim()
        };
        println!(
            "  {:<12} {:<24} {}",
            style(kind.as_str()).cyan(),
            kind.artifact_layout(),
            status
        );
    }

    println!();
    println!(
        "{} External backends need an adapter provider from the vendor SDK.",
        style("ℹ").blue()
    );

    Ok(())
}
