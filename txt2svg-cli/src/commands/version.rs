//! Version command - show version information.

use anyhow::Result;
use txt2svg_core::font::FontKey;
use txt2svg_core::marshal::DEFAULT_OUTPUT_CAPACITY;

/// Version information.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command.
pub fn run() -> Result<()> {
    println!("txt2svg - text to SVG through a sandboxed WebAssembly module");
    println!();
    println!("Version:     {}", VERSION);
    println!(
        "Platform:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!();
    println!("Fonts:");
    for font in FontKey::ALL {
        println!("  {:<12} {}", font.as_str(), font.asset_path());
    }
    println!();
    println!("Output buffer: {} KiB", DEFAULT_OUTPUT_CAPACITY / 1024);
    println!();
    println!("Components:");
    println!("  txt2svg-core    Arena, marshaler, module host");
    println!("  txt2svg-server  Wasmtime runtime, HTTP API, assets");
    println!("  txt2svg-cli     Command-line interface");

    Ok(())
}
