//! `crossgem doctor` — toolchain diagnostics.

use std::process::Command;
use std::time::Duration;

use anyhow::Result;
use crossgem_inspect::{run_captured, Inspector, Verifier};
use crossgem_targets::{CrossCompileCatalog, PlatformDescriptor, PlatformTag};

/// Deadline for a tool's `--version` probe.
const VERSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Report which inspection tools are available for the catalog's platforms.
pub fn run<I: Inspector>(
    verifier: &Verifier<I>,
    catalog: Option<&CrossCompileCatalog>,
) -> Result<()> {
    println!("=== crossgem doctor ===");
    println!();
    println!("crossgem version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    match catalog {
        Some(catalog) => println!("Catalog: {} entries", catalog.len()),
        None => println!("Catalog: not found (checking all platforms)"),
    }
    println!();

    println!("--- Inspection Tools ---");
    for descriptor in representatives(catalog) {
        let tool = verifier.tool_path(&descriptor);
        print_tool_status(descriptor.platform(), &tool);
    }
    Ok(())
}

/// One descriptor per platform to check.
fn representatives(catalog: Option<&CrossCompileCatalog>) -> Vec<PlatformDescriptor> {
    match catalog {
        Some(catalog) => catalog
            .platforms()
            .into_iter()
            .filter_map(|p| catalog.iter().find(|d| d.platform() == p).cloned())
            .collect(),
        None => PlatformTag::ALL
            .into_iter()
            .filter_map(|p| PlatformDescriptor::parse("0.0.0", sample_host(p)).ok())
            .collect(),
    }
}

fn sample_host(platform: PlatformTag) -> &'static str {
    match platform {
        PlatformTag::X64Mingw32 => "x86_64-w64-mingw32",
        PlatformTag::X86Mingw32 => "i686-w64-mingw32",
        PlatformTag::X86_64Linux => "x86_64-linux-gnu",
        PlatformTag::X86Linux => "i686-linux-gnu",
    }
}

fn print_tool_status(platform: PlatformTag, tool: &str) {
    println!("  {:<14} {tool}: {}", platform.as_str(), tool_status(tool, VERSION_TIMEOUT));
}

/// First line of `tool --version`, or why it could not be obtained.
fn tool_status(tool: &str, timeout: Duration) -> String {
    let mut cmd = Command::new(tool);
    cmd.arg("--version");
    match run_captured(cmd, tool, timeout) {
        Ok(output) if output.status.success() => output
            .stdout
            .lines()
            .next()
            .unwrap_or("(unknown version)")
            .to_string(),
        Ok(output) => format!("exited with {}", output.status),
        Err(e) => {
            tracing::debug!("{e}");
            "not found".to_string()
        }
    }
}
