//! `crossgem platforms`, `crossgem describe` and `crossgem rc-version`.

use anyhow::{Context, Result};
use crossgem_targets::{CrossCompileCatalog, OsFamily, PlatformDescriptor};

/// Environment variable handed to the build orchestrator.
pub const RC_VERSION_ENV: &str = "RUBY_CC_VERSION";

/// Unique platforms in the catalog, optionally restricted to one family.
pub fn list(catalog: &CrossCompileCatalog, family: Option<OsFamily>) -> Result<()> {
    let platforms = match family {
        Some(family) => catalog.platforms_in(family),
        None => catalog.platforms(),
    };
    for platform in platforms {
        println!("{:<14} {}", platform.as_str(), platform.family());
    }
    Ok(())
}

/// Print the expectation table for one platform.
pub fn describe(ruby_version: &str, host: &str) -> Result<()> {
    let descriptor = PlatformDescriptor::parse(ruby_version, host)
        .with_context(|| format!("resolving platform {ruby_version}:{host}"))?;
    print!("{}", render_description(&descriptor)?);
    Ok(())
}

fn render_description(descriptor: &PlatformDescriptor) -> Result<String> {
    let expected = descriptor.expectations()?;
    let mut out = String::new();
    out.push_str(&format!("=== Platform: {} ===\n", descriptor.platform()));
    out.push_str(&format!("Version:     {}\n", descriptor.semantic_version()));
    out.push_str(&format!("Host:        {}\n", descriptor.raw_host()));
    out.push_str(&format!("Family:      {}\n", descriptor.family()));
    out.push_str(&format!("Inspector:   {}\n", descriptor.tool("objdump")));
    if let Some(format) = expected.expected_format {
        out.push_str(&format!("Format:      {format}\n"));
    }
    out.push_str(&format!("Entry point: {}\n", expected.entry_point));
    out.push_str("Libraries:\n");
    for lib in &expected.expected_libraries {
        out.push_str(&format!("  {lib}\n"));
    }
    if let Some(floors) = &expected.expected_min_versions {
        out.push_str("Symbol versions:\n");
        for (family, version) in floors {
            out.push_str(&format!("  {family} {version}\n"));
        }
    }
    Ok(out)
}

/// Print the `RUBY_CC_VERSION` value for the catalog. An existing value in
/// the environment wins.
pub fn rc_version(catalog: &CrossCompileCatalog) -> Result<()> {
    println!("{}", rc_version_value(catalog, std::env::var(RC_VERSION_ENV).ok()));
    Ok(())
}

fn rc_version_value(catalog: &CrossCompileCatalog, existing: Option<String>) -> String {
    existing
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| catalog.rc_versions())
}
