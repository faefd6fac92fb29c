// src/commands/query.rs
//! Read-only commands: listings, search, info, dependency trees

use anyhow::Result;
use cellarman::api::{DependencyNode, KindLists, OutdatedPackage, PackageInfo};
use cellarman::{BackendClient, PackageKind};

pub fn cmd_installed(backend: &BackendClient) -> Result<()> {
    let installed = backend.queries().installed()?;
    print_package_lists(&installed);
    println!("{} packages installed.", installed.len());
    Ok(())
}

pub fn cmd_packages(backend: &BackendClient) -> Result<()> {
    let catalog = backend.queries().packages()?;
    print_package_lists(&catalog.installed);
    if !catalog.outdated.is_empty() {
        println!("Outdated:");
        for item in catalog
            .outdated
            .formulae
            .iter()
            .chain(catalog.outdated.casks.iter())
        {
            println!("  {}", format_outdated(item));
        }
    }
    println!(
        "{} packages installed, {} outdated.",
        catalog.installed.len(),
        catalog.outdated.len()
    );
    Ok(())
}

pub fn cmd_summary(backend: &BackendClient) -> Result<()> {
    let summary = backend.queries().summary()?;
    println!("Installed:  {}", summary.installed.len());
    println!("Outdated:   {}", summary.outdated.len());
    println!("Deprecated: {}", summary.deprecated.len());
    println!("Orphaned:   {}", summary.orphaned.len());
    if !summary.outdated.is_empty() {
        println!();
        println!("Available upgrades:");
        for item in summary
            .outdated
            .formulae
            .iter()
            .chain(summary.outdated.casks.iter())
        {
            println!("  {}", format_outdated(item));
        }
    }
    Ok(())
}

pub fn cmd_outdated(backend: &BackendClient) -> Result<()> {
    let outdated = backend.queries().outdated()?;
    if outdated.is_empty() {
        println!("Everything is up to date.");
        return Ok(());
    }
    for (label, items) in [("Formulae", &outdated.formulae), ("Casks", &outdated.casks)] {
        if items.is_empty() {
            continue;
        }
        println!("{label}:");
        for item in items {
            println!("  {}", format_outdated(item));
        }
    }
    println!("{} packages outdated.", outdated.len());
    Ok(())
}

pub fn cmd_deprecated(backend: &BackendClient) -> Result<()> {
    let deprecated = backend.queries().deprecated()?;
    if deprecated.is_empty() {
        println!("No deprecated packages installed.");
        return Ok(());
    }
    for item in deprecated.formulae.iter().chain(deprecated.casks.iter()) {
        let state = if item.disabled { "disabled" } else { "deprecated" };
        match &item.deprecation_reason {
            Some(reason) => println!("{} ({state}: {reason})", item.display_name()),
            None => println!("{} ({state})", item.display_name()),
        }
    }
    Ok(())
}

pub fn cmd_orphaned(backend: &BackendClient) -> Result<()> {
    let orphaned = backend.queries().orphaned()?;
    if orphaned.is_empty() {
        println!("No orphaned packages.");
        return Ok(());
    }
    for item in orphaned.formulae.iter().chain(orphaned.casks.iter()) {
        match &item.desc {
            Some(desc) => println!("{} - {desc}", item.display_name()),
            None => println!("{}", item.display_name()),
        }
    }
    Ok(())
}

pub fn cmd_search(backend: &BackendClient, query: &str) -> Result<()> {
    let results = backend.queries().search(query)?;
    if results.is_empty() {
        println!("No matches for '{query}'.");
        return Ok(());
    }
    for (label, items) in [("Formulae", &results.formulae), ("Casks", &results.casks)] {
        if items.is_empty() {
            continue;
        }
        println!("{label}:");
        for hit in items {
            if hit.desc.is_empty() {
                println!("  {}", hit.name);
            } else {
                println!("  {} - {}", hit.name, hit.desc);
            }
        }
    }
    Ok(())
}

pub fn cmd_info(backend: &BackendClient, name: &str, cask: bool) -> Result<()> {
    let kind = kind_of(cask);
    let info = backend.queries().info(name, kind)?;
    print_info(&info, kind);
    Ok(())
}

pub fn cmd_deps(backend: &BackendClient, name: &str, cask: bool) -> Result<()> {
    let tree = backend.queries().dependency_tree(name, kind_of(cask))?;
    print_tree(&tree, 0);
    Ok(())
}

pub fn cmd_backup(backend: &BackendClient) -> Result<()> {
    let backup = backend.queries().backup()?;
    for name in &backup.formulae {
        println!("formula {name}");
    }
    for name in &backup.casks {
        println!("cask {name}");
    }
    Ok(())
}

pub fn cmd_health(backend: &BackendClient) -> Result<()> {
    let health = backend.queries().health()?;
    match &health.brew {
        Some(version) => println!("Backend OK ({version})"),
        None => println!("Backend OK"),
    }
    if health.needs_update {
        println!("Package metadata is stale; run 'cellarman update'.");
    }
    Ok(())
}

fn kind_of(cask: bool) -> PackageKind {
    if cask {
        PackageKind::Cask
    } else {
        PackageKind::Formula
    }
}

fn print_package_lists(lists: &KindLists<PackageInfo>) {
    for (label, items) in [("Formulae", &lists.formulae), ("Casks", &lists.casks)] {
        if items.is_empty() {
            continue;
        }
        println!("{label}:");
        for item in items {
            let mut line = format!("  {}", item.display_name());
            if let Some(size) = &item.size {
                line.push_str(&format!(" ({size})"));
            }
            if let Some(desc) = &item.desc {
                line.push_str(&format!(" - {desc}"));
            }
            println!("{line}");
        }
    }
}

fn format_outdated(item: &OutdatedPackage) -> String {
    let installed = item.installed_versions.join(", ");
    match &item.current_version {
        Some(current) => format!("{} {installed} -> {current}", item.name),
        None => format!("{} {installed}", item.name),
    }
}

fn print_info(info: &PackageInfo, kind: PackageKind) {
    println!("{} ({kind})", info.display_name());
    if let Some(desc) = &info.desc {
        println!("  {desc}");
    }
    if let Some(versions) = &info.versions {
        if let Some(stable) = &versions.stable {
            println!("  version: {stable}");
        }
    } else if let Some(version) = &info.version {
        println!("  version: {version}");
    }
    if let Some(homepage) = &info.homepage {
        println!("  homepage: {homepage}");
    }
    if let Some(size) = &info.size {
        println!("  size: {size}");
    }
    if info.deprecated || info.disabled {
        match &info.deprecation_reason {
            Some(reason) => println!("  deprecated: {reason}"),
            None => println!("  deprecated"),
        }
    }
}

fn print_tree(node: &DependencyNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let suffix = if node.optional { " (optional)" } else { "" };
    println!("{indent}{} [{}]{suffix}", node.name, node.kind);
    for dep in &node.deps {
        print_tree(dep, depth + 1);
    }
}
