// src/report.rs
// =============================================================================
// Everything that ends up in front of the user: terminal summaries and the
// JSON / text files written by the subcommands.
// =============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::resolver::ResolvedLink;
use crate::structure::{LinkStats, Section, SectionTree};

/// How many links of a section the outline shows before summarizing.
const OUTLINE_LINKS: usize = 3;

/// Writes `value` as pretty-printed JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let file = fs::File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("cannot write JSON to {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display())),
        _ => Ok(()),
    }
}

/// Counts and file-type distribution of flat extraction results.
pub fn print_link_summary(links: &[ResolvedLink]) {
    let pdf_count = links.iter().filter(|l| l.is_pdf).count();
    let named_count = links.iter().filter(|l| l.filename.is_some()).count();

    println!("📊 Links with known file types: {}", links.len());
    println!("   PDF links: {}", pdf_count);
    println!("   Links with filenames: {}", named_count);

    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for link in links {
        *by_type.entry(link.file_type.as_str()).or_default() += 1;
    }
    if !by_type.is_empty() {
        println!("\nFile type distribution:");
        for (file_type, count) in by_type {
            println!("   - {}: {}", file_type, count);
        }
    }

    let examples: Vec<&ResolvedLink> = links.iter().filter(|l| l.filename.is_some()).take(5).collect();
    if !examples.is_empty() {
        println!("\nExample links:");
        for link in examples {
            println!(
                "   - {} | {} | {} | {}",
                link.text,
                link.safe_text,
                link.filename.as_deref().unwrap_or(""),
                link.file_type
            );
        }
    }
}

pub fn print_link_stats(stats: &LinkStats) {
    println!("📊 Link statistics");
    println!("   Total links: {}", stats.total_links);
    println!("   PDF links: {}", stats.pdf_links);
    println!("\nPer section:");
    for (section, counts) in &stats.sections {
        println!(
            "   {}: {} link(s), {} PDF, {} in tables",
            section, counts.total_links, counts.pdf_links, counts.table_links
        );
    }
}

/// Indented outline of the section tree.
pub fn print_outline(tree: &SectionTree) {
    for section in tree.roots() {
        print_section(tree, section, 0);
    }
}

fn print_section(tree: &SectionTree, section: &Section, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}{} {}", indent, "#".repeat(depth + 1), section.name());

    if !section.paragraphs.is_empty() {
        println!("{}  paragraphs: {}", indent, section.paragraphs.len());
    }
    if !section.links.is_empty() {
        println!("{}  links: {}", indent, section.links.len());
        for link in section.links.iter().take(OUTLINE_LINKS) {
            let marker = if link.is_pdf { " (PDF)" } else { "" };
            println!("{}  - {}{}", indent, link.text, marker);
        }
        if section.links.len() > OUTLINE_LINKS {
            println!("{}    ... {} more", indent, section.links.len() - OUTLINE_LINKS);
        }
    }
    if !section.tables.is_empty() {
        println!("{}  tables: {}", indent, section.tables.len());
    }

    for child in tree.subsections(section) {
        print_section(tree, child, depth + 1);
    }
}
