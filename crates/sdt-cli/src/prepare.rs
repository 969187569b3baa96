//! # Prepare-Agent Subcommand
//!
//! Interactive helper for the agent pre-preparation checklist: pick a
//! template, validate it, describe the agent, choose SDT axes and
//! capability types, and plan field mappings. Pure glue over
//! [`load_document`]/[`validate_template`] — everything that does not touch
//! stdin is factored into plain functions so it stays testable.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};

use sdt_validator::{load_document, validate_template};

/// Arguments for the `sdt prepare-agent` subcommand.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Directory to search for templates (default: ./presets and the
    /// current directory).
    #[arg(long)]
    pub template_dir: Option<PathBuf>,

    /// Path to the spec directory for template validation.
    #[arg(long)]
    pub spec_dir: Option<PathBuf>,
}

/// Capability types an agent may declare, with their menu descriptions.
const CAPABILITY_TYPES: [(&str, &str); 5] = [
    ("capture", "Data collection"),
    ("suggest", "Suggestion provision"),
    ("remind", "Notification provision"),
    ("analyze", "Analysis performance"),
    ("custom", "User-defined functionality"),
];

/// The SDT axes an agent may describe support for.
const SDT_AXES: [&str; 3] = ["autonomy", "competence", "relatedness"];

/// Execute the prepare-agent subcommand against real stdin/stdout.
pub fn run_prepare(args: &PrepareArgs) -> Result<u8> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_prepare_io(args, &mut input, &mut out)
}

/// The wizard proper, generic over its I/O so tests can drive it.
fn run_prepare_io(
    args: &PrepareArgs,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<u8> {
    let search_dirs = search_dirs(args);
    writeln!(out, "Searching for templates...")?;
    let templates = find_template_files(&search_dirs);
    if templates.is_empty() {
        writeln!(out, "No template files found.")?;
        return Ok(1);
    }

    writeln!(out, "\nAvailable templates:")?;
    for (idx, path) in templates.iter().enumerate() {
        match load_document(path) {
            Ok(template) => {
                let name = template
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown");
                let id = template.get("id").and_then(Value::as_str).unwrap_or("n/a");
                writeln!(out, "{}. {} (ID: {})", idx + 1, name, id)?;
                writeln!(out, "   Path: {}", path.display())?;
            }
            Err(_) => writeln!(out, "{}. {} (could not load)", idx + 1, path.display())?,
        }
    }

    let Some(selected) = prompt_selection(&templates, input, out)? else {
        writeln!(out, "No template selected. Exiting.")?;
        return Ok(1);
    };

    let template = load_document(&selected)?;
    match validate_template(&template, args.spec_dir.as_deref()) {
        Ok(()) => writeln!(out, "\nTemplate validation passed.")?,
        Err(e) => {
            writeln!(out, "\nTemplate validation warning: {e}")?;
            write!(out, "Continue anyway? (y/n): ")?;
            out.flush()?;
            let answer = read_line(input)?.unwrap_or_default();
            if !answer.eq_ignore_ascii_case("y") {
                return Ok(1);
            }
        }
    }

    out.write_all(format_template_info(&template).as_bytes())?;

    // Agent identity.
    let Some(agent_id) = prompt_required("Agent ID (e.g. 'my-agent-001')", input, out)? else {
        return Ok(1);
    };
    let Some(agent_name) = prompt_required("Agent name", input, out)? else {
        return Ok(1);
    };
    write!(out, "Description (optional, press Enter to skip): ")?;
    out.flush()?;
    let description = read_line(input)?.unwrap_or_default();

    // SDT axes.
    writeln!(out, "\nWhich SDT axes will this agent support?")?;
    let mut sdt = serde_json::Map::new();
    for axis in SDT_AXES {
        write!(
            out,
            "How does this agent support {axis}? (optional, press Enter to skip): "
        )?;
        out.flush()?;
        let answer = read_line(input)?.unwrap_or_default();
        if !answer.is_empty() {
            sdt.insert(axis.to_string(), Value::String(answer));
        }
    }

    // Capability types.
    writeln!(out, "\nAvailable capability types:")?;
    for (idx, (name, blurb)) in CAPABILITY_TYPES.iter().enumerate() {
        writeln!(out, "  {}. {name} - {blurb}", idx + 1)?;
    }
    let capabilities = loop {
        write!(out, "Capabilities (numbers separated by commas, e.g. '1,3'): ")?;
        out.flush()?;
        let Some(answer) = read_line(input)? else {
            return Ok(1);
        };
        match parse_multi_selection(&answer, CAPABILITY_TYPES.len()) {
            Some(indices) if !indices.is_empty() => {
                break indices
                    .iter()
                    .map(|&i| CAPABILITY_TYPES[i].0.to_string())
                    .collect::<Vec<_>>();
            }
            _ => writeln!(out, "Select at least one capability type by number.")?,
        }
    };

    // Field mappings.
    let field_list: Vec<String> = sdt_core::field_keys(&template).into_iter().collect();
    let mut mappings: Vec<Value> = Vec::new();
    if !field_list.is_empty() {
        writeln!(out, "\nAvailable template fields:")?;
        for (idx, key) in field_list.iter().enumerate() {
            writeln!(out, "  {}. {key}", idx + 1)?;
        }
        for capability in &capabilities {
            write!(
                out,
                "Fields for {capability} (numbers separated by commas, or press Enter to skip): "
            )?;
            out.flush()?;
            let answer = read_line(input)?.unwrap_or_default();
            if answer.is_empty() {
                continue;
            }
            match parse_multi_selection(&answer, field_list.len()) {
                Some(indices) => {
                    for i in indices {
                        mappings.push(json!({
                            "capability_type": capability,
                            "field": field_list[i],
                        }));
                    }
                }
                None => writeln!(out, "Skipping invalid input for {capability}.")?,
            }
        }
    }

    // Summary.
    let template_id = template.get("id").and_then(Value::as_str).unwrap_or("n/a");
    writeln!(out, "\nPre-preparation summary")?;
    writeln!(out, "  Agent ID: {agent_id}")?;
    writeln!(out, "  Agent name: {agent_name}")?;
    writeln!(out, "  Template ID: {template_id}")?;
    if !description.is_empty() {
        writeln!(out, "  Description: {description}")?;
    }
    let axes = if sdt.is_empty() {
        "(none)".to_string()
    } else {
        sdt.keys().cloned().collect::<Vec<_>>().join(", ")
    };
    writeln!(out, "  SDT axes: {axes}")?;
    writeln!(out, "  Capability types: {}", capabilities.join(", "))?;
    writeln!(out, "  Field mappings planned: {}", mappings.len())?;
    writeln!(out, "\nNext steps:")?;
    writeln!(out, "  1. Create the agent JSON file from this summary.")?;
    writeln!(
        out,
        "  2. Run: sdt validate agent <your_agent.json> --template {}",
        selected.display()
    )?;

    write!(out, "\nSave preparation summary to file? (y/n): ")?;
    out.flush()?;
    let answer = read_line(input)?.unwrap_or_default();
    if answer.eq_ignore_ascii_case("y") {
        let output_file = PathBuf::from(format!("{agent_id}_preparation.json"));
        let summary = json!({
            "agent_info": {
                "id": agent_id,
                "name": agent_name,
                "description": description,
                "template_id": template_id,
            },
            "sdt_support": Value::Object(sdt),
            "capability_types": capabilities,
            "field_mappings": mappings,
            "template_path": selected.display().to_string(),
        });
        std::fs::write(&output_file, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("failed to write {}", output_file.display()))?;
        writeln!(out, "Summary saved to: {}", output_file.display())?;
    }

    Ok(0)
}

/// Directories searched for template files.
fn search_dirs(args: &PrepareArgs) -> Vec<PathBuf> {
    if let Some(dir) = &args.template_dir {
        return vec![dir.clone()];
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    vec![cwd.join("presets"), cwd]
}

/// Find JSON files that look like templates (they declare `id` and
/// `fields`). Unreadable files are skipped.
fn find_template_files(search_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut templates = Vec::new();
    for dir in search_dirs {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(doc) = load_document(&path) else {
                continue;
            };
            if doc.get("id").is_some() && doc.get("fields").is_some() {
                templates.push(path);
            }
        }
    }
    templates.sort();
    templates.dedup();
    templates
}

/// Render a template's fields, metrics, and SDT axes for display.
fn format_template_info(template: &Value) -> String {
    let mut out = String::new();
    let name = template
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("Unknown");
    out.push_str(&format!("\nTemplate: {name}\n"));
    let id = template.get("id").and_then(Value::as_str).unwrap_or("n/a");
    out.push_str(&format!("  ID: {id}\n"));
    let domain = template
        .get("domain")
        .and_then(Value::as_str)
        .unwrap_or("n/a");
    out.push_str(&format!("  Domain: {domain}\n"));
    if let Some(description) = template.get("description").and_then(Value::as_str) {
        out.push_str(&format!("  Description: {description}\n"));
    }

    out.push_str("\n  Fields:\n");
    for field in template
        .get("fields")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let key = field.get("key").and_then(Value::as_str).unwrap_or("?");
        let kind = field.get("type").and_then(Value::as_str).unwrap_or("?");
        let optional = if field
            .get("optional")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            " (optional)"
        } else {
            ""
        };
        out.push_str(&format!("    - {key}: {kind}{optional}\n"));
        if let Some(label) = field.get("label").and_then(Value::as_str) {
            out.push_str(&format!("      Label: {label}\n"));
        }
    }

    if let Some(metric_list) = template.get("metrics").and_then(Value::as_array) {
        out.push_str("\n  Metrics:\n");
        for metric in metric_list {
            let key = metric.get("key").and_then(Value::as_str).unwrap_or("?");
            let formula = metric
                .get("formula")
                .and_then(Value::as_str)
                .unwrap_or("n/a");
            out.push_str(&format!("    - {key}: {formula}\n"));
        }
    }

    if let Some(sdt) = template.get("sdt_support").and_then(Value::as_object) {
        out.push_str("\n  SDT support:\n");
        for axis in SDT_AXES {
            if let Some(desc) = sdt.get(axis).and_then(Value::as_str) {
                out.push_str(&format!("    - {axis}: {desc}\n"));
            }
        }
    }

    out
}

/// Outcome of parsing a single-choice menu answer.
#[derive(Debug, PartialEq, Eq)]
enum Selection {
    Quit,
    Pick(usize),
    Invalid,
}

fn parse_selection(input: &str, count: usize) -> Selection {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("q") {
        return Selection::Quit;
    }
    match trimmed.parse::<usize>() {
        Ok(n) if n >= 1 && n <= count => Selection::Pick(n - 1),
        _ => Selection::Invalid,
    }
}

/// Parse a comma-separated list of 1-based indices. Returns `None` when any
/// entry is not a number in range; duplicates collapse, order is preserved.
fn parse_multi_selection(input: &str, count: usize) -> Option<Vec<usize>> {
    let mut indices = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let n = part.parse::<usize>().ok()?;
        if n < 1 || n > count {
            return None;
        }
        let idx = n - 1;
        if !indices.contains(&idx) {
            indices.push(idx);
        }
    }
    Some(indices)
}

fn prompt_selection(
    templates: &[PathBuf],
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<Option<PathBuf>> {
    loop {
        write!(
            out,
            "\nSelect template (1-{}) or 'q' to quit: ",
            templates.len()
        )?;
        out.flush()?;
        let Some(answer) = read_line(input)? else {
            return Ok(None);
        };
        match parse_selection(&answer, templates.len()) {
            Selection::Quit => return Ok(None),
            Selection::Pick(idx) => return Ok(Some(templates[idx].clone())),
            Selection::Invalid => writeln!(
                out,
                "Enter a number between 1 and {} or 'q'.",
                templates.len()
            )?,
        }
    }
}

fn prompt_required(
    label: &str,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<Option<String>> {
    loop {
        write!(out, "{label}: ")?;
        out.flush()?;
        let Some(answer) = read_line(input)? else {
            return Ok(None);
        };
        if !answer.is_empty() {
            return Ok(Some(answer));
        }
        writeln!(out, "A value is required.")?;
    }
}

/// Read one trimmed line; `None` on end of input.
fn read_line(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
