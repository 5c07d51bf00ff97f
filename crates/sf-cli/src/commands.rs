//! Subcommand implementations
//!
//! Each command is a pure function of the loaded project and its arguments,
//! returning an [`Output`] the binary prints. Command failures that concern
//! the document (a dangling reference) are reported through
//! [`Output::ok`]; argument problems are errors.

use anyhow::{anyhow, bail, Result};
use serde_json::{json, Value};
use sf_document::{Project, StageAddress};
use sf_reference::{Expansion, Reference, Resolver};

/// Result of one command
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    /// False when the command found unresolved references
    pub ok: bool,

    /// Human-readable result for stdout
    pub text: String,

    /// Problems for stderr in text mode
    pub diagnostics: Vec<String>,

    /// Machine-readable result for `--json`
    pub json: Value,
}

impl Output {
    /// Render for stdout
    ///
    /// # Errors
    /// Fails only if JSON serialization fails.
    pub fn render(&self, json: bool) -> Result<String> {
        if json {
            Ok(serde_json::to_string_pretty(&self.json)?)
        } else {
            Ok(self.text.clone())
        }
    }
}

/// `resolve <REFERENCE>`
#[must_use]
pub fn resolve(project: &Project, reference: &str) -> Output {
    match Resolver::new(project).resolve(reference) {
        Ok(resolution) => Output {
            ok: true,
            text: resolution.content.to_string(),
            diagnostics: Vec::new(),
            json: json!({ "reference": reference, "resolution": resolution }),
        },
        Err(err) => Output {
            ok: false,
            text: String::new(),
            diagnostics: vec![err.to_string()],
            json: json!({ "reference": reference, "error": err }),
        },
    }
}

/// `expand <TEXT>`
#[must_use]
pub fn expand_text(project: &Project, text: &str) -> Output {
    expansion_output(Resolver::new(project).expand(text))
}

/// `expand --stage category:block:stage`
///
/// # Errors
/// Fails when the address is not three segments or the stage does not exist.
pub fn expand_stage(project: &Project, address: &str) -> Result<Output> {
    let address = parse_stage_address(address)?;
    let expansion = Resolver::new(project)
        .expand_stage(&address)
        .ok_or_else(|| anyhow!("stage {address} not found"))?;
    Ok(expansion_output(expansion))
}

/// `uses <CATEGORY> <BLOCK>`
///
/// # Errors
/// Fails when the block does not exist.
pub fn uses(project: &Project, category: &str, block: &str) -> Result<Output> {
    require_block(project, category, block)?;

    let deps = Resolver::new(project).uses_of(category, block);
    let text = deps
        .iter()
        .map(|dep| {
            let stages = dep.stages.join(", ");
            let reference = &dep.reference;
            match (&dep.target, &dep.error) {
                (Some(target), _) => format!("ok      [{reference}] -> {target} (in {stages})"),
                (None, Some(err)) => format!("broken  [{reference}] {err} (in {stages})"),
                (None, None) => format!("broken  [{reference}] (in {stages})"),
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Output {
        ok: true,
        text,
        diagnostics: Vec::new(),
        json: json!({ "category": category, "block": block, "uses": deps }),
    })
}

/// `used-by <CATEGORY> <BLOCK>`
///
/// # Errors
/// Fails when the block does not exist.
pub fn used_by(project: &Project, category: &str, block: &str) -> Result<Output> {
    require_block(project, category, block)?;

    let users = Resolver::new(project).used_by_of(category, block);
    let text = users
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Output {
        ok: true,
        text,
        diagnostics: Vec::new(),
        json: json!({ "category": category, "block": block, "used_by": users }),
    })
}

/// `check`
#[must_use]
pub fn check(project: &Project) -> Output {
    let broken = Resolver::new(project).broken_references();
    let text = if broken.is_empty() {
        "all references resolve".to_string()
    } else {
        broken
            .iter()
            .map(|b| format!("{}: [{}] {}", b.location, b.reference, b.error))
            .collect::<Vec<_>>()
            .join("\n")
    };

    Output {
        ok: broken.is_empty(),
        text,
        diagnostics: Vec::new(),
        json: json!({ "broken": broken }),
    }
}

fn expansion_output(expansion: Expansion) -> Output {
    let json = json!({
        "resolved_text": expansion.resolved_text,
        "errors": expansion.errors,
        "references": expansion.references,
    });
    Output {
        ok: expansion.is_resolved(),
        text: expansion.resolved_text,
        diagnostics: expansion.errors,
        json,
    }
}

fn parse_stage_address(address: &str) -> Result<StageAddress> {
    match Reference::parse(address)? {
        Reference::Full(category, block, stage) => Ok(StageAddress::new(category, block, stage)),
        _ => bail!("stage address must be category:block:stage, got {address:?}"),
    }
}

fn require_block(project: &Project, category: &str, block: &str) -> Result<()> {
    if project.block(category, block).is_none() {
        bail!("block {category}:{block} not found");
    }
    Ok(())
}
