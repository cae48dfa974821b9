use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use docwatch_cli::WatchConfig;
use docwatch_dom::{apply_mutation, DocumentTree, HostMutation, NodeDescriptor};
use perceiver_mutation::{classify, Annotator, Category, DocumentLifecycle, MutationSnapshot};
use serde::{Deserialize, Serialize};

use super::output::{render, OutputFormat};

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// JSON file holding `{"root": <node>, "mutation": <record>}`
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,

    /// Treat the document as still loading
    #[arg(long)]
    pub loading: bool,
}

/// A single edit together with the tree it applies to.
#[derive(Debug, Deserialize)]
struct ClassifyInput {
    root: NodeDescriptor,
    mutation: HostMutation,
}

#[derive(Debug, Serialize)]
struct ClassifyReport {
    category: Category,
    label: Option<String>,
    context_content: Option<String>,
    change: Option<MutationSnapshot>,
}

pub async fn cmd_classify(args: ClassifyArgs, config: &WatchConfig, format: OutputFormat) -> Result<()> {
    let raw = tokio::fs::read_to_string(&args.record)
        .await
        .with_context(|| format!("Failed to read {}", args.record.display()))?;
    let input: ClassifyInput = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", args.record.display()))?;

    let mut tree = DocumentTree::from_root(&input.root).context("Invalid tree")?;
    let record = apply_mutation(&mut tree, &input.mutation).context("Mutation does not apply")?;

    let lifecycle = if args.loading {
        DocumentLifecycle::new()
    } else {
        DocumentLifecycle::ready()
    };
    let annotator = Annotator::new(Arc::new(config.rule_table()?), Arc::new(lifecycle));
    let category = classify(&tree, &record);
    let annotation = annotator.annotate_classified(&tree, &record, category);

    let report = ClassifyReport {
        category,
        label: annotation.as_ref().map(|a| a.label.clone()),
        context_content: annotation.as_ref().and_then(|a| a.context_content.clone()),
        change: annotation.map(|a| a.change),
    };

    if let Some(rendered) = render(&report, &format)? {
        println!("{rendered}");
        return Ok(());
    }
    println!("category: {}", report.category);
    match &report.label {
        Some(label) => println!("label:    {label}"),
        None => println!("label:    (no matching rule)"),
    }
    if let Some(context) = &report.context_content {
        println!("context:  {context}");
    }
    Ok(())
}
