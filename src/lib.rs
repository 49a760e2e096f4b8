// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod ir;
pub mod logging;
pub mod pipeline;

use anyhow::Result;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::Manifest;
use crate::ir::Graph;
use crate::pipeline::{ManifestParser, ModelParser, Pipeline};

/// High-level entry point used by `main.rs`.
///
/// Loads the manifest, applies CLI overrides, then either prints the
/// schedule (`--dry-run`) or runs the full pipeline and reports the
/// artifact.
pub fn run(args: CliArgs) -> Result<()> {
    let mut manifest = load_and_validate(&args.config)?;

    if let Some(target) = args.target {
        debug!(%target, "overriding manifest target from CLI");
        manifest.config.target = target;
    }

    if args.dry_run {
        let mut graph = ManifestParser.parse(&manifest)?;
        print_dry_run(&manifest, &mut graph)?;
        return Ok(());
    }

    let artifact = Pipeline::from_manifest(&manifest).run(&manifest)?;
    println!("{}", artifact.path.display());
    Ok(())
}

/// Dry-run output: graph summary, validation result and operator schedule.
fn print_dry_run(manifest: &Manifest, graph: &mut Graph) -> Result<()> {
    println!("neuroforge dry-run");
    println!("  config.target = {}", manifest.config.target);
    println!("  config.output_dir = {}", manifest.config.output_dir.display());
    println!();

    println!(
        "graph {} ({} tensors, {} operators)",
        graph.name(),
        graph.tensor_count(),
        graph.operator_count()
    );
    println!("  {}", graph.validate().to_string().trim_end());
    println!();

    let order = graph.topologically_sort_operators()?.to_vec();
    println!("schedule ({}):", order.len());
    for (i, id) in order.iter().enumerate() {
        let op = graph.get_operator(id)?;
        println!("  {i:>3}. {id} [{}]", op.op_type);
        println!(
            "       {} -> {}",
            ir::ids::join_ids(&op.input_tensor_ids),
            ir::ids::join_ids(&op.output_tensor_ids)
        );
        for (key, value) in op.attributes.iter() {
            println!("       {key} = {value}");
        }
    }

    debug!("dry-run complete (no code generated)");
    Ok(())
}
