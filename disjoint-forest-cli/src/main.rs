use anyhow::{ensure, Context, Result};
use clap::Parser;
use serde::Serialize;

use disjoint_forest::forest::Forest;
use disjoint_forest::handle::NodeHandle;

/// Disjoint-forest demo — build singleton sets, merge them, look up
/// representatives, and contract nodes out again
#[derive(Parser)]
#[command(name = "disjoint-forest", version)]
struct Args {
    /// Number of elements to create
    #[arg(short = 'n', long, default_value = "10")]
    count: usize,

    /// Initial capacity hint for the forest
    #[arg(short, long, default_value = "5")]
    capacity: usize,

    /// Additional capacity to reserve after the elements exist
    #[arg(short, long, default_value = "20")]
    expand: usize,

    /// Elements to contract out after merging (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "5,7")]
    contract: Vec<usize>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Suppress non-JSON output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct OutputReport {
    count: usize,
    initial_capacity: usize,
    capacity_after_expand: usize,
    unions: Vec<[usize; 2]>,
    representatives: Vec<OutputElement>,
    contracted: Vec<usize>,
    size_after_contract: usize,
    remaining_connected: bool,
}

#[derive(Serialize)]
struct OutputElement {
    element: usize,
    representative: usize,
}

fn representatives(
    forest: &mut Forest<usize>,
    elements: &[(usize, NodeHandle)],
) -> Result<Vec<OutputElement>> {
    elements
        .iter()
        .map(|&(value, handle)| {
            let root = forest
                .find(handle)
                .with_context(|| format!("find failed for element {value}"))?;
            Ok(OutputElement {
                element: value,
                representative: *forest.get(root)?,
            })
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    ensure!(args.count >= 2, "--count must be at least 2");
    for &value in &args.contract {
        ensure!(
            value < args.count,
            "--contract element {value} is outside 0..{}",
            args.count
        );
    }

    let mut forest: Forest<usize> = Forest::with_capacity(args.capacity);

    if !args.quiet {
        eprintln!(
            "created forest: capacity {}, size {}, empty: {}",
            forest.capacity(),
            forest.len(),
            forest.is_empty()
        );
    }

    let nodes: Vec<NodeHandle> = (0..args.count).map(|i| forest.make_set(i)).collect();
    if !args.quiet {
        eprintln!(
            "made {} singleton sets (size {}, capacity {})",
            args.count,
            forest.len(),
            forest.capacity()
        );
    }

    forest
        .expand(args.expand)
        .context("expanding the capacity hint")?;
    if !args.quiet {
        eprintln!("expanded capacity by {} (now {})", args.expand, forest.capacity());
    }

    // Chain the even elements, chain the odd elements, then bridge the two
    // chains through (0, 1).
    let mut unions: Vec<[usize; 2]> = Vec::new();
    for start in [0, 1] {
        let mut i = start;
        while i + 2 < args.count {
            unions.push([i, i + 2]);
            i += 2;
        }
    }
    unions.push([0, 1]);

    for &[a, b] in &unions {
        forest
            .union_sets(nodes[a], nodes[b])
            .with_context(|| format!("uniting {a} and {b}"))?;
        if !args.quiet {
            eprintln!("united {a} and {b}");
        }
    }

    let elements: Vec<(usize, NodeHandle)> = nodes.iter().copied().enumerate().collect();
    let reps = representatives(&mut forest, &elements)?;
    if !args.quiet {
        for rep in &reps {
            eprintln!(
                "element {} belongs to the set of {}",
                rep.element, rep.representative
            );
        }
    }

    for &value in &args.contract {
        let removed = forest
            .contract(nodes[value])
            .with_context(|| format!("contracting element {value}"))?;
        if !args.quiet {
            eprintln!("contracted element {removed} (size {})", forest.len());
        }
    }

    // Every remaining element should still share one representative.
    let survivors: Vec<(usize, NodeHandle)> = elements
        .iter()
        .copied()
        .filter(|(value, _)| !args.contract.contains(value))
        .collect();
    let survivor_reps = representatives(&mut forest, &survivors)?;
    let remaining_connected = survivor_reps
        .windows(2)
        .all(|pair| pair[0].representative == pair[1].representative);
    if !args.quiet {
        eprintln!(
            "remaining {} elements connected: {}",
            survivors.len(),
            remaining_connected
        );
    }

    let report = OutputReport {
        count: args.count,
        initial_capacity: args.capacity,
        capacity_after_expand: forest.capacity(),
        unions,
        representatives: reps,
        contracted: args.contract.clone(),
        size_after_contract: forest.len(),
        remaining_connected,
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    Ok(())
}
