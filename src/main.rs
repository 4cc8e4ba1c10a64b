use std::time::Instant;

use cliques::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct RunConfig {
    order: usize,
    size: usize,
    variant: Option<Variant>,
    num_workers: usize,
    seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            order: 10_000,
            size: 100_000,
            variant: None,
            num_workers: cliques::pipeline::DEFAULT_NUM_WORKERS,
            seed: 19680516,
        }
    }
}

fn main() {
    let mut cfg = RunConfig::default();

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--order" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                cfg.order = v.parse().unwrap_or_else(|_| usage_and_exit(2));
                i += 2;
            }
            "--size" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                cfg.size = v.parse().unwrap_or_else(|_| usage_and_exit(2));
                i += 2;
            }
            "--variant" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                cfg.variant = match v.as_str() {
                    "all" => None,
                    other => Some(parse_variant(other).unwrap_or_else(|| usage_and_exit(2))),
                };
                i += 2;
            }
            "--workers" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                cfg.num_workers = v.parse().unwrap_or_else(|_| usage_and_exit(2));
                i += 2;
            }
            "--seed" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                cfg.seed = v.parse().unwrap_or_else(|_| usage_and_exit(2));
                i += 2;
            }
            "--help" | "-h" => usage_and_exit(0),
            _ => usage_and_exit(2),
        }
    }

    if cfg.order < 2 || cfg.size > cfg.order * (cfg.order - 1) / 2 || cfg.num_workers == 0 {
        usage_and_exit(2);
    }

    println!(
        "Sampling a random graph of order {} and size {} (seed {})...",
        cfg.order, cfg.size, cfg.seed
    );
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let graph = random_graph(&mut rng, cfg.order, cfg.size);

    match cfg.variant {
        Some(variant) => {
            run_variant(&graph, variant, cfg.num_workers);
        }
        None => {
            let mut reference = None;
            for variant in Variant::ALL {
                let cliques = run_variant(&graph, variant, cfg.num_workers);
                let canonical = order_cliques(cliques);
                match &reference {
                    None => reference = Some(canonical),
                    Some(expected) => {
                        if &canonical != expected {
                            eprintln!("MISMATCH: {variant:?} disagrees with the first variant");
                            std::process::exit(1);
                        }
                    }
                }
            }
            println!("All variants agree.");
        }
    }
}

fn run_variant(graph: &UndirectedGraph, variant: Variant, num_workers: usize) -> Vec<Clique> {
    let started = Instant::now();
    let outcome = match variant {
        Variant::Pipeline => cliques::pipeline::explore(graph, num_workers),
        other => cliques::enumerate(graph, other),
    };
    let elapsed = started.elapsed();
    match outcome {
        Ok(cliques) => {
            println!(
                "{:<24} {:>9} cliques in {elapsed:.2?}",
                format!("{variant:?}"),
                cliques.len()
            );
            cliques
        }
        Err(e) => {
            eprintln!("{variant:?} failed: {e}");
            std::process::exit(1);
        }
    }
}

fn parse_variant(name: &str) -> Option<Variant> {
    let variant = match name {
        "arbitrary" => Variant::ArbitraryPivot,
        "degree" => Variant::MaxDegreePivot,
        "local" => Variant::LocalPivot,
        "localx" => Variant::LocalXPivot,
        "order" => Variant::DegeneracyOrder,
        "order-par" => Variant::DegeneracyOrderParallel,
        "lazy" => Variant::LazyGenerator,
        "pipeline" => Variant::Pipeline,
        _ => return None,
    };
    Some(variant)
}

fn random_graph<R: Rng>(rng: &mut R, order: usize, size: usize) -> UndirectedGraph {
    let mut adjacencies = vec![VertexSet::default(); order];
    let mut added = 0;
    while added < size {
        let v = rng.random_range(0..order) as Vertex;
        let w = rng.random_range(0..order) as Vertex;
        if v != w && !adjacencies[v as usize].contains(&w) {
            adjacencies[v as usize].insert(w);
            adjacencies[w as usize].insert(v);
            added += 1;
        }
    }
    UndirectedGraph::new(adjacencies).expect("sampled edges form a simple graph")
}

fn usage_and_exit(code: i32) -> ! {
    eprintln!(
        "Usage:\n  cliques [--order N] [--size M] [--variant NAME] [--workers N] [--seed SEED]\n\nOptions:\n  --order N       Number of vertices in the sampled graph (default: 10000)\n  --size M        Number of edges in the sampled graph (default: 100000)\n  --variant NAME  One of: arbitrary, degree, local, localx, order, order-par,\n                  lazy, pipeline, all (default: all, cross-checks every variant)\n  --workers N     Pipeline worker-pool size (default: 5)\n  --seed SEED     Deterministic sampling seed\n"
    );
    std::process::exit(code)
}
