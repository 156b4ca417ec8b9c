use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, clap::ValueEnum)]
enum EmitStage {
    Summary,
    Dot,
    Json,
    BuildInfo,
}

#[derive(Parser, Debug)]
#[command(
    name = "gmc",
    version,
    about = "Graphical Model Compiler — unrolls .str frame templates into explicit inference graphs"
)]
struct Cli {
    /// Input .str structure file
    source: PathBuf,

    /// Sequence length (overrides the chunk directive)
    #[arg(short = 'L', long)]
    length: Option<u32>,

    /// Output stage
    #[arg(long, value_enum, default_value_t = EmitStage::Summary)]
    emit: EmitStage,

    /// Print compiler phases and counts
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        eprintln!("gmc: source = {}", cli.source.display());
        eprintln!("gmc: emit   = {:?}", cli.emit);
    }

    // ── Read source ──
    let source = match std::fs::read_to_string(&cli.source) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("gmc: error: {}: {}", cli.source.display(), e);
            std::process::exit(2);
        }
    };

    let provenance = gmc::pipeline::compute_provenance(&source);
    if matches!(cli.emit, EmitStage::BuildInfo) {
        print!("{}", provenance.to_json());
        return;
    }

    // ── Parse and check templates ──
    let templates = match gmc::pipeline::parse_templates(&source) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("gmc: {}", e.kind);
            for diag in &e.diagnostics {
                eprintln!("gmc: {}", diag.render(&source));
            }
            std::process::exit(1);
        }
    };

    if cli.verbose {
        eprintln!(
            "gmc: {} frames, {} variables per frame, {} parameter bindings",
            templates.frame_set.frames.len(),
            templates.frame_set.var_count(),
            templates.bound.arena.len(),
        );
    }

    let length = match cli.length.or(templates.frame_set.default_length()) {
        Some(l) => l,
        None => {
            eprintln!("gmc: error: no chunk directive in source and no --length given");
            std::process::exit(2);
        }
    };

    if cli.verbose {
        eprintln!("gmc: unrolling to {} positions", length);
    }

    // ── Unroll and validate ──
    let graph = match gmc::pipeline::compile(&templates, length) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("gmc: {}", e.kind);
            for diag in &e.diagnostics {
                eprintln!("gmc: {}", diag.render(&source));
            }
            std::process::exit(1);
        }
    };

    if cli.verbose {
        eprintln!(
            "gmc: unrolled {} nodes, {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
    }

    // ── Emit ──
    match cli.emit {
        EmitStage::Summary => print!("{graph}"),
        EmitStage::Dot => print!("{}", gmc::dot::emit_dot(&graph)),
        EmitStage::Json => match serde_json::to_string_pretty(&graph) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("gmc: error: {}", e);
                std::process::exit(2);
            }
        },
        EmitStage::BuildInfo => unreachable!(),
    }
}
