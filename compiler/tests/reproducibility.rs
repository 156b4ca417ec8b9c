// Reproducibility tests.
//
// These tests verify that the compiler produces byte-identical outputs for
// identical inputs, both through the binary and through the library cache,
// including under concurrent use.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use gmc::pipeline::{compute_provenance, GraphCache};

fn gmc_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_gmc"))
}

fn demo_template() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("demos")
        .join("seg.str")
}

fn run_gmc(args: &[&str]) -> String {
    let output = Command::new(gmc_binary())
        .args(args)
        .output()
        .expect("failed to run gmc");
    assert!(
        output.status.success(),
        "gmc failed with args {:?}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("non-UTF8 output")
}

/// Compiling the same template twice produces byte-identical JSON.
#[test]
fn same_source_identical_json() {
    let path = demo_template();
    let path_str = path.to_str().unwrap();

    let first = run_gmc(&["--emit", "json", "-L", "4", path_str]);
    let second = run_gmc(&["--emit", "json", "-L", "4", path_str]);

    assert_eq!(
        first, second,
        "JSON output should be byte-identical across runs"
    );
}

/// DOT output is likewise byte-identical.
#[test]
fn same_source_identical_dot() {
    let path = demo_template();
    let path_str = path.to_str().unwrap();

    let first = run_gmc(&["--emit", "dot", path_str]);
    let second = run_gmc(&["--emit", "dot", path_str]);

    assert_eq!(first, second);
}

/// Build-info reports the SHA-256 of the source text.
#[test]
fn build_info_matches_library_provenance() {
    let path = demo_template();
    let source = std::fs::read_to_string(&path).unwrap();
    let expected = compute_provenance(&source).source_hash_hex();

    let info = run_gmc(&["--emit", "build-info", path.to_str().unwrap()]);
    assert!(info.contains(&expected), "build-info: {info}");
}

/// The cache hands out the same Arc for repeated requests.
#[test]
fn cache_shares_one_graph() {
    let source = std::fs::read_to_string(demo_template()).unwrap();
    let cache = GraphCache::new();
    let a = cache.get_or_compile(&source, Some(6)).unwrap();
    let b = cache.get_or_compile(&source, Some(6)).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

/// Concurrent callers racing on a cold cache all end with equal graphs and
/// the cache settles on a single entry per key.
#[test]
fn concurrent_cache_use_is_consistent() {
    let source = std::fs::read_to_string(demo_template()).unwrap();
    let cache = Arc::new(GraphCache::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cache = Arc::clone(&cache);
            let source = source.clone();
            std::thread::spawn(move || {
                let length = 3 + (i % 2) as u32;
                cache.get_or_compile(&source, Some(length)).unwrap()
            })
        })
        .collect();

    let graphs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for graph in &graphs {
        let same_length: Vec<_> = graphs
            .iter()
            .filter(|g| g.length == graph.length)
            .collect();
        for other in same_length {
            assert_eq!(**other, **graph);
        }
    }
    assert_eq!(cache.len(), 2); // lengths 3 and 4
}
