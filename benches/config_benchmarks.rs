use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use su2_config::{dump, parse, serialize, Value};

// ============================================================================
// Test Data
// ============================================================================

const SMALL_CFG: &str = "% small case
PHYSICAL_PROBLEM= EULER
MACH_NUMBER= 0.8
AoA= 1.25
EXT_ITER= 250
MESH_FILENAME= mesh_NACA0012_inv.su2
";

const DESIGN_CFG: &str = "% optimization case
DV_KIND= HICKS_HENNE, HICKS_HENNE, HICKS_HENNE
DV_PARAM= ( 0, 0.05 ); ( 1, 0.05 ); ( 0, 0.10 )
DV_VALUE_NEW= 0.001, 0.001, 0.001
DEFINITION_DV= ( 1, 1.0 | airfoil | 0, 0.05 ); ( 1, 1.0 | airfoil | 1, 0.05 ); ( 1, 1.0 | airfoil | 0, 0.10 )
OPT_OBJECTIVE= DRAG * 0.001
OPT_CONSTRAINT= ( LIFT > 0.328188 ) * 0.001; ( MOMENT_Z > 0.0 ) * 0.001
";

/// Builds a file with `n` blocks of commented string, float and list entries.
fn generate_cfg(n: usize) -> String {
    let mut out = String::new();
    for i in 0..n {
        out.push_str(&format!("% ---------- block {i} ----------%\n"));
        out.push_str(&format!("MARKER_{i}= ( wall_{i} )\n"));
        out.push_str(&format!("OPTION_{i}= value {i}\n\n"));
    }
    out.push_str("DV_VALUE_OLD= 0.0, 0.0, 0.0\n");
    out.push_str(DESIGN_CFG);
    out
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, source) in [
        ("small", SMALL_CFG.to_string()),
        ("design", DESIGN_CFG.to_string()),
        ("generated_500", generate_cfg(500)),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &source, |b, source| {
            b.iter(|| parse(black_box(source)).unwrap());
        });
    }
    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");

    let source = generate_cfg(500);
    let unchanged = parse(&source).unwrap();
    let mut changed = unchanged.clone();
    changed.insert(
        "DV_VALUE_NEW".to_string(),
        Value::FloatList(vec![0.002, 0.003, 0.004]),
    );

    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("unchanged", |b| {
        b.iter(|| serialize(black_box(&source), black_box(&unchanged)).unwrap());
    });
    group.bench_function("changed", |b| {
        b.iter(|| serialize(black_box(&source), black_box(&changed)).unwrap());
    });
    group.bench_function("dump", |b| {
        b.iter(|| dump(black_box(&unchanged)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_serialize);
criterion_main!(benches);
