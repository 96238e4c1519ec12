use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::fs;
use test_forge::scan_project;

fn benchmark_scan(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    for pkg in 0..20 {
        for file in 0..25 {
            let path = dir.path().join(format!("src/pkg{pkg}/mod{file}.ts"));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "export {};").unwrap();
        }
        let dep = dir.path().join(format!("node_modules/dep{pkg}/index.js"));
        fs::create_dir_all(dep.parent().unwrap()).unwrap();
        fs::write(&dep, "module.exports = {};").unwrap();
    }

    c.bench_function("scan_project", |b| {
        b.iter(|| {
            let manifest = scan_project(black_box(dir.path()));
            assert!(manifest.is_ok());
        })
    });
}

criterion_group!(benches, benchmark_scan);
criterion_main!(benches);
