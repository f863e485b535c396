//! Custom assertions for conversion results

use bili_remux::RunReport;
use std::path::Path;

/// Assert `path` exists and holds exactly `expected`
pub fn assert_file_contents(path: &Path, expected: &[u8]) {
    let actual = std::fs::read(path)
        .unwrap_or_else(|e| panic!("expected output file {}: {}", path.display(), e));
    assert_eq!(
        actual,
        expected,
        "unexpected contents in {}",
        path.display()
    );
}

/// Assert the report lists exactly these failed task ids, in order
pub fn assert_failed_ids(report: &RunReport, expected: &[&str]) {
    let ids: Vec<&str> = report.failures.iter().map(|f| f.task.as_str()).collect();
    assert_eq!(ids, expected, "failures were: {:?}", report.failures);
}

/// Collect every regular file under `dir`, relative to it, sorted
pub fn files_under(dir: &Path) -> Vec<String> {
    let mut out = Vec::new();
    collect(dir, dir, &mut out);
    out.sort();
    out
}

fn collect(base: &Path, dir: &Path, out: &mut Vec<String>) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(base, &path, out);
        } else {
            let rel = path.strip_prefix(base).unwrap();
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}
