use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::analyze::AnalysisResult;

/// One JSON object per line. An existing file is replaced, so the output
/// always lines up with the batch's `summary.csv`.
pub fn write_jsonl(path: &Path, items: &[&AnalysisResult]) -> anyhow::Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    for it in items {
        let line = serde_json::to_string(it)?;
        f.write_all(line.as_bytes())?;
        f.write_all(b"\n")?;
    }
    f.flush()?;
    Ok(())
}

pub fn read_jsonl(path: &Path) -> anyhow::Result<Vec<AnalysisResult>> {
    let mut out = Vec::new();
    let data = std::fs::read_to_string(path)?;
    for line in data.lines() {
        if line.trim().is_empty() {
            continue;
        }
        out.push(serde_json::from_str(line)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{Analyzer, HeaderMap};

    #[test]
    fn reads_back_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        let a = Analyzer::new().analyze("https://a.test/", &HeaderMap::new());
        let b = Analyzer::new().analyze("https://b.test/", &HeaderMap::new());
        write_jsonl(&path, &[&a, &b]).unwrap();
        let back = read_jsonl(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0], a);
        assert_eq!(back[1].url, "https://b.test/");
    }

    #[test]
    fn rerun_replaces_previous_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        let a = Analyzer::new().analyze("https://a.test/", &HeaderMap::new());
        let b = Analyzer::new().analyze("https://b.test/", &HeaderMap::new());
        write_jsonl(&path, &[&a, &b]).unwrap();
        write_jsonl(&path, &[&a, &b]).unwrap();
        let back = read_jsonl(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
