use csv::Writer;
use std::fs::File;
use std::path::Path;

use crate::analyze::AnalysisResult;

fn names<'a>(headers: impl Iterator<Item = &'a crate::analyze::EvaluatedHeader>) -> String {
    headers.map(|h| h.name.as_str()).collect::<Vec<_>>().join("; ")
}

/// One summary row per analysed URL.
pub fn write_csv(path: &Path, items: &[&AnalysisResult]) -> anyhow::Result<()> {
    let f = File::create(path)?;
    let mut w = Writer::from_writer(f);
    w.write_record(["url", "score", "grade", "framework", "found", "missing", "misconfigured", "fixes", "timestamp"])?;
    for it in items {
        w.write_record(&[
            it.url.clone(),
            it.score.to_string(),
            it.grade.to_string(),
            it.framework.as_ref().map(|p| p.to_string()).unwrap_or_default(),
            names(it.headers.found.iter()),
            names(it.headers.missing.iter()),
            names(it.headers.misconfigured.iter()),
            it.fix_set.len().to_string(),
            it.timestamp.to_rfc3339(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{Analyzer, HeaderMap};

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let mut headers = HeaderMap::new();
        headers.insert("x-frame-options".into(), "DENY".into());
        let r = Analyzer::new().analyze("https://a.test/", &headers);
        write_csv(&path, &[&r]).unwrap();

        let data = std::fs::read_to_string(&path).unwrap();
        let mut lines = data.lines();
        assert!(lines.next().unwrap().starts_with("url,score,grade"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("https://a.test/,"));
        assert!(row.contains(",X-Frame-Options,"));
    }
}
