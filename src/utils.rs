use ahash::AHashSet;
use std::fs;
use std::path::Path;

pub fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Newline-delimited targets; blank lines and `#` comments are skipped.
pub fn read_targets(path: &Path) -> anyhow::Result<Vec<String>> {
    let data = fs::read_to_string(path)?;
    Ok(parse_targets(&data))
}

pub fn parse_targets(data: &str) -> Vec<String> {
    let mut seen = AHashSet::new();
    let mut out = Vec::new();
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if seen.insert(line) {
            out.push(line.to_string());
        }
    }
    out
}
