use serde::{Deserialize, Serialize};

use crate::analyze::engine::AnalysisResult;
use super::platform::Platform;

/// Human-readable pull request content handed to the patch publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDraft {
    pub branch: String,
    pub title: String,
    pub body: String,
}

fn branch_slug(url: &str) -> String {
    let host = url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string());
    let slug: String = host
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    slug.trim_matches('-').to_string()
}

fn table_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

pub fn build_pr_description(result: &AnalysisResult, platforms: &[Platform]) -> PullRequestDraft {
    let title = format!(
        "Add security headers ({} fix{})",
        result.fix_set.len(),
        if result.fix_set.len() == 1 { "" } else { "es" }
    );

    let mut body = String::new();
    body.push_str("## Security header hardening\n\n");
    body.push_str(&format!(
        "Automated analysis of {} scored **{}/100 (grade {})**: {} found, {} missing, {} misconfigured.\n\n",
        result.url,
        result.score,
        result.grade,
        result.headers.found.len(),
        result.headers.missing.len(),
        result.headers.misconfigured.len(),
    ));

    if result.fix_set.is_empty() {
        body.push_str("No header changes are required.\n");
    } else {
        body.push_str("### Changes\n\n| Header | Action | Value |\n|---|---|---|\n");
        for fix in &result.fix_set {
            body.push_str(&format!(
                "| `{}` | {} | `{}` |\n",
                fix.header,
                fix.action.label(),
                table_cell(&fix.value)
            ));
        }
        body.push('\n');
    }

    if !platforms.is_empty() {
        body.push_str("### Files\n\n");
        for p in platforms {
            body.push_str(&format!("- `{}` ({})\n", p.default_config_file(), p.display_name()));
        }
        body.push('\n');
    }

    if let Some(framework) = &result.framework {
        body.push_str(&format!("Detected platform: {}.\n\n", framework.display_name()));
    }

    let top: Vec<_> = result.recommendations.iter().take(5).collect();
    if !top.is_empty() {
        body.push_str("### Why\n\n");
        for rec in top {
            body.push_str(&format!("- **{}** [{}]: {}\n", rec.header, rec.severity, rec.description));
        }
        body.push('\n');
    }

    let references: Vec<&str> = result
        .fix_set
        .iter()
        .filter_map(|f| f.reference.as_deref())
        .collect();
    if !references.is_empty() {
        body.push_str("### References\n\n");
        for r in references {
            body.push_str(&format!("- {r}\n"));
        }
    }

    PullRequestDraft {
        branch: format!("security-headers/{}", branch_slug(&result.url)),
        title,
        body,
    }
}
