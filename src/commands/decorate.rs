//! Decorate the pages of the public directory

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::Site;

/// Totals for one decorate run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecorateSummary {
    pub pages: usize,
    pub enhanced: usize,
    pub failed: usize,
    /// Pages or entries that could not be read
    pub skipped: usize,
}

/// Decorate every HTML page under the public directory
///
/// Pages are rewritten in place, or mirrored under `out` together with the
/// remaining files when an output directory is given.
pub async fn run(site: &Site, out: Option<&Path>) -> Result<DecorateSummary> {
    let start = std::time::Instant::now();

    if !site.public_dir.exists() {
        anyhow::bail!("Public directory {:?} does not exist", site.public_dir);
    }

    let bootstrapper = site.bootstrapper()?;
    let mut summary = DecorateSummary::default();

    for entry in WalkDir::new(&site.public_dir).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                summary.skipped += 1;
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let target = match out {
            Some(out_dir) => mirror_path(&site.public_dir, out_dir, path)?,
            None => path.to_path_buf(),
        };
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if !is_html_file(path) {
            if target != path {
                tokio::fs::copy(path, &target).await?;
            }
            continue;
        }

        let html = match tokio::fs::read_to_string(path).await {
            Ok(html) => html,
            Err(e) => {
                // Copied untouched when mirroring
                tracing::warn!("Skipping {:?}: {}", path, e);
                if target != path {
                    tokio::fs::copy(path, &target)
                        .await
                        .with_context(|| format!("Failed to copy {:?}", path))?;
                }
                summary.skipped += 1;
                continue;
            }
        };
        let (decorated, report) = bootstrapper.decorate_html(&html).await;
        tokio::fs::write(&target, decorated)
            .await
            .with_context(|| format!("Failed to write {:?}", target))?;

        tracing::debug!(
            "Decorated {:?}: {} enhanced, {} failed",
            path,
            report.enhanced(),
            report.failed()
        );
        summary.pages += 1;
        summary.enhanced += report.enhanced();
        summary.failed += report.failed();
    }

    tracing::info!(
        "Decorated {} pages ({} blocks enhanced, {} failed, {} skipped) in {:.2}s",
        summary.pages,
        summary.enhanced,
        summary.failed,
        summary.skipped,
        start.elapsed().as_secs_f64()
    );

    Ok(summary)
}

fn mirror_path(public_dir: &Path, out_dir: &Path, path: &Path) -> Result<PathBuf> {
    let relative = path.strip_prefix(public_dir)?;
    Ok(out_dir.join(relative))
}

fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}
