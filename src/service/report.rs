use crate::resource::zone::TransferableZone;
use std::env;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

pub const REPORT_HEADER: &str = "# List of TLDs & Roots With Zone Transfers Currently Enabled\n\n";

/// Markdown listing of every exposed zone, ordered by domain then nameserver.
/// Links are `archive_root` joined with the zone's file, using `/` separators.
pub fn render_report(zones: &[TransferableZone], archive_root: &Path) -> String {
    let mut zones = zones.to_vec();
    zones.sort();
    zones.dedup();
    let root: Vec<String> = archive_root
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let mut report = String::from(REPORT_HEADER);
    for zone in &zones {
        let name = zone.display_name();
        let suffix = if zone.compressed { ".gz" } else { "" };
        let mut link = root.clone();
        link.push(name.clone());
        link.push(format!("{}zone{}", zone.nameserver, suffix));
        report.push_str(&format!(
            "* `{}` via `{}`: [Click here to view zone data.]({})\n",
            name,
            zone.nameserver,
            link.join("/")
        ));
    }
    report
}

/// Writes the report with links relative to the directory it lands in.
pub async fn write_report(path: &Path, zones: &[TransferableZone], archive_root: &Path) -> io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent).await?;
    }
    let links_root = relative_to(parent, archive_root);
    fs::write(path, render_report(zones, &links_root)).await
}

/// `target` as reached from `base`, both taken against the working directory.
fn relative_to(base: &Path, target: &Path) -> PathBuf {
    let cwd = env::current_dir().unwrap_or_default();
    let base = lexical(&cwd.join(base));
    let target = lexical(&cwd.join(target));
    let common = base
        .components()
        .zip(target.components())
        .take_while(|(a, b)| a == b)
        .count();
    let mut relative = PathBuf::new();
    for _ in base.components().skip(common) {
        relative.push(Component::ParentDir);
    }
    for component in target.components().skip(common) {
        relative.push(component);
    }
    relative
}

fn lexical(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    resolved
}
