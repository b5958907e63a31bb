//! Standalone Python batch-download script for a chosen set of papers.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::info;

use crate::paper::PaperRecord;

pub const DEFAULT_SCRIPT_NAME: &str = "start_download.py";
pub const FALLBACK_DOWNLOAD_DIR: &str = "Scholar_Downloads";

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("no papers selected; nothing to download")]
    NothingSelected,

    #[error("failed to encode paper list: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write script: {0}")]
    Io(#[from] std::io::Error),
}

/// The fields the script needs from each paper.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScriptEntry {
    pub title: String,
    pub url: String,
    pub year: i32,
}

impl From<&PaperRecord> for ScriptEntry {
    fn from(paper: &PaperRecord) -> Self {
        Self {
            title: paper.title.clone(),
            url: paper.url.clone(),
            year: paper.year,
        }
    }
}

const SCRIPT_IMPORTS: &str = "import os
import requests
import re
import sys
import time
import random
";

/// Everything after the configuration block.
const SCRIPT_BODY: &str = r##"

def sanitize_filename(name):
    return re.sub(r'[\\/*?:"<>|]', "", name)

def download_file(url, filepath, retries=2):
    headers = {
        'User-Agent': 'Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36'
    }

    for attempt in range(retries + 1):
        try:
            response = requests.get(url, headers=headers, timeout=15, stream=True, verify=False)
            if response.status_code == 200:
                with open(filepath, 'wb') as f:
                    for chunk in response.iter_content(chunk_size=1024):
                        f.write(chunk)
                return True
            elif response.status_code == 403:
                print(f"    [!] 403 Forbidden (Anti-bot). Skipping.")
                return False
        except Exception as e:
            if attempt < retries:
                time.sleep(1)
                continue
            print(f"    [!] Error: {e}")
    return False

def main():
    print("===========================================")
    print("      ScholarSync Batch Downloader         ")
    print("===========================================")

    if not os.path.exists(DOWNLOAD_DIR):
        try:
            os.makedirs(DOWNLOAD_DIR)
        except OSError:
            pass

    print(f"Target Folder: {os.path.abspath(DOWNLOAD_DIR)}")
    print(f"Queue: {len(PAPERS)} papers")
    print("-" * 40)

    success = 0

    # Legacy university sites often have broken certificates.
    requests.packages.urllib3.disable_warnings()

    for i, paper in enumerate(PAPERS):
        title = paper['title']
        url = paper['url']
        year = paper['year']

        safe_title = sanitize_filename(title)[:120]
        filename = f"{year} - {safe_title}.pdf"
        filepath = os.path.join(DOWNLOAD_DIR, filename)

        print(f"[{i+1}/{len(PAPERS)}] Processing: {title[:40]}...")

        if os.path.exists(filepath):
            print(f"    -> Exists. Skipping.")
            success += 1
            continue

        if download_file(url, filepath):
            print(f"    -> Downloaded.")
            success += 1
        else:
            print(f"    -> Failed or Protected. Manual download needed.")

        time.sleep(random.uniform(0.5, 1.5))

    print("-" * 40)
    print(f"Done. {success}/{len(PAPERS)} saved.")
    input("Press Enter to close...")

if __name__ == "__main__":
    main()
"##;

/// Renders the script for `entries`, saving into `download_dir`.
///
/// Backslashes in the directory become `/`; double quotes and control characters
/// are dropped so the value stays a valid Python raw string. A blank directory uses
/// [`FALLBACK_DOWNLOAD_DIR`].
pub fn generate_script(entries: &[ScriptEntry], download_dir: &str) -> Result<String, ScriptError> {
    let dir = download_dir.trim();
    let dir = if dir.is_empty() {
        FALLBACK_DOWNLOAD_DIR.to_string()
    } else {
        dir.chars()
            .filter(|&c| c != '"' && !c.is_control())
            .map(|c| if c == '\\' { '/' } else { c })
            .collect()
    };

    let papers = papers_literal(entries)?;
    Ok(format!(
        "{SCRIPT_IMPORTS}\n# --- CONFIGURATION ---\nDOWNLOAD_DIR = r\"{dir}\"\nPAPERS = {papers}\n# ---------------------\n{SCRIPT_BODY}"
    ))
}

/// Writes the script for the selected papers to `path`.
pub fn write_script<'a>(
    path: &Path,
    selected: impl IntoIterator<Item = &'a PaperRecord>,
    download_dir: &str,
) -> Result<usize, ScriptError> {
    let entries: Vec<ScriptEntry> = selected.into_iter().map(ScriptEntry::from).collect();
    if entries.is_empty() {
        return Err(ScriptError::NothingSelected);
    }

    let script = generate_script(&entries, download_dir)?;
    fs::write(path, script)?;
    info!(path = %path.display(), papers = entries.len(), "download script written");
    Ok(entries.len())
}

/// JSON with 4-space indentation, which Python reads as a list of dicts.
fn papers_literal(entries: &[ScriptEntry]) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    entries.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
