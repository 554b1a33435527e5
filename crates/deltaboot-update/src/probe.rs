//! Installed artifact inspection
//!
//! The artifact is a zip archive carrying a JAR-style manifest at
//! `META-INF/MANIFEST.MF`. The build number lives in `Implementation-Version`,
//! the human version in `Version` (or `Specification-Version`) and the entry
//! point in `Main-Class`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// Manifest entry inside the artifact
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

const BUILD_ATTRIBUTE: &str = "Implementation-Version";
/// Checked in order for the human readable version
const DISPLAY_ATTRIBUTES: [&str; 2] = ["Version", "Specification-Version"];
const ENTRY_POINT_ATTRIBUTE: &str = "Main-Class";

/// A valid artifact found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledArtifact {
    /// Location of the artifact
    pub path: PathBuf,

    /// Build number from the manifest
    pub build_number: u64,

    /// Human readable version
    pub display_version: String,

    /// Entry point handed to the launch collaborator
    pub entry_point: String,
}

/// Outcome of probing an artifact path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Valid(InstalledArtifact),
    /// Present but its metadata cannot be trusted
    Corrupt { reason: String },
    Absent,
}

impl ProbeResult {
    /// Build number the engine should assume; absent and corrupt count as 0
    pub fn effective_build(&self) -> u64 {
        match self {
            Self::Valid(artifact) => artifact.build_number,
            Self::Corrupt { .. } | Self::Absent => 0,
        }
    }

    pub fn artifact(&self) -> Option<&InstalledArtifact> {
        match self {
            Self::Valid(artifact) => Some(artifact),
            _ => None,
        }
    }
}

/// Read the artifact's embedded metadata
///
/// Any failure to extract an integer build number or an entry point marks
/// the whole artifact corrupt; there is no partial result.
pub fn probe(path: &Path) -> ProbeResult {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return ProbeResult::Absent,
        Err(e) => return corrupt(path, format!("cannot open: {}", e)),
    };

    let manifest = match read_manifest(file) {
        Ok(manifest) => manifest,
        Err(reason) => return corrupt(path, reason),
    };

    let attributes = parse_manifest(&manifest);

    let build_number = match attributes.get(BUILD_ATTRIBUTE) {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                return corrupt(path, format!("{} is not a build number: {:?}", BUILD_ATTRIBUTE, raw))
            }
        },
        None => return corrupt(path, format!("manifest has no {}", BUILD_ATTRIBUTE)),
    };

    let entry_point = match attributes.get(ENTRY_POINT_ATTRIBUTE) {
        Some(entry) if !entry.trim().is_empty() => entry.trim().to_string(),
        _ => return corrupt(path, format!("manifest has no {}", ENTRY_POINT_ATTRIBUTE)),
    };

    let display_version = DISPLAY_ATTRIBUTES
        .iter()
        .filter_map(|name| attributes.get(*name))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| build_number.to_string());

    debug!("Probed {:?}: build {}", path, build_number);

    ProbeResult::Valid(InstalledArtifact {
        path: path.to_path_buf(),
        build_number,
        display_version,
        entry_point,
    })
}

fn corrupt(path: &Path, reason: String) -> ProbeResult {
    debug!("Artifact {:?} is corrupt: {}", path, reason);
    ProbeResult::Corrupt { reason }
}

fn read_manifest(file: File) -> Result<String, String> {
    let mut archive = ZipArchive::new(file).map_err(|e| format!("not a zip archive: {}", e))?;
    let mut entry = archive
        .by_name(MANIFEST_PATH)
        .map_err(|e| format!("{} unreadable: {}", MANIFEST_PATH, e))?;

    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| format!("{} unreadable: {}", MANIFEST_PATH, e))?;
    Ok(content)
}

/// Parse the main section of a manifest into attribute pairs
///
/// A line starting with a single space continues the previous value.
/// Parsing stops at the first blank line (start of per-entry sections).
fn parse_manifest(content: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    let mut current: Option<(String, String)> = None;

    for line in content.lines() {
        let line = line.trim_end_matches('\r');

        if line.is_empty() {
            break;
        }

        if let Some(rest) = line.strip_prefix(' ') {
            if let Some((_, value)) = current.as_mut() {
                value.push_str(rest);
            }
            continue;
        }

        if let Some((key, value)) = current.take() {
            attributes.insert(key, value);
        }

        if let Some((key, value)) = line.split_once(':') {
            current = Some((key.trim().to_string(), value.trim_start().to_string()));
        }
    }

    if let Some((key, value)) = current {
        attributes.insert(key, value);
    }

    attributes
}
