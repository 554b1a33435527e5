//! Zip artifact builders
//!
//! Artifacts are real zip archives with a `META-INF/MANIFEST.MF`, so the
//! production probe reads them exactly as it reads downloaded ones.

use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::constants::*;

/// Bytes of an artifact reporting `build`
pub fn artifact_bytes(build: u64) -> Vec<u8> {
    let manifest = format!(
        "Manifest-Version: 1.0\r\nImplementation-Version: {}\r\nSpecification-Version: {}.{}\r\nMain-Class: {}\r\n\r\n",
        build, DISTRIBUTION, build, ENTRY_POINT
    );
    zip_with_manifest(&manifest)
}

/// Bytes of an artifact whose build number cannot be parsed
pub fn corrupt_artifact_bytes() -> Vec<u8> {
    zip_with_manifest("Manifest-Version: 1.0\r\nImplementation-Version: unknown\r\nMain-Class: app.Main\r\n\r\n")
}

fn zip_with_manifest(manifest: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("META-INF/MANIFEST.MF", options).unwrap();
    zip.write_all(manifest.as_bytes()).unwrap();
    zip.start_file("app/Main.class", options).unwrap();
    zip.write_all(b"\xCA\xFE\xBA\xBE").unwrap();

    zip.finish().unwrap().into_inner()
}

/// Write an artifact reporting `build` to `path`
pub fn write_artifact(path: &Path, build: u64) {
    std::fs::write(path, artifact_bytes(build)).unwrap();
}
