//! Bulk-download packaging: bundles converted files into one zip archive.
//!
//! Runs strictly after the batch has settled; the core never sees archive
//! concerns, it only hands over `(filename, bytes)` pairs.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};
use crate::utils::error::ConverterError;
use crate::utils::ConverterResult;

/// Builds a deflated zip archive from converted outputs, in memory.
///
/// Duplicate filenames get a ` (n)` marker before the extension so no entry
/// silently overwrites another.
pub fn build_archive(entries: &[(String, Vec<u8>)]) -> ConverterResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut used = HashSet::new();
    for (name, bytes) in entries {
        let entry_name = unique_name(&mut used, name);
        writer
            .start_file(entry_name, options)
            .map_err(|e| ConverterError::Io(format!("Archive entry failed: {}", e)))?;
        writer
            .write_all(bytes)
            .map_err(|e| ConverterError::Io(format!("Archive write failed: {}", e)))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| ConverterError::Io(format!("Archive finalize failed: {}", e)))?;
    Ok(cursor.into_inner())
}

fn unique_name(used: &mut HashSet<String>, name: &str) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let ext = path.extension().and_then(|e| e.to_str());

    for n in 1.. {
        let candidate = match ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
    }
    unreachable!()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn archive_contains_every_entry() {
        let entries = vec![
            ("a.png".to_string(), vec![1, 2, 3]),
            ("b.png".to_string(), vec![4, 5]),
        ];
        let bytes = build_archive(&entries).unwrap();

        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.len(), 2);

        let mut content = Vec::new();
        zip.by_name("a.png").unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_names_are_deduplicated() {
        let entries = vec![
            ("photo.png".to_string(), vec![1]),
            ("photo.png".to_string(), vec![2]),
            ("photo.png".to_string(), vec![3]),
        ];
        let bytes = build_archive(&entries).unwrap();

        let zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<_> = zip.file_names().collect();
        assert!(names.contains(&"photo.png"));
        assert!(names.contains(&"photo (1).png"));
        assert!(names.contains(&"photo (2).png"));
    }

    #[test]
    fn empty_batch_yields_empty_archive() {
        let bytes = build_archive(&[]).unwrap();
        let zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.len(), 0);
    }
}
