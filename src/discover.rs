//! Recursive source-file discovery.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{config::LoaderConfig, error::ConvertError, schema::table_name_for};

/// A file selected for loading together with the table it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub table_name: String,
    pub encoding: String,
}

/// Walks `root` depth-first and returns every regular file whose name ends
/// with the configured extension. Entries within a directory are visited in
/// file-name order so repeated runs see the same sequence.
pub fn discover_files(root: &Path, config: &LoaderConfig) -> Result<Vec<SourceFile>, ConvertError> {
    if !root.is_dir() {
        return Err(ConvertError::NotFound {
            path: root.to_path_buf(),
        });
    }
    let suffix = config.extension.to_ascii_lowercase();
    let mut found = Vec::new();
    walk(root, &suffix, &mut found)?;
    debug!("Discovered {} file(s) under {:?}", found.len(), root);
    Ok(found
        .into_iter()
        .map(|path| SourceFile {
            table_name: table_name_for(&path),
            encoding: config.encoding.clone(),
            path,
        })
        .collect())
}

fn walk(dir: &Path, suffix: &str, found: &mut Vec<PathBuf>) -> Result<(), ConvertError> {
    let discovery_error = |source| ConvertError::Discovery {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(discovery_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(discovery_error)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        // file_type() does not follow symlinks, so linked directories are skipped
        let file_type = entry.file_type().map_err(discovery_error)?;
        let path = entry.path();
        if file_type.is_dir() {
            walk(&path, suffix, found)?;
        } else if file_type.is_file() && has_suffix(&path, suffix) {
            found.push(path);
        }
    }
    Ok(())
}

fn has_suffix(path: &Path, lowercase_suffix: &str) -> bool {
    path.file_name()
        .map(|name| {
            name.to_string_lossy()
                .to_ascii_lowercase()
                .ends_with(lowercase_suffix)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_match_ignores_ascii_case() {
        assert!(has_suffix(Path::new("dir/ORDERS.CSV"), ".csv"));
        assert!(has_suffix(Path::new("orders.Csv"), ".csv"));
        assert!(!has_suffix(Path::new("orders.csv.bak"), ".csv"));
        assert!(!has_suffix(Path::new("orderscsv"), ".csv"));
    }
}
