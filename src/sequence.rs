//! Renumbers the files of a directory into a zero-padded sequence
//! (`00001.jpg`, `00002.png`, …), the layout the cascade trainer expects
//! for its positive and negative sample folders.

use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::Result;

/// Renames every regular file in `dir`, in sorted name order, to its
/// one-based position padded to five digits, keeping the original
/// extension. Returns the number of files in the sequence.
pub fn renumber(dir: &Path) -> Result<usize> {
    let files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| Some(entry.ok()?.path()))
        .filter(|path| path.is_file())
        .sorted()
        .collect();

    for (index, path) in files.iter().enumerate() {
        let target = dir.join(sequence_name(index + 1, path));
        if *path == target {
            continue;
        }
        fs::rename(path, &target)?;
        log::info!("renamed {:?} -> {:?}", path.file_name(), target.file_name());
    }

    Ok(files.len())
}

fn sequence_name(position: usize, original: &Path) -> String {
    match original.extension() {
        Some(ext) => format!("{:05}.{}", position, ext.to_string_lossy()),
        None => format!("{:05}", position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    fn names(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .sorted()
            .collect()
    }

    #[test]
    fn renumbers_in_sorted_order_keeping_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "zebra.png");
        touch(dir.path(), "apple.jpg");
        touch(dir.path(), "mango.jpeg");

        let count = renumber(dir.path()).unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            names(dir.path()),
            vec!["00001.jpg", "00002.jpeg", "00003.png"]
        );
    }

    #[test]
    fn renumbering_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.jpg");
        touch(dir.path(), "a.jpg");

        renumber(dir.path()).unwrap();
        let first = names(dir.path());
        renumber(dir.path()).unwrap();
        assert_eq!(names(dir.path()), first);
        assert_eq!(first, vec!["00001.jpg", "00002.jpg"]);
    }

    #[test]
    fn subdirectories_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        touch(dir.path(), "only.png");

        let count = renumber(dir.path()).unwrap();
        assert_eq!(count, 1);
        assert!(dir.path().join("nested").is_dir());
        assert!(dir.path().join("00001.png").is_file());
    }

    #[test]
    fn empty_directory_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(renumber(dir.path()).unwrap(), 0);
    }
}
