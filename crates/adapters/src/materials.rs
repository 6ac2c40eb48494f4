// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Filesystem helpers for runtime materials and built artifacts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

/// Copy every top-level file of `source` into `destination` unless a file of
/// the same name already exists there. Returns the number of files copied.
pub fn merge_missing_files(source: &Path, destination: &Path) -> io::Result<usize> {
    fs::create_dir_all(destination)?;
    let mut copied = 0;

    for entry in fs::read_dir(source)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let target = destination.join(entry.file_name());
        if target.exists() {
            continue;
        }
        debug!(
            file = %entry.file_name().to_string_lossy(),
            from = %source.display(),
            "Copying file into artifact"
        );
        fs::copy(entry.path(), &target)?;
        copied += 1;
    }

    Ok(copied)
}

/// Summed size of every file under `directories`, in whole KiB.
pub fn directory_size_kb(directories: &[PathBuf]) -> io::Result<u64> {
    let mut bytes = 0u64;
    for dir in directories {
        for entry in WalkDir::new(dir) {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() {
                bytes += entry.metadata().map_err(io::Error::from)?.len();
            }
        }
    }
    Ok(bytes / 1024)
}

/// Sorted `.dll` files directly inside `dir`.
pub fn list_assemblies(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut assemblies = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_dll = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("dll"))
            .unwrap_or(false);
        if is_dll && path.is_file() {
            assemblies.push(path);
        }
    }
    assemblies.sort();
    Ok(assemblies)
}

/// Identifiers listed in a subset file, one per non-empty line. Lines
/// starting with `#` are ignored.
pub fn read_subset_entries(path: &Path) -> io::Result<Vec<String>> {
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// File name an identifier refers to: `.dll` is appended unless the
/// identifier already ends with it. Dots inside identifiers such as
/// `System.Runtime` are part of the name.
pub fn assembly_file_name(entry: &str) -> String {
    if entry.to_ascii_lowercase().ends_with(".dll") {
        entry.to_string()
    } else {
        format!("{entry}.dll")
    }
}

/// Copy `file` into `directory` unless it is already there. Returns the
/// staged path.
pub fn stage_file(file: &Path, directory: &Path) -> io::Result<PathBuf> {
    let name = file.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", file.display()),
        )
    })?;
    let staged = directory.join(name);
    if !staged.exists() {
        fs::create_dir_all(directory)?;
        fs::copy(file, &staged)?;
        info!(file = %staged.display(), "Staged subset file");
    }
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_never_overwrites() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::write(src.path().join("System.Runtime.dll"), b"il").unwrap();
        fs::write(src.path().join("libcoreclr.so"), b"native").unwrap();
        fs::create_dir(src.path().join("nested")).unwrap();
        fs::write(dst.path().join("System.Runtime.dll"), b"compiled").unwrap();

        let copied = merge_missing_files(src.path(), dst.path()).unwrap();
        assert_eq!(copied, 1);
        assert_eq!(fs::read(dst.path().join("System.Runtime.dll")).unwrap(), b"compiled");
        assert_eq!(fs::read(dst.path().join("libcoreclr.so")).unwrap(), b"native");
        assert!(!dst.path().join("nested").exists());
    }

    #[test]
    fn test_directory_size() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fs::write(a.path().join("one.dll"), vec![0u8; 1024]).unwrap();
        fs::create_dir(a.path().join("sub")).unwrap();
        fs::write(a.path().join("sub").join("two.dll"), vec![0u8; 1024]).unwrap();
        fs::write(b.path().join("three.dll"), vec![0u8; 2048]).unwrap();

        let size = directory_size_kb(&[a.path().to_path_buf(), b.path().to_path_buf()]).unwrap();
        assert_eq!(size, 4);
    }

    #[test]
    fn test_list_assemblies_only_dlls() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.dll"), b"").unwrap();
        fs::write(dir.path().join("a.DLL"), b"").unwrap();
        fs::write(dir.path().join("c.so"), b"").unwrap();

        let names: Vec<_> = list_assemblies(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.DLL", "b.dll"]);
    }

    #[test]
    fn test_subset_entries() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("web.txt");
        fs::write(&file, "System.Runtime\n\n# hot path\n  System.Linq.dll  \n").unwrap();
        assert_eq!(
            read_subset_entries(&file).unwrap(),
            vec!["System.Runtime", "System.Linq.dll"]
        );
        assert_eq!(assembly_file_name("System.Runtime"), "System.Runtime.dll");
        assert_eq!(assembly_file_name("System.Linq.dll"), "System.Linq.dll");
        assert_eq!(assembly_file_name("System.Linq.DLL"), "System.Linq.DLL");
        assert_eq!(
            assembly_file_name("Microsoft.AspNetCore.Http"),
            "Microsoft.AspNetCore.Http.dll"
        );
    }

    #[test]
    fn test_stage_file_once() {
        let src = tempfile::tempdir().unwrap();
        let res = tempfile::tempdir().unwrap();
        let file = src.path().join("web.txt");
        fs::write(&file, "System.Runtime\n").unwrap();

        let staged = stage_file(&file, res.path()).unwrap();
        assert_eq!(staged, res.path().join("web.txt"));
        fs::write(&file, "changed\n").unwrap();
        stage_file(&file, res.path()).unwrap();
        assert_eq!(fs::read_to_string(staged).unwrap(), "System.Runtime\n");
    }
}
