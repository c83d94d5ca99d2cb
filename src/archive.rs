// archive.rs

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use itertools::Itertools;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Result, ShellError};
use crate::paths::base_name;

struct Member {
    path: PathBuf,
    name: String,
    is_dir: bool,
}

/// Everything below `folder`, named relative to it with `/` separators.
/// Collected before the archive is created so it never contains itself.
fn members(folder: &Path, skip: &Path) -> Result<Vec<Member>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(folder).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if entry.path() == skip {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(folder)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let name = rel.components().map(|c| c.as_os_str().to_string_lossy()).join("/");
        let is_dir = entry.file_type().is_dir();
        if !is_dir && !entry.path().is_file() {
            debug!(path = %entry.path().display(), "skipping non-regular archive member");
            continue;
        }
        out.push(Member { path: entry.into_path(), name, is_dir });
    }
    Ok(out)
}

/// `archive` with a `.zip` extension, added when missing.
pub fn with_zip_extension(archive: &Path) -> PathBuf {
    match archive.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("zip") => archive.to_path_buf(),
        _ => {
            let mut name = archive.as_os_str().to_owned();
            name.push(".zip");
            PathBuf::from(name)
        }
    }
}

/// Zips the contents of `folder` (entries relative to it). Returns the member count.
pub fn create_zip(folder: &Path, archive: &Path) -> Result<usize> {
    let members = members(folder, archive)?;
    let mut zip = ZipWriter::new(File::create(archive)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for member in &members {
        if member.is_dir {
            zip.add_directory(member.name.as_str(), options)?;
        } else {
            zip.start_file(member.name.as_str(), options)?;
            io::copy(&mut File::open(&member.path)?, &mut zip)?;
        }
    }
    zip.finish()?;
    debug!(archive = %archive.display(), members = members.len(), "zip written");
    Ok(members.len())
}

pub fn extract_zip(archive: &Path, dest: &Path) -> Result<usize> {
    let mut zip = ZipArchive::new(File::open(archive)?)
        .map_err(|e| ShellError::Archive(format!("{} is not a zip archive: {}", archive.display(), e)))?;
    fs::create_dir_all(dest)?;
    // entries escaping `dest` are rejected by the zip crate
    zip.extract(dest)?;
    Ok(zip.len())
}

/// Writes a gzip-compressed tar with `folder` as its top-level directory.
pub fn create_tar_gz(folder: &Path, archive: &Path) -> Result<usize> {
    let top = base_name(folder);
    let members = members(folder, archive)?;
    let encoder = GzEncoder::new(File::create(archive)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir(&top, folder)?;
    for member in &members {
        let name = format!("{}/{}", top, member.name);
        if member.is_dir {
            builder.append_dir(&name, &member.path)?;
        } else {
            builder.append_path_with_name(&member.path, &name)?;
        }
    }
    builder.into_inner()?.finish()?;
    debug!(archive = %archive.display(), members = members.len(), "tar.gz written");
    Ok(members.len())
}

pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)?;
    fs::create_dir_all(dest)?;
    // `unpack` refuses entries that would land outside `dest`
    tar::Archive::new(GzDecoder::new(file))
        .unpack(dest)
        .map_err(|e| ShellError::Archive(format!("cannot unpack {}: {}", archive.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn docs(root: &Path) -> PathBuf {
        let folder = root.join("docs");
        fs::create_dir_all(folder.join("img")).unwrap();
        fs::write(folder.join("readme.md"), "# docs").unwrap();
        fs::write(folder.join("img/logo.svg"), "<svg/>").unwrap();
        folder
    }

    #[test]
    fn zip_extension_is_added_once() {
        assert_eq!(with_zip_extension(Path::new("/t/out")), PathBuf::from("/t/out.zip"));
        assert_eq!(with_zip_extension(Path::new("/t/out.ZIP")), PathBuf::from("/t/out.ZIP"));
        assert_eq!(with_zip_extension(Path::new("/t/out.tar")), PathBuf::from("/t/out.tar.zip"));
    }

    #[test]
    fn zip_contents_are_relative_to_folder() {
        let tmp = TempDir::new().unwrap();
        let folder = docs(tmp.path());
        let archive = tmp.path().join("docs.zip");
        assert_eq!(create_zip(&folder, &archive).unwrap(), 3);

        let out = tmp.path().join("out");
        extract_zip(&archive, &out).unwrap();
        assert_eq!(fs::read_to_string(out.join("readme.md")).unwrap(), "# docs");
        assert_eq!(fs::read_to_string(out.join("img/logo.svg")).unwrap(), "<svg/>");
    }

    #[test]
    fn tar_keeps_top_level_folder() {
        let tmp = TempDir::new().unwrap();
        let folder = docs(tmp.path());
        let archive = tmp.path().join("docs.tar.gz");
        create_tar_gz(&folder, &archive).unwrap();

        let out = tmp.path().join("out");
        extract_tar_gz(&archive, &out).unwrap();
        assert_eq!(fs::read_to_string(out.join("docs/img/logo.svg")).unwrap(), "<svg/>");
    }

    #[test]
    fn archive_inside_folder_is_not_self_included() {
        let tmp = TempDir::new().unwrap();
        let folder = docs(tmp.path());
        let archive = folder.join("self.zip");
        assert_eq!(create_zip(&folder, &archive).unwrap(), 3);
    }

    #[test]
    fn garbage_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let junk = tmp.path().join("junk.bin");
        fs::write(&junk, "definitely not an archive").unwrap();
        assert!(matches!(extract_zip(&junk, tmp.path()), Err(ShellError::Archive(_))));
        assert!(matches!(extract_tar_gz(&junk, &tmp.path().join("x")), Err(ShellError::Archive(_))));
    }
}
