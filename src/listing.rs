// listing.rs

use std::fs::{self, Metadata};
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use chrono::{DateTime, Local};
use nix::unistd::{Gid, Group, Uid, User};

use crate::error::Result;

/// Sorted names in `dir`, decorated like `ls -F`: `/` for directories,
/// `@` for symlinks, `*` for executables.
pub fn short_listing(dir: &Path) -> Result<Vec<String>> {
    let mut rows = Vec::new();
    for (name, meta) in sorted_entries(dir)? {
        rows.push(format!("{}{}", name, suffix(&meta)));
    }
    Ok(rows)
}

pub fn long_listing(dir: &Path) -> Result<Vec<String>> {
    let mut rows = Vec::new();
    for (name, meta) in sorted_entries(dir)? {
        let mtime: DateTime<Local> = match meta.modified() {
            Ok(t) => t.into(),
            Err(_) => {
                rows.push(format!("? ? ? ? ? ? ? {}", name));
                continue;
            }
        };
        rows.push(format!(
            "{} {:>2} {:<8} {:<8} {:>8} {} {}{}",
            mode_string(&meta),
            meta.nlink(),
            owner_name(meta.uid()),
            group_name(meta.gid()),
            meta.len(),
            mtime.format("%b %d %H:%M"),
            name,
            suffix(&meta),
        ));
    }
    Ok(rows)
}

fn sorted_entries(dir: &Path) -> Result<Vec<(String, Metadata)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        // symlink_metadata so links are reported as links
        let meta = entry.path().symlink_metadata()?;
        entries.push((entry.file_name().to_string_lossy().into_owned(), meta));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

fn suffix(meta: &Metadata) -> &'static str {
    if meta.is_dir() {
        "/"
    } else if meta.file_type().is_symlink() {
        "@"
    } else if meta.mode() & 0o100 != 0 {
        "*"
    } else {
        ""
    }
}

pub fn mode_string(meta: &Metadata) -> String {
    let file_type = if meta.is_dir() {
        'd'
    } else if meta.file_type().is_symlink() {
        'l'
    } else {
        '-'
    };
    let mode = meta.mode();
    let mut out = String::with_capacity(10);
    out.push(file_type);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

fn owner_name(uid: u32) -> String {
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => user.name,
        _ => uid.to_string(),
    }
}

fn group_name(gid: u32) -> String {
    match Group::from_gid(Gid::from_raw(gid)) {
        Ok(Some(group)) => group.name,
        _ => gid.to_string(),
    }
}
