// builtins.rs

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::archive;
use crate::error::{Result, ShellError};
use crate::fsops;
use crate::listing;
use crate::paths::{
    base_name, ensure_absent, ensure_distinct, ensure_exists, ensure_is_dir, ensure_is_file, ensure_not_root,
    reject_root, resolve,
};
use crate::search;
use crate::shell::{Outcome, Prompt, Shell};
use crate::undo::{OperationKind, PendingRecord};

/// Splits `-r`-style flags from positional arguments.
fn split_flags<'a>(args: &'a [String], flags: &[&str]) -> (Vec<&'a str>, Vec<&'a str>) {
    args.iter().map(String::as_str).partition(|a| flags.contains(a))
}

impl<W: Write> Shell<W> {
    fn resolve(&self, raw: &str) -> PathBuf {
        resolve(&self.cwd, raw)
    }

    pub(crate) fn ls(&mut self, args: &[String]) -> Result<Outcome> {
        let (flags, rest) = split_flags(args, &["-l"]);
        let target = self.resolve(rest.first().copied().unwrap_or("."));
        ensure_is_dir(&target)?;
        let rows = if flags.is_empty() { listing::short_listing(&target)? } else { listing::long_listing(&target)? };
        if rows.is_empty() {
            self.say("Directory is empty");
        }
        for row in rows {
            self.say(row);
        }
        info!(path = %target.display(), "ls");
        Ok(Outcome::Done)
    }

    pub(crate) fn cd(&mut self, args: &[String]) -> Result<Outcome> {
        let target = self.resolve(args.first().map(String::as_str).unwrap_or("~"));
        ensure_is_dir(&target)?;
        info!(from = %self.cwd.display(), to = %target.display(), "cd");
        self.cwd = target;
        Ok(Outcome::Done)
    }

    pub(crate) fn cat(&mut self, args: &[String]) -> Result<Outcome> {
        let raw = args.first().ok_or(ShellError::Usage("cat <file>"))?;
        let path = self.resolve(raw);
        ensure_is_file(&path)?;
        let bytes = fs::read(&path)?;
        self.say(String::from_utf8_lossy(&bytes));
        info!(path = %path.display(), "cat");
        Ok(Outcome::Done)
    }

    pub(crate) fn cp(&mut self, args: &[String]) -> Result<Outcome> {
        let (flags, rest) = split_flags(args, &["-r"]);
        let [raw_src, raw_dst, ..] = rest.as_slice() else {
            return Err(ShellError::Usage("cp [-r] <source> <destination>"));
        };
        let recursive = !flags.is_empty();
        let src = self.resolve(raw_src);
        let mut dst = self.resolve(raw_dst);
        ensure_not_root(raw_src, &src)?;
        reject_root(&dst)?;
        ensure_exists(&src)?;

        if src.is_dir() && !recursive {
            return Err(ShellError::Usage("cp -r <directory> <destination>"));
        }
        if dst.is_dir() {
            dst = dst.join(base_name(&src));
        }
        if src.is_dir() && dst.starts_with(&src) {
            return Err(ShellError::PermissionDenied { path: dst, reason: "cannot copy a directory into itself" });
        }
        ensure_distinct(&src, &dst)?;
        // undo deletes the destination, so it must not hold anything beforehand
        ensure_absent(&dst)?;

        fsops::copy_any(&src, &dst)?;
        self.say(format!("Copied: {} -> {}", src.display(), dst.display()));
        info!(src = %src.display(), dst = %dst.display(), recursive, "cp");
        Ok(Outcome::Reversible(PendingRecord::new(OperationKind::Copy, src, dst)))
    }

    pub(crate) fn mv(&mut self, args: &[String]) -> Result<Outcome> {
        let [raw_src, raw_dst, ..] = args else {
            return Err(ShellError::Usage("mv <source> <destination>"));
        };
        let src = self.resolve(raw_src);
        let mut dst = self.resolve(raw_dst);
        ensure_not_root(raw_src, &src)?;
        reject_root(&dst)?;
        ensure_exists(&src)?;

        if dst.is_dir() {
            dst = dst.join(base_name(&src));
        }
        if src == dst {
            self.say("Warning: source and destination are the same");
            return Ok(Outcome::Done);
        }
        ensure_absent(&dst)?;

        fsops::move_path(&src, &dst)?;
        self.say(format!("Moved: {} -> {}", src.display(), dst.display()));
        info!(src = %src.display(), dst = %dst.display(), "mv");
        Ok(Outcome::Reversible(PendingRecord::new(OperationKind::Move, src, dst)))
    }

    /// Files go immediately and cannot be undone. Directories need `-r` and a
    /// confirmation, and are copied into the trash before they are removed.
    pub(crate) fn rm(&mut self, args: &[String], prompt: &mut dyn Prompt) -> Result<Outcome> {
        let (flags, rest) = split_flags(args, &["-r"]);
        let raw = rest.first().ok_or(ShellError::Usage("rm [-r] <path>"))?;
        let target = self.resolve(raw);
        ensure_not_root(raw, &target)?;
        ensure_exists(&target)?;

        // a symlink to a directory is removed like a file
        if !fs::symlink_metadata(&target)?.is_dir() {
            fs::remove_file(&target)?;
            self.say(format!("File removed: {}", target.display()));
            debug!(path = %target.display(), "file removal is not recorded for undo");
            info!(path = %target.display(), "rm");
            return Ok(Outcome::Done);
        }

        if flags.is_empty() {
            return Err(ShellError::Usage("rm -r <directory>"));
        }
        if self.trash.root().starts_with(fs::canonicalize(&target)?) {
            return Err(ShellError::PermissionDenied { path: target, reason: "contains the trash directory" });
        }
        let question = format!("Remove directory {} and all its contents? (y/n): ", target.display());
        let confirmed = prompt.ask(&question).is_some_and(|a| a.trim().eq_ignore_ascii_case("y"));
        if !confirmed {
            self.say("Deletion cancelled");
            warn!(path = %target.display(), "rm -r cancelled");
            return Ok(Outcome::Declined);
        }

        let slot = self.trash.place(&target)?;
        self.say(format!("Directory removed: {}", target.display()));
        info!(path = %target.display(), slot = %slot.display(), "rm -r");
        Ok(Outcome::Reversible(PendingRecord::new(OperationKind::Delete, slot, target)))
    }

    pub(crate) fn zip(&mut self, args: &[String]) -> Result<Outcome> {
        let [raw_folder, raw_archive] = args else {
            return Err(ShellError::Usage("zip <folder> <archive.zip>"));
        };
        let (folder, target) = self.archive_paths(raw_folder, raw_archive)?;
        let target = archive::with_zip_extension(&target);
        ensure_absent(&target)?;
        let members = archive::create_zip(&folder, &target)?;
        self.say(format!("ZIP archive created: {}", target.display()));
        info!(folder = %folder.display(), archive = %target.display(), members, "zip");
        Ok(Outcome::Reversible(PendingRecord::new(OperationKind::Archive, folder, target)))
    }

    pub(crate) fn tar(&mut self, args: &[String]) -> Result<Outcome> {
        let [raw_folder, raw_archive] = args else {
            return Err(ShellError::Usage("tar <folder> <archive.tar.gz>"));
        };
        let (folder, target) = self.archive_paths(raw_folder, raw_archive)?;
        ensure_absent(&target)?;
        let members = archive::create_tar_gz(&folder, &target)?;
        self.say(format!("TAR.GZ archive created: {}", target.display()));
        info!(folder = %folder.display(), archive = %target.display(), members, "tar");
        Ok(Outcome::Reversible(PendingRecord::new(OperationKind::Archive, folder, target)))
    }

    fn archive_paths(&self, raw_folder: &str, raw_archive: &str) -> Result<(PathBuf, PathBuf)> {
        let folder = self.resolve(raw_folder);
        let target = self.resolve(raw_archive);
        ensure_not_root(raw_folder, &folder)?;
        reject_root(&target)?;
        ensure_is_dir(&folder)?;
        Ok((folder, target))
    }

    pub(crate) fn unzip(&mut self, args: &[String]) -> Result<Outcome> {
        let (source, dest) = self.extract_paths(args, "unzip <archive.zip> [destination]")?;
        let entries = archive::extract_zip(&source, &dest)?;
        self.say(format!("Archive extracted to: {}", dest.display()));
        info!(archive = %source.display(), dest = %dest.display(), entries, "unzip");
        Ok(Outcome::Done)
    }

    pub(crate) fn untar(&mut self, args: &[String]) -> Result<Outcome> {
        let (source, dest) = self.extract_paths(args, "untar <archive.tar.gz> [destination]")?;
        archive::extract_tar_gz(&source, &dest)?;
        self.say(format!("Archive extracted to: {}", dest.display()));
        info!(archive = %source.display(), dest = %dest.display(), "untar");
        Ok(Outcome::Done)
    }

    fn extract_paths(&self, args: &[String], usage: &'static str) -> Result<(PathBuf, PathBuf)> {
        let raw = args.first().ok_or(ShellError::Usage(usage))?;
        let source = self.resolve(raw);
        ensure_is_file(&source)?;
        let dest = self.resolve(args.get(1).map(String::as_str).unwrap_or("."));
        Ok((source, dest))
    }

    pub(crate) fn grep(&mut self, args: &[String]) -> Result<Outcome> {
        let (flags, rest) = split_flags(args, &["-r", "-i"]);
        let [pattern, raw_path, ..] = rest.as_slice() else {
            return Err(ShellError::Usage("grep <pattern> <path> [-r] [-i]"));
        };
        let regex = search::compile(pattern, flags.contains(&"-i"))?;
        let target = self.resolve(raw_path);
        let matches = search::grep(&regex, &target, flags.contains(&"-r"))?;
        for m in &matches {
            self.say(format!("{}:{}:{}", m.path.display(), m.line_number, m.line));
        }
        info!(pattern, path = %target.display(), matches = matches.len(), "grep");
        Ok(if matches.is_empty() { Outcome::Declined } else { Outcome::Done })
    }

    pub(crate) fn show_history(&mut self, args: &[String]) -> Result<Outcome> {
        let limit = match args.first() {
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| ShellError::Usage("history [limit]"))?),
            None => None,
        };
        let rows: Vec<String> =
            self.history.list(limit).into_iter().map(|(index, text)| format!("{}: {}", index, text)).collect();
        if rows.is_empty() {
            self.say("History is empty");
            return Ok(Outcome::Done);
        }
        self.say("Command history:");
        for row in rows {
            self.say(row);
        }
        Ok(Outcome::Done)
    }

    pub(crate) fn clear_history(&mut self) -> Result<Outcome> {
        self.history.clear();
        self.ledger.unlink();
        self.say("History cleared");
        info!("history cleared");
        Ok(Outcome::Done)
    }

    pub(crate) fn undo(&mut self, args: &[String]) -> Result<Outcome> {
        if !args.is_empty() {
            return Err(ShellError::Usage("undo"));
        }
        let record = self.ledger.undo_last(&mut self.history, &self.trash)?;
        self.say(record.summary());
        Ok(Outcome::Done)
    }

    pub(crate) fn list_trash(&mut self) -> Result<Outcome> {
        let entries = self.trash.entries()?;
        if entries.is_empty() {
            self.say("Trash is empty");
        }
        for entry in entries {
            let marker = if entry.is_dir { "/" } else { "" };
            self.say(format!("{}{}  {} bytes", entry.name, marker, entry.size));
        }
        Ok(Outcome::Done)
    }

    pub(crate) fn empty_trash(&mut self) -> Result<Outcome> {
        let removed = self.trash.purge()?;
        self.say(format!("Removed {} item(s) from trash", removed));
        Ok(Outcome::Done)
    }
}
