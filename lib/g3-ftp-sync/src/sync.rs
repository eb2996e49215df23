/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::{Component, Path, PathBuf};

use log::{debug, info, warn};

use crate::FtpClient;
use crate::error::{FtpRequestError, FtpSyncError};
use crate::request::{FtpMethod, join_remote};
use crate::transport::FtpTransport;

/// Aggregate result of a recursive transfer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FtpSyncReport {
    success: bool,
    failures: Vec<String>,
}

impl Default for FtpSyncReport {
    fn default() -> Self {
        FtpSyncReport {
            success: true,
            failures: Vec::new(),
        }
    }
}

impl FtpSyncReport {
    #[inline]
    pub fn success(&self) -> bool {
        self.success
    }

    /// Source paths that failed, in the order they were met.
    #[inline]
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    fn record(&mut self, path: String) {
        self.success = false;
        self.failures.push(path);
    }

    fn log_summary(&self, what: &str) {
        if self.success {
            info!("{what} succeeded");
        } else {
            for path in &self.failures {
                warn!("{what}: failed on {path}");
            }
        }
    }
}

enum UploadWork {
    Dir(PathBuf, String),
    File(PathBuf, String),
}

enum DownloadWork {
    Dir(String, PathBuf),
    File(String, PathBuf),
}

struct LocalEntry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Reads one local directory level, sorted by name.
async fn read_local_dir(dir: &Path) -> io::Result<Vec<LocalEntry>> {
    let mut rd = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = rd.next_entry().await? {
        let path = entry.path();
        let Ok(name) = entry.file_name().into_string() else {
            warn!("skipping non utf-8 local name {}", path.display());
            continue;
        };
        // follow symlinks, a dangling one is tried as a file
        let is_dir = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        entries.push(LocalEntry { name, path, is_dir });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

impl<T: FtpTransport> FtpClient<T> {
    /// Lists `remote` once and creates it, with retries, if that failed.
    async fn ensure_remote_dir(&mut self, remote: &str) -> Result<bool, FtpRequestError> {
        let request = self.create_request(remote, FtpMethod::ListNames)?;
        if self.try_list(&request).await.is_some() {
            return Ok(true);
        }
        debug!("remote dir {remote} not listable, creating it");
        self.create_dir(remote).await
    }

    /// Mirrors the local tree at `local_root` into `remote_root`.
    ///
    /// Only an unusable root is an error. Every other failed file or
    /// directory is recorded by its local path and the walk goes on;
    /// a directory that can not be created has its subtree skipped.
    pub async fn upload_dir(
        &mut self,
        local_root: &Path,
        remote_root: &str,
    ) -> Result<FtpSyncReport, FtpSyncError> {
        self.create_request(remote_root, FtpMethod::ListNames)?;
        let root_entries = read_local_dir(local_root)
            .await
            .map_err(|e| FtpSyncError::LocalRootUnreadable(local_root.to_path_buf(), e))?;
        if !self.ensure_remote_dir(remote_root).await? {
            return Err(FtpSyncError::RemoteRootUnavailable(remote_root.to_string()));
        }

        let mut report = FtpSyncReport::default();
        let mut pending = Vec::new();
        push_upload_work(&mut pending, root_entries, remote_root);

        while let Some(work) = pending.pop() {
            match work {
                UploadWork::File(local, remote) => {
                    let outcome = self.upload_file(&local, &remote, 0).await?;
                    if !outcome.success {
                        report.record(local.display().to_string());
                    }
                }
                UploadWork::Dir(local, remote) => {
                    if !self.ensure_remote_dir(&remote).await? {
                        report.record(local.display().to_string());
                        continue;
                    }
                    match read_local_dir(&local).await {
                        Ok(entries) => push_upload_work(&mut pending, entries, &remote),
                        Err(e) => {
                            warn!("unable to read local dir {}: {e}", local.display());
                            report.record(local.display().to_string());
                        }
                    }
                }
            }
        }

        report.log_summary(&format!("upload {} to {remote_root}", local_root.display()));
        Ok(report)
    }

    /// Mirrors the remote tree at `remote_root` into `local_root`.
    ///
    /// Only an uncreatable local root is an error. Failures are recorded by
    /// their remote url; a directory that can not be listed or created has
    /// its subtree skipped.
    pub async fn download_dir(
        &mut self,
        remote_root: &str,
        local_root: &Path,
    ) -> Result<FtpSyncReport, FtpSyncError> {
        self.create_request(remote_root, FtpMethod::ListDetailed)?;
        tokio::fs::create_dir_all(local_root)
            .await
            .map_err(|e| FtpSyncError::LocalRootUnavailable(local_root.to_path_buf(), e))?;

        let mut report = FtpSyncReport::default();
        let mut pending = vec![DownloadWork::Dir(
            remote_root.to_string(),
            local_root.to_path_buf(),
        )];

        while let Some(work) = pending.pop() {
            match work {
                DownloadWork::File(remote, local) => {
                    let outcome = self.download_file(&remote, &local, 0).await?;
                    if !outcome.success {
                        report.record(remote);
                    }
                }
                DownloadWork::Dir(remote, local) => {
                    if let Err(e) = tokio::fs::create_dir_all(&local).await {
                        warn!("unable to create local dir {}: {e}", local.display());
                        report.record(remote);
                        continue;
                    }
                    let Some(mut entries) = self.get_detailed_dir_list(&remote).await? else {
                        report.record(remote);
                        continue;
                    };
                    entries.retain(|e| !e.is_dot_entry());
                    entries.retain(|e| {
                        if is_plain_name(e.name()) {
                            return true;
                        }
                        warn!("refusing listed name {:?} under {remote}", e.name());
                        report.record(join_remote(&remote, e.name()));
                        false
                    });
                    entries.sort_by(|a, b| a.name().cmp(b.name()));

                    let (dirs, files): (Vec<_>, Vec<_>) =
                        entries.into_iter().partition(|e| e.is_directory());
                    for e in files.into_iter().rev() {
                        pending.push(DownloadWork::File(
                            join_remote(&remote, e.name()),
                            local.join(e.name()),
                        ));
                    }
                    for e in dirs.into_iter().rev() {
                        pending.push(DownloadWork::Dir(
                            join_remote(&remote, e.name()),
                            local.join(e.name()),
                        ));
                    }
                }
            }
        }

        report.log_summary(&format!("download {remote_root} to {}", local_root.display()));
        Ok(report)
    }
}

/// Whether a listed name maps to exactly one entry inside its parent.
fn is_plain_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Queues one directory level so that subdirectories are walked first, in
/// name order, followed by the files.
fn push_upload_work(pending: &mut Vec<UploadWork>, entries: Vec<LocalEntry>, remote_dir: &str) {
    let (dirs, files): (Vec<_>, Vec<_>) = entries.into_iter().partition(|e| e.is_dir);
    for e in files.into_iter().rev() {
        pending.push(UploadWork::File(e.path, join_remote(remote_dir, &e.name)));
    }
    for e in dirs.into_iter().rev() {
        pending.push(UploadWork::Dir(e.path, join_remote(remote_dir, &e.name)));
    }
}
