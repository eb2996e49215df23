/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncSeekExt;
use tokio::net::TcpStream;

use crate::FtpCredentials;
use crate::config::FtpClientConfig;
use crate::connection::TcpConnectionProvider;
use crate::error::FtpRequestError;
use crate::listing::{self, FtpListingDialect, FtpListingEntry};
use crate::request::{FtpMethod, FtpRequest, FtpRequestFactory};
use crate::retry::{FtpRetryPolicy, retry_until, retry_until_some};
use crate::transfer::{FtpListingReader, TransferOutcome, transfer};
use crate::transport::{FtpResponse, FtpStatus, FtpTransport, FtpWireTransport};

/// A session bound to one set of credentials.
///
/// Every operation builds its own request and closes its own response, so
/// a client may be reused sequentially. Operations take `&mut self`; run
/// concurrent transfers on separate clients.
pub struct FtpClient<T: FtpTransport> {
    factory: FtpRequestFactory,
    transport: T,
    config: Arc<FtpClientConfig>,
}

impl FtpClient<FtpWireTransport<TcpConnectionProvider, TcpStream>> {
    /// A client talking to real servers over TCP.
    pub fn with_tcp(credentials: FtpCredentials, config: Arc<FtpClientConfig>) -> Self {
        let transport = FtpWireTransport::tcp(config.clone());
        FtpClient::new(credentials, transport, config)
    }
}

impl<T: FtpTransport> FtpClient<T> {
    pub fn new(credentials: FtpCredentials, transport: T, config: Arc<FtpClientConfig>) -> Self {
        FtpClient {
            factory: FtpRequestFactory::new(credentials),
            transport,
            config,
        }
    }

    #[inline]
    pub fn credentials(&self) -> &FtpCredentials {
        self.factory.credentials()
    }

    #[inline]
    pub fn config(&self) -> &FtpClientConfig {
        &self.config
    }

    pub(crate) fn retry_policy(&self) -> FtpRetryPolicy {
        FtpRetryPolicy::new(self.credentials().retries(), self.config.retry_delay)
    }

    pub(crate) fn create_request(
        &self,
        target: &str,
        method: FtpMethod,
    ) -> Result<FtpRequest, FtpRequestError> {
        self.factory.create(target, method)
    }

    /// Runs a request without data transfer and returns the final reply.
    async fn run_command(&mut self, request: &FtpRequest) -> Option<FtpStatus> {
        let rsp = match self.transport.execute(request).await {
            Ok(rsp) => rsp,
            Err(e) => {
                warn!("{} {} failed: {e}", request.method(), request.url());
                return None;
            }
        };
        match rsp.close().await {
            Ok(status) if status.is_positive() => Some(status),
            Ok(status) => {
                warn!("{} {} refused: {status}", request.method(), request.url());
                None
            }
            Err(e) => {
                warn!("{} {} failed: {e}", request.method(), request.url());
                None
            }
        }
    }

    async fn run_retried_command(&mut self, request: FtpRequest) -> bool {
        let policy = self.retry_policy();
        let label = format!("{} {}", request.method(), request.url());
        let ok = retry_until(policy, &label, async |_| {
            self.run_command(&request).await.is_some()
        })
        .await;
        if ok {
            info!("{label} succeeded");
        } else {
            warn!("{label} failed after {} attempts", policy.max_attempts());
        }
        ok
    }

    /// Closes a data transfer response, folding its final reply into
    /// `outcome`.
    async fn finish_transfer(
        request: &FtpRequest,
        rsp: T::Response,
        outcome: TransferOutcome,
    ) -> TransferOutcome {
        match rsp.close().await {
            Ok(status) if status.is_positive() => outcome,
            Ok(status) => {
                warn!("{} {} refused: {status}", request.method(), request.url());
                TransferOutcome::failed(outcome.bytes_transferred)
            }
            Err(e) => {
                warn!("{} {} failed: {e}", request.method(), request.url());
                TransferOutcome::failed(outcome.bytes_transferred)
            }
        }
    }

    async fn try_upload(&mut self, local: &Path, request: &FtpRequest) -> TransferOutcome {
        let mut file = match File::open(local).await {
            Ok(f) => f,
            Err(e) => {
                warn!("unable to open local file {}: {e}", local.display());
                return TransferOutcome::failed(0);
            }
        };
        let offset = request.content_offset();
        if offset > 0 {
            if let Err(e) = file.seek(SeekFrom::Start(offset)).await {
                warn!("unable to seek {} to {offset}: {e}", local.display());
                return TransferOutcome::failed(0);
            }
        }

        let mut rsp = match self.transport.execute(request).await {
            Ok(rsp) => rsp,
            Err(e) => {
                warn!("{} {} failed: {e}", request.method(), request.url());
                return TransferOutcome::failed(0);
            }
        };
        let outcome = match rsp.stream() {
            Some(stream) => transfer(&mut file, stream).await,
            None => TransferOutcome::failed(0),
        };
        Self::finish_transfer(request, rsp, outcome).await
    }

    async fn open_download_target(local: &Path, offset: u64) -> std::io::Result<File> {
        if offset == 0 {
            return File::create(local).await;
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(local)
            .await?;
        file.set_len(offset).await?;
        file.seek(SeekFrom::Start(offset)).await?;
        Ok(file)
    }

    async fn try_download(&mut self, request: &FtpRequest, local: &Path) -> TransferOutcome {
        let mut rsp = match self.transport.execute(request).await {
            Ok(rsp) => rsp,
            Err(e) => {
                warn!("{} {} failed: {e}", request.method(), request.url());
                return TransferOutcome::failed(0);
            }
        };

        // only touch the local copy once the server has accepted RETR
        let outcome = match Self::open_download_target(local, request.content_offset()).await {
            Ok(mut file) => match rsp.stream() {
                Some(stream) => transfer(stream, &mut file).await,
                None => TransferOutcome::failed(0),
            },
            Err(e) => {
                warn!("unable to open local file {}: {e}", local.display());
                TransferOutcome::failed(0)
            }
        };
        Self::finish_transfer(request, rsp, outcome).await
    }

    /// Fetches the raw text of a listing, once.
    pub(crate) async fn try_list(&mut self, request: &FtpRequest) -> Option<String> {
        let mut rsp = match self.transport.execute(request).await {
            Ok(rsp) => rsp,
            Err(e) => {
                warn!("{} {} failed: {e}", request.method(), request.url());
                return None;
            }
        };

        let transfer_config = self.config.transfer;
        let text = match rsp.stream() {
            Some(stream) => {
                let reader = FtpListingReader::new(stream, &transfer_config);
                match tokio::time::timeout(transfer_config.list_all_timeout(), reader.read_to_end())
                    .await
                {
                    Ok(Ok(text)) => Some(text),
                    Ok(Err(e)) => {
                        warn!("{} {} read failed: {e}", request.method(), request.url());
                        None
                    }
                    Err(_) => {
                        warn!("{} {} read timed out", request.method(), request.url());
                        None
                    }
                }
            }
            None => None,
        };

        match rsp.close().await {
            Ok(status) if status.is_positive() => text,
            Ok(status) => {
                warn!("{} {} refused: {status}", request.method(), request.url());
                None
            }
            Err(e) => {
                warn!("{} {} failed: {e}", request.method(), request.url());
                None
            }
        }
    }

    /// Runs `request` with retries until the response carries a value
    /// picked by `pick`.
    async fn query_with_retry<V, F>(&mut self, request: FtpRequest, pick: F) -> Option<V>
    where
        F: Fn(&T::Response) -> Option<V>,
    {
        let policy = self.retry_policy();
        let label = format!("{} {}", request.method(), request.url());
        let value = retry_until_some(policy, &label, async |_| {
            let rsp = match self.transport.execute(&request).await {
                Ok(rsp) => rsp,
                Err(e) => {
                    warn!("{label} failed: {e}");
                    return None;
                }
            };
            let value = pick(&rsp);
            match rsp.close().await {
                Ok(_) => value,
                Err(e) => {
                    warn!("{label} failed: {e}");
                    None
                }
            }
        })
        .await;
        if value.is_some() {
            info!("{label} succeeded");
        } else {
            warn!("{label} failed after {} attempts", policy.max_attempts());
        }
        value
    }

    async fn list_with_retry(&mut self, request: FtpRequest) -> Option<String> {
        let policy = self.retry_policy();
        let label = format!("{} {}", request.method(), request.url());
        let text = retry_until_some(policy, &label, async |_| self.try_list(&request).await).await;
        if text.is_some() {
            info!("{label} succeeded");
        } else {
            warn!("{label} failed after {} attempts", policy.max_attempts());
        }
        text
    }

    /// Uploads `local` to `remote`, resuming at `offset` when non-zero.
    pub async fn upload_file(
        &mut self,
        local: &Path,
        remote: &str,
        offset: u64,
    ) -> Result<TransferOutcome, FtpRequestError> {
        let request = self
            .create_request(remote, FtpMethod::Store)?
            .with_content_offset(offset);
        let policy = self.retry_policy();
        let label = format!("upload {} to {remote}", local.display());

        let mut outcome = TransferOutcome::default();
        retry_until(policy, &label, async |_| {
            outcome = self.try_upload(local, &request).await;
            outcome.success
        })
        .await;

        if outcome.success {
            info!("{label} succeeded, {} bytes", outcome.bytes_transferred);
        } else {
            warn!("{label} failed after {} attempts", policy.max_attempts());
        }
        Ok(outcome)
    }

    /// Downloads `remote` to `local`, resuming at `offset` when non-zero.
    ///
    /// The local file is truncated to `offset` before writing.
    pub async fn download_file(
        &mut self,
        remote: &str,
        local: &Path,
        offset: u64,
    ) -> Result<TransferOutcome, FtpRequestError> {
        let request = self
            .create_request(remote, FtpMethod::Retrieve)?
            .with_content_offset(offset);
        let policy = self.retry_policy();
        let label = format!("download {remote} to {}", local.display());

        let mut outcome = TransferOutcome::default();
        retry_until(policy, &label, async |_| {
            outcome = self.try_download(&request, local).await;
            outcome.success
        })
        .await;

        if outcome.success {
            info!("{label} succeeded, {} bytes", outcome.bytes_transferred);
        } else {
            warn!("{label} failed after {} attempts", policy.max_attempts());
        }
        Ok(outcome)
    }

    /// Renames `remote` to `new_name`, a bare name staying in the same
    /// directory.
    pub async fn rename(&mut self, remote: &str, new_name: &str) -> Result<bool, FtpRequestError> {
        let request = self
            .create_request(remote, FtpMethod::Rename)?
            .with_rename_to(new_name)?;
        Ok(self.run_retried_command(request).await)
    }

    /// Fails when the directory already exists, which callers may ignore.
    pub async fn create_dir(&mut self, remote: &str) -> Result<bool, FtpRequestError> {
        let request = self.create_request(remote, FtpMethod::MakeDirectory)?;
        Ok(self.run_retried_command(request).await)
    }

    pub async fn delete_dir(&mut self, remote: &str) -> Result<bool, FtpRequestError> {
        let request = self.create_request(remote, FtpMethod::RemoveDirectory)?;
        Ok(self.run_retried_command(request).await)
    }

    pub async fn delete_file(&mut self, remote: &str) -> Result<bool, FtpRequestError> {
        let request = self.create_request(remote, FtpMethod::DeleteFile)?;
        Ok(self.run_retried_command(request).await)
    }

    /// `None` when the size stays unknown after every attempt.
    pub async fn get_file_size(&mut self, remote: &str) -> Result<Option<u64>, FtpRequestError> {
        let request = self.create_request(remote, FtpMethod::GetFileSize)?;
        Ok(self
            .query_with_retry(request, |rsp| rsp.content_length())
            .await)
    }

    pub async fn get_date_modified(
        &mut self,
        remote: &str,
    ) -> Result<Option<DateTime<Utc>>, FtpRequestError> {
        let request = self.create_request(remote, FtpMethod::GetDateModified)?;
        Ok(self
            .query_with_retry(request, |rsp| rsp.last_modified())
            .await)
    }

    pub async fn get_dir_list(
        &mut self,
        remote: &str,
    ) -> Result<Option<Vec<String>>, FtpRequestError> {
        let request = self.create_request(remote, FtpMethod::ListNames)?;
        let text = self.list_with_retry(request).await;
        Ok(text.map(|t| listing::parse_names(&t)))
    }

    /// Parses with the configured dialect, or the detected one.
    pub async fn get_detailed_dir_list(
        &mut self,
        remote: &str,
    ) -> Result<Option<Vec<FtpListingEntry>>, FtpRequestError> {
        let request = self.create_request(remote, FtpMethod::ListDetailed)?;
        let text = self.list_with_retry(request).await;
        Ok(text.map(|t| {
            let dialect = self
                .config
                .listing_dialect
                .or_else(|| FtpListingDialect::detect(&t))
                .unwrap_or(FtpListingDialect::ClassicColumn);
            listing::parse_detailed(&t, dialect)
        }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::Duration;

    use crate::transport::mock::{MockFtpServer, mock_mtime};

    pub(crate) fn mock_client(retries: usize) -> (FtpClient<MockFtpServer>, MockFtpServer) {
        let server = MockFtpServer::new();
        let credentials = FtpCredentials::new("deploy", "s3cret", retries).unwrap();
        let config = FtpClientConfig {
            retry_delay: Duration::ZERO,
            ..Default::default()
        };
        let client = FtpClient::new(credentials, server.clone(), Arc::new(config));
        (client, server)
    }

    #[tokio::test]
    async fn rename_once() {
        let (mut client, server) = mock_client(3);
        server.add_file("old.txt", b"content");

        assert!(client.rename("ftp://h/old.txt", "new.txt").await.unwrap());
        assert_eq!(server.count(FtpMethod::Rename), 1);
        assert_eq!(server.file("new.txt").unwrap(), b"content");
        assert!(server.file("old.txt").is_none());
    }

    #[tokio::test]
    async fn size_unknown_after_all_attempts() {
        let (mut client, server) = mock_client(3);

        let size = client.get_file_size("ftp://h/missing.bin").await.unwrap();
        assert_eq!(size, None);
        assert_eq!(server.attempts(FtpMethod::GetFileSize, "missing.bin"), 4);
    }

    #[tokio::test]
    async fn size_and_mtime() {
        let (mut client, server) = mock_client(0);
        server.add_file("a.bin", &[0u8; 1234]);

        let size = client.get_file_size("ftp://h/a.bin").await.unwrap();
        assert_eq!(size, Some(1234));
        let mtime = client.get_date_modified("ftp://h/a.bin").await.unwrap();
        assert_eq!(mtime, Some(mock_mtime()));
    }

    #[tokio::test]
    async fn invalid_scheme_is_not_retried() {
        let (mut client, server) = mock_client(3);

        let r = client.delete_file("http://h/a.txt").await;
        assert!(matches!(r, Err(FtpRequestError::InvalidPath(_, _))));
        assert_eq!(server.count(FtpMethod::DeleteFile), 0);

        let tmp = tempfile::tempdir().unwrap();
        let r = client
            .upload_file(&tmp.path().join("a.txt"), "sftp://h/a.txt", 0)
            .await;
        assert!(r.is_err());
    }

    #[tokio::test]
    async fn upload_and_resume() {
        let (mut client, server) = mock_client(1);
        let tmp = tempfile::tempdir().unwrap();
        let local = tmp.path().join("artifact.bin");
        tokio::fs::write(&local, b"0123456789").await.unwrap();

        let outcome = client
            .upload_file(&local, "ftp://h/artifact.bin", 0)
            .await
            .unwrap();
        assert_eq!(outcome, TransferOutcome::succeeded(10));
        assert_eq!(server.file("artifact.bin").unwrap(), b"0123456789");

        server.add_file("artifact.bin", b"0123");
        let outcome = client
            .upload_file(&local, "ftp://h/artifact.bin", 4)
            .await
            .unwrap();
        assert_eq!(outcome, TransferOutcome::succeeded(6));
        assert_eq!(server.file("artifact.bin").unwrap(), b"0123456789");
    }

    #[tokio::test]
    async fn upload_missing_local_file() {
        let (mut client, server) = mock_client(2);
        let tmp = tempfile::tempdir().unwrap();

        let outcome = client
            .upload_file(&tmp.path().join("missing"), "ftp://h/missing", 0)
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(server.count(FtpMethod::Store), 0);
    }

    #[tokio::test]
    async fn upload_into_missing_dir() {
        let (mut client, server) = mock_client(2);
        let tmp = tempfile::tempdir().unwrap();
        let local = tmp.path().join("a.txt");
        tokio::fs::write(&local, b"a").await.unwrap();

        let outcome = client
            .upload_file(&local, "ftp://h/nowhere/a.txt", 0)
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(server.count(FtpMethod::Store), 3);
    }

    #[tokio::test]
    async fn download_and_resume() {
        let (mut client, server) = mock_client(0);
        server.add_file("a.txt", b"hello world");
        let tmp = tempfile::tempdir().unwrap();
        let local = tmp.path().join("a.txt");

        let outcome = client
            .download_file("ftp://h/a.txt", &local, 0)
            .await
            .unwrap();
        assert_eq!(outcome, TransferOutcome::succeeded(11));
        assert_eq!(tokio::fs::read(&local).await.unwrap(), b"hello world");

        tokio::fs::write(&local, b"hello XXXXXXXX").await.unwrap();
        let outcome = client
            .download_file("ftp://h/a.txt", &local, 6)
            .await
            .unwrap();
        assert_eq!(outcome, TransferOutcome::succeeded(5));
        assert_eq!(tokio::fs::read(&local).await.unwrap(), b"hello world");

        let outcome = client
            .download_file("ftp://h/missing.txt", &tmp.path().join("missing.txt"), 0)
            .await
            .unwrap();
        assert!(!outcome.success);
        assert!(!tmp.path().join("missing.txt").exists());
    }

    #[tokio::test]
    async fn refused_download_keeps_local_copy() {
        let (mut client, server) = mock_client(1);
        server.add_file("a.txt", b"remote");
        server.fail_path("a.txt");
        let tmp = tempfile::tempdir().unwrap();
        let local = tmp.path().join("a.txt");
        tokio::fs::write(&local, b"good local copy").await.unwrap();

        let outcome = client
            .download_file("ftp://h/a.txt", &local, 0)
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(server.attempts(FtpMethod::Retrieve, "a.txt"), 2);
        assert_eq!(tokio::fs::read(&local).await.unwrap(), b"good local copy");
    }

    #[tokio::test]
    async fn mtime_unknown_after_all_attempts() {
        let (mut client, server) = mock_client(2);

        let mtime = client
            .get_date_modified("ftp://h/missing.bin")
            .await
            .unwrap();
        assert_eq!(mtime, None);
        assert_eq!(
            server.attempts(FtpMethod::GetDateModified, "missing.bin"),
            3
        );
    }

    #[tokio::test]
    async fn directories() {
        let (mut client, server) = mock_client(1);

        assert!(client.create_dir("ftp://h/dest").await.unwrap());
        assert!(server.has_dir("dest"));
        // already exists
        assert!(!client.create_dir("ftp://h/dest").await.unwrap());
        assert_eq!(server.count(FtpMethod::MakeDirectory), 3);

        server.add_file("dest/a.txt", b"a");
        assert!(!client.delete_dir("ftp://h/dest").await.unwrap());
        assert!(client.delete_file("ftp://h/dest/a.txt").await.unwrap());
        assert!(client.delete_dir("ftp://h/dest/").await.unwrap());
        assert!(!server.has_dir("dest"));
    }

    #[tokio::test]
    async fn listings() {
        let (mut client, server) = mock_client(0);
        server.add_dir("dest");
        server.add_dir("dest/sub");
        server.add_file("dest/a.txt", b"12345");

        let names = client.get_dir_list("ftp://h/dest").await.unwrap().unwrap();
        assert_eq!(names, vec!["sub".to_string(), "a.txt".to_string()]);

        let entries = client
            .get_detailed_dir_list("ftp://h/dest")
            .await
            .unwrap()
            .unwrap();
        let summary: Vec<(&str, bool)> = entries
            .iter()
            .map(|e| (e.name(), e.is_directory()))
            .collect();
        assert_eq!(
            summary,
            vec![(".", true), ("..", true), ("sub", true), ("a.txt", false)]
        );
        assert_eq!(entries[3].raw_tokens()[2], "5");

        server.add_dir("empty");
        let names = client.get_dir_list("ftp://h/empty").await.unwrap();
        assert_eq!(names, Some(Vec::new()));
        assert_eq!(client.get_dir_list("ftp://h/nowhere").await.unwrap(), None);
    }
}
