/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

//! An in-memory FTP server for client tests.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use super::{FtpResponse, FtpStatus, FtpTransport};
use crate::control::FtpCommand;
use crate::error::{FtpCommandError, FtpTransportError};
use crate::request::{FtpMethod, FtpRequest};

#[derive(Default)]
struct MockState {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    failing: BTreeSet<String>,
    listings: BTreeMap<String, String>,
    commands: Vec<(FtpMethod, String)>,
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(p, _)| p).unwrap_or("")
}

fn name_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, n)| n).unwrap_or(path)
}

impl MockState {
    fn children(&self, dir: &str) -> (Vec<&str>, Vec<(&str, usize)>) {
        let dirs = self
            .dirs
            .iter()
            .filter(|d| !d.is_empty() && parent_of(d) == dir)
            .map(|d| name_of(d))
            .collect();
        let files = self
            .files
            .iter()
            .filter(|(f, _)| parent_of(f) == dir)
            .map(|(f, c)| (name_of(f), c.len()))
            .collect();
        (dirs, files)
    }
}

fn command_of(method: FtpMethod) -> FtpCommand {
    match method {
        FtpMethod::Retrieve => FtpCommand::RETR,
        FtpMethod::Store => FtpCommand::STOR,
        FtpMethod::MakeDirectory => FtpCommand::MKD,
        FtpMethod::RemoveDirectory => FtpCommand::RMD,
        FtpMethod::DeleteFile => FtpCommand::DELE,
        FtpMethod::Rename => FtpCommand::RNFR,
        FtpMethod::GetFileSize => FtpCommand::SIZE,
        FtpMethod::GetDateModified => FtpCommand::MDTM,
        FtpMethod::ListNames => FtpCommand::NLST,
        FtpMethod::ListDetailed => FtpCommand::LIST,
    }
}

fn refused(method: FtpMethod, code: u16, msg: &str) -> FtpTransportError {
    FtpCommandError::Refused(command_of(method), code, msg.to_string()).into()
}

pub(crate) fn mock_mtime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 2, 14, 10, 15, 0)
        .single()
        .unwrap_or_default()
}

/// Shared state behind cheap clones, so a test keeps a handle while the
/// client owns the transport.
#[derive(Clone)]
pub(crate) struct MockFtpServer {
    state: Arc<Mutex<MockState>>,
}

impl MockFtpServer {
    pub(crate) fn new() -> Self {
        let mut state = MockState::default();
        state.dirs.insert(String::new());
        MockFtpServer {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub(crate) fn add_dir(&self, path: &str) {
        self.state.lock().unwrap().dirs.insert(path.to_string());
    }

    pub(crate) fn add_file(&self, path: &str, content: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), content.to_vec());
    }

    /// Every request on `path` is refused from now on.
    pub(crate) fn fail_path(&self, path: &str) {
        self.state.lock().unwrap().failing.insert(path.to_string());
    }

    /// Serves `raw` as the detailed listing of `path`.
    pub(crate) fn set_listing(&self, path: &str, raw: &str) {
        self.state
            .lock()
            .unwrap()
            .listings
            .insert(path.to_string(), raw.to_string());
    }

    pub(crate) fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    pub(crate) fn has_dir(&self, path: &str) -> bool {
        self.state.lock().unwrap().dirs.contains(path)
    }

    pub(crate) fn count(&self, method: FtpMethod) -> usize {
        self.state
            .lock()
            .unwrap()
            .commands
            .iter()
            .filter(|(m, _)| *m == method)
            .count()
    }

    pub(crate) fn attempts(&self, method: FtpMethod, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .commands
            .iter()
            .filter(|(m, p)| *m == method && p == path)
            .count()
    }

    fn handle(&self, request: &FtpRequest) -> Result<MockResponse, FtpTransportError> {
        let mut state = self.state.lock().unwrap();
        let method = request.method();
        let path = request.path().to_string();
        state.commands.push((method, path.clone()));

        if state.failing.contains(&path) {
            return Err(refused(method, 451, "injected failure"));
        }

        let mut rsp = MockResponse::new(FtpStatus::new(250, "ok"));
        match method {
            FtpMethod::MakeDirectory => {
                if state.dirs.contains(&path) || !state.dirs.contains(parent_of(&path)) {
                    return Err(refused(method, 550, "cannot create"));
                }
                state.dirs.insert(path);
                rsp.status = FtpStatus::new(257, "created");
            }
            FtpMethod::RemoveDirectory => {
                let (dirs, files) = state.children(&path);
                if path.is_empty() || !dirs.is_empty() || !files.is_empty() {
                    return Err(refused(method, 550, "not empty"));
                }
                if !state.dirs.remove(&path) {
                    return Err(refused(method, 550, "no such directory"));
                }
            }
            FtpMethod::DeleteFile => {
                if state.files.remove(&path).is_none() {
                    return Err(refused(method, 550, "no such file"));
                }
            }
            FtpMethod::Rename => {
                let to = request
                    .rename_to()
                    .ok_or(FtpTransportError::MissingRenameTarget)?
                    .to_string();
                match state.files.remove(&path) {
                    Some(content) => {
                        state.files.insert(to, content);
                    }
                    None => return Err(refused(method, 550, "no such file")),
                }
            }
            FtpMethod::GetFileSize => match state.files.get(&path) {
                Some(content) => {
                    rsp.status = FtpStatus::new(213, &content.len().to_string());
                    rsp.content_length = Some(content.len() as u64);
                }
                None => return Err(refused(method, 550, "no such file")),
            },
            FtpMethod::GetDateModified => {
                if !state.files.contains_key(&path) {
                    return Err(refused(method, 550, "no such file"));
                }
                rsp.status = FtpStatus::new(213, "20230214101500");
                rsp.last_modified = Some(mock_mtime());
            }
            FtpMethod::Retrieve => match state.files.get(&path) {
                Some(content) => {
                    let offset = (request.content_offset() as usize).min(content.len());
                    let body = content[offset..].to_vec();
                    rsp.status = FtpStatus::new(150, "opening data connection");
                    rsp.content_length = Some(body.len() as u64);
                    rsp.stream = Some(MockStream::reader(body));
                }
                None => return Err(refused(method, 550, "no such file")),
            },
            FtpMethod::Store => {
                if !state.dirs.contains(parent_of(&path)) {
                    return Err(refused(method, 553, "no such directory"));
                }
                rsp.status = FtpStatus::new(150, "ok to send data");
                rsp.stream = Some(MockStream::writer());
                rsp.commit = Some((self.state.clone(), path, request.content_offset()));
            }
            FtpMethod::ListNames | FtpMethod::ListDetailed => {
                if !state.dirs.contains(&path) {
                    return Err(refused(method, 550, "no such directory"));
                }
                let (dirs, files) = state.children(&path);
                let mut text = String::new();
                let fixed = match method {
                    FtpMethod::ListDetailed => state.listings.get(&path),
                    _ => None,
                };
                if let Some(raw) = fixed {
                    text.push_str(raw);
                } else if method == FtpMethod::ListNames {
                    for name in dirs.iter().chain(files.iter().map(|(n, _)| n)) {
                        text.push_str(name);
                        text.push_str("\r\n");
                    }
                } else {
                    for name in [".", ".."].iter().chain(dirs.iter()) {
                        text.push_str(&format!(
                            "02-14-23  10:15AM       <DIR>          {name}\r\n"
                        ));
                    }
                    for (name, size) in files {
                        text.push_str(&format!("02-14-23  10:15AM {size:>20} {name}\r\n"));
                    }
                }
                rsp.status = FtpStatus::new(150, "here comes the listing");
                rsp.stream = Some(MockStream::reader(text.into_bytes()));
            }
        }
        Ok(rsp)
    }
}

#[async_trait]
impl FtpTransport for MockFtpServer {
    type Response = MockResponse;

    async fn execute(&mut self, request: &FtpRequest) -> Result<MockResponse, FtpTransportError> {
        self.handle(request)
    }
}

pub(crate) struct MockStream {
    reader: Cursor<Vec<u8>>,
    written: Vec<u8>,
}

impl MockStream {
    fn reader(content: Vec<u8>) -> Self {
        MockStream {
            reader: Cursor::new(content),
            written: Vec::new(),
        }
    }

    fn writer() -> Self {
        MockStream::reader(Vec::new())
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.reader).poll_read(cx, buf)
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.written).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.written).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.written).poll_shutdown(cx)
    }
}

pub(crate) struct MockResponse {
    status: FtpStatus,
    content_length: Option<u64>,
    last_modified: Option<DateTime<Utc>>,
    stream: Option<MockStream>,
    commit: Option<(Arc<Mutex<MockState>>, String, u64)>,
}

impl MockResponse {
    fn new(status: FtpStatus) -> Self {
        MockResponse {
            status,
            content_length: None,
            last_modified: None,
            stream: None,
            commit: None,
        }
    }
}

#[async_trait]
impl FtpResponse for MockResponse {
    type Stream = MockStream;

    fn status(&self) -> &FtpStatus {
        &self.status
    }

    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    fn stream(&mut self) -> Option<&mut MockStream> {
        self.stream.as_mut()
    }

    async fn close(self) -> Result<FtpStatus, FtpTransportError> {
        let Some(stream) = self.stream else {
            return Ok(self.status);
        };
        if let Some((state, path, offset)) = self.commit {
            let mut state = state.lock().unwrap();
            let mut content = state.files.remove(&path).unwrap_or_default();
            content.truncate(offset as usize);
            content.extend_from_slice(&stream.written);
            state.files.insert(path, content);
        }
        Ok(FtpStatus::new(226, "transfer complete"))
    }
}
