/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS};
use url::{Host, Url};

use crate::FtpCredentials;
use crate::error::FtpRequestError;

const FTP_DEFAULT_PORT: u16 = 21;

const PATH_SEGMENT_PCT_ENCODING_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FtpMethod {
    Retrieve,
    Store,
    MakeDirectory,
    RemoveDirectory,
    DeleteFile,
    Rename,
    GetFileSize,
    GetDateModified,
    ListNames,
    ListDetailed,
}

impl FtpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FtpMethod::Retrieve => "RETR",
            FtpMethod::Store => "STOR",
            FtpMethod::MakeDirectory => "MKD",
            FtpMethod::RemoveDirectory => "RMD",
            FtpMethod::DeleteFile => "DELE",
            FtpMethod::Rename => "RENAME",
            FtpMethod::GetFileSize => "SIZE",
            FtpMethod::GetDateModified => "MDTM",
            FtpMethod::ListNames => "NLST",
            FtpMethod::ListDetailed => "LIST",
        }
    }

    /// Whether the method moves data over a separate data connection.
    pub fn has_data_transfer(&self) -> bool {
        matches!(
            self,
            FtpMethod::Retrieve | FtpMethod::Store | FtpMethod::ListNames | FtpMethod::ListDetailed
        )
    }
}

impl fmt::Display for FtpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved, authenticated FTP request.
///
/// Every request uses passive mode and binary transfer type, and opens its
/// own control connection.
#[derive(Clone, Debug)]
pub struct FtpRequest {
    url: Url,
    host: String,
    port: u16,
    path: String,
    method: FtpMethod,
    credentials: FtpCredentials,
    rename_to: Option<String>,
    content_offset: u64,
}

impl FtpRequest {
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The server side path, relative to the login directory unless it
    /// starts with `/`.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn method(&self) -> FtpMethod {
        self.method
    }

    #[inline]
    pub fn credentials(&self) -> &FtpCredentials {
        &self.credentials
    }

    #[inline]
    pub fn passive(&self) -> bool {
        true
    }

    #[inline]
    pub fn binary(&self) -> bool {
        true
    }

    #[inline]
    pub fn keep_alive(&self) -> bool {
        false
    }

    #[inline]
    pub fn rename_to(&self) -> Option<&str> {
        self.rename_to.as_deref()
    }

    #[inline]
    pub fn content_offset(&self) -> u64 {
        self.content_offset
    }

    /// Sets the rename target.
    ///
    /// A bare name is placed next to the source entry, an absolute path is
    /// used as is.
    pub fn with_rename_to(mut self, new_name: &str) -> Result<Self, FtpRequestError> {
        if new_name.is_empty() {
            return Err(FtpRequestError::InvalidPath(
                new_name.to_string(),
                "empty rename target",
            ));
        }
        if new_name.contains(['\r', '\n']) {
            return Err(FtpRequestError::InvalidPath(
                new_name.to_string(),
                "line break in rename target",
            ));
        }

        let target = if new_name.starts_with('/') {
            new_name.to_string()
        } else {
            match self.path.rsplit_once('/') {
                Some((parent, _)) => format!("{parent}/{new_name}"),
                None => new_name.to_string(),
            }
        };
        self.rename_to = Some(target);
        Ok(self)
    }

    pub fn with_content_offset(mut self, offset: u64) -> Self {
        self.content_offset = offset;
        self
    }
}

/// Builds requests for one set of credentials.
#[derive(Clone, Debug)]
pub struct FtpRequestFactory {
    credentials: FtpCredentials,
}

impl FtpRequestFactory {
    pub fn new(credentials: FtpCredentials) -> Self {
        FtpRequestFactory { credentials }
    }

    #[inline]
    pub fn credentials(&self) -> &FtpCredentials {
        &self.credentials
    }

    pub fn create(&self, target: &str, method: FtpMethod) -> Result<FtpRequest, FtpRequestError> {
        let url = Url::parse(target)
            .map_err(|_| FtpRequestError::InvalidPath(target.to_string(), "not a valid url"))?;
        if url.scheme() != "ftp" {
            return Err(FtpRequestError::InvalidPath(
                target.to_string(),
                "url scheme is not ftp",
            ));
        }

        let host = match url.host() {
            Some(Host::Ipv6(ip)) => ip.to_string(),
            Some(host) => host.to_string(),
            None => {
                return Err(FtpRequestError::InvalidPath(
                    target.to_string(),
                    "no host in url",
                ));
            }
        };
        let port = url.port_or_known_default().unwrap_or(FTP_DEFAULT_PORT);

        let path = decode_path(url.path())
            .ok_or_else(|| FtpRequestError::InvalidPath(target.to_string(), "invalid path"))?;

        Ok(FtpRequest {
            url,
            host,
            port,
            path,
            method,
            credentials: self.credentials.clone(),
            rename_to: None,
            content_offset: 0,
        })
    }
}

/// Maps an url path to the server path.
///
/// The leading `/` only separates the path from the authority, so `%2F`
/// is needed to address an absolute path.
fn decode_path(encoded: &str) -> Option<String> {
    let encoded = encoded.strip_prefix('/').unwrap_or(encoded);
    let decoded = percent_encoding::percent_decode_str(encoded)
        .decode_utf8()
        .ok()?;
    if decoded.contains(['\r', '\n', '\0']) {
        return None;
    }

    let path = decoded.as_ref();
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };
    Some(path.to_string())
}

/// Appends one entry name to a remote directory url.
pub(crate) fn join_remote(parent: &str, name: &str) -> String {
    let encoded = percent_encoding::utf8_percent_encode(name, PATH_SEGMENT_PCT_ENCODING_SET);
    format!("{}/{encoded}", parent.trim_end_matches('/'))
}
