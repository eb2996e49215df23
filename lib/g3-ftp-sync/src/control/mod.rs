/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};

use crate::FtpCredentials;
use crate::config::FtpControlConfig;
use crate::error::{FtpAuthStatus, FtpCommandError, FtpSessionOpenError, FtpTransferServerError};
use crate::transport::FtpStatus;

mod response;
use response::FtpRawResponse;

mod command;
pub(crate) use command::FtpCommand;

pub(crate) mod time_val;

pub(crate) struct FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite,
{
    config: FtpControlConfig,
    stream: BufStream<T>,
}

fn negative_reply_error(cmd: FtpCommand, reply: &FtpRawResponse) -> FtpCommandError {
    match reply.code() {
        421 => FtpCommandError::ServiceNotAvailable,
        500 | 501 => FtpCommandError::RejectedCommandSyntax(cmd),
        502 => FtpCommandError::CommandNotImplemented(cmd),
        503 => FtpCommandError::BadCommandSequence(cmd),
        504 => FtpCommandError::ParameterNotImplemented(cmd),
        530 => FtpCommandError::NotLoggedIn,
        n => FtpCommandError::Refused(cmd, n, reply.message().to_string()),
    }
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: T, config: FtpControlConfig) -> Self {
        FtpControlChannel {
            config,
            stream: BufStream::new(stream),
        }
    }

    /// Sends `cmd` and waits for one of the `expected` reply codes.
    async fn run_command(
        &mut self,
        cmd: FtpCommand,
        param: Option<&str>,
        stage: &'static str,
        expected: &[u16],
    ) -> Result<FtpRawResponse, FtpCommandError> {
        let sent = match param {
            Some(p) => self.send_cmd1(cmd, p).await,
            None => self.send_cmd(cmd).await,
        };
        sent.map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response(stage).await?;
        if expected.contains(&reply.code()) {
            Ok(reply)
        } else {
            Err(negative_reply_error(cmd, &reply))
        }
    }

    pub(crate) async fn wait_greetings(&mut self) -> Result<(), FtpCommandError> {
        loop {
            let reply = self.read_raw_response().await?;
            return match reply.code() {
                120 => continue,
                220 => Ok(()),
                _ => Err(negative_reply_error(FtpCommand::GREETING, &reply)),
            };
        }
    }

    async fn send_username(
        &mut self,
        credentials: &FtpCredentials,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::USER;
        self.send_cmd1(cmd, credentials.username().as_original())
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("send username").await?;
        match reply.code() {
            530 => Ok(FtpAuthStatus::Rejected),
            230 => Ok(FtpAuthStatus::Accepted),
            331 => Ok(FtpAuthStatus::PasswordRequired),
            332 => Ok(FtpAuthStatus::AccountRequired),
            _ => Err(negative_reply_error(cmd, &reply)),
        }
    }

    async fn send_password(
        &mut self,
        credentials: &FtpCredentials,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::PASS;
        self.send_cmd1(cmd, credentials.password().as_original())
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("send password").await?;
        match reply.code() {
            530 => Ok(FtpAuthStatus::Rejected),
            202 | 230 => Ok(FtpAuthStatus::Accepted),
            332 => Ok(FtpAuthStatus::AccountRequired),
            _ => Err(negative_reply_error(cmd, &reply)),
        }
    }

    pub(crate) async fn login(
        &mut self,
        credentials: &FtpCredentials,
    ) -> Result<(), FtpSessionOpenError> {
        let username = credentials.username().as_original();
        let to_session_error = |e| FtpSessionOpenError::from_command(e, username);
        let status = match self.send_username(credentials).await {
            Ok(FtpAuthStatus::PasswordRequired) => self
                .send_password(credentials)
                .await
                .map_err(to_session_error)?,
            Ok(s) => s,
            Err(e) => return Err(to_session_error(e)),
        };
        match status {
            FtpAuthStatus::Accepted => Ok(()),
            FtpAuthStatus::AccountRequired => Err(FtpSessionOpenError::AccountRequired),
            FtpAuthStatus::Rejected | FtpAuthStatus::PasswordRequired => Err(
                FtpSessionOpenError::CredentialsRejected(username.to_string()),
            ),
        }
    }

    pub(crate) async fn request_binary_type(&mut self) -> Result<(), FtpCommandError> {
        self.run_command(FtpCommand::TYPE_I, None, "request binary type", &[200])
            .await?;
        Ok(())
    }

    pub(crate) async fn request_pasv_port(&mut self) -> Result<SocketAddr, FtpCommandError> {
        let cmd = FtpCommand::PASV;
        let reply = self
            .run_command(cmd, None, "request pasv port", &[227])
            .await?;
        reply
            .parse_pasv_227_reply()
            .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 227))
    }

    pub(crate) async fn request_epsv_port(&mut self) -> Result<u16, FtpCommandError> {
        let cmd = FtpCommand::EPSV;
        let reply = self
            .run_command(cmd, None, "request epsv port", &[229])
            .await?;
        reply
            .parse_epsv_229_reply()
            .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 229))
    }

    pub(crate) async fn request_restart(&mut self, position: u64) -> Result<(), FtpCommandError> {
        self.run_command(
            FtpCommand::REST,
            Some(&position.to_string()),
            "request restart",
            &[350],
        )
        .await?;
        Ok(())
    }

    pub(crate) async fn make_dir(&mut self, path: &str) -> Result<FtpStatus, FtpCommandError> {
        let reply = self
            .run_command(FtpCommand::MKD, Some(path), "make dir", &[257])
            .await?;
        Ok(reply.to_status())
    }

    pub(crate) async fn remove_dir(&mut self, path: &str) -> Result<FtpStatus, FtpCommandError> {
        let reply = self
            .run_command(FtpCommand::RMD, Some(path), "remove dir", &[250])
            .await?;
        Ok(reply.to_status())
    }

    pub(crate) async fn delete_file(&mut self, path: &str) -> Result<FtpStatus, FtpCommandError> {
        let reply = self
            .run_command(FtpCommand::DELE, Some(path), "delete file", &[250])
            .await?;
        Ok(reply.to_status())
    }

    pub(crate) async fn rename(
        &mut self,
        from: &str,
        to: &str,
    ) -> Result<FtpStatus, FtpCommandError> {
        self.run_command(FtpCommand::RNFR, Some(from), "rename from", &[350])
            .await?;
        let reply = self
            .run_command(FtpCommand::RNTO, Some(to), "rename to", &[250])
            .await?;
        Ok(reply.to_status())
    }

    pub(crate) async fn request_size(
        &mut self,
        path: &str,
    ) -> Result<(FtpStatus, u64), FtpCommandError> {
        let cmd = FtpCommand::SIZE;
        let reply = self
            .run_command(cmd, Some(path), "request size", &[213])
            .await?;
        let size = reply
            .line_trimmed()
            .and_then(|s| u64::from_str(s).ok())
            .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 213))?;
        Ok((reply.to_status(), size))
    }

    pub(crate) async fn request_mtime(
        &mut self,
        path: &str,
    ) -> Result<(FtpStatus, DateTime<Utc>), FtpCommandError> {
        let cmd = FtpCommand::MDTM;
        let reply = self
            .run_command(cmd, Some(path), "request mtime", &[213])
            .await?;
        let mtime = reply
            .line_trimmed()
            .and_then(|s| time_val::parse_from_str(s).ok())
            .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 213))?;
        Ok((reply.to_status(), mtime))
    }

    /// Sends a data verb and waits for the preliminary reply.
    ///
    /// Returns the reply and the byte count announced in it, if any.
    pub(crate) async fn start_transfer(
        &mut self,
        cmd: FtpCommand,
        path: &str,
    ) -> Result<(FtpStatus, Option<u64>), FtpCommandError> {
        let param = if path.is_empty() { None } else { Some(path) };
        let reply = self
            .run_command(cmd, param, "start transfer", &[125, 150])
            .await?;
        Ok((reply.to_status(), reply.parse_150_byte_count()))
    }

    /// Waits for the completion reply of a data verb, without timeout.
    pub(crate) async fn wait_transfer_end(
        &mut self,
        cmd: FtpCommand,
    ) -> Result<FtpStatus, FtpTransferServerError> {
        let reply = self.read_raw_response().await?;
        match reply.code() {
            110 => Err(FtpTransferServerError::RestartNeeded),
            226 | 250 => Ok(reply.to_status()),
            425 => Err(FtpTransferServerError::DataTransferNotEstablished),
            426 => Err(FtpTransferServerError::DataTransferLost),
            451 => Err(FtpTransferServerError::ServerFailed),
            450 | 550 => Err(FtpTransferServerError::FileUnavailable),
            551 => Err(FtpTransferServerError::PageTypeUnknown),
            552 => Err(FtpTransferServerError::ExceededStorageAllocation),
            n => Err(FtpTransferServerError::UnexpectedEndReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn send_quit(&mut self) -> Result<(), FtpCommandError> {
        self.run_command(FtpCommand::QUIT, None, "send quit", &[221])
            .await?;
        Ok(())
    }

    pub(crate) async fn shutdown(&mut self) {
        let _ = self.stream.shutdown().await;
    }
}
