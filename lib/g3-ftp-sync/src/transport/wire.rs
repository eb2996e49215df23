/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::{FtpResponse, FtpStatus, FtpTransport};
use crate::config::FtpClientConfig;
use crate::connection::{FtpConnectionProvider, TcpConnectionProvider};
use crate::control::{FtpCommand, FtpControlChannel};
use crate::debug::log_step;
use crate::error::{FtpCommandError, FtpConnectError, FtpTransportError};
use crate::request::{FtpMethod, FtpRequest};

/// Speaks FTP to a real server, one control connection per request.
pub struct FtpWireTransport<CP, S> {
    provider: CP,
    config: Arc<FtpClientConfig>,
    _stream: PhantomData<S>,
}

impl FtpWireTransport<TcpConnectionProvider, TcpStream> {
    pub fn tcp(config: Arc<FtpClientConfig>) -> Self {
        FtpWireTransport::new(TcpConnectionProvider::default(), config)
    }
}

impl<CP, S> FtpWireTransport<CP, S>
where
    CP: FtpConnectionProvider<S>,
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(provider: CP, config: Arc<FtpClientConfig>) -> Self {
        FtpWireTransport {
            provider,
            config,
            _stream: PhantomData,
        }
    }

    async fn open_session(
        &mut self,
        request: &FtpRequest,
    ) -> Result<FtpControlChannel<S>, FtpTransportError> {
        log_step("connect", &format!("{}:{}", request.host(), request.port()));
        let stream = match tokio::time::timeout(
            self.config.connect_timeout,
            self.provider
                .new_control_connection(request.host(), request.port()),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(FtpConnectError::ConnectIoError(e).into()),
            Err(_) => return Err(FtpConnectError::ConnectTimedOut.into()),
        };

        let mut control = FtpControlChannel::new(stream, self.config.control);
        match tokio::time::timeout(self.config.greeting_timeout, control.wait_greetings()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(FtpConnectError::from(e).into()),
            Err(_) => return Err(FtpConnectError::GreetingTimedOut.into()),
        }

        log_step("login", request.credentials().username().as_original());
        control.login(request.credentials()).await?;
        control.request_binary_type().await?;
        Ok(control)
    }

    async fn open_data_connection(
        &mut self,
        control: &mut FtpControlChannel<S>,
    ) -> Result<S, FtpTransportError> {
        let port = if self.config.always_try_epsv {
            match control.request_epsv_port().await {
                Ok(port) => port,
                Err(FtpCommandError::ServiceNotAvailable) => {
                    return Err(FtpCommandError::ServiceNotAvailable.into());
                }
                Err(e) => {
                    log_step("epsv", &format!("falling back to pasv: {e}"));
                    control.request_pasv_port().await?.port()
                }
            }
        } else {
            control.request_pasv_port().await?.port()
        };

        log_step("data connect", &port.to_string());
        match tokio::time::timeout(
            self.config.connect_timeout,
            self.provider.new_data_connection(port),
        )
        .await
        {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(FtpTransportError::DataConnectFailed(e)),
            Err(_) => Err(FtpTransportError::DataConnectTimedOut),
        }
    }

    async fn run_request(
        &mut self,
        control: &mut FtpControlChannel<S>,
        request: &FtpRequest,
    ) -> Result<WireReply<S>, FtpTransportError> {
        let path = request.path();
        let mut reply = WireReply::default();

        let data_cmd = match request.method() {
            FtpMethod::MakeDirectory => {
                reply.status = Some(control.make_dir(path).await?);
                return Ok(reply);
            }
            FtpMethod::RemoveDirectory => {
                reply.status = Some(control.remove_dir(path).await?);
                return Ok(reply);
            }
            FtpMethod::DeleteFile => {
                reply.status = Some(control.delete_file(path).await?);
                return Ok(reply);
            }
            FtpMethod::Rename => {
                let to = request
                    .rename_to()
                    .ok_or(FtpTransportError::MissingRenameTarget)?;
                reply.status = Some(control.rename(path, to).await?);
                return Ok(reply);
            }
            FtpMethod::GetFileSize => {
                let (status, size) = control.request_size(path).await?;
                reply.status = Some(status);
                reply.content_length = Some(size);
                return Ok(reply);
            }
            FtpMethod::GetDateModified => {
                let (status, mtime) = control.request_mtime(path).await?;
                reply.status = Some(status);
                reply.last_modified = Some(mtime);
                return Ok(reply);
            }
            FtpMethod::Retrieve => FtpCommand::RETR,
            FtpMethod::Store => FtpCommand::STOR,
            FtpMethod::ListNames => FtpCommand::NLST,
            FtpMethod::ListDetailed => FtpCommand::LIST,
        };

        let data = self.open_data_connection(control).await?;
        reply.data = Some(data);

        let offset = request.content_offset();
        if offset > 0 && matches!(data_cmd, FtpCommand::RETR | FtpCommand::STOR) {
            control.request_restart(offset).await?;
        }

        let (status, announced) = control.start_transfer(data_cmd, path).await?;
        reply.status = Some(status);
        reply.content_length = announced;
        reply.pending_end = Some(data_cmd);
        Ok(reply)
    }
}

struct WireReply<S> {
    status: Option<FtpStatus>,
    content_length: Option<u64>,
    last_modified: Option<DateTime<Utc>>,
    data: Option<S>,
    pending_end: Option<FtpCommand>,
}

impl<S> Default for WireReply<S> {
    fn default() -> Self {
        WireReply {
            status: None,
            content_length: None,
            last_modified: None,
            data: None,
            pending_end: None,
        }
    }
}

#[async_trait]
impl<CP, S> FtpTransport for FtpWireTransport<CP, S>
where
    CP: FtpConnectionProvider<S>,
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    type Response = FtpWireResponse<S>;

    async fn execute(&mut self, request: &FtpRequest) -> Result<Self::Response, FtpTransportError> {
        log_step(request.method().as_str(), request.url().as_str());
        let mut control = self.open_session(request).await?;

        match self.run_request(&mut control, request).await {
            Ok(reply) => {
                let status = reply
                    .status
                    .unwrap_or_else(|| FtpStatus::new(200, "command okay"));
                Ok(FtpWireResponse {
                    control,
                    status,
                    content_length: reply.content_length,
                    last_modified: reply.last_modified,
                    data: reply.data,
                    pending_end: reply.pending_end,
                    end_wait_timeout: self.config.transfer.end_wait_timeout,
                })
            }
            Err(e) => {
                let _ = control.send_quit().await;
                control.shutdown().await;
                Err(e)
            }
        }
    }
}

pub struct FtpWireResponse<S>
where
    S: AsyncRead + AsyncWrite,
{
    control: FtpControlChannel<S>,
    status: FtpStatus,
    content_length: Option<u64>,
    last_modified: Option<DateTime<Utc>>,
    data: Option<S>,
    pending_end: Option<FtpCommand>,
    end_wait_timeout: Duration,
}

#[async_trait]
impl<S> FtpResponse for FtpWireResponse<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    type Stream = S;

    fn status(&self) -> &FtpStatus {
        &self.status
    }

    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    fn stream(&mut self) -> Option<&mut S> {
        self.data.as_mut()
    }

    async fn close(self) -> Result<FtpStatus, FtpTransportError> {
        let FtpWireResponse {
            mut control,
            status,
            data,
            pending_end,
            end_wait_timeout,
            ..
        } = self;

        if let Some(mut data) = data {
            let _ = data.shutdown().await;
        }

        let mut result = Ok(status);
        if let Some(cmd) = pending_end {
            result = match tokio::time::timeout(end_wait_timeout, control.wait_transfer_end(cmd))
                .await
            {
                Ok(Ok(status)) => Ok(status),
                Ok(Err(e)) => Err(e.into()),
                Err(_) => Err(FtpTransportError::TimeoutToWaitEndReply),
            };
        }

        if let Err(e) = control.send_quit().await {
            log_step("quit", &e.to_string());
        }
        control.shutdown().await;
        result
    }
}
