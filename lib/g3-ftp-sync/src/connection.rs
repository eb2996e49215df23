/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// Opens the sockets used by one FTP request.
///
/// Data connections are always passive, so the provider only has to dial
/// out. The data connection goes to the peer of the last control
/// connection, which sidesteps servers announcing private addresses in
/// their PASV reply.
#[async_trait]
pub trait FtpConnectionProvider<S: AsyncRead + AsyncWrite>: Send {
    async fn new_control_connection(&mut self, host: &str, port: u16) -> io::Result<S>;
    async fn new_data_connection(&mut self, port: u16) -> io::Result<S>;
}

#[derive(Default)]
pub struct TcpConnectionProvider {
    remote_addr: Option<SocketAddr>,
}

#[async_trait]
impl FtpConnectionProvider<TcpStream> for TcpConnectionProvider {
    async fn new_control_connection(&mut self, host: &str, port: u16) -> io::Result<TcpStream> {
        let mut err = io::Error::new(io::ErrorKind::AddrNotAvailable, "no addr resolved");
        for addr in tokio::net::lookup_host((host, port)).await? {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    let _ = stream.set_nodelay(true);
                    self.remote_addr = Some(addr);
                    return Ok(stream);
                }
                Err(e) => err = e,
            }
        }

        Err(err)
    }

    async fn new_data_connection(&mut self, port: u16) -> io::Result<TcpStream> {
        match self.remote_addr {
            Some(addr) => TcpStream::connect(SocketAddr::new(addr.ip(), port)).await,
            None => Err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no resolved upstream addr found",
            )),
        }
    }
}
