/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use log::Level;

pub const FTP_DEBUG_LOG_LEVEL: Level = Level::Debug;
pub const FTP_DEBUG_LOG_TARGET: &str = "g3_ftp_sync::wire";

#[cfg(feature = "log-raw-io")]
#[inline]
pub(crate) fn log_cmd(cmd: &str) {
    log::log!(
        target: FTP_DEBUG_LOG_TARGET,
        FTP_DEBUG_LOG_LEVEL,
        "> {}",
        cmd
    );
}

#[cfg(feature = "log-raw-io")]
pub(crate) fn log_cmd1(cmd: &str, param: &str) {
    if cmd == "PASS" {
        log_cmd("PASS ***");
    } else {
        log::log!(
            target: FTP_DEBUG_LOG_TARGET,
            FTP_DEBUG_LOG_LEVEL,
            "> {} {}",
            cmd,
            param
        );
    }
}

#[cfg(feature = "log-raw-io")]
#[inline]
pub(crate) fn log_rsp(rsp: &str) {
    log::log!(
        target: FTP_DEBUG_LOG_TARGET,
        FTP_DEBUG_LOG_LEVEL,
        "< {}",
        rsp
    );
}

/// Logs one protocol step of the wire transport.
pub(crate) fn log_step(stage: &str, detail: &str) {
    log::log!(
        target: FTP_DEBUG_LOG_TARGET,
        FTP_DEBUG_LOG_LEVEL,
        "{stage}: {detail}"
    );
}
