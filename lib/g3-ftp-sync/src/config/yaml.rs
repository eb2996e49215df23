/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use humanize_rs::bytes::Bytes;
use yaml_rust::{Yaml, yaml};

use super::{FtpClientConfig, FtpControlConfig, FtpTransferConfig};
use crate::listing::FtpListingDialect;

fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

fn as_humanize_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(value) => {
            let v = value.parse::<Bytes>()?;
            Ok(v.size())
        }
        Yaml::Integer(value) => Ok(usize::try_from(*value)?),
        _ => Err(anyhow!(
            "yaml value type for humanize usize should be 'string' or 'integer'"
        )),
    }
}

fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(usize::from_str(s)?),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                if let Ok(u) = u64::from_str(value) {
                    Ok(Duration::from_secs(u))
                } else if let Ok(f) = f64::from_str(value) {
                    Duration::try_from_secs_f64(f).map_err(anyhow::Error::new)
                } else {
                    Err(anyhow!("invalid duration string"))
                }
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            if let Ok(u) = u64::try_from(*value) {
                Ok(Duration::from_secs(u))
            } else {
                Err(anyhow!("unsupported duration string"))
            }
        }
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' or 'integer'"
        )),
    }
}

fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid yaml string value for 'bool': {s}")),
        },
        Yaml::Boolean(value) => Ok(*value),
        _ => Err(anyhow!(
            "yaml value type for 'bool' should be 'boolean' or 'string'"
        )),
    }
}

fn as_listing_dialect(v: &Yaml) -> anyhow::Result<Option<FtpListingDialect>> {
    if let Yaml::String(s) = v {
        match normalize_key(s).as_str() {
            "auto" | "detect" => Ok(None),
            _ => FtpListingDialect::from_str(s)
                .map(Some)
                .map_err(|_| anyhow!("unsupported listing dialect {s}")),
        }
    } else {
        Err(anyhow!(
            "yaml value type for listing dialect should be 'string'"
        ))
    }
}

impl FtpControlConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = FtpControlConfig::default();
            foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                "max_line_len" | "max_line_length" => {
                    config.max_line_len = as_humanize_usize(v)
                        .context(format!("invalid humanize usize value for key {k}"))?;
                    Ok(())
                }
                "max_multi_lines" => {
                    config.max_multi_lines =
                        as_usize(v).context(format!("invalid usize value for key {k}"))?;
                    Ok(())
                }
                "command_timeout" => {
                    config.command_timeout = as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}

impl FtpTransferConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = FtpTransferConfig::default();
            foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                "list_max_line_len" | "list_max_line_length" => {
                    config.list_max_line_len = as_humanize_usize(v)
                        .context(format!("invalid humanize usize value for key {k}"))?;
                    Ok(())
                }
                "list_max_entries" => {
                    config.list_max_entries =
                        as_usize(v).context(format!("invalid usize value for key {k}"))?;
                    Ok(())
                }
                "list_all_timeout" => {
                    let timeout = as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    config.set_list_all_timeout(timeout);
                    Ok(())
                }
                "end_wait_timeout" => {
                    config.end_wait_timeout = as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}

impl FtpClientConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = FtpClientConfig::default();
            foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                "control" => {
                    config.control = FtpControlConfig::parse_yaml(v).context(format!(
                        "invalid ftp control connection config value for key {k}"
                    ))?;
                    Ok(())
                }
                "transfer" => {
                    config.transfer = FtpTransferConfig::parse_yaml(v).context(format!(
                        "invalid ftp transfer connection config value for key {k}"
                    ))?;
                    Ok(())
                }
                "connect_timeout" => {
                    config.connect_timeout = as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "greeting_timeout" => {
                    config.greeting_timeout = as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "always_try_epsv" => {
                    config.always_try_epsv =
                        as_bool(v).context(format!("invalid bool value for key {k}"))?;
                    Ok(())
                }
                "retry_delay" | "retry_interval" => {
                    config.retry_delay = as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "listing_dialect" | "list_dialect" => {
                    config.listing_dialect = as_listing_dialect(v)
                        .context(format!("invalid listing dialect value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml_rust::YamlLoader;

    macro_rules! yaml_doc {
        ($s:expr) => {
            YamlLoader::load_from_str($s).unwrap().remove(0)
        };
    }

    #[test]
    fn control_config_parse() {
        let yaml = yaml_doc!(
            r#"
                max-line-length: "2KB"
                max_multi_lines: 256
                command_timeout: "30s"
            "#
        );
        let config = FtpControlConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.max_line_len, 2000);
        assert_eq!(config.max_multi_lines, 256);
        assert_eq!(config.command_timeout, Duration::from_secs(30));

        let yaml = yaml_doc!("max_multi_lines: -1");
        assert!(FtpControlConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!("invalid_key: 1");
        assert!(FtpControlConfig::parse_yaml(&yaml).is_err());
    }

    #[test]
    fn transfer_config_parse() {
        let yaml = yaml_doc!(
            r#"
                list_max_line_len: "4KB"
                list_max_entries: 2048
                list_all_timeout: "5m"
                end_wait_timeout: "500ms"
            "#
        );
        let config = FtpTransferConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.list_max_line_len, 4000);
        assert_eq!(config.list_max_entries, 2048);
        assert_eq!(config.list_all_timeout(), Duration::from_secs(300));
        assert_eq!(config.end_wait_timeout, Duration::from_millis(500));

        let yaml = yaml_doc!("list_all_timeout: \"5x\"");
        assert!(FtpTransferConfig::parse_yaml(&yaml).is_err());
    }

    #[test]
    fn client_config_parse() {
        let yaml = yaml_doc!(
            r#"
                control:
                  command_timeout: "15s"
                transfer:
                  list_max_entries: 100
                connect_timeout: 10
                greeting_timeout: "5s"
                always_try_epsv: "off"
                retry_delay: "250ms"
                listing_dialect: unix
            "#
        );
        let config = FtpClientConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.control.command_timeout, Duration::from_secs(15));
        assert_eq!(config.transfer.list_max_entries, 100);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.greeting_timeout, Duration::from_secs(5));
        assert!(!config.always_try_epsv);
        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert_eq!(config.listing_dialect, Some(FtpListingDialect::UnixLong));

        let yaml = yaml_doc!("listing_dialect: auto");
        let config = FtpClientConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.listing_dialect, None);
    }

    #[test]
    fn client_config_parse_err() {
        let yaml = yaml_doc!("control: \"invalid\"");
        assert!(FtpClientConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!("listing_dialect: vms");
        assert!(FtpClientConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!("always_try_epsv: maybe");
        assert!(FtpClientConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!("retry_delay: \"-1s\"");
        assert!(FtpClientConfig::parse_yaml(&yaml).is_err());

        assert!(FtpClientConfig::parse_yaml(&Yaml::Integer(1)).is_err());
        assert!(FtpClientConfig::parse_yaml(&Yaml::Null).is_err());
    }
}
