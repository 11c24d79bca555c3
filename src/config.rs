// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 60;

/// Helper configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace used when a command does not name one explicitly
    pub namespace: String,
    /// How long readiness waits block before giving up
    pub wait_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let namespace = env::var("SIGNPOST_NAMESPACE")
            .context("SIGNPOST_NAMESPACE environment variable not set")?;
        let wait_timeout_secs: u64 = env::var("SIGNPOST_WAIT_TIMEOUT_SECS")
            .unwrap_or(DEFAULT_WAIT_TIMEOUT_SECS.to_string())
            .parse()
            .unwrap_or(DEFAULT_WAIT_TIMEOUT_SECS);

        Ok(Config {
            namespace,
            wait_timeout: Duration::from_secs(wait_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env() {
        env::set_var("SIGNPOST_NAMESPACE", "staging");
        env::set_var("SIGNPOST_WAIT_TIMEOUT_SECS", "banana");
        let config = Config::from_env().unwrap();
        assert_eq!(config.namespace, "staging");
        // unparseable timeout falls back to the default
        assert_eq!(config.wait_timeout, Duration::from_secs(60));

        env::set_var("SIGNPOST_WAIT_TIMEOUT_SECS", "5");
        let config = Config::from_env().unwrap();
        assert_eq!(config.wait_timeout, Duration::from_secs(5));

        env::remove_var("SIGNPOST_NAMESPACE");
        env::remove_var("SIGNPOST_WAIT_TIMEOUT_SECS");
        assert!(Config::from_env().is_err());
    }
}
