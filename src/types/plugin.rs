// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "signpost.dev", version = "v1", kind = "Plugin")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct PluginSpec {
    pub name: String,
    pub sub_command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    pub binaries: Vec<Binary>,
}

/// A downloadable build of a plugin for one platform
#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Binary {
    pub os: String,
    pub arch: String,
    pub url: String,
}

impl Plugin {
    /// Find the binary matching an OS/architecture pair
    pub fn binary_for(&self, os: &str, arch: &str) -> Option<&Binary> {
        self.spec
            .binaries
            .iter()
            .find(|b| b.os == os && b.arch == arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_plugin(binaries: Vec<Binary>) -> Plugin {
        Plugin::new(
            "signpost-admin",
            PluginSpec {
                name: "signpost-admin".to_string(),
                sub_command: "admin".to_string(),
                description: None,
                version: "0.0.1".to_string(),
                binaries,
            },
        )
    }

    #[test]
    fn test_binary_for_matches_os_and_arch() {
        let plugin = make_plugin(vec![
            Binary {
                os: "linux".to_string(),
                arch: "amd64".to_string(),
                url: "https://example.com/linux-amd64.tar.gz".to_string(),
            },
            Binary {
                os: "linux".to_string(),
                arch: "arm64".to_string(),
                url: "https://example.com/linux-arm64.tar.gz".to_string(),
            },
        ]);

        let binary = plugin.binary_for("linux", "arm64").unwrap();
        assert_eq!(binary.url, "https://example.com/linux-arm64.tar.gz");
        assert!(plugin.binary_for("windows", "amd64").is_none());
    }
}
