// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Version-pinned metadata for the companion CLI plugins

use crate::types::plugin::{Binary, Plugin, PluginSpec};

/// The version of the admin plugin
pub const ADMIN_VERSION: &str = "0.0.39";

/// The version of the application plugin
pub const APPLICATION_VERSION: &str = "0.0.6";

/// The version of the gitops plugin
pub const GITOPS_VERSION: &str = "0.0.54";

/// The version of the pipeline plugin
pub const PIPELINE_VERSION: &str = "0.0.2";

/// The version of the project plugin
pub const PROJECT_VERSION: &str = "0.0.27";

/// The version of the promote plugin
pub const PROMOTE_VERSION: &str = "0.0.54";

/// The version of the secret plugin
pub const SECRET_VERSION: &str = "0.0.36";

/// The version of the verify plugin
pub const VERIFY_VERSION: &str = "0.0.8";

const DOWNLOAD_PLATFORMS: &[(&str, &str)] = &[
    ("linux", "amd64"),
    ("linux", "arm64"),
    ("darwin", "amd64"),
    ("darwin", "arm64"),
    ("windows", "amd64"),
];

/// The default plugin table, one entry per companion subcommand
pub fn default_plugins() -> Vec<Plugin> {
    vec![
        create_plugin("admin", ADMIN_VERSION),
        create_plugin("application", APPLICATION_VERSION),
        create_plugin("gitops", GITOPS_VERSION),
        create_plugin("pipeline", PIPELINE_VERSION),
        create_plugin("project", PROJECT_VERSION),
        create_plugin("promote", PROMOTE_VERSION),
        create_plugin("secret", SECRET_VERSION),
        create_plugin("verify", VERIFY_VERSION),
    ]
}

/// Build the Plugin resource for a subcommand at a pinned version, with
/// release binaries for every supported platform.
pub fn create_plugin(name: &str, version: &str) -> Plugin {
    let binaries = DOWNLOAD_PLATFORMS
        .iter()
        .map(|&(os, arch)| Binary {
            os: os.to_string(),
            arch: arch.to_string(),
            url: download_url(name, version, os, arch),
        })
        .collect();

    Plugin::new(
        &format!("signpost-{}", name),
        PluginSpec {
            name: format!("signpost-{}", name),
            sub_command: name.to_string(),
            description: Some(format!("Signpost {} plugin", name)),
            version: version.to_string(),
            binaries,
        },
    )
}

fn download_url(name: &str, version: &str, os: &str, arch: &str) -> String {
    let extension = if os == "windows" { "zip" } else { "tar.gz" };
    format!(
        "https://github.com/signpost-dev/signpost-{name}/releases/download/v{version}/signpost-{name}-{os}-{arch}.{extension}",
    )
}
