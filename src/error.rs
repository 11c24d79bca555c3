// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::api::core::v1::Service;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignpostError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("failed to list services in namespace {namespace}: {source}")]
    ListServices {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to find service {name} in namespace {namespace}: {source}")]
    GetService {
        name: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("service {0} not found")]
    ServiceNotFound(String),

    #[error("ingress for service {name} in namespace {namespace} is unavailable: {source}")]
    IngressUnavailable {
        name: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("watch failed: {0}")]
    Watch(#[from] kube_runtime::watcher::Error),

    #[error("service {0} never became ready")]
    NeverReady(String),

    /// First failure of a batch annotation update. `updated` holds the
    /// services that were written before the failure; they are not rolled back.
    #[error("failed to update service {name} in namespace {namespace}: {source}")]
    UpdateService {
        name: String,
        namespace: String,
        #[source]
        source: kube::Error,
        updated: Vec<Service>,
    },

    #[error("invalid external URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

pub type Result<T> = std::result::Result<T, SignpostError>;
