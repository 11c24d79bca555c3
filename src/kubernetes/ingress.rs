// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Ingress lookup and URL derivation

use crate::error::{Result, SignpostError};
use k8s_openapi::api::networking::v1::Ingress;
use kube::{Api, Client};
use tracing::{debug, instrument};

/// Find the URL for the ingress with the given name. A missing ingress is a
/// soft miss (`None`); any other lookup failure surfaces as
/// [`SignpostError::IngressUnavailable`].
#[instrument(skip(client))]
pub async fn find_ingress_url(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<Option<String>> {
    debug!("Finding ingress URL for {} in namespace {}", name, namespace);
    let ingresses: Api<Ingress> = Api::namespaced(client.clone(), namespace);
    match ingresses.get(name).await {
        Ok(ing) => Ok(ingress_url(&ing)),
        Err(kube::Error::Api(err)) if err.code == 404 => {
            debug!("No ingress named {} in namespace {}", name, namespace);
            Ok(None)
        }
        Err(e) => Err(SignpostError::IngressUnavailable {
            name: name.to_string(),
            namespace: namespace.to_string(),
            source: e,
        }),
    }
}

/// URL for an ingress: `https://` in front of the preferred TLS host, else
/// `http://` in front of the first rule's host.
pub fn ingress_url(ing: &Ingress) -> Option<String> {
    resolve_host(ing).map(|(host, tls)| {
        if tls {
            format!("https://{}", host)
        } else {
            format!("http://{}", host)
        }
    })
}

/// Host for an ingress, preferring a non-empty TLS host over the first
/// rule's host.
pub fn ingress_host(ing: &Ingress) -> Option<&str> {
    resolve_host(ing).map(|(host, _)| host)
}

// Ingresses without rules resolve to nothing, even when TLS entries exist.
fn resolve_host(ing: &Ingress) -> Option<(&str, bool)> {
    let spec = ing.spec.as_ref()?;
    let rule = spec.rules.as_deref().unwrap_or(&[]).first()?;

    for tls in spec.tls.as_deref().unwrap_or(&[]) {
        for host in tls.hosts.as_deref().unwrap_or(&[]) {
            if !host.is_empty() {
                return Some((host, true));
            }
        }
    }
    match rule.host.as_deref() {
        Some(host) if !host.is_empty() => Some((host, false)),
        _ => None,
    }
}
