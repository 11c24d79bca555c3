// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Timeout-bounded readiness waiting over a scoped service watch

use crate::error::{Result, SignpostError};
use crate::kubernetes::services::has_external_address;
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::Service;
use kube::runtime::WatchStreamExt;
use kube::{Api, Client, ResourceExt};
use kube_runtime::watcher;
use std::time::Duration;
use tracing::{debug, instrument};

/// Wait until the named service exists, or the timeout elapses.
#[instrument(skip(client))]
pub async fn wait_for_service(
    client: &Client,
    name: &str,
    namespace: &str,
    timeout: Duration,
) -> Result<Service> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    let stream = watcher::watcher(services, watch_config(name)).applied_objects();
    wait_on_stream(stream, name, timeout, |svc| svc.name_any() == name).await
}

/// Wait until the named service gains an external load balancer address,
/// or the timeout elapses.
#[instrument(skip(client))]
pub async fn wait_for_external_ip(
    client: &Client,
    name: &str,
    namespace: &str,
    timeout: Duration,
) -> Result<Service> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    let stream = watcher::watcher(services, watch_config(name)).applied_objects();
    wait_on_stream(stream, name, timeout, has_external_address).await
}

fn watch_config(name: &str) -> watcher::Config {
    watcher::Config::default().fields(&format!("metadata.name={}", name))
}

/// Drive a watch stream until an observed service satisfies the condition.
/// Watch errors propagate unchanged; hitting the timeout (or the stream
/// ending early) reports the service as never ready. The stream is dropped,
/// and the watch released, on every exit path.
async fn wait_on_stream<S>(
    stream: S,
    name: &str,
    timeout: Duration,
    mut condition: impl FnMut(&Service) -> bool,
) -> Result<Service>
where
    S: Stream<Item = std::result::Result<Service, watcher::Error>>,
{
    tokio::pin!(stream);
    let wait = async {
        while let Some(event) = stream.next().await {
            let svc = event?;
            debug!("Observed service {}", svc.name_any());
            if condition(&svc) {
                return Ok(svc);
            }
        }
        Err(SignpostError::NeverReady(name.to_string()))
    };

    match tokio::time::timeout(timeout, wait).await {
        Ok(result) => result,
        Err(_) => Err(SignpostError::NeverReady(name.to_string())),
    }
}
