// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Service lookup and external URL resolution

use crate::constants::{annotations, APP_LABEL};
use crate::error::{Result, SignpostError};
use crate::kubernetes::ingress::find_ingress_url;
use k8s_openapi::api::core::v1::{
    LoadBalancerIngress, Namespace, Service, ServicePort, ServiceSpec,
};
use kube::{
    api::{ListParams, ObjectMeta, PostParams},
    Api, Client, ResourceExt,
};
use std::collections::BTreeMap;
use tracing::{debug, instrument};
use url::Url;

/// A service name paired with its externally reachable URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrl {
    pub name: String,
    pub url: String,
}

/// Get all services in a namespace, keyed by name
#[instrument(skip(client))]
pub async fn get_services(client: &Client, namespace: &str) -> Result<BTreeMap<String, Service>> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    let list = services
        .list(&ListParams::default())
        .await
        .map_err(|e| SignpostError::ListServices {
            namespace: namespace.to_string(),
            source: e,
        })?;

    Ok(list
        .items
        .into_iter()
        .map(|s| (s.name_any(), s))
        .collect())
}

/// Get the services in a namespace whose names appear in the given list
#[instrument(skip(client))]
pub async fn get_services_by_name(
    client: &Client,
    namespace: &str,
    names: &[String],
) -> Result<Vec<Service>> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    let list = services
        .list(&ListParams::default())
        .await
        .map_err(|e| SignpostError::ListServices {
            namespace: namespace.to_string(),
            source: e,
        })?;

    Ok(list
        .items
        .into_iter()
        .filter(|s| names.contains(&s.name_any()))
        .collect())
}

/// Get the sorted names of all services in a namespace matching a substring
/// filter. An empty filter matches every service.
#[instrument(skip(client))]
pub async fn get_service_names(
    client: &Client,
    namespace: &str,
    filter: &str,
) -> Result<Vec<String>> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    let list = services
        .list(&ListParams::default())
        .await
        .map_err(|e| SignpostError::ListServices {
            namespace: namespace.to_string(),
            source: e,
        })?;

    let mut names: Vec<String> = list
        .items
        .iter()
        .map(|s| s.name_any())
        .filter(|name| filter.is_empty() || name.contains(filter))
        .collect();
    names.sort();
    Ok(names)
}

/// Look up a service by name across all namespaces, returning the first match
#[instrument(skip(client))]
pub async fn find_service(client: &Client, name: &str) -> Result<Service> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let list = namespaces.list(&ListParams::default()).await?;

    for ns in list.items {
        let services: Api<Service> = Api::namespaced(client.clone(), &ns.name_any());
        if let Ok(svc) = services.get(name).await {
            return Ok(svc);
        }
    }
    Err(SignpostError::ServiceNotFound(name.to_string()))
}

/// Check whether a service exists in a namespace
#[instrument(skip(client))]
pub async fn is_service_present(client: &Client, namespace: &str, name: &str) -> Result<bool> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    match services.get(name).await {
        Ok(_) => Ok(true),
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Find the externally reachable URL of a service, falling back to its
/// ingress when the service itself does not carry one.
#[instrument(skip(client))]
pub async fn find_service_url(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<Option<String>> {
    debug!("Finding service URL for {} in namespace {}", name, namespace);
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    let svc = services
        .get(name)
        .await
        .map_err(|e| SignpostError::GetService {
            name: name.to_string(),
            namespace: namespace.to_string(),
            source: e,
        })?;

    if let Some(url) = service_url(&svc) {
        debug!("Found service URL {}", url);
        return Ok(Some(url));
    }

    debug!(
        "No URL on service {}, attempting to look up via ingress",
        name
    );
    find_ingress_url(client, namespace, name).await
}

/// Resolve URLs for every service in a namespace. Services without a
/// resolvable URL are left out.
#[instrument(skip(client))]
pub async fn find_service_urls(client: &Client, namespace: &str) -> Result<Vec<ServiceUrl>> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    let list = services
        .list(&ListParams::default())
        .await
        .map_err(|e| SignpostError::ListServices {
            namespace: namespace.to_string(),
            source: e,
        })?;

    let mut urls = Vec::new();
    for svc in list.items {
        let name = svc.name_any();
        let url = match service_url(&svc) {
            Some(url) => Some(url),
            None => match find_ingress_url(client, namespace, &name).await {
                Ok(url) => url,
                Err(e) => {
                    debug!("unable to find service URL for {}: {}", name, e);
                    None
                }
            },
        };
        if let Some(url) = url {
            urls.push(ServiceUrl { name, url });
        }
    }
    Ok(urls)
}

/// Derive the externally reachable URL recorded on the service itself:
/// the exposed-URL annotation verbatim when present, otherwise the first
/// external address of a LoadBalancer service.
pub fn service_url(svc: &Service) -> Option<String> {
    if let Some(url) = svc.annotations().get(annotations::EXPOSE_URL) {
        if !url.is_empty() {
            return Some(url.clone());
        }
    }

    if service_type(svc) != Some("LoadBalancer") {
        return None;
    }

    let scheme = if service_ports(svc).iter().any(|p| p.port == 443) {
        "https"
    } else {
        "http"
    };

    let points = load_balancer_ingress(svc);
    if let Some(ip) = points
        .iter()
        .find_map(|p| p.ip.as_deref().filter(|v| !v.is_empty()))
    {
        return Some(format!("{}://{}/", scheme, ip));
    }
    points
        .iter()
        .find_map(|p| p.hostname.as_deref().filter(|v| !v.is_empty()))
        .map(|hostname| format!("{}://{}/", scheme, hostname))
}

/// Pick a (scheme, port) pair from the declared service ports, in order of
/// degrading priority: numeric 443, numeric 80, TCP port named "https",
/// any port named "http".
pub fn extract_scheme_port(svc: &Service) -> Option<(String, String)> {
    let ports = service_ports(svc);

    if ports.iter().any(|p| p.port == 443) {
        return Some(("https".to_string(), "443".to_string()));
    }
    if ports.iter().any(|p| p.port == 80) {
        return Some(("http".to_string(), "80".to_string()));
    }
    // protocol defaults to TCP when the field is unset
    if let Some(p) = ports.iter().find(|p| {
        p.protocol.as_deref().unwrap_or("TCP") == "TCP" && p.name.as_deref() == Some("https")
    }) {
        return Some(("https".to_string(), p.port.to_string()));
    }
    if let Some(p) = ports.iter().find(|p| p.name.as_deref() == Some("http")) {
        return Some(("http".to_string(), p.port.to_string()));
    }
    None
}

/// Get-then-extract wrapper around [`extract_scheme_port`]
#[instrument(skip(client))]
pub async fn find_service_scheme_port(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<Option<(String, String)>> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    let svc = services
        .get(name)
        .await
        .map_err(|e| SignpostError::GetService {
            name: name.to_string(),
            namespace: namespace.to_string(),
            source: e,
        })?;
    Ok(extract_scheme_port(&svc))
}

/// Check if the service has a load balancer ingress point with an IP or hostname
pub fn has_external_address(svc: &Service) -> bool {
    load_balancer_ingress(svc).iter().any(|p| {
        p.ip.as_deref().is_some_and(|v| !v.is_empty())
            || p.hostname.as_deref().is_some_and(|v| !v.is_empty())
    })
}

/// Application name of a service: the ingress-name annotation, else the app
/// label, else the service name.
pub fn service_app_name(svc: &Service) -> String {
    if let Some(name) = svc.annotations().get(annotations::INGRESS_NAME) {
        return name.clone();
    }
    if let Some(app) = svc.labels().get(APP_LABEL) {
        return app.clone();
    }
    svc.name_any()
}

/// Create an ExternalName service in `current_namespace` pointing at the
/// same-named service in `target_namespace`, annotated with the external URL.
#[instrument(skip(client))]
pub async fn create_service_link(
    client: &Client,
    current_namespace: &str,
    target_namespace: &str,
    service_name: &str,
    external_url: &str,
) -> Result<Service> {
    Url::parse(external_url).map_err(|e| SignpostError::InvalidUrl {
        url: external_url.to_string(),
        source: e,
    })?;

    let svc = Service {
        metadata: ObjectMeta {
            name: Some(service_name.to_string()),
            namespace: Some(current_namespace.to_string()),
            annotations: Some(BTreeMap::from([(
                annotations::EXPOSE_URL.to_string(),
                external_url.to_string(),
            )])),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("ExternalName".to_string()),
            external_name: Some(format!(
                "{}.{}.svc.cluster.local",
                service_name, target_namespace
            )),
            ..Default::default()
        }),
        ..Default::default()
    };

    let services: Api<Service> = Api::namespaced(client.clone(), current_namespace);
    Ok(services.create(&PostParams::default(), &svc).await?)
}

fn service_type(svc: &Service) -> Option<&str> {
    svc.spec.as_ref().and_then(|s| s.type_.as_deref())
}

fn service_ports(svc: &Service) -> &[ServicePort] {
    svc.spec
        .as_ref()
        .and_then(|s| s.ports.as_deref())
        .unwrap_or(&[])
}

fn load_balancer_ingress(svc: &Service) -> &[LoadBalancerIngress] {
    svc.status
        .as_ref()
        .and_then(|s| s.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_deref())
        .unwrap_or(&[])
}
