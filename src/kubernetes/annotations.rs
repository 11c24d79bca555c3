// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Ingress annotation management for exposed services
//!
//! The exposure controller reads its per-service ingress annotations from a
//! single annotation holding newline-joined `key: value` lines.
//! [`IngressAnnotations`] is the structured view of that blob; the text form
//! only exists at the cluster boundary.

use crate::constants::{annotations, basic_auth};
use crate::error::{Result, SignpostError};
use k8s_openapi::api::core::v1::Service;
use kube::{
    api::{ListParams, PostParams},
    Api, Client, ResourceExt,
};
use std::fmt;
use tracing::{debug, instrument};

/// Ordered key/value view of the ingress-annotations blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngressAnnotations {
    entries: Vec<(String, String)>,
}

impl IngressAnnotations {
    pub fn parse(blob: &str) -> Self {
        let entries = blob
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| match line.split_once(':') {
                Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
                // a line without a colon is kept as a bare key
                None => (line.trim().to_string(), String::new()),
            })
            .collect();
        Self { entries }
    }

    /// Replace the value for `key`, or append the entry if absent
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k.as_str() == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    /// Drop the entry for `key`, reporting whether one was present
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        self.entries.len() != before
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for IngressAnnotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            if value.is_empty() {
                write!(f, "{}", key)?;
            } else {
                write!(f, "{}: {}", key, value)?;
            }
        }
        Ok(())
    }
}

/// Set the cert-manager issuer annotation on the exposed services of a
/// namespace. A non-empty `services` list restricts the update to those
/// names. Returns the updated services; the first update failure aborts the
/// batch and carries the successes so far.
#[instrument(skip(client))]
pub async fn annotate_services_with_cert_manager_issuer(
    client: &Client,
    namespace: &str,
    issuer: &str,
    cluster_issuer: bool,
    services: &[String],
) -> Result<Vec<Service>> {
    let issuer_key = if cluster_issuer {
        annotations::CERT_MANAGER_CLUSTER_ISSUER
    } else {
        annotations::CERT_MANAGER_ISSUER
    };
    let issuer = issuer.to_string();

    update_exposed_services(client, namespace, services, move |svc| {
        apply_issuer(svc, issuer_key, &issuer)
    })
    .await
}

/// Set the nginx basic-auth annotations on the exposed services named in
/// `services`. A no-op when the list is empty.
#[instrument(skip(client))]
pub async fn annotate_services_with_basic_auth(
    client: &Client,
    namespace: &str,
    services: &[String],
) -> Result<Vec<Service>> {
    if services.is_empty() {
        return Ok(Vec::new());
    }
    update_exposed_services(client, namespace, services, apply_basic_auth).await
}

/// Remove the cert-manager issuer entries and the exposed-URL annotation
/// from the exposed services of a namespace. Idempotent.
#[instrument(skip(client))]
pub async fn clean_service_annotations(
    client: &Client,
    namespace: &str,
    services: &[String],
) -> Result<Vec<Service>> {
    update_exposed_services(client, namespace, services, apply_clean).await
}

fn apply_issuer(svc: &mut Service, issuer_key: &str, issuer: &str) {
    let blob = ingress_annotations_blob(svc);
    let mut ingress_annotations = IngressAnnotations::parse(&blob);
    ingress_annotations.set(issuer_key, issuer);
    svc.annotations_mut().insert(
        annotations::INGRESS_ANNOTATIONS.to_string(),
        ingress_annotations.to_string(),
    );
}

fn apply_basic_auth(svc: &mut Service) {
    let blob = ingress_annotations_blob(svc);
    let mut ingress_annotations = IngressAnnotations::parse(&blob);
    ingress_annotations.set(basic_auth::AUTH_TYPE, "basic");
    ingress_annotations.set(basic_auth::AUTH_SECRET, basic_auth::SECRET_NAME);
    ingress_annotations.set(basic_auth::AUTH_REALM, basic_auth::REALM);
    svc.annotations_mut().insert(
        annotations::INGRESS_ANNOTATIONS.to_string(),
        ingress_annotations.to_string(),
    );
}

fn apply_clean(svc: &mut Service) {
    if let Some(blob) = svc
        .annotations()
        .get(annotations::INGRESS_ANNOTATIONS)
        .cloned()
    {
        let mut ingress_annotations = IngressAnnotations::parse(&blob);
        ingress_annotations.remove(annotations::CERT_MANAGER_ISSUER);
        ingress_annotations.remove(annotations::CERT_MANAGER_CLUSTER_ISSUER);
        svc.annotations_mut().insert(
            annotations::INGRESS_ANNOTATIONS.to_string(),
            ingress_annotations.to_string(),
        );
    }
    svc.annotations_mut().remove(annotations::EXPOSE_URL);
}

fn ingress_annotations_blob(svc: &Service) -> String {
    svc.annotations()
        .get(annotations::INGRESS_ANNOTATIONS)
        .cloned()
        .unwrap_or_default()
}

/// A service takes part in annotation updates when it is marked for exposure
/// and not excluded from TLS management.
fn is_exposed(svc: &Service) -> bool {
    let svc_annotations = svc.annotations();
    svc_annotations
        .get(annotations::EXPOSE)
        .is_some_and(|v| v == "true")
        && !svc_annotations
            .get(annotations::SKIP_TLS)
            .is_some_and(|v| v == "true")
}

async fn update_exposed_services(
    client: &Client,
    namespace: &str,
    services: &[String],
    mut mutate: impl FnMut(&mut Service),
) -> Result<Vec<Service>> {
    let api: Api<Service> = Api::namespaced(client.clone(), namespace);
    let list = api
        .list(&ListParams::default())
        .await
        .map_err(|e| SignpostError::ListServices {
            namespace: namespace.to_string(),
            source: e,
        })?;

    let mut updated = Vec::new();
    for mut svc in list.items {
        let name = svc.name_any();
        // an empty list applies the update to every exposed service
        if !services.is_empty() && !services.contains(&name) {
            continue;
        }
        if !is_exposed(&svc) {
            debug!("Service {}/{} is not exposed, skipping", namespace, name);
            continue;
        }

        mutate(&mut svc);
        match api.replace(&name, &PostParams::default(), &svc).await {
            Ok(svc) => updated.push(svc),
            Err(e) => {
                return Err(SignpostError::UpdateService {
                    name,
                    namespace: namespace.to_string(),
                    source: e,
                    updated,
                })
            }
        }
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{list_json, MockService};
    use kube::api::ObjectMeta;
    use std::collections::BTreeMap;

    fn make_service(name: &str, svc_annotations: &[(&str, &str)]) -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("dev".to_string()),
                annotations: Some(
                    svc_annotations
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect::<BTreeMap<_, _>>(),
                ),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn make_exposed_service(name: &str) -> Service {
        make_service(name, &[(annotations::EXPOSE, "true")])
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        let blob = "kubernetes.io/ingress.class: nginx\ncertmanager.k8s.io/issuer: letsencrypt";
        let parsed = IngressAnnotations::parse(blob);
        assert_eq!(parsed.get("kubernetes.io/ingress.class").unwrap(), "nginx");
        assert_eq!(parsed.to_string(), blob);
    }

    #[test]
    fn test_parse_tolerates_blank_lines_and_bare_keys() {
        let parsed = IngressAnnotations::parse("a: 1\n\nbare\nb: 2");
        assert_eq!(parsed.get("bare").unwrap(), "");
        assert_eq!(parsed.to_string(), "a: 1\nbare\nb: 2");
    }

    #[test]
    fn test_parse_splits_on_first_colon_only() {
        let parsed = IngressAnnotations::parse("realm: Authentication: required");
        assert_eq!(parsed.get("realm").unwrap(), "Authentication: required");
    }

    #[test]
    fn test_set_replaces_existing_entry() {
        let mut ia = IngressAnnotations::parse("a: 1\nb: 2");
        ia.set("a", "3");
        assert_eq!(ia.to_string(), "a: 3\nb: 2");
    }

    #[test]
    fn test_remove() {
        let mut ia = IngressAnnotations::parse("a: 1\nb: 2");
        assert!(ia.remove("a"));
        assert!(!ia.remove("a"));
        assert_eq!(ia.to_string(), "b: 2");
    }

    #[test]
    fn test_apply_issuer_does_not_duplicate_on_repeat() {
        let mut svc = make_service(
            "web",
            &[
                (annotations::EXPOSE, "true"),
                (annotations::INGRESS_ANNOTATIONS, "kubernetes.io/ingress.class: nginx"),
            ],
        );

        apply_issuer(&mut svc, annotations::CERT_MANAGER_ISSUER, "letsencrypt");
        apply_issuer(&mut svc, annotations::CERT_MANAGER_ISSUER, "letsencrypt");

        let blob = &svc.annotations()[annotations::INGRESS_ANNOTATIONS];
        assert_eq!(
            blob,
            "kubernetes.io/ingress.class: nginx\ncertmanager.k8s.io/issuer: letsencrypt"
        );
    }

    #[test]
    fn test_apply_basic_auth_sets_all_three_entries() {
        let mut svc = make_exposed_service("web");
        apply_basic_auth(&mut svc);

        let parsed =
            IngressAnnotations::parse(&svc.annotations()[annotations::INGRESS_ANNOTATIONS]);
        assert_eq!(parsed.get(basic_auth::AUTH_TYPE).unwrap(), "basic");
        assert_eq!(
            parsed.get(basic_auth::AUTH_SECRET).unwrap(),
            basic_auth::SECRET_NAME
        );
        assert_eq!(parsed.get(basic_auth::AUTH_REALM).unwrap(), basic_auth::REALM);
    }

    #[test]
    fn test_apply_clean_is_idempotent() {
        let mut svc = make_service(
            "web",
            &[
                (annotations::EXPOSE, "true"),
                (annotations::EXPOSE_URL, "https://web.example.com"),
                (
                    annotations::INGRESS_ANNOTATIONS,
                    "kubernetes.io/ingress.class: nginx\ncertmanager.k8s.io/issuer: letsencrypt\ncertmanager.k8s.io/cluster-issuer: letsencrypt-prod",
                ),
            ],
        );

        apply_clean(&mut svc);
        let once = svc.annotations().clone();
        apply_clean(&mut svc);
        assert_eq!(svc.annotations(), &once);

        assert_eq!(
            once[annotations::INGRESS_ANNOTATIONS],
            "kubernetes.io/ingress.class: nginx"
        );
        assert!(!once.contains_key(annotations::EXPOSE_URL));
    }

    #[test]
    fn test_is_exposed_filter() {
        assert!(is_exposed(&make_exposed_service("web")));
        assert!(!is_exposed(&make_service("web", &[])));
        assert!(!is_exposed(&make_service(
            "web",
            &[(annotations::EXPOSE, "false")]
        )));
        assert!(!is_exposed(&make_service(
            "web",
            &[
                (annotations::EXPOSE, "true"),
                (annotations::SKIP_TLS, "true")
            ]
        )));
    }

    #[tokio::test]
    async fn test_annotate_with_issuer_updates_only_exposed_services() {
        let services = vec![
            make_exposed_service("web"),
            make_service("db", &[]),
            make_service(
                "legacy",
                &[
                    (annotations::EXPOSE, "true"),
                    (annotations::SKIP_TLS, "true"),
                ],
            ),
        ];
        let client = MockService::new()
            .on_get(
                "/api/v1/namespaces/dev/services",
                200,
                &list_json("ServiceList", &services),
            )
            .on_put_echo("/api/v1/namespaces/dev/services/web")
            .into_client();

        let updated =
            annotate_services_with_cert_manager_issuer(&client, "dev", "letsencrypt", true, &[])
                .await
                .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].name_any(), "web");
        let parsed =
            IngressAnnotations::parse(&updated[0].annotations()[annotations::INGRESS_ANNOTATIONS]);
        assert_eq!(
            parsed.get(annotations::CERT_MANAGER_CLUSTER_ISSUER).unwrap(),
            "letsencrypt"
        );
        assert_eq!(parsed.get(annotations::CERT_MANAGER_ISSUER), None);
    }

    #[tokio::test]
    async fn test_annotate_with_issuer_restricted_to_named_services() {
        let services = vec![make_exposed_service("web"), make_exposed_service("api")];
        let client = MockService::new()
            .on_get(
                "/api/v1/namespaces/dev/services",
                200,
                &list_json("ServiceList", &services),
            )
            .on_put_echo("/api/v1/namespaces/dev/services/api")
            .into_client();

        let updated = annotate_services_with_cert_manager_issuer(
            &client,
            "dev",
            "letsencrypt",
            false,
            &["api".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].name_any(), "api");
    }

    #[tokio::test]
    async fn test_batch_failure_carries_partial_progress() {
        let services = vec![make_exposed_service("api"), make_exposed_service("web")];
        // "api" is listed first; "web" has no PUT stub and fails
        let client = MockService::new()
            .on_get(
                "/api/v1/namespaces/dev/services",
                200,
                &list_json("ServiceList", &services),
            )
            .on_put_echo("/api/v1/namespaces/dev/services/api")
            .into_client();

        let result =
            annotate_services_with_cert_manager_issuer(&client, "dev", "letsencrypt", false, &[])
                .await;

        match result {
            Err(SignpostError::UpdateService { name, updated, .. }) => {
                assert_eq!(name, "web");
                assert_eq!(updated.len(), 1);
                assert_eq!(updated[0].name_any(), "api");
            }
            other => panic!("expected UpdateService error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_basic_auth_is_noop_without_names() {
        // no list stub: an empty name set must not touch the cluster
        let client = MockService::new().into_client();
        let updated = annotate_services_with_basic_auth(&client, "dev", &[])
            .await
            .unwrap();
        assert!(updated.is_empty());
    }

    #[tokio::test]
    async fn test_clean_removes_issuer_and_exposed_url() {
        let services = vec![make_service(
            "web",
            &[
                (annotations::EXPOSE, "true"),
                (annotations::EXPOSE_URL, "https://web.example.com"),
                (
                    annotations::INGRESS_ANNOTATIONS,
                    "certmanager.k8s.io/issuer: letsencrypt",
                ),
            ],
        )];
        let client = MockService::new()
            .on_get(
                "/api/v1/namespaces/dev/services",
                200,
                &list_json("ServiceList", &services),
            )
            .on_put_echo("/api/v1/namespaces/dev/services/web")
            .into_client();

        let updated = clean_service_annotations(&client, "dev", &[]).await.unwrap();

        assert_eq!(updated.len(), 1);
        let cleaned = updated[0].annotations();
        assert!(!cleaned.contains_key(annotations::EXPOSE_URL));
        assert_eq!(cleaned[annotations::INGRESS_ANNOTATIONS], "");
    }
}
