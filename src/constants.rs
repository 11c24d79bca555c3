// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys read and written by Signpost
pub mod annotations {
    /// When set to "true", marks a service for external exposure
    pub const EXPOSE: &str = "fabric8.io/expose";
    /// Externally reachable URL recorded by the exposure controller
    pub const EXPOSE_URL: &str = "fabric8.io/exposeUrl";
    /// Tool that generated the exposure
    pub const GENERATED_BY: &str = "fabric8.io/generated-by";
    /// Name of the ingress created for the service
    pub const INGRESS_NAME: &str = "fabric8.io/ingress.name";
    /// Newline-joined `key: value` pairs copied onto the generated ingress
    pub const INGRESS_ANNOTATIONS: &str = "fabric8.io/ingress.annotations";
    /// When set to "true", leaves the service out of TLS management
    pub const SKIP_TLS: &str = "signpost.dev/skip.tls";
    /// cert-manager issuer for the generated ingress
    pub const CERT_MANAGER_ISSUER: &str = "certmanager.k8s.io/issuer";
    /// cert-manager cluster-scoped issuer for the generated ingress
    pub const CERT_MANAGER_CLUSTER_ISSUER: &str = "certmanager.k8s.io/cluster-issuer";
}

/// nginx-ingress basic authentication wiring
pub mod basic_auth {
    pub const AUTH_TYPE: &str = "nginx.ingress.kubernetes.io/auth-type";
    pub const AUTH_SECRET: &str = "nginx.ingress.kubernetes.io/auth-secret";
    pub const AUTH_REALM: &str = "nginx.ingress.kubernetes.io/auth-realm";

    /// Well-known secret holding the htpasswd credentials
    pub const SECRET_NAME: &str = "signpost-basic-auth";
    pub const REALM: &str = "Authentication is required to access this service";
}

/// Label carrying the application name on a service
pub const APP_LABEL: &str = "app";
