// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for service lookup, URL resolution, readiness
//! waiting, and ingress annotation management.

pub mod annotations;
pub mod ingress;
pub mod services;
pub mod wait;

pub use annotations::{
    annotate_services_with_basic_auth, annotate_services_with_cert_manager_issuer,
    clean_service_annotations, IngressAnnotations,
};
pub use ingress::{find_ingress_url, ingress_host, ingress_url};
pub use services::{
    create_service_link, extract_scheme_port, find_service, find_service_scheme_port,
    find_service_url, find_service_urls, get_service_names, get_services, get_services_by_name,
    has_external_address, is_service_present, service_app_name, service_url, ServiceUrl,
};
pub use wait::{wait_for_external_ip, wait_for_service};
