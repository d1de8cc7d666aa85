// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Orchestrator Adapter (C3): creates/deletes the per-workspace compute
//! instance and its stable ingress route. Neither operation blocks on the
//! runtime becoming healthy (§4.3) — readiness is discovered separately by
//! the Workspace Service's probe.

use async_trait::async_trait;
use hatch_core::{Login, WorkspaceId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("orchestrator unreachable: {0}")]
    Unreachable(String),

    #[error("provision failed: {0}")]
    ProvisionFailed(String),

    #[error("deprovision failed: {0}")]
    DeprovisionFailed(String),
}

#[async_trait]
pub trait OrchestratorAdapter: Clone + Send + Sync + 'static {
    /// Creates the compute instance and a stable ingress route of the form
    /// `<workspaceId>.<base-domain>`. A concurrent second `Provision` for the
    /// same id must surface `AlreadyExists` as success-equivalent (§5).
    async fn provision(&self, owner: &Login, id: &WorkspaceId, template: &str) -> Result<(), OrchestratorError>;

    async fn deprovision(&self, owner: &Login, id: &WorkspaceId) -> Result<(), OrchestratorError>;

    async fn check_status(&self) -> Result<(), OrchestratorError>;
}

pub mod k8s {
    use super::*;
    use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
    use k8s_openapi::api::core::v1::{Container, ContainerPort, EnvVar, Pod, PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
    use kube::api::{Api, DeleteParams, ObjectMeta, PostParams};
    use kube::Client;
    use std::collections::BTreeMap;

    fn base_domain() -> String {
        std::env::var("HATCH_BASE_DOMAIN").unwrap_or_else(|_| "repl.local".to_string())
    }

    fn namespace() -> String {
        std::env::var("HATCH_K8S_NAMESPACE").unwrap_or_else(|_| "default".to_string())
    }

    fn runner_image(template: &str) -> String {
        std::env::var("HATCH_RUNNER_IMAGE").unwrap_or_else(|_| format!("hatch-runtime-agent:{template}"))
    }

    fn container_port() -> i32 {
        std::env::var("HATCH_AGENT_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080)
    }

    /// Kubernetes-backed Orchestrator Adapter. Creates one Deployment and one
    /// ClusterIP Service per workspace, named and labeled by the workspace id,
    /// mirroring the reference implementation's one-Deployment-one-Service
    /// pairing per repl.
    #[derive(Clone)]
    pub struct KubernetesOrchestrator {
        client: Client,
    }

    impl KubernetesOrchestrator {
        pub async fn new() -> Result<Self, OrchestratorError> {
            let client = Client::try_default()
                .await
                .map_err(|e| OrchestratorError::Unreachable(e.to_string()))?;
            Ok(Self { client })
        }

        fn labels(id: &WorkspaceId) -> BTreeMap<String, String> {
            BTreeMap::from([("app".to_string(), id.to_string())])
        }

        fn build_deployment(&self, owner: &Login, id: &WorkspaceId, template: &str) -> Deployment {
            let labels = Self::labels(id);
            Deployment {
                metadata: ObjectMeta { name: Some(id.to_string()), labels: Some(labels.clone()), ..Default::default() },
                spec: Some(DeploymentSpec {
                    replicas: Some(1),
                    selector: LabelSelector { match_labels: Some(labels.clone()), ..Default::default() },
                    template: PodTemplateSpec {
                        metadata: Some(ObjectMeta { labels: Some(labels), ..Default::default() }),
                        spec: Some(PodSpec {
                            containers: vec![Container {
                                name: "hatch-agent".to_string(),
                                image: Some(runner_image(template)),
                                ports: Some(vec![ContainerPort { container_port: container_port(), ..Default::default() }]),
                                env: Some(vec![
                                    EnvVar { name: "REPL_ID".to_string(), value: Some(id.to_string()), ..Default::default() },
                                    EnvVar { name: "REPL_OWNER".to_string(), value: Some(owner.to_string()), ..Default::default() },
                                    EnvVar { name: "REPL_TEMPLATE".to_string(), value: Some(template.to_string()), ..Default::default() },
                                ]),
                                ..Default::default()
                            }],
                            ..Default::default()
                        }),
                    },
                    ..Default::default()
                }),
                ..Default::default()
            }
        }

        fn build_service(&self, id: &WorkspaceId) -> Service {
            Service {
                metadata: ObjectMeta { name: Some(id.to_string()), labels: Some(Self::labels(id)), ..Default::default() },
                spec: Some(ServiceSpec {
                    selector: Some(Self::labels(id)),
                    ports: Some(vec![ServicePort {
                        port: container_port(),
                        target_port: Some(k8s_openapi::apimachinery::pkg::util::intstr::IntOrString::Int(container_port())),
                        ..Default::default()
                    }]),
                    ..Default::default()
                }),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl OrchestratorAdapter for KubernetesOrchestrator {
        async fn provision(&self, owner: &Login, id: &WorkspaceId, template: &str) -> Result<(), OrchestratorError> {
            let ns = namespace();
            let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), &ns);
            let services: Api<Service> = Api::namespaced(self.client.clone(), &ns);

            match deployments.create(&PostParams::default(), &self.build_deployment(owner, id, template)).await {
                Ok(_) => {}
                Err(kube::Error::Api(e)) if e.code == 409 => {
                    tracing::info!(%id, "deployment already exists, treating as success");
                }
                Err(e) => return Err(OrchestratorError::ProvisionFailed(e.to_string())),
            }

            match services.create(&PostParams::default(), &self.build_service(id)).await {
                Ok(_) => {}
                Err(kube::Error::Api(e)) if e.code == 409 => {
                    tracing::info!(%id, "service already exists, treating as success");
                }
                Err(e) => return Err(OrchestratorError::ProvisionFailed(e.to_string())),
            }

            tracing::info!(%id, ingress = %format!("{id}.{}", base_domain()), "workspace provisioned");
            Ok(())
        }

        async fn deprovision(&self, _owner: &Login, id: &WorkspaceId) -> Result<(), OrchestratorError> {
            let ns = namespace();
            let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), &ns);
            let services: Api<Service> = Api::namespaced(self.client.clone(), &ns);
            let dp = DeleteParams::default();

            for result in [
                deployments.delete(id.as_str(), &dp).await.map(|_| ()),
                services.delete(id.as_str(), &dp).await.map(|_| ()),
            ] {
                match result {
                    Ok(()) => {}
                    Err(kube::Error::Api(e)) if e.code == 404 => {}
                    Err(e) => return Err(OrchestratorError::DeprovisionFailed(e.to_string())),
                }
            }
            Ok(())
        }

        async fn check_status(&self) -> Result<(), OrchestratorError> {
            let pods: Api<Pod> = Api::namespaced(self.client.clone(), &namespace());
            pods.list(&Default::default())
                .await
                .map(|_| ())
                .map_err(|e| OrchestratorError::Unreachable(e.to_string()))
        }
    }
}

pub use k8s::KubernetesOrchestrator;

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeOrchestrator {
        provisioned: Arc<Mutex<HashSet<String>>>,
        deprovision_calls: Arc<Mutex<u32>>,
    }

    impl FakeOrchestrator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_provisioned(&self, id: &WorkspaceId) -> bool {
            self.provisioned.lock().contains(id.as_str())
        }

        pub fn deprovision_call_count(&self) -> u32 {
            *self.deprovision_calls.lock()
        }
    }

    #[async_trait]
    impl OrchestratorAdapter for FakeOrchestrator {
        async fn provision(&self, _owner: &Login, id: &WorkspaceId, _template: &str) -> Result<(), OrchestratorError> {
            self.provisioned.lock().insert(id.as_str().to_string());
            Ok(())
        }

        async fn deprovision(&self, _owner: &Login, id: &WorkspaceId) -> Result<(), OrchestratorError> {
            self.provisioned.lock().remove(id.as_str());
            *self.deprovision_calls.lock() += 1;
            Ok(())
        }

        async fn check_status(&self) -> Result<(), OrchestratorError> {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
