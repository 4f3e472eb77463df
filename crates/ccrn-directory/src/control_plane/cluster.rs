//! Kubernetes-backed control plane

use async_trait::async_trait;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{
    Client,
    api::{Api, DynamicObject, ListParams, PostParams},
    core::GroupVersionKind,
    discovery::ApiResource,
};
use serde_json::Value as JsonValue;

use super::ControlPlane;
use crate::error::{DirectoryError, Result};
use crate::types::TypeInfo;

/// HTTP statuses the API server uses to reject an object it will not admit
const REJECTION_CODES: [u16; 3] = [400, 403, 422];

/// Control plane talking to a Kubernetes API server
pub struct KubeControlPlane {
    client: Client,
    dry_run: bool,
}

impl KubeControlPlane {
    /// Connect using the inferred kubeconfig or in-cluster configuration
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self::with_client(client))
    }

    /// Create with an existing client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            dry_run: false,
        }
    }

    /// Submit objects as server-side dry runs so nothing is persisted
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ControlPlane for KubeControlPlane {
    async fn list_type_definitions(&self) -> Result<Vec<JsonValue>> {
        let api: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;

        list.items
            .iter()
            .map(|crd| serde_json::to_value(crd).map_err(DirectoryError::from))
            .collect()
    }

    async fn create_object(
        &self,
        info: &TypeInfo,
        namespace: &str,
        name: &str,
        object: JsonValue,
    ) -> Result<()> {
        let gvk = GroupVersionKind::gvk(&info.group, &info.version, &info.kind);
        let resource = ApiResource::from_gvk_with_plural(&gvk, &info.plural_name);
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &resource);

        let object = DynamicObject::new(name, &resource)
            .within(namespace)
            .data(object);

        let params = PostParams {
            dry_run: self.dry_run,
            ..Default::default()
        };

        tracing::info!(
            type_key = %info.type_key(),
            namespace,
            name,
            "creating object for delegated validation"
        );

        match api.create(&params, &object).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(resp)) if REJECTION_CODES.contains(&resp.code) => {
                Err(DirectoryError::SchemaViolation {
                    type_key: info.type_key(),
                    message: resp.message,
                })
            }
            Err(e) => Err(DirectoryError::Api(e)),
        }
    }
}
