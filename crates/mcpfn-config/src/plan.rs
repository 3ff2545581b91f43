//! Deployment planning pass
//!
//! Validates parameters, derives names, composes settings and the auth policy,
//! and assembles everything the provisioning engine and the identity directory
//! need. Any failure aborts the whole plan before resources are touched.

use serde::Serialize;
use tracing::info;

use crate::composer::{Composition, CompositionInput, compose};
use crate::directory::{AppRegistration, AppRegistrationRequest, IdentityDirectory, RegistrationInput};
use crate::feature_flags::FeatureFlags;
use crate::identity::{AppInsightsRef, AuthParams, StorageAccountRef};
use crate::loader::DeploymentFile;
use crate::naming::ResourceNames;
use crate::outputs::DeploymentOutputs;
use crate::roles::{RoleAssignment, role_assignments};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PublicNetworkAccess {
    Enabled,
    Disabled,
}

impl PublicNetworkAccess {
    pub fn for_vnet(vnet_enabled: bool) -> Self {
        if vnet_enabled {
            PublicNetworkAccess::Disabled
        } else {
            PublicNetworkAccess::Enabled
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPlan {
    pub names: ResourceNames,
    pub flags: FeatureFlags,
    pub storage: StorageAccountRef,
    pub storage_public_network_access: PublicNetworkAccess,
    pub composition: Composition,
    pub registration_request: AppRegistrationRequest,
    pub role_assignments: Vec<RoleAssignment>,
    pub outputs: DeploymentOutputs,
}

impl DeploymentPlan {
    /// Plan using the registration recorded in the file, if any.
    pub fn build(file: &DeploymentFile) -> Result<Self> {
        Self::assemble(file, file.registration.as_ref())
    }

    /// Register the application first, then plan with its identifiers.
    pub async fn build_with_directory(file: &DeploymentFile, directory: &dyn IdentityDirectory) -> Result<Self> {
        let draft = Self::assemble(file, file.registration.as_ref())?;
        let registration = directory.register(&draft.registration_request).await?;
        info!(
            directory = directory.name(),
            app_id = %registration.app_id,
            "application registered"
        );
        Self::assemble(file, Some(&registration))
    }

    fn assemble(file: &DeploymentFile, registration: Option<&AppRegistration>) -> Result<Self> {
        let params = &file.parameters;
        let provisioned = &file.provisioned;
        params.validate()?;

        let names = ResourceNames::derive(params);
        let flags = params.feature_flags();
        let hostname = names.function_app_hostname();

        let mut storage = StorageAccountRef::new(names.storage_account.clone());
        if let Some(endpoints) = provisioned.storage_endpoints.clone() {
            storage.endpoints = endpoints;
        }

        let registration_request = AppRegistrationRequest::build(RegistrationInput {
            unique_name: &names.app_registration,
            display_name: &params.api_service_name,
            function_app_hostname: &hostname,
            extra_redirect_uris: &params.extra_redirect_uris,
            pre_authorized_client_ids: params.pre_authorized_client_id_list(),
            delegated_permissions: params.scopes(),
            tenant_id: &provisioned.tenant_id,
            identity_principal_id: &provisioned.identity.principal_id,
        })?;

        let registration = registration.cloned().unwrap_or_default();
        let identifier_uri = if registration.identifier_uri.is_empty() {
            registration_request.identifier_uri.clone()
        } else {
            registration.identifier_uri.clone()
        };

        let app_insights = (!provisioned.app_insights_connection_string.is_empty()).then(|| AppInsightsRef {
            connection_string: provisioned.app_insights_connection_string.clone(),
        });

        let input = CompositionInput {
            flags,
            identity: provisioned.identity.clone(),
            storage: storage.clone(),
            content_share: names.content_share.clone(),
            app_insights,
            auth: Some(AuthParams {
                client_id: registration.app_id.clone(),
                tenant_id: provisioned.tenant_id.clone(),
                identifier_uri: identifier_uri.clone(),
                pre_authorized_client_ids: params.pre_authorized_client_ids.clone(),
            }),
            token_exchange_audience: params.token_exchange_audience.clone(),
            passthrough: file.app_settings.clone(),
        };
        let composition = compose(&input)?;

        let role_assignments = role_assignments(
            &flags,
            &provisioned.identity.principal_id,
            &params.principal_id,
            input.app_insights.is_some(),
        );

        let outputs = DeploymentOutputs {
            azure_location: params.normalized_location(),
            azure_tenant_id: provisioned.tenant_id.clone(),
            resource_group: names.resource_group.clone(),
            service_api_name: names.function_app.clone(),
            service_api_uri: format!("https://{hostname}"),
            service_api_hostname: hostname,
            azure_storage_account_name: storage.name.clone(),
            azure_storage_blob_endpoint: storage.endpoints.blob.clone(),
            azure_storage_queue_endpoint: storage.endpoints.queue.clone(),
            azure_storage_table_endpoint: storage.endpoints.table.clone(),
            azure_identity_client_id: provisioned.identity.client_id.clone(),
            azure_identity_resource_id: provisioned.identity.resource_id.clone(),
            applicationinsights_connection_string: provisioned.app_insights_connection_string.clone(),
            entra_application_id: registration.app_id.clone(),
            entra_application_object_id: registration.object_id.clone(),
            entra_service_principal_id: registration.service_principal_id.clone(),
            entra_identifier_uri: identifier_uri,
            auth_enabled: composition.auth_enabled(),
            configured_scopes: params.scopes_joined(),
            pre_authorized_client_ids: params.pre_authorized_client_ids.clone(),
            redirect_uris: registration_request.redirect_uris.clone(),
        };

        info!(
            resource_group = %names.resource_group,
            function_app = %names.function_app,
            auth_enabled = outputs.auth_enabled,
            roles = role_assignments.len(),
            "deployment plan assembled"
        );

        Ok(Self {
            storage_public_network_access: PublicNetworkAccess::for_vnet(params.vnet_enabled),
            names,
            flags,
            storage,
            composition,
            registration_request,
            role_assignments,
            outputs,
        })
    }
}
