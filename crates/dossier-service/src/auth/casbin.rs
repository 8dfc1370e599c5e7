use std::sync::Arc;

use casbin::{CoreApi, MgmtApi};
use salvo::async_trait;

use crate::error::{ServiceError, ServiceResult};

/// Role permissions: `(role, resource, action)`.
const ROLE_POLICIES: &[(&str, &str, &str)] = &[
    ("viewer", "series", "read"),
    ("viewer", "classification", "read"),
    ("viewer", "tickets", "read"),
    ("editor", "series", "write"),
    ("editor", "feedback", "write"),
    ("editor", "tickets", "write"),
];

/// Role inheritance: the first role gets everything the second has.
const ROLE_INHERITANCE: &[(&str, &str)] = &[("editor", "viewer"), ("admin", "editor")];

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// ## Summary
/// Initialize a Casbin enforcer with the built-in RBAC model and role policies.
///
/// ## Errors
/// Returns an error if the model fails to load or a policy cannot be added.
#[tracing::instrument]
pub async fn init_casbin() -> ServiceResult<casbin::Enforcer> {
    tracing::debug!("Initializing Casbin enforcer");

    let model = casbin::DefaultModel::from_str(include_str!("casbin_model.conf")).await?;
    tracing::debug!("Casbin model loaded");

    let adapter = casbin::MemoryAdapter::default();
    let mut enforcer = casbin::Enforcer::new(model, adapter).await?;

    for (role, object, action) in ROLE_POLICIES {
        enforcer.add_policy(owned(&[role, object, action])).await?;
    }
    for (role, inherits) in ROLE_INHERITANCE {
        enforcer.add_grouping_policy(owned(&[role, inherits])).await?;
    }

    let policy_count = enforcer.get_policy().len();
    let grouping_count = enforcer.get_grouping_policy().len();
    tracing::info!(
        policy_count = policy_count,
        grouping_count = grouping_count,
        "Casbin enforcer initialized successfully"
    );
    Ok(enforcer)
}

pub struct CasbinEnforcerHandler {
    pub enforcer: Arc<casbin::Enforcer>,
}

#[async_trait]
impl salvo::Handler for CasbinEnforcerHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.enforcer.clone());
    }
}

/// ## Summary
/// Retrieves the Casbin enforcer from the depot.
///
/// ## Errors
/// Returns an error if the Casbin enforcer is not found in the depot.
pub fn get_enforcer_from_depot(depot: &salvo::Depot) -> ServiceResult<Arc<casbin::Enforcer>> {
    depot
        .obtain::<Arc<casbin::Enforcer>>()
        .cloned()
        .map_err(|_err| ServiceError::InvariantViolation("Casbin enforcer not found in depot"))
}
