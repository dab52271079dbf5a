//! Status condition helpers.
//!
//! Conditions are constructed fresh on every reconcile and persisted only
//! by the caller, onto the GPUAddon status.

use chrono::Utc;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};

/// Condition type reported after reconciling the ClusterPolicy.
pub const CLUSTER_POLICY_DEPLOYED_CONDITION: &str = "ClusterPolicyDeployed";

/// Condition status value for a satisfied condition.
pub const CONDITION_TRUE: &str = "True";

/// Builds a fresh condition of the given type.
pub fn new_condition(type_: &str, status: &str, reason: &str, message: &str) -> Condition {
    Condition {
        last_transition_time: Time(Utc::now()),
        message: message.to_string(),
        observed_generation: None,
        reason: reason.to_string(),
        status: status.to_string(),
        type_: type_.to_string(),
    }
}

/// The single condition a successful ClusterPolicy reconcile reports.
pub fn cluster_policy_deployed() -> Condition {
    new_condition(
        CLUSTER_POLICY_DEPLOYED_CONDITION,
        CONDITION_TRUE,
        "Reconciled",
        "ClusterPolicy deployed",
    )
}
