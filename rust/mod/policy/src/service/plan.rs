use tracing::info;

use assura_core::new_id;
use assura_store::{StoreError, Value};

use crate::model::{CreatePlan, PolicyPlan};
use crate::service::{LedgerError, PolicyLedger};

fn columns(plan: &PolicyPlan) -> [(&'static str, Value); 3] {
    [
        ("admin_id", Value::text(&plan.admin_id)),
        ("created_at", Value::text(plan.created_at.to_rfc3339())),
        ("updated_at", Value::text(plan.updated_at.to_rfc3339())),
    ]
}

impl PolicyLedger {
    pub fn create_plan(&self, admin_id: &str, input: CreatePlan) -> Result<PolicyPlan, LedgerError> {
        let admin_id = admin_id.trim();
        if admin_id.is_empty() {
            return Err(LedgerError::Validation("admin_id is required".into()));
        }
        let name = input.name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("plan name is required".into()));
        }
        if !(input.premium.is_finite() && input.premium >= 0.0) {
            return Err(LedgerError::Validation("premium must be a non-negative amount".into()));
        }
        if !(input.coverage.is_finite() && input.coverage >= 0.0) {
            return Err(LedgerError::Validation("coverage must be a non-negative amount".into()));
        }
        if input.duration_years == 0 {
            return Err(LedgerError::Validation("duration must be at least one year".into()));
        }

        let now = self.clock.now();
        let plan = PolicyPlan {
            id: new_id(),
            admin_id: admin_id.to_string(),
            name: name.to_string(),
            policy_type: input.policy_type.trim().to_string(),
            premium: input.premium,
            coverage: input.coverage,
            duration_years: input.duration_years,
            image_ref: None,
            created_at: now,
            updated_at: now,
        };
        self.plans.insert(&plan.id, &plan, &columns(&plan))?;

        info!(plan = %plan.id, admin = %plan.admin_id, "plan created");
        Ok(plan)
    }

    pub fn get_plan(&self, id: &str) -> Result<PolicyPlan, LedgerError> {
        self.plans
            .get(id)?
            .ok_or_else(|| LedgerError::PlanNotFound(id.to_string()))
    }

    pub fn list_plans(&self) -> Result<Vec<PolicyPlan>, LedgerError> {
        Ok(self.plans.find(&[])?)
    }

    pub fn list_plans_for_admin(&self, admin_id: &str) -> Result<Vec<PolicyPlan>, LedgerError> {
        Ok(self.plans.find(&[("admin_id", Value::text(admin_id))])?)
    }

    /// Attach (or with `None`, detach) an uploaded image.
    pub fn set_plan_image(&self, id: &str, image_ref: Option<String>) -> Result<PolicyPlan, LedgerError> {
        let mut plan = self.get_plan(id)?;
        plan.image_ref = image_ref;
        plan.updated_at = self.clock.now();
        if !self.plans.update(id, &plan, &columns(&plan))? {
            return Err(LedgerError::PlanNotFound(id.to_string()));
        }
        Ok(plan)
    }

    /// Delete a plan nobody holds a policy on.
    pub fn delete_plan(&self, id: &str) -> Result<(), LedgerError> {
        self.get_plan(id)?;
        let holders = self.policies.count(&[("plan_id", Value::text(id))])?;
        if holders > 0 {
            return Err(LedgerError::Conflict(format!(
                "plan {} is referenced by {} policies",
                id, holders
            )));
        }
        // A purchase landing after the count still holds the plan through
        // the foreign key, which refuses the delete.
        let deleted = self.plans.delete(id).map_err(|e| match e {
            StoreError::Constraint(_) => {
                LedgerError::Conflict(format!("plan {} is referenced by a policy", id))
            }
            other => other.into(),
        })?;
        if !deleted {
            return Err(LedgerError::PlanNotFound(id.to_string()));
        }

        info!(plan = %id, "plan deleted");
        Ok(())
    }
}
