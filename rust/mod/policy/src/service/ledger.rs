use chrono::Months;
use tracing::{debug, info, warn};

use assura_core::new_id;
use assura_store::{StoreError, Value};

use crate::model::{PolicyStatus, PurchaseRequest, UpdateUserPolicy, UserPolicy};
use crate::service::{LedgerError, PolicyLedger};

/// Attempts for a nominee update before giving up with `Conflict`.
const NOMINEE_RETRIES: usize = 3;

fn columns(policy: &UserPolicy) -> [(&'static str, Value); 5] {
    [
        ("user_id", Value::text(&policy.user_id)),
        ("plan_id", Value::text(&policy.plan_id)),
        ("status", Value::text(policy.status.as_str())),
        ("created_at", Value::text(policy.created_at.to_rfc3339())),
        ("updated_at", Value::text(policy.updated_at.to_rfc3339())),
    ]
}

impl PolicyLedger {
    /// Buy a plan. The new policy is always PENDING and runs from today
    /// (UTC) for the plan's duration.
    pub fn purchase(&self, req: PurchaseRequest) -> Result<UserPolicy, LedgerError> {
        if req.user_id.trim().is_empty() {
            return Err(LedgerError::Validation("user_id is required".into()));
        }
        let plan = self.get_plan(&req.plan_id)?;
        if let Some(requested) = req.status.as_deref() {
            debug!(requested, "caller-supplied status ignored on purchase");
        }

        let now = self.clock.now();
        let start_date = now.date_naive();
        let end_date = start_date
            .checked_add_months(Months::new(plan.duration_years.saturating_mul(12)))
            .ok_or_else(|| LedgerError::Internal("policy end date out of range".into()))?;

        let policy = UserPolicy {
            id: new_id(),
            user_id: req.user_id.trim().to_string(),
            user_name: req.user_name.trim().to_string(),
            gender: req.gender.trim().to_string(),
            dob: req.dob,
            aadhaar_number: req.aadhaar_number.trim().to_string(),
            age: req.age,
            plan_id: plan.id.clone(),
            start_date,
            end_date,
            nominee: req.nominee.trim().to_string(),
            nominee_relation: req.nominee_relation.trim().to_string(),
            status: PolicyStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        // The plan may be deleted between the read above and this insert;
        // the foreign key on plan_id refuses the row in that case.
        self.policies
            .insert(&policy.id, &policy, &columns(&policy))
            .map_err(|e| match e {
                StoreError::Constraint(_) => LedgerError::PlanNotFound(plan.id.clone()),
                other => other.into(),
            })?;

        info!(policy = %policy.id, plan = %plan.id, user = %policy.user_id, "policy purchased");
        Ok(policy)
    }

    /// PENDING → ACTIVE.
    pub fn activate(&self, id: &str) -> Result<UserPolicy, LedgerError> {
        self.transition(id, PolicyStatus::Active)
    }

    /// PENDING → REJECTED.
    pub fn reject(&self, id: &str) -> Result<UserPolicy, LedgerError> {
        self.transition(id, PolicyStatus::Rejected)
    }

    /// Move a PENDING policy to `to`. The status check and the write are a
    /// single conditional update returning the written record; if it matches
    /// nothing, a re-read tells a missing policy apart from one that already
    /// left PENDING.
    fn transition(&self, id: &str, to: PolicyStatus) -> Result<UserPolicy, LedgerError> {
        let now = self.clock.now().to_rfc3339();
        let written: Option<UserPolicy> = self.policies.patch_if(
            id,
            &[
                ("status", Value::text(to.as_str())),
                ("updated_at", Value::text(&now)),
            ],
            &[
                ("status", Value::text(to.as_str())),
                ("updated_at", Value::text(&now)),
            ],
            "status",
            Value::text(PolicyStatus::Pending.as_str()),
        )?;

        match written {
            Some(policy) => {
                info!(policy = %id, status = %to, "policy status changed");
                Ok(policy)
            }
            None => {
                let current = self.get_policy(id)?;
                warn!(policy = %id, from = %current.status, to = %to, "transition refused");
                Err(LedgerError::InvalidTransition {
                    from: current.status,
                    to,
                })
            }
        }
    }

    /// Change the nominee in any status. Never overwrites a status written
    /// concurrently: the write only lands while the status read is current.
    pub fn update_nominee(
        &self,
        id: &str,
        nominee: &str,
        relation: &str,
    ) -> Result<UserPolicy, LedgerError> {
        for attempt in 1..=NOMINEE_RETRIES {
            let status = self.get_policy(id)?.status;
            let updated_at = self.clock.now().to_rfc3339();

            let written: Option<UserPolicy> = self.policies.patch_if(
                id,
                &[
                    ("nominee", Value::text(nominee.trim())),
                    ("nominee_relation", Value::text(relation.trim())),
                    ("updated_at", Value::text(&updated_at)),
                ],
                &[("updated_at", Value::text(&updated_at))],
                "status",
                Value::text(status.as_str()),
            )?;
            if let Some(policy) = written {
                info!(policy = %id, "nominee updated");
                return Ok(policy);
            }
            debug!(policy = %id, attempt, "status moved during nominee update; retrying");
        }

        Err(LedgerError::Conflict(format!(
            "policy {} kept changing during nominee update",
            id
        )))
    }

    /// Policies awaiting review on plans owned by `admin_id`, oldest first.
    pub fn list_pending_for_admin(&self, admin_id: &str) -> Result<Vec<UserPolicy>, LedgerError> {
        self.list_for_admin(admin_id, PolicyStatus::Pending)
    }

    /// Approved policies on plans owned by `admin_id`, oldest first.
    pub fn list_active_for_admin(&self, admin_id: &str) -> Result<Vec<UserPolicy>, LedgerError> {
        self.list_for_admin(admin_id, PolicyStatus::Active)
    }

    fn list_for_admin(
        &self,
        admin_id: &str,
        status: PolicyStatus,
    ) -> Result<Vec<UserPolicy>, LedgerError> {
        let sql = "SELECT p.data AS data
            FROM user_policies p
            JOIN policy_plans pl ON pl.id = p.plan_id
            WHERE pl.admin_id = ?1 AND p.status = ?2
            ORDER BY p.created_at ASC, p.id ASC";
        Ok(self
            .policies
            .query(sql, &[Value::text(admin_id), Value::text(status.as_str())])?)
    }

    /// Administrative overwrite of every mutable field, status included.
    /// Bypasses the transition rules.
    pub fn update(&self, id: &str, input: UpdateUserPolicy) -> Result<UserPolicy, LedgerError> {
        let existing = self.get_policy(id)?;
        self.get_plan(&input.plan_id)?;
        if input.end_date < input.start_date {
            return Err(LedgerError::Validation("end_date is before start_date".into()));
        }

        let policy = UserPolicy {
            id: existing.id,
            user_id: input.user_id.trim().to_string(),
            user_name: input.user_name.trim().to_string(),
            gender: input.gender.trim().to_string(),
            dob: input.dob,
            aadhaar_number: input.aadhaar_number.trim().to_string(),
            age: input.age,
            plan_id: input.plan_id,
            start_date: input.start_date,
            end_date: input.end_date,
            nominee: input.nominee.trim().to_string(),
            nominee_relation: input.nominee_relation.trim().to_string(),
            status: input.status,
            created_at: existing.created_at,
            updated_at: self.clock.now(),
        };
        let updated = self
            .policies
            .update(id, &policy, &columns(&policy))
            .map_err(|e| match e {
                StoreError::Constraint(_) => LedgerError::PlanNotFound(policy.plan_id.clone()),
                other => other.into(),
            })?;
        if !updated {
            return Err(LedgerError::PolicyNotFound(id.to_string()));
        }

        warn!(policy = %id, status = %policy.status, "policy overwritten");
        Ok(policy)
    }

    pub fn delete(&self, id: &str) -> Result<(), LedgerError> {
        if !self.policies.delete(id)? {
            return Err(LedgerError::PolicyNotFound(id.to_string()));
        }
        info!(policy = %id, "policy deleted");
        Ok(())
    }

    pub fn get_policy(&self, id: &str) -> Result<UserPolicy, LedgerError> {
        self.policies
            .get(id)?
            .ok_or_else(|| LedgerError::PolicyNotFound(id.to_string()))
    }

    pub fn list_policies_for_user(&self, user_id: &str) -> Result<Vec<UserPolicy>, LedgerError> {
        Ok(self.policies.find(&[("user_id", Value::text(user_id))])?)
    }

    pub fn list_all_policies(&self) -> Result<Vec<UserPolicy>, LedgerError> {
        Ok(self.policies.find(&[])?)
    }
}
