use std::rc::Rc;

use im::Vector;
use leptos_reactive::{create_signal, ReadSignal, SignalGetUntracked, SignalSet, WriteSignal};
use serde::Serialize;
use tracing::debug;

use crate::prelude::{
    AnalysisEntry, ComplianceAnalysis, ComplianceRequest, Policy, RestClient, Rule, SyncError,
};

use super::{
    utils::{refresh_current, remove_record, replace_record, tracked},
    LoadingFlag, Notifications,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolicyState {
    pub policies: Vector<Policy>,
    pub rules: Vector<Rule>,
    pub current_policy: Option<Policy>,
    pub current_rule: Option<Rule>,
    pub compliance_matrix: Vector<AnalysisEntry>,
    pub waste_analysis: Vector<AnalysisEntry>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PolicyAction {
    SetError(Option<String>),
    SetPolicies(Vector<Policy>),
    SetRules(Vector<Rule>),
    SetCurrentPolicy(Option<Policy>),
    SetCurrentRule(Option<Rule>),
    AddPolicy(Policy),
    UpdatePolicy(Policy),
    DeletePolicy(String),
    AddRule(Rule),
    UpdateRule(Rule),
    DeleteRule(String),
    SetComplianceMatrix(Vector<AnalysisEntry>),
    SetWasteAnalysis(Vector<AnalysisEntry>),
    UpdateComplianceEntry(AnalysisEntry),
    UpdateWasteEntry(AnalysisEntry),
}

impl PolicyState {
    pub fn reduce(&self, action: PolicyAction) -> Self {
        let mut next = self.clone();
        match action {
            PolicyAction::SetError(error) => next.error = error,
            PolicyAction::SetPolicies(policies) => next.policies = policies,
            PolicyAction::SetRules(rules) => next.rules = rules,
            PolicyAction::SetCurrentPolicy(policy) => next.current_policy = policy,
            PolicyAction::SetCurrentRule(rule) => next.current_rule = rule,
            PolicyAction::AddPolicy(policy) => next.policies.push_back(policy),
            PolicyAction::UpdatePolicy(policy) => {
                next.current_policy = refresh_current(&self.current_policy, &policy);
                next.policies = replace_record(&self.policies, policy);
            }
            PolicyAction::DeletePolicy(id) => {
                next.policies = remove_record(&self.policies, &id);
                if is_current(self.current_policy.as_ref().and_then(|p| p.id.as_deref()), &id) {
                    next.current_policy = None;
                }
            }
            PolicyAction::AddRule(rule) => next.rules.push_back(rule),
            PolicyAction::UpdateRule(rule) => {
                next.current_rule = refresh_current(&self.current_rule, &rule);
                next.rules = replace_record(&self.rules, rule);
            }
            PolicyAction::DeleteRule(id) => {
                next.rules = remove_record(&self.rules, &id);
                if is_current(self.current_rule.as_ref().and_then(|r| r.id.as_deref()), &id) {
                    next.current_rule = None;
                }
            }
            PolicyAction::SetComplianceMatrix(matrix) => next.compliance_matrix = matrix,
            PolicyAction::SetWasteAnalysis(waste) => next.waste_analysis = waste,
            PolicyAction::UpdateComplianceEntry(entry) => {
                next.compliance_matrix = merge_entry(&self.compliance_matrix, &entry)
            }
            PolicyAction::UpdateWasteEntry(entry) => {
                next.waste_analysis = merge_entry(&self.waste_analysis, &entry)
            }
        }
        next
    }
}

impl PolicyState {
    pub fn summary(&self) -> PolicySummary {
        let rules_with = |status: &str| {
            self.rules
                .iter()
                .filter(|rule| rule.status.as_deref() == Some(status))
                .count()
        };
        PolicySummary {
            policies: self.policies.len(),
            rules: self.rules.len(),
            active_rules: rules_with("active"),
            draft_rules: rules_with("draft"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PolicySummary {
    pub policies: usize,
    pub rules: usize,
    pub active_rules: usize,
    pub draft_rules: usize,
}

fn is_current(current_id: Option<&str>, id: &str) -> bool {
    current_id == Some(id)
}

fn merge_entry(entries: &Vector<AnalysisEntry>, update: &AnalysisEntry) -> Vector<AnalysisEntry> {
    let index = update
        .id
        .as_ref()
        .and_then(|id| entries.iter().position(|entry| entry.id.as_ref() == Some(id)));
    match index {
        Some(index) => entries.update(index, entries[index].merge(update)),
        None => entries.clone(),
    }
}

/// Policies, rules and the results of the last compliance analysis.
pub struct PolicyStore {
    pub state: ReadSignal<PolicyState>,
    set_state: WriteSignal<PolicyState>,
    loading: LoadingFlag,
    client: Rc<RestClient>,
    notifications: Rc<Notifications>,
}

impl PolicyStore {
    pub fn new(client: Rc<RestClient>, notifications: Rc<Notifications>) -> Self {
        let (state, set_state) = create_signal(PolicyState::default());
        Self {
            state,
            set_state,
            loading: LoadingFlag::new(),
            client,
            notifications,
        }
    }

    pub fn dispatch(&self, action: PolicyAction) {
        debug!(?action, "policy dispatch");
        let next = self.state.get_untracked().reduce(action);
        self.set_state.set(next);
    }

    pub fn snapshot(&self) -> PolicyState {
        self.state.get_untracked()
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn summary(&self) -> PolicySummary {
        self.snapshot().summary()
    }

    fn record_error(&self, error: &SyncError) {
        self.dispatch(PolicyAction::SetError(Some(error.to_string())));
    }

    pub fn set_current_policy(&self, policy: Option<Policy>) {
        self.dispatch(PolicyAction::SetCurrentPolicy(policy));
    }

    pub fn set_current_rule(&self, rule: Option<Rule>) {
        self.dispatch(PolicyAction::SetCurrentRule(rule));
    }

    pub async fn load_policies(&self) -> Result<Vector<Policy>, SyncError> {
        let policies = tracked(
            &self.loading,
            &self.notifications,
            "Failed to load policies",
            |error| self.record_error(error),
            self.client.list::<Policy>(),
        )
        .await?;
        self.dispatch(PolicyAction::SetPolicies(policies.clone()));
        Ok(policies)
    }

    pub async fn load_rules(&self) -> Result<Vector<Rule>, SyncError> {
        let rules = tracked(
            &self.loading,
            &self.notifications,
            "Failed to load rules",
            |error| self.record_error(error),
            self.client.list::<Rule>(),
        )
        .await?;
        self.dispatch(PolicyAction::SetRules(rules.clone()));
        Ok(rules)
    }

    pub async fn create_policy(&self, policy: &Policy) -> Result<Policy, SyncError> {
        let created = tracked(
            &self.loading,
            &self.notifications,
            "Failed to create policy",
            |error| self.record_error(error),
            self.client.create(policy),
        )
        .await?;
        self.dispatch(PolicyAction::AddPolicy(created.clone()));
        self.notifications.success("Policy created successfully");
        Ok(created)
    }

    pub async fn update_policy<P: Serialize + ?Sized>(
        &self,
        id: &str,
        updates: &P,
    ) -> Result<Policy, SyncError> {
        let updated: Policy = tracked(
            &self.loading,
            &self.notifications,
            "Failed to update policy",
            |error| self.record_error(error),
            self.client.update(id, updates),
        )
        .await?;
        self.dispatch(PolicyAction::UpdatePolicy(updated.clone()));
        self.notifications.success("Policy updated successfully");
        Ok(updated)
    }

    pub async fn delete_policy(&self, id: &str) -> Result<(), SyncError> {
        tracked(
            &self.loading,
            &self.notifications,
            "Failed to delete policy",
            |error| self.record_error(error),
            self.client.remove::<Policy>(id),
        )
        .await?;
        self.dispatch(PolicyAction::DeletePolicy(id.to_string()));
        self.notifications.success("Policy deleted successfully");
        Ok(())
    }

    pub async fn create_rule(&self, rule: &Rule) -> Result<Rule, SyncError> {
        let created = tracked(
            &self.loading,
            &self.notifications,
            "Failed to create rule",
            |error| self.record_error(error),
            self.client.create(rule),
        )
        .await?;
        self.dispatch(PolicyAction::AddRule(created.clone()));
        self.notifications.success("Rule created successfully");
        Ok(created)
    }

    pub async fn update_rule<P: Serialize + ?Sized>(
        &self,
        id: &str,
        updates: &P,
    ) -> Result<Rule, SyncError> {
        let updated: Rule = tracked(
            &self.loading,
            &self.notifications,
            "Failed to update rule",
            |error| self.record_error(error),
            self.client.update(id, updates),
        )
        .await?;
        self.dispatch(PolicyAction::UpdateRule(updated.clone()));
        self.notifications.success("Rule updated successfully");
        Ok(updated)
    }

    pub async fn delete_rule(&self, id: &str) -> Result<(), SyncError> {
        tracked(
            &self.loading,
            &self.notifications,
            "Failed to delete rule",
            |error| self.record_error(error),
            self.client.remove::<Rule>(id),
        )
        .await?;
        self.dispatch(PolicyAction::DeleteRule(id.to_string()));
        self.notifications.success("Rule deleted successfully");
        Ok(())
    }

    pub async fn analyze_compliance(
        &self,
        process_id: &str,
        policy_ids: &[String],
    ) -> Result<ComplianceAnalysis, SyncError> {
        let request = ComplianceRequest {
            process_id: process_id.to_string(),
            policy_ids: policy_ids.to_vec(),
        };
        let analysis = tracked(
            &self.loading,
            &self.notifications,
            "Failed to analyze compliance",
            |error| self.record_error(error),
            self.client.analyze_compliance(&request),
        )
        .await?;
        self.dispatch(PolicyAction::SetComplianceMatrix(
            analysis.compliance_matrix.clone(),
        ));
        self.dispatch(PolicyAction::SetWasteAnalysis(analysis.waste_analysis.clone()));
        self.notifications.success("Compliance analysis completed");
        Ok(analysis)
    }
}
