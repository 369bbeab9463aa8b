use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol};

const ADD_GRANT: Symbol = symbol_short!("add_grant");
const ADD_STAGE: Symbol = symbol_short!("add_stage");
const APPROVE: Symbol = symbol_short!("approve");
const COMPLETE: Symbol = symbol_short!("complete");
const CHANGE_BUILDER: Symbol = symbol_short!("builder");

/// A grant or a new stage of one was created.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StageAdded {
    pub grant_id: u64,
    pub builder: Address,
    pub stage_number: u32,
    pub milestone_count: u32,
    pub total_amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MilestoneApproved {
    pub grant_id: u64,
    pub stage_number: u32,
    pub milestone_number: u32,
    pub approver: Address,
}

/// Funds left the contract: `amount` paid to `builder`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MilestoneCompleted {
    pub grant_id: u64,
    pub stage_number: u32,
    pub milestone_number: u32,
    pub completer: Address,
    pub builder: Address,
    pub amount: i128,
    pub description: String,
    pub proof: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuilderChanged {
    pub grant_id: u64,
    pub previous: Address,
    pub builder: Address,
}

pub fn emit_grant_added(env: &Env, event: StageAdded) {
    env.events().publish((ADD_GRANT, event.grant_id), event);
}

pub fn emit_stage_added(env: &Env, event: StageAdded) {
    env.events().publish((ADD_STAGE, event.grant_id), event);
}

pub fn emit_milestone_approved(env: &Env, event: MilestoneApproved) {
    env.events().publish((APPROVE, event.grant_id), event);
}

pub fn emit_milestone_completed(env: &Env, event: MilestoneCompleted) {
    env.events().publish((COMPLETE, event.grant_id), event);
}

pub fn emit_builder_changed(env: &Env, event: BuilderChanged) {
    env.events().publish((CHANGE_BUILDER, event.grant_id), event);
}
