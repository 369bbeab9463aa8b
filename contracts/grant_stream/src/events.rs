use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol};

const ADD_GRANT: Symbol = symbol_short!("add_grant");
const UPDATE_GRANT: Symbol = symbol_short!("upd_grant");
const NEXT_STAGE: Symbol = symbol_short!("next_stg");
const WITHDRAW: Symbol = symbol_short!("withdraw");
const DEPOSIT: Symbol = symbol_short!("deposit");

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddGrant {
    pub id: u64,
    pub builder: Address,
    pub cap: i128,
    pub grant_number: u32,
    pub stage_number: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpdateGrant {
    pub id: u64,
    pub builder: Address,
    pub cap: i128,
    pub last_checkpoint: u64,
    pub amount_left: i128,
    pub stage_number: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MoveGrantToNextStage {
    pub id: u64,
    pub builder: Address,
    pub cap: i128,
    pub stage_number: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdraw {
    pub id: u64,
    pub builder: Address,
    pub amount: i128,
    pub reason: String,
    pub grant_number: u32,
    pub stage_number: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposit {
    pub from: Address,
    pub amount: i128,
}

pub fn emit_add_grant(env: &Env, event: AddGrant) {
    env.events().publish((ADD_GRANT, event.id), event);
}

pub fn emit_update_grant(env: &Env, event: UpdateGrant) {
    env.events().publish((UPDATE_GRANT, event.id), event);
}

pub fn emit_move_to_next_stage(env: &Env, event: MoveGrantToNextStage) {
    env.events().publish((NEXT_STAGE, event.id), event);
}

pub fn emit_withdraw(env: &Env, event: Withdraw) {
    env.events().publish((WITHDRAW, event.id), event);
}

pub fn emit_deposit(env: &Env, event: Deposit) {
    env.events().publish((DEPOSIT, event.from.clone()), event);
}
