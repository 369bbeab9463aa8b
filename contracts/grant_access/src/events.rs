use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

const ROLE_GRANTED: Symbol = symbol_short!("role_g");
const ROLE_REVOKED: Symbol = symbol_short!("role_r");
const ADMIN_TRANSFERRED: Symbol = symbol_short!("admin");
const PAUSED: Symbol = symbol_short!("paused");
const UNPAUSED: Symbol = symbol_short!("unpaused");

/// Steward role granted to or revoked from `account` by `sender`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleChanged {
    pub account: Address,
    pub sender: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferred {
    pub previous: Address,
    pub new_admin: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseChanged {
    pub admin: Address,
}

pub(crate) fn emit_role_granted(env: &Env, event: RoleChanged) {
    env.events()
        .publish((ROLE_GRANTED, event.account.clone()), event);
}

pub(crate) fn emit_role_revoked(env: &Env, event: RoleChanged) {
    env.events()
        .publish((ROLE_REVOKED, event.account.clone()), event);
}

pub(crate) fn emit_admin_transferred(env: &Env, event: AdminTransferred) {
    env.events()
        .publish((ADMIN_TRANSFERRED, event.new_admin.clone()), event);
}

pub(crate) fn emit_paused(env: &Env, event: PauseChanged) {
    env.events().publish((PAUSED,), event);
}

pub(crate) fn emit_unpaused(env: &Env, event: PauseChanged) {
    env.events().publish((UNPAUSED,), event);
}
