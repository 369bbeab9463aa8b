#![no_std]

//! Admin, steward role and emergency pause shared by the grant contracts.
//!
//! Contracts hold no access state of their own: every entry point builds an
//! [`AccessControl`] over its `Env` and goes through it for role checks.

mod events;

pub use events::{AdminTransferred, PauseChanged, RoleChanged};

use soroban_sdk::{contracterror, contracttype, Address, Env};

pub const DAY_IN_LEDGERS: u32 = 17_280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const PERSISTENT_LIFETIME_THRESHOLD: u32 = PERSISTENT_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Failures raised by the access layer. Contract error enums reuse these
/// discriminants so the codes stay stable across both grant contracts.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum AccessError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    ContractPaused = 4,
    ContractNotPaused = 5,
    /// The contract's own address was supplied where an external account is required.
    InvalidAddress = 6,
}

#[derive(Clone)]
#[contracttype]
enum AccessKey {
    Admin,
    Paused,
    Steward(Address),
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Rejects the contract's own address. Soroban has no zero address; the
/// contract itself is the one account that must never own a grant.
pub fn require_external(env: &Env, account: &Address) -> Result<(), AccessError> {
    if *account == env.current_contract_address() {
        return Err(AccessError::InvalidAddress);
    }
    Ok(())
}

/// View over the admin, steward set and pause flag of the current contract.
pub struct AccessControl<'a> {
    env: &'a Env,
}

impl<'a> AccessControl<'a> {
    pub fn new(env: &'a Env) -> Self {
        Self { env }
    }

    pub fn is_initialized(&self) -> bool {
        self.env.storage().instance().has(&AccessKey::Admin)
    }

    /// Stores the first admin, who also receives the steward role.
    pub fn init(&self, admin: &Address) -> Result<(), AccessError> {
        if self.is_initialized() {
            return Err(AccessError::AlreadyInitialized);
        }
        require_external(self.env, admin)?;
        admin.require_auth();

        let storage = self.env.storage().instance();
        storage.set(&AccessKey::Admin, admin);
        storage.set(&AccessKey::Paused, &false);
        bump_instance(self.env);

        self.write_steward(admin, true);
        events::emit_role_granted(
            self.env,
            RoleChanged {
                account: admin.clone(),
                sender: admin.clone(),
            },
        );
        Ok(())
    }

    pub fn admin(&self) -> Result<Address, AccessError> {
        self.env
            .storage()
            .instance()
            .get(&AccessKey::Admin)
            .ok_or(AccessError::NotInitialized)
    }

    /// Loads the admin and requires its authorization for this invocation.
    pub fn require_admin(&self) -> Result<Address, AccessError> {
        let admin = self.admin()?;
        admin.require_auth();
        Ok(admin)
    }

    pub fn is_steward(&self, account: &Address) -> bool {
        self.env
            .storage()
            .persistent()
            .get(&AccessKey::Steward(account.clone()))
            .unwrap_or(false)
    }

    /// Requires `caller` to authorize the invocation and to hold the steward role.
    pub fn require_steward(&self, caller: &Address) -> Result<(), AccessError> {
        if !self.is_initialized() {
            return Err(AccessError::NotInitialized);
        }
        caller.require_auth();
        if !self.is_steward(caller) {
            return Err(AccessError::Unauthorized);
        }
        Ok(())
    }

    pub fn grant_steward(&self, account: &Address) -> Result<(), AccessError> {
        let admin = self.require_admin()?;
        if self.is_steward(account) {
            return Ok(());
        }
        self.write_steward(account, true);
        events::emit_role_granted(
            self.env,
            RoleChanged {
                account: account.clone(),
                sender: admin,
            },
        );
        Ok(())
    }

    pub fn revoke_steward(&self, account: &Address) -> Result<(), AccessError> {
        let admin = self.require_admin()?;
        if !self.is_steward(account) {
            return Ok(());
        }
        self.write_steward(account, false);
        events::emit_role_revoked(
            self.env,
            RoleChanged {
                account: account.clone(),
                sender: admin,
            },
        );
        Ok(())
    }

    /// Immediate handover: the previous admin loses admin rights in the same
    /// invocation. Steward membership is left untouched.
    pub fn transfer_admin(&self, new_admin: &Address) -> Result<(), AccessError> {
        let previous = self.require_admin()?;
        require_external(self.env, new_admin)?;

        self.env.storage().instance().set(&AccessKey::Admin, new_admin);
        bump_instance(self.env);

        events::emit_admin_transferred(
            self.env,
            AdminTransferred {
                previous,
                new_admin: new_admin.clone(),
            },
        );
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.env
            .storage()
            .instance()
            .get(&AccessKey::Paused)
            .unwrap_or(false)
    }

    pub fn require_not_paused(&self) -> Result<(), AccessError> {
        if !self.is_initialized() {
            return Err(AccessError::NotInitialized);
        }
        if self.is_paused() {
            return Err(AccessError::ContractPaused);
        }
        Ok(())
    }

    pub fn pause(&self) -> Result<(), AccessError> {
        let admin = self.require_admin()?;
        if self.is_paused() {
            return Err(AccessError::ContractPaused);
        }
        self.write_paused(true);
        events::emit_paused(self.env, PauseChanged { admin });
        Ok(())
    }

    pub fn unpause(&self) -> Result<(), AccessError> {
        let admin = self.require_admin()?;
        if !self.is_paused() {
            return Err(AccessError::ContractNotPaused);
        }
        self.write_paused(false);
        events::emit_unpaused(self.env, PauseChanged { admin });
        Ok(())
    }

    fn write_paused(&self, paused: bool) {
        self.env.storage().instance().set(&AccessKey::Paused, &paused);
        bump_instance(self.env);
    }

    fn write_steward(&self, account: &Address, enabled: bool) {
        let key = AccessKey::Steward(account.clone());
        let storage = self.env.storage().persistent();
        if enabled {
            storage.set(&key, &true);
            storage.extend_ttl(&key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
        } else {
            storage.remove(&key);
        }
    }
}
