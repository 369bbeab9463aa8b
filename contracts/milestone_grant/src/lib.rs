#![no_std]

//! Milestone escrow for large grants.
//!
//! Each milestone moves through `Proposed -> Approved -> Completed`. One
//! steward approves, a different steward completes, and only completion pays
//! the builder. The contract's token balance is funded by plain transfers and
//! is not earmarked per grant.

mod events;

pub use events::{BuilderChanged, MilestoneApproved, MilestoneCompleted, StageAdded};

use grant_access::{
    bump_instance, require_external, AccessControl, AccessError, PERSISTENT_BUMP_AMOUNT,
    PERSISTENT_LIFETIME_THRESHOLD,
};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, token, Address, Env, String, Vec,
};

#[contract]
pub struct MilestoneGrantContract;

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct Milestone {
    pub stage_number: u32,
    /// 1-based position within its stage.
    pub number: u32,
    pub amount: i128,
    pub completed: bool,
    pub approved_by: Option<Address>,
    pub completed_by: Option<Address>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct MilestoneGrant {
    pub builder: Address,
    /// Every milestone of every stage, in stage order.
    pub milestones: Vec<Milestone>,
}

#[derive(Clone)]
#[contracttype]
enum DataKey {
    GrantToken,
    Grant(u64),
}

#[contracterror]
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[repr(u32)]
pub enum Error {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    ContractPaused = 4,
    ContractNotPaused = 5,
    InvalidAddress = 6,
    GrantNotFound = 7,
    GrantAlreadyExists = 8,
    EmptyMilestones = 9,
    InvalidAmount = 10,
    InvalidStage = 11,
    MilestoneNotFound = 12,
    MilestoneNotApproved = 13,
    MilestoneAlreadyCompleted = 14,
    SameApproverAndCompleter = 15,
    TokenTransferFailed = 16,
    MathOverflow = 17,
}

impl From<AccessError> for Error {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotInitialized => Error::NotInitialized,
            AccessError::AlreadyInitialized => Error::AlreadyInitialized,
            AccessError::Unauthorized => Error::Unauthorized,
            AccessError::ContractPaused => Error::ContractPaused,
            AccessError::ContractNotPaused => Error::ContractNotPaused,
            AccessError::InvalidAddress => Error::InvalidAddress,
        }
    }
}

fn read_grant_token(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::GrantToken)
        .ok_or(Error::NotInitialized)
}

fn read_grant(env: &Env, grant_id: u64) -> Result<MilestoneGrant, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Grant(grant_id))
        .ok_or(Error::GrantNotFound)
}

fn write_grant(env: &Env, grant_id: u64, grant: &MilestoneGrant) {
    let key = DataKey::Grant(grant_id);
    env.storage().persistent().set(&key, grant);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn require_steward_op(env: &Env, caller: &Address) -> Result<(), Error> {
    let access = AccessControl::new(env);
    access.require_not_paused()?;
    access.require_steward(caller)?;
    Ok(())
}

/// Appends one milestone per amount, numbered from 1, and returns the stage total.
fn append_stage(
    milestones: &mut Vec<Milestone>,
    stage_number: u32,
    amounts: &Vec<i128>,
) -> Result<i128, Error> {
    if amounts.is_empty() {
        return Err(Error::EmptyMilestones);
    }

    let mut total: i128 = 0;
    let mut number: u32 = 0;
    for amount in amounts.iter() {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        number += 1;
        total = total.checked_add(amount).ok_or(Error::MathOverflow)?;
        milestones.push_back(Milestone {
            stage_number,
            number,
            amount,
            completed: false,
            approved_by: None,
            completed_by: None,
        });
    }
    Ok(total)
}

fn last_stage(grant: &MilestoneGrant) -> u32 {
    grant
        .milestones
        .iter()
        .map(|milestone| milestone.stage_number)
        .max()
        .unwrap_or(0)
}

fn find_milestone(
    grant: &MilestoneGrant,
    stage_number: u32,
    milestone_number: u32,
) -> Result<(u32, Milestone), Error> {
    if stage_number == 0 {
        return Err(Error::InvalidStage);
    }
    let mut index: u32 = 0;
    for milestone in grant.milestones.iter() {
        if milestone.stage_number == stage_number && milestone.number == milestone_number {
            return Ok((index, milestone));
        }
        index += 1;
    }
    Err(Error::MilestoneNotFound)
}

#[contractimpl]
impl MilestoneGrantContract {
    /// Sets the admin (also the first steward) and the token paid out on completion.
    pub fn initialize(env: Env, admin: Address, grant_token: Address) -> Result<(), Error> {
        AccessControl::new(&env).init(&admin)?;
        env.storage()
            .instance()
            .set(&DataKey::GrantToken, &grant_token);
        bump_instance(&env);
        Ok(())
    }

    pub fn add_grant(
        env: Env,
        caller: Address,
        builder: Address,
        grant_id: u64,
        milestone_amounts: Vec<i128>,
    ) -> Result<(), Error> {
        require_steward_op(&env, &caller)?;
        require_external(&env, &builder)?;

        if env.storage().persistent().has(&DataKey::Grant(grant_id)) {
            return Err(Error::GrantAlreadyExists);
        }

        let mut milestones = Vec::new(&env);
        let total_amount = append_stage(&mut milestones, 1, &milestone_amounts)?;
        let grant = MilestoneGrant {
            builder: builder.clone(),
            milestones,
        };
        write_grant(&env, grant_id, &grant);

        events::emit_grant_added(
            &env,
            StageAdded {
                grant_id,
                builder,
                stage_number: 1,
                milestone_count: milestone_amounts.len(),
                total_amount,
            },
        );
        Ok(())
    }

    /// Opens the next stage of an existing grant; its milestones restart at 1.
    pub fn add_grant_stage(
        env: Env,
        caller: Address,
        grant_id: u64,
        milestone_amounts: Vec<i128>,
    ) -> Result<(), Error> {
        require_steward_op(&env, &caller)?;

        let mut grant = read_grant(&env, grant_id)?;
        let stage_number = last_stage(&grant)
            .checked_add(1)
            .ok_or(Error::MathOverflow)?;
        let total_amount = append_stage(&mut grant.milestones, stage_number, &milestone_amounts)?;
        write_grant(&env, grant_id, &grant);

        events::emit_stage_added(
            &env,
            StageAdded {
                grant_id,
                builder: grant.builder,
                stage_number,
                milestone_count: milestone_amounts.len(),
                total_amount,
            },
        );
        Ok(())
    }

    /// Records `caller` as the approver. A later approval by another steward
    /// replaces the earlier one as long as the milestone is not completed.
    pub fn approve_milestone(
        env: Env,
        caller: Address,
        grant_id: u64,
        stage_number: u32,
        milestone_number: u32,
    ) -> Result<(), Error> {
        require_steward_op(&env, &caller)?;

        let mut grant = read_grant(&env, grant_id)?;
        let (index, mut milestone) = find_milestone(&grant, stage_number, milestone_number)?;
        if milestone.completed {
            return Err(Error::MilestoneAlreadyCompleted);
        }

        milestone.approved_by = Some(caller.clone());
        grant.milestones.set(index, milestone);
        write_grant(&env, grant_id, &grant);

        events::emit_milestone_approved(
            &env,
            MilestoneApproved {
                grant_id,
                stage_number,
                milestone_number,
                approver: caller,
            },
        );
        Ok(())
    }

    /// Completes an approved milestone and pays its amount to the builder.
    /// The completer must be a different steward from the approver.
    pub fn complete_milestone(
        env: Env,
        caller: Address,
        grant_id: u64,
        stage_number: u32,
        milestone_number: u32,
        description: String,
        proof: String,
    ) -> Result<(), Error> {
        require_steward_op(&env, &caller)?;

        let mut grant = read_grant(&env, grant_id)?;
        let (index, mut milestone) = find_milestone(&grant, stage_number, milestone_number)?;

        if milestone.completed {
            return Err(Error::MilestoneAlreadyCompleted);
        }
        let approver = milestone
            .approved_by
            .clone()
            .ok_or(Error::MilestoneNotApproved)?;
        if approver == caller {
            return Err(Error::SameApproverAndCompleter);
        }

        let amount = milestone.amount;
        milestone.completed = true;
        milestone.completed_by = Some(caller.clone());
        grant.milestones.set(index, milestone);
        write_grant(&env, grant_id, &grant);

        let token = token::Client::new(&env, &read_grant_token(&env)?);
        match token.try_transfer(&env.current_contract_address(), &grant.builder, &amount) {
            Ok(Ok(())) => {}
            _ => return Err(Error::TokenTransferFailed),
        }

        events::emit_milestone_completed(
            &env,
            MilestoneCompleted {
                grant_id,
                stage_number,
                milestone_number,
                completer: caller,
                builder: grant.builder,
                amount,
                description,
                proof,
            },
        );
        Ok(())
    }

    pub fn change_builder_address(
        env: Env,
        grant_id: u64,
        new_builder: Address,
    ) -> Result<(), Error> {
        let access = AccessControl::new(&env);
        access.require_not_paused()?;
        access.require_admin()?;
        require_external(&env, &new_builder)?;

        let mut grant = read_grant(&env, grant_id)?;
        let previous = grant.builder;
        grant.builder = new_builder.clone();
        write_grant(&env, grant_id, &grant);

        events::emit_builder_changed(
            &env,
            BuilderChanged {
                grant_id,
                previous,
                builder: new_builder,
            },
        );
        Ok(())
    }

    /// Builder of a grant.
    pub fn grants(env: Env, grant_id: u64) -> Result<Address, Error> {
        Ok(read_grant(&env, grant_id)?.builder)
    }

    pub fn grant_data(env: Env, grant_id: u64) -> Result<MilestoneGrant, Error> {
        read_grant(&env, grant_id)
    }

    pub fn get_milestone(
        env: Env,
        grant_id: u64,
        stage_number: u32,
        milestone_number: u32,
    ) -> Result<Milestone, Error> {
        let grant = read_grant(&env, grant_id)?;
        let (_, milestone) = find_milestone(&grant, stage_number, milestone_number)?;
        Ok(milestone)
    }

    pub fn stage_count(env: Env, grant_id: u64) -> Result<u32, Error> {
        Ok(last_stage(&read_grant(&env, grant_id)?))
    }

    pub fn grant_token(env: Env) -> Result<Address, Error> {
        read_grant_token(&env)
    }

    pub fn add_steward(env: Env, account: Address) -> Result<(), Error> {
        Ok(AccessControl::new(&env).grant_steward(&account)?)
    }

    pub fn remove_steward(env: Env, account: Address) -> Result<(), Error> {
        Ok(AccessControl::new(&env).revoke_steward(&account)?)
    }

    pub fn transfer_admin(env: Env, new_admin: Address) -> Result<(), Error> {
        Ok(AccessControl::new(&env).transfer_admin(&new_admin)?)
    }

    pub fn pause(env: Env) -> Result<(), Error> {
        Ok(AccessControl::new(&env).pause()?)
    }

    pub fn unpause(env: Env) -> Result<(), Error> {
        Ok(AccessControl::new(&env).unpause()?)
    }

    pub fn admin(env: Env) -> Result<Address, Error> {
        Ok(AccessControl::new(&env).admin()?)
    }

    pub fn is_steward(env: Env, account: Address) -> bool {
        AccessControl::new(&env).is_steward(&account)
    }

    pub fn paused(env: Env) -> bool {
        AccessControl::new(&env).is_paused()
    }
}
