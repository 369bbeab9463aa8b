#![no_std]

mod events;
mod unlock;

pub use events::{AddGrant, Deposit, MoveGrantToNextStage, UpdateGrant, Withdraw};
pub use unlock::{unlocked_amount, FULL_STREAM_UNLOCK_PERIOD};

use grant_access::{
    bump_instance, require_external, AccessControl, AccessError, PERSISTENT_BUMP_AMOUNT,
    PERSISTENT_LIFETIME_THRESHOLD,
};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, token, Address, Env, String, Vec,
};

/// Largest unlocked-but-unwithdrawn balance a stream may leave behind when it
/// moves to its next stage: 0.01 of a 7-decimal native unit.
pub const STAGE_DUST_THRESHOLD: i128 = 100_000;

#[contract]
pub struct GrantStreamContract;

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct GrantStream {
    pub id: u64,
    pub builder: Address,
    /// Allocation of the current stage.
    pub cap: i128,
    /// Last withdrawal or stage reset; the unlock curve starts here.
    pub last_checkpoint: u64,
    pub amount_left: i128,
    pub grant_number: u32,
    pub stage_number: u32,
}

#[derive(Clone)]
#[contracttype]
enum DataKey {
    /// Token contract of the native asset paid out by streams.
    NativeToken,
    StreamCount,
    Stream(u64),
    BuilderStreams(Address),
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
    StreamNotFound = 7,
    IndexOutOfBounds = 8,
    InvalidAmount = 9,
    MathOverflow = 10,
    UnauthorizedWithdrawal = 11,
    NoActiveStream = 12,
    InsufficientStreamFunds = 13,
    InsufficientContractFunds = 14,
    FailedToSendNative = 15,
    PreviousAmountNotFullyWithdrawn = 16,
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

fn read_native_token(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::NativeToken)
        .ok_or(Error::NotInitialized)
}

fn read_stream_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::StreamCount)
        .unwrap_or(0)
}

fn read_stream(env: &Env, id: u64) -> Result<GrantStream, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Stream(id))
        .ok_or(Error::StreamNotFound)
}

fn write_stream(env: &Env, stream: &GrantStream) {
    let key = DataKey::Stream(stream.id);
    env.storage().persistent().set(&key, stream);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn read_builder_streams(env: &Env, builder: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::BuilderStreams(builder.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

fn write_builder_streams(env: &Env, builder: &Address, ids: &Vec<u64>) {
    let key = DataKey::BuilderStreams(builder.clone());
    env.storage().persistent().set(&key, ids);
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

#[contractimpl]
impl GrantStreamContract {
    /// Sets the admin (also the first steward) and the native token contract.
    pub fn initialize(env: Env, admin: Address, native_token: Address) -> Result<(), Error> {
        AccessControl::new(&env).init(&admin)?;
        env.storage()
            .instance()
            .set(&DataKey::NativeToken, &native_token);
        env.storage().instance().set(&DataKey::StreamCount, &0u64);
        bump_instance(&env);
        Ok(())
    }

    /// Opens a stream at stage 1 with its whole `cap` left to unlock. A zero
    /// cap is accepted and leaves the stream inert until it is re-capitalised.
    pub fn add_grant_stream(
        env: Env,
        caller: Address,
        builder: Address,
        cap: i128,
        grant_number: u32,
    ) -> Result<u64, Error> {
        require_steward_op(&env, &caller)?;
        require_external(&env, &builder)?;

        if cap < 0 {
            return Err(Error::InvalidAmount);
        }

        let id = read_stream_count(&env);
        let next_id = id.checked_add(1).ok_or(Error::MathOverflow)?;

        let stream = GrantStream {
            id,
            builder: builder.clone(),
            cap,
            last_checkpoint: env.ledger().timestamp(),
            amount_left: cap,
            grant_number,
            stage_number: 1,
        };
        write_stream(&env, &stream);
        env.storage().instance().set(&DataKey::StreamCount, &next_id);
        bump_instance(&env);

        let mut ids = read_builder_streams(&env, &builder);
        ids.push_back(id);
        write_builder_streams(&env, &builder, &ids);

        events::emit_add_grant(
            &env,
            AddGrant {
                id,
                builder,
                cap,
                grant_number,
                stage_number: stream.stage_number,
            },
        );

        Ok(id)
    }

    /// Overwrites a stream's bookkeeping, e.g. to zero it out or correct it.
    pub fn update_grant(
        env: Env,
        caller: Address,
        id: u64,
        cap: i128,
        last_checkpoint: u64,
        amount_left: i128,
        stage_number: u32,
    ) -> Result<(), Error> {
        require_steward_op(&env, &caller)?;

        let mut stream = read_stream(&env, id)?;

        if cap < 0 || amount_left < 0 || amount_left > cap {
            return Err(Error::InvalidAmount);
        }

        stream.cap = cap;
        stream.last_checkpoint = last_checkpoint;
        stream.amount_left = amount_left;
        stream.stage_number = stage_number;
        write_stream(&env, &stream);

        events::emit_update_grant(
            &env,
            UpdateGrant {
                id,
                builder: stream.builder,
                cap,
                last_checkpoint,
                amount_left,
                stage_number,
            },
        );

        Ok(())
    }

    /// Replaces the stage allocation with `new_cap` once at most
    /// [`STAGE_DUST_THRESHOLD`] is unlocked and unclaimed. Only the unlocked
    /// portion is measured, so a stream that has not accrued yet can always
    /// move on and its locked remainder is discarded.
    pub fn move_grant_to_next_stage(
        env: Env,
        caller: Address,
        id: u64,
        new_cap: i128,
    ) -> Result<(), Error> {
        require_steward_op(&env, &caller)?;

        if new_cap < 0 {
            return Err(Error::InvalidAmount);
        }

        let mut stream = read_stream(&env, id)?;
        let now = env.ledger().timestamp();

        let unlocked = unlocked_amount(stream.amount_left, stream.last_checkpoint, now)?;
        if unlocked > STAGE_DUST_THRESHOLD {
            return Err(Error::PreviousAmountNotFullyWithdrawn);
        }

        stream.stage_number = stream
            .stage_number
            .checked_add(1)
            .ok_or(Error::MathOverflow)?;
        stream.cap = new_cap;
        stream.amount_left = new_cap;
        stream.last_checkpoint = now;
        write_stream(&env, &stream);

        events::emit_move_to_next_stage(
            &env,
            MoveGrantToNextStage {
                id,
                builder: stream.builder,
                cap: new_cap,
                stage_number: stream.stage_number,
            },
        );

        Ok(())
    }

    /// Pays `amount` of the unlocked balance to the stream's builder and
    /// restarts the unlock curve from now.
    pub fn stream_withdraw(
        env: Env,
        caller: Address,
        id: u64,
        amount: i128,
        reason: String,
    ) -> Result<(), Error> {
        AccessControl::new(&env).require_not_paused()?;
        caller.require_auth();

        let mut stream = read_stream(&env, id)?;

        if caller != stream.builder {
            return Err(Error::UnauthorizedWithdrawal);
        }
        if stream.cap == 0 {
            return Err(Error::NoActiveStream);
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let now = env.ledger().timestamp();
        let unlocked = unlocked_amount(stream.amount_left, stream.last_checkpoint, now)?;
        if amount > unlocked {
            return Err(Error::InsufficientStreamFunds);
        }

        let contract = env.current_contract_address();
        let token = token::Client::new(&env, &read_native_token(&env)?);
        if token.balance(&contract) < amount {
            return Err(Error::InsufficientContractFunds);
        }

        stream.amount_left = stream
            .amount_left
            .checked_sub(amount)
            .ok_or(Error::MathOverflow)?;
        stream.last_checkpoint = now;
        write_stream(&env, &stream);

        match token.try_transfer(&contract, &stream.builder, &amount) {
            Ok(Ok(())) => {}
            _ => return Err(Error::FailedToSendNative),
        }

        events::emit_withdraw(
            &env,
            Withdraw {
                id,
                builder: stream.builder,
                amount,
                reason,
                grant_number: stream.grant_number,
                stage_number: stream.stage_number,
            },
        );

        Ok(())
    }

    /// Moves `amount` of the native token from `from` into the contract.
    /// Plain transfers to the contract address fund streams just as well.
    pub fn deposit(env: Env, from: Address, amount: i128) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        let native_token = read_native_token(&env)?;
        from.require_auth();

        let client = token::Client::new(&env, &native_token);
        client.transfer(&from, &env.current_contract_address(), &amount);

        events::emit_deposit(&env, Deposit { from, amount });
        Ok(())
    }

    pub fn unlocked_grant_amount(env: Env, id: u64) -> Result<i128, Error> {
        let stream = read_stream(&env, id)?;
        unlocked_amount(
            stream.amount_left,
            stream.last_checkpoint,
            env.ledger().timestamp(),
        )
    }

    pub fn get_grant_stream(env: Env, id: u64) -> Result<GrantStream, Error> {
        read_stream(&env, id)
    }

    pub fn grant_stream_count(env: Env) -> u64 {
        read_stream_count(&env)
    }

    pub fn builder_grants(env: Env, builder: Address, index: u64) -> Result<u64, Error> {
        let ids = read_builder_streams(&env, &builder);
        let index = u32::try_from(index).map_err(|_| Error::IndexOutOfBounds)?;
        ids.get(index).ok_or(Error::IndexOutOfBounds)
    }

    pub fn get_builder_grant_count(env: Env, builder: Address) -> u64 {
        u64::from(read_builder_streams(&env, &builder).len())
    }

    pub fn get_builder_grants(env: Env, builder: Address) -> Vec<u64> {
        read_builder_streams(&env, &builder)
    }

    pub fn native_token(env: Env) -> Result<Address, Error> {
        read_native_token(&env)
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
