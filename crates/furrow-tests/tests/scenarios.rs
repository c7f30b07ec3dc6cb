//! Multi-pool reward scenarios.
//!
//! Each test drives a farm through a schedule of deposits, withdrawals and
//! admin changes on an explicit block clock, then compares earned reward
//! against closed-form expectations computed interval by interval.
//!
//! Scenarios covered:
//! - One pool with depositors joining and leaving
//! - Several pools with independent stakers
//! - Pool weight raised, lowered and set to zero mid-stream
//! - A new pool registered while others are accruing
//! - Reward rate changed mid-stream
//! - Harvesting, including from a disabled pool

use furrow_core::constants::{DEFAULT_REWARD_PER_BLOCK, UNIT};
use furrow_core::error::FarmError;
use furrow_core::traits::TokenLedger;
use furrow_core::types::{Amount, BlockNumber, Weight};
use furrow_tests::helpers::*;

const R: Amount = DEFAULT_REWARD_PER_BLOCK;
const DUST: Amount = 1_000;

/// Reward one staker earns over an interval: the pool's per-block share,
/// times the interval length, pro rata to stake.
fn slice(
    weight: Weight,
    total_weight: Weight,
    blocks: BlockNumber,
    stake: Amount,
    pool_stake: Amount,
) -> Amount {
    R * weight / total_weight * Amount::from(blocks) * stake / pool_stake
}

fn e18(n: u128) -> Amount {
    n * UNIT
}

// ---------------------------------------------------------------------------
// Single pool
// ---------------------------------------------------------------------------

#[test]
fn single_pool_stakers_join_and_leave() {
    init_tracing();
    let mut farm = new_farm();
    let (alice, bob, lp) = (addr(1), addr(2), asset(1));
    fund(&mut farm, lp, alice, e18(10));
    fund(&mut farm, lp, bob, e18(20));
    farm.register_pool(ADMIN, lp, 3, 0).unwrap();

    assert_eq!(farm.earned_reward(&lp, &alice, 0).unwrap(), 0);

    farm.deposit(alice, lp, e18(5), 0).unwrap();
    let mut a = slice(1, 1, 5, 5, 5);
    assert_eq!(farm.earned_reward(&lp, &alice, 5).unwrap(), a);
    assert_eq!(farm.earned_reward(&lp, &bob, 5).unwrap(), 0);

    farm.deposit(bob, lp, e18(7), 5).unwrap();
    a += slice(1, 1, 4, 5, 12);
    let mut b = slice(1, 1, 4, 7, 12);
    assert_eq!(farm.earned_reward(&lp, &alice, 9).unwrap(), a);
    assert_eq!(farm.earned_reward(&lp, &bob, 9).unwrap(), b);

    farm.withdraw(alice, lp, e18(1), 9).unwrap();
    a += slice(1, 1, 3, 4, 11);
    b += slice(1, 1, 3, 7, 11);
    assert_close(farm.earned_reward(&lp, &alice, 12).unwrap(), a, DUST);
    assert_close(farm.earned_reward(&lp, &bob, 12).unwrap(), b, DUST);

    farm.deposit(alice, lp, e18(3), 12).unwrap();
    a += slice(1, 1, 2, 7, 14);
    b += slice(1, 1, 2, 7, 14);
    assert_close(farm.earned_reward(&lp, &alice, 14).unwrap(), a, DUST);
    assert_close(farm.earned_reward(&lp, &bob, 14).unwrap(), b, DUST);

    farm.withdraw(alice, lp, e18(4), 14).unwrap();
    a += slice(1, 1, 1, 3, 10);
    b += slice(1, 1, 1, 7, 10);
    let alice_earned = farm.earned_reward(&lp, &alice, 15).unwrap();
    let bob_earned = farm.earned_reward(&lp, &bob, 15).unwrap();
    assert_close(alice_earned, a, DUST);
    assert_close(bob_earned, b, DUST);

    // Staked from block 0 throughout: the whole emission was distributed.
    assert_close(alice_earned + bob_earned, 15 * R, DUST);
    assert!(alice_earned + bob_earned <= 15 * R);

    assert_eq!(farm.staked_amount(&lp, &alice), e18(3));
    assert_eq!(farm.staked_amount(&lp, &bob), e18(7));
    assert_eq!(farm.ledger().balance_of(&lp, &CUSTODY), e18(10));
}

#[test]
fn new_pool_joins_without_repricing_history() {
    let mut farm = new_farm();
    let (x, a, b) = (addr(1), asset(1), asset(2));
    fund(&mut farm, a, x, e18(5));
    farm.register_pool(ADMIN, a, 3, 0).unwrap();
    farm.deposit(x, a, e18(5), 0).unwrap();

    assert_eq!(farm.earned_reward(&a, &x, 5).unwrap(), 15 * UNIT / 10);
    farm.register_pool(ADMIN, b, 1, 5).unwrap();
    assert_eq!(farm.earned_reward(&a, &x, 9).unwrap(), 24 * UNIT / 10);
    assert_eq!(farm.pool(&b).unwrap().total_staked, 0);
}

// ---------------------------------------------------------------------------
// Multiple pools
// ---------------------------------------------------------------------------

#[test]
fn multiple_pools_split_by_weight() {
    let mut farm = new_farm();
    let (alice, bob) = (addr(1), addr(2));
    let (lp1, lp2) = (asset(1), asset(2));
    for holder in [alice, bob] {
        fund(&mut farm, lp1, holder, e18(20));
        fund(&mut farm, lp2, holder, e18(20));
    }
    farm.register_pool(ADMIN, lp1, 3, 0).unwrap();
    farm.register_pool(ADMIN, lp2, 5, 0).unwrap();

    farm.deposit(alice, lp1, e18(5), 0).unwrap();
    farm.deposit(bob, lp1, e18(7), 5).unwrap();
    farm.deposit(alice, lp2, e18(8), 9).unwrap();
    farm.deposit(bob, lp2, e18(9), 12).unwrap();

    let at = 14;
    let a1 = slice(3, 8, 5, 5, 5) + slice(3, 8, at - 5, 5, 12);
    let b1 = slice(3, 8, at - 5, 7, 12);
    let a2 = slice(5, 8, 3, 8, 8) + slice(5, 8, at - 12, 8, 17);
    let b2 = slice(5, 8, at - 12, 9, 17);

    assert_close(farm.earned_reward(&lp1, &alice, at).unwrap(), a1, DUST);
    assert_close(farm.earned_reward(&lp1, &bob, at).unwrap(), b1, DUST);
    assert_close(farm.earned_reward(&lp2, &alice, at).unwrap(), a2, DUST);
    assert_close(farm.earned_reward(&lp2, &bob, at).unwrap(), b2, DUST);

    // Nothing was staked in lp2 for blocks 0..9.
    let distributed = a1 + b1 + a2 + b2;
    assert_close(distributed, R * 3 / 8 * 14 + R * 5 / 8 * 5, DUST);
}

#[test]
fn pool_added_while_others_accrue() {
    let mut farm = new_farm();
    let (alice, bob) = (addr(1), addr(2));
    let (lp1, lp2, lp3) = (asset(1), asset(2), asset(3));
    for holder in [alice, bob] {
        fund(&mut farm, lp1, holder, e18(20));
        fund(&mut farm, lp2, holder, e18(20));
    }
    fund(&mut farm, lp3, alice, e18(30));
    farm.register_pool(ADMIN, lp1, 3, 0).unwrap();
    farm.register_pool(ADMIN, lp2, 5, 0).unwrap();

    farm.deposit(alice, lp1, e18(5), 0).unwrap();
    farm.deposit(bob, lp1, e18(7), 5).unwrap();
    farm.deposit(alice, lp2, e18(8), 9).unwrap();
    farm.deposit(bob, lp2, e18(9), 12).unwrap();

    assert_eq!(farm.earned_reward(&lp3, &alice, 14).unwrap(), 0);
    farm.register_pool(ADMIN, lp3, 7, 14).unwrap();
    assert_eq!(farm.total_weight(), 15);
    farm.deposit(alice, lp3, e18(6), 14).unwrap();
    farm.withdraw(bob, lp2, e18(3), 15).unwrap();

    let end = 21;
    let a1 = slice(3, 8, 5, 5, 5) + slice(3, 8, 9, 5, 12) + slice(3, 15, end - 14, 5, 12);
    let b1 = slice(3, 8, 9, 7, 12) + slice(3, 15, end - 14, 7, 12);
    let a2 = slice(5, 8, 3, 8, 8)
        + slice(5, 8, 2, 8, 17)
        + slice(5, 15, 1, 8, 17)
        + slice(5, 15, end - 15, 8, 14);
    let b2 = slice(5, 8, 2, 9, 17) + slice(5, 15, 1, 9, 17) + slice(5, 15, end - 15, 6, 14);
    let a3 = slice(7, 15, end - 14, 6, 6);

    assert_close(farm.earned_reward(&lp1, &alice, end).unwrap(), a1, DUST);
    assert_close(farm.earned_reward(&lp1, &bob, end).unwrap(), b1, DUST);
    assert_close(farm.earned_reward(&lp2, &alice, end).unwrap(), a2, DUST);
    assert_close(farm.earned_reward(&lp2, &bob, end).unwrap(), b2, DUST);
    assert_close(farm.earned_reward(&lp3, &alice, end).unwrap(), a3, DUST);
}

// ---------------------------------------------------------------------------
// Weight and rate changes
// ---------------------------------------------------------------------------

#[test]
fn weight_lowered_mid_stream() {
    let mut farm = new_farm();
    let (alice, bob) = (addr(1), addr(2));
    let (lp1, lp2) = (asset(1), asset(2));
    fund(&mut farm, lp1, alice, e18(10));
    fund(&mut farm, lp2, bob, e18(10));
    farm.register_pool(ADMIN, lp1, 3, 0).unwrap();
    farm.register_pool(ADMIN, lp2, 5, 0).unwrap();
    farm.deposit(alice, lp1, e18(5), 0).unwrap();
    farm.deposit(bob, lp2, e18(4), 0).unwrap();

    assert_eq!(farm.set_weight(ADMIN, lp1, 1, 6).unwrap(), 3);
    let a = slice(3, 8, 6, 5, 5) + slice(1, 6, 4, 5, 5);
    let b = slice(5, 8, 6, 4, 4) + slice(5, 6, 4, 4, 4);
    assert_close(farm.earned_reward(&lp1, &alice, 10).unwrap(), a, DUST);
    assert_close(farm.earned_reward(&lp2, &bob, 10).unwrap(), b, DUST);
}

#[test]
fn weight_raised_after_being_zeroed() {
    let mut farm = new_farm();
    let (alice, bob) = (addr(1), addr(2));
    let (lp1, lp2) = (asset(1), asset(2));
    fund(&mut farm, lp1, alice, e18(10));
    fund(&mut farm, lp2, bob, e18(10));
    farm.register_pool(ADMIN, lp1, 3, 0).unwrap();
    farm.register_pool(ADMIN, lp2, 1, 0).unwrap();
    farm.deposit(alice, lp1, e18(2), 0).unwrap();
    farm.deposit(bob, lp2, e18(2), 0).unwrap();

    farm.set_weight(ADMIN, lp1, 0, 4).unwrap();
    assert_eq!(farm.total_weight(), 1);
    farm.set_weight(ADMIN, lp1, 5, 8).unwrap();
    assert_eq!(farm.total_weight(), 6);

    let a = slice(3, 4, 4, 2, 2) + slice(5, 6, 2, 2, 2);
    let b = slice(1, 4, 4, 2, 2) + slice(1, 1, 4, 2, 2) + slice(1, 6, 2, 2, 2);
    assert_close(farm.earned_reward(&lp1, &alice, 10).unwrap(), a, DUST);
    assert_close(farm.earned_reward(&lp2, &bob, 10).unwrap(), b, DUST);
}

#[test]
fn zero_weight_pool_stops_accruing_and_rejects_deposits() {
    let mut farm = new_farm();
    let (alice, bob) = (addr(1), addr(2));
    let (lp1, lp2) = (asset(1), asset(2));
    fund(&mut farm, lp1, alice, e18(10));
    fund(&mut farm, lp2, bob, e18(10));
    farm.register_pool(ADMIN, lp1, 3, 0).unwrap();
    farm.register_pool(ADMIN, lp2, 5, 0).unwrap();
    farm.deposit(alice, lp1, e18(5), 0).unwrap();
    farm.deposit(bob, lp2, e18(5), 0).unwrap();

    farm.set_weight(ADMIN, lp1, 0, 8).unwrap();
    let frozen = slice(3, 8, 8, 5, 5);
    assert_close(farm.earned_reward(&lp1, &alice, 8).unwrap(), frozen, DUST);
    assert_close(farm.earned_reward(&lp1, &alice, 80).unwrap(), frozen, DUST);

    // The remaining pool now takes the whole emission.
    let b = slice(5, 8, 8, 5, 5) + slice(5, 5, 72, 5, 5);
    assert_close(farm.earned_reward(&lp2, &bob, 80).unwrap(), b, DUST);

    assert_eq!(
        farm.deposit(alice, lp1, e18(1), 80),
        Err(FarmError::ZeroWeightPool(lp1))
    );
    farm.withdraw(alice, lp1, e18(5), 80).unwrap();
    assert_eq!(farm.ledger().balance_of(&lp1, &alice), e18(10));
}

#[test]
fn reward_rate_changed_mid_stream() {
    let mut farm = new_farm();
    let (alice, bob) = (addr(1), addr(2));
    let (lp1, lp2) = (asset(1), asset(2));
    fund(&mut farm, lp1, alice, e18(10));
    fund(&mut farm, lp2, bob, e18(10));
    farm.register_pool(ADMIN, lp1, 3, 0).unwrap();
    farm.register_pool(ADMIN, lp2, 1, 0).unwrap();
    farm.deposit(alice, lp1, e18(5), 0).unwrap();
    farm.deposit(bob, lp2, e18(8), 2).unwrap();

    let new_rate = e18(2);
    farm.set_reward_rate(ADMIN, new_rate, 7).unwrap();
    assert_eq!(farm.reward_per_block(), new_rate);
    assert_eq!(farm.total_weight(), 4);

    let a = slice(3, 4, 7, 5, 5) + new_rate * 3 / 4 * 3;
    let b = slice(1, 4, 5, 8, 8) + new_rate / 4 * 3;
    assert_close(farm.earned_reward(&lp1, &alice, 10).unwrap(), a, DUST);
    assert_close(farm.earned_reward(&lp2, &bob, 10).unwrap(), b, DUST);
}

// ---------------------------------------------------------------------------
// Harvest
// ---------------------------------------------------------------------------

#[test]
fn harvest_pays_reward_and_keeps_principal() {
    let mut farm = new_farm();
    let (alice, bob) = (addr(1), addr(2));
    let (lp1, lp2) = (asset(1), asset(2));
    for holder in [alice, bob] {
        fund(&mut farm, lp1, holder, e18(20));
        fund(&mut farm, lp2, holder, e18(20));
    }
    farm.register_pool(ADMIN, lp1, 3, 0).unwrap();
    farm.register_pool(ADMIN, lp2, 1, 0).unwrap();
    farm.deposit(alice, lp1, e18(5), 0).unwrap();
    farm.deposit(bob, lp1, e18(7), 0).unwrap();
    farm.deposit(alice, lp2, e18(6), 0).unwrap();
    farm.deposit(bob, lp2, e18(8), 0).unwrap();

    let a1 = farm.earned_reward(&lp1, &alice, 4).unwrap();
    let a2 = farm.earned_reward(&lp2, &alice, 4).unwrap();
    assert_close(a1, slice(3, 4, 4, 5, 12), DUST);
    assert_close(a2, slice(1, 4, 4, 6, 14), DUST);

    farm.harvest(alice, lp1, a1, 4).unwrap();
    farm.harvest(alice, lp2, a2 / 2, 4).unwrap();

    assert_eq!(farm.ledger().balance_of(&REWARD_ASSET, &alice), a1 + a2 / 2);
    assert_eq!(farm.earned_reward(&lp1, &alice, 4).unwrap(), 0);
    assert_eq!(farm.earned_reward(&lp2, &alice, 4).unwrap(), a2 - a2 / 2);
    assert_eq!(farm.staked_amount(&lp1, &alice), e18(5));
    assert_eq!(
        farm.ledger().balance_of(&REWARD_ASSET, &CUSTODY),
        REWARD_RESERVE - a1 - a2 / 2
    );
    // Bob is unaffected by Alice's harvest.
    assert_close(
        farm.earned_reward(&lp1, &bob, 4).unwrap(),
        slice(3, 4, 4, 7, 12),
        DUST
    );
}

#[test]
fn harvest_more_than_collected_rejected() {
    let mut farm = new_farm();
    let (alice, lp) = (addr(1), asset(1));
    fund(&mut farm, lp, alice, e18(5));
    farm.register_pool(ADMIN, lp, 1, 0).unwrap();
    farm.deposit(alice, lp, e18(5), 0).unwrap();

    let earned = farm.earned_reward(&lp, &alice, 3).unwrap();
    assert_eq!(
        farm.harvest(alice, lp, earned + 1, 3),
        Err(FarmError::InsufficientReward { have: earned, need: earned + 1 })
    );
    assert_eq!(farm.ledger().balance_of(&REWARD_ASSET, &alice), 0);
    assert_eq!(farm.earned_reward(&lp, &alice, 3).unwrap(), earned);
}

#[test]
fn harvest_from_unregistered_pool_rejected() {
    let mut farm = new_farm();
    assert_eq!(
        farm.harvest(addr(1), asset(9), 0, 1),
        Err(FarmError::UnknownPool(asset(9)))
    );
}

#[test]
fn harvest_allowed_after_weight_zeroed() {
    let mut farm = new_farm();
    let (alice, lp) = (addr(1), asset(1));
    fund(&mut farm, lp, alice, e18(5));
    farm.register_pool(ADMIN, lp, 2, 0).unwrap();
    farm.deposit(alice, lp, e18(5), 0).unwrap();
    farm.set_weight(ADMIN, lp, 0, 6).unwrap();

    let earned = farm.earned_reward(&lp, &alice, 20).unwrap();
    assert_eq!(earned, 6 * R);
    farm.harvest(alice, lp, earned, 20).unwrap();
    assert_eq!(farm.ledger().balance_of(&REWARD_ASSET, &alice), earned);
    assert_eq!(farm.earned_reward(&lp, &alice, 30).unwrap(), 0);
}

#[test]
fn interleaved_deposits_and_withdrawals_conserve_stake() {
    let mut farm = new_farm();
    let (alice, bob, lp) = (addr(1), addr(2), asset(1));
    fund(&mut farm, lp, alice, e18(10));
    fund(&mut farm, lp, bob, e18(10));
    farm.register_pool(ADMIN, lp, 1, 0).unwrap();

    let mut block = 0;
    for round in 1..=5u128 {
        farm.deposit(alice, lp, e18(round), block).unwrap();
        block += 1;
        farm.deposit(bob, lp, e18(1), block).unwrap();
        block += 1;
        farm.withdraw(alice, lp, e18(round) / 2, block).unwrap();
        block += 1;
    }

    let pool = farm.pool(&lp).unwrap();
    let summed: Amount = farm.positions().positions_in(&lp).map(|(_, p)| p.amount).sum();
    assert_eq!(pool.total_staked, summed);
    assert_eq!(farm.ledger().balance_of(&lp, &CUSTODY), summed);
    assert_eq!(
        farm.staked_amount(&lp, &alice) + farm.ledger().balance_of(&lp, &alice),
        e18(10)
    );
}
