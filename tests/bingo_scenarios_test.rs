//! Contract-level scenarios: deploy, configure, join, start and draw

use bingo::{
    Address, Bingo, BingoError, Board, CallContext, GameError, GamePhase, GlobalConfig,
    HashChainEntropy, LedgerError, MemoryLedger, Timestamp, TokenLedger,
};
use std::collections::HashSet;

type Contract = Bingo<MemoryLedger, HashChainEntropy>;

/// Wall-clock reading taken by the deployer before sending the deploy call
const NOW: Timestamp = 1_700_000_000;
/// The deploy lands one second later
const DEPLOYED_AT: Timestamp = NOW + 1;

struct Fixture {
    owner: Address,
    addr1: Address,
    addr2: Address,
    bingo: Contract,
}

fn deploy_fixture() -> Fixture {
    let owner = Address::derive("owner");
    let bingo = Bingo::deploy(
        CallContext::new(owner, DEPLOYED_AT),
        Address::derive("bingo-contract"),
        GlobalConfig::new(100, 10, 10),
        MemoryLedger::new(),
        HashChainEntropy::new([7; 32]),
    );

    Fixture {
        owner,
        addr1: Address::derive("addr1"),
        addr2: Address::derive("addr2"),
        bingo,
    }
}

fn fund(bingo: &mut Contract, player: Address, minted: u64, approved: u64) {
    let custody = bingo.address();
    bingo.ledger_mut().mint(player, minted).unwrap();
    bingo.ledger_mut().approve(player, custody, approved);
}

#[test]
fn test_initializes_fees_join_and_turn_time() {
    let Fixture { bingo, .. } = deploy_fixture();

    assert_eq!(bingo.fees(), 100);
    assert_eq!(bingo.join_duration_time(), NOW + 11);
    assert_eq!(bingo.turn_duration_time(), 10);
}

#[test]
fn test_owner_updates_fees_join_and_turn_duration() {
    let Fixture { mut bingo, owner, .. } = deploy_fixture();
    let ctx = CallContext::new(owner, DEPLOYED_AT + 1);

    bingo.update_fees(ctx, 110).unwrap();
    bingo.update_join_duration_time(ctx, 11).unwrap();
    bingo.update_turn_duration_time(ctx, 11).unwrap();

    assert_eq!(bingo.fees(), 110);
    assert_eq!(bingo.join_duration_time(), 11);
    assert_eq!(bingo.turn_duration_time(), 11);
}

#[test]
fn test_non_owner_cannot_update_parameters() {
    let Fixture { mut bingo, addr1, .. } = deploy_fixture();
    let ctx = CallContext::new(addr1, DEPLOYED_AT + 1);

    for result in [
        bingo.update_fees(ctx, 1),
        bingo.update_join_duration_time(ctx, 1),
        bingo.update_turn_duration_time(ctx, 1),
        bingo.start_new_game(ctx, 1),
    ] {
        assert!(matches!(
            result,
            Err(BingoError::Game(GameError::Unauthorized { caller })) if caller == addr1
        ));
    }
    assert_eq!(bingo.fees(), 100);
    assert_eq!(bingo.join_duration_time(), NOW + 11);
}

#[test]
fn test_starts_game_after_join_window() {
    let Fixture { mut bingo, owner, .. } = deploy_fixture();
    let et = bingo.join_duration_time();

    bingo.start_new_game(CallContext::new(owner, et + 2), 1).unwrap();

    assert!(bingo.game_start(1));
    assert_eq!(bingo.game_phase(1, et + 2), Some(GamePhase::InProgress));
}

#[test]
fn test_start_before_deadline_then_twice() {
    let Fixture { mut bingo, owner, addr1, .. } = deploy_fixture();
    fund(&mut bingo, addr1, 1_000, 100);
    bingo.create_board(CallContext::new(addr1, 2_000_000_000), 1).unwrap();
    let deadline = bingo.game(1).unwrap().join_deadline;

    let early = bingo.start_new_game(CallContext::new(owner, deadline - 1), 1);
    assert!(matches!(
        early,
        Err(BingoError::Game(GameError::JoinWindowStillOpen { game_id: 1, .. }))
    ));
    assert!(!bingo.game_start(1));

    bingo.start_new_game(CallContext::new(owner, deadline), 1).unwrap();
    let again = bingo.start_new_game(CallContext::new(owner, deadline + 1), 1);
    assert!(matches!(again, Err(BingoError::Game(GameError::AlreadyStarted(1)))));
}

#[test]
fn test_creates_bingo_ticket_for_player() {
    let Fixture { mut bingo, owner, .. } = deploy_fixture();
    fund(&mut bingo, owner, 1_000, 100);
    let et = bingo.join_duration_time();

    bingo.create_board(CallContext::new(owner, et + 2), 1).unwrap();

    assert_eq!(bingo.ledger().balance_of(&bingo.address()), 100);
    assert_eq!(bingo.number_of_player(1), 1);
}

#[test]
fn test_join_fails_after_deadline_or_start() {
    let Fixture { mut bingo, owner, addr1, addr2 } = deploy_fixture();
    fund(&mut bingo, addr1, 1_000, 1_000);
    fund(&mut bingo, addr2, 1_000, 1_000);

    bingo.create_board(CallContext::new(addr1, 5_000), 1).unwrap();
    let closed = bingo.create_board(CallContext::new(addr2, 5_010), 1);
    assert!(matches!(
        closed,
        Err(BingoError::Game(GameError::JoinWindowClosed { game_id: 1, deadline: 5_010 }))
    ));

    bingo.create_board(CallContext::new(addr1, 6_000), 2).unwrap();
    bingo.update_join_duration_time(CallContext::new(owner, 6_001), 0).unwrap();
    // Game 2 keeps its own window; the owner cannot start it early
    assert!(bingo.start_new_game(CallContext::new(owner, 6_005), 2).is_err());
    bingo.start_new_game(CallContext::new(owner, 6_010), 2).unwrap();
    let started = bingo.create_board(CallContext::new(addr2, 6_010), 2);
    assert!(matches!(started, Err(BingoError::Game(GameError::AlreadyStarted(2)))));

    assert_eq!(bingo.ledger().balance_of(&addr2), 1_000);
    assert_eq!(bingo.number_of_player(1), 1);
    assert_eq!(bingo.number_of_player(2), 1);
}

#[test]
fn test_k_joins_collect_k_fees() {
    let Fixture { mut bingo, .. } = deploy_fixture();
    let players: Vec<Address> = (0..25).map(|i| Address::derive(&format!("player-{i}"))).collect();
    for &player in &players {
        fund(&mut bingo, player, 1_000, 100);
    }

    for (i, &player) in players.iter().enumerate() {
        bingo.create_board(CallContext::new(player, 3_000 + i as u64 % 5), 4).unwrap();
    }

    assert_eq!(bingo.number_of_player(4), 25);
    assert_eq!(bingo.pot(4), 25 * bingo.fees());
    assert_eq!(bingo.ledger().balance_of(&bingo.address()), 25 * bingo.fees());
    assert_eq!(bingo.game(4).unwrap().players, players);
}

#[test]
fn test_boards_are_unique_within_a_game() {
    let Fixture { mut bingo, .. } = deploy_fixture();
    let players: Vec<Address> = (0..200).map(|i| Address::derive(&format!("p{i}"))).collect();
    for &player in &players {
        fund(&mut bingo, player, 100, 100);
        bingo.create_board(CallContext::new(player, 4_000), 9).unwrap();
    }

    let boards: HashSet<&Board> = players
        .iter()
        .map(|p| bingo.board_of(9, p).unwrap())
        .collect();
    assert_eq!(boards.len(), players.len());
}

#[test]
fn test_ledger_errors_leave_state_untouched() {
    let Fixture { mut bingo, addr1, addr2, .. } = deploy_fixture();
    fund(&mut bingo, addr1, 1_000, 99);
    fund(&mut bingo, addr2, 50, 100);

    let no_allowance = bingo.create_board(CallContext::new(addr1, 3_000), 1);
    assert!(matches!(
        no_allowance,
        Err(BingoError::Ledger(LedgerError::InsufficientAllowance { available: 99, required: 100, .. }))
    ));
    let no_balance = bingo.create_board(CallContext::new(addr2, 3_000), 1);
    assert!(matches!(
        no_balance,
        Err(BingoError::Ledger(LedgerError::InsufficientBalance { available: 50, .. }))
    ));

    assert_eq!(bingo.number_of_player(1), 0);
    assert!(bingo.game(1).is_none());
    assert_eq!(bingo.ledger().balance_of(&bingo.address()), 0);
    assert!(bingo.events().is_empty());
}

#[test]
fn test_creates_new_random_number_by_owner() {
    let Fixture { mut bingo, owner, .. } = deploy_fixture();

    let old = bingo.random_number(1);
    bingo.generate_random(CallContext::new(owner, DEPLOYED_AT), 1).unwrap();
    let new = bingo.random_number(1);

    assert_ne!(old, new);
}

#[test]
fn test_successive_randoms_differ_within_same_second() {
    let Fixture { mut bingo, owner, .. } = deploy_fixture();
    let ctx = CallContext::new(owner, DEPLOYED_AT + 3);

    let mut previous = bingo.random_number(1);
    for _ in 0..50 {
        let next = bingo.generate_random(ctx, 1).unwrap();
        assert_ne!(next, previous);
        assert_eq!(bingo.random_number(1), next);
        previous = next;
    }
}

#[test]
fn test_full_game_draws_every_number_once() {
    let Fixture { mut bingo, owner, addr1, addr2 } = deploy_fixture();
    fund(&mut bingo, addr1, 100, 100);
    fund(&mut bingo, addr2, 100, 100);
    bingo.create_board(CallContext::new(addr1, 10_000), 1).unwrap();
    bingo.create_board(CallContext::new(addr2, 10_001), 1).unwrap();
    bingo.start_new_game(CallContext::new(owner, 10_010), 1).unwrap();

    let mut first_winner_at = None;
    for turn in 0..75u64 {
        bingo.generate_random(CallContext::new(owner, 10_011 + turn), 1).unwrap();
        let drawn = bingo.drawn_numbers(1);
        let unique: HashSet<u8> = drawn.iter().copied().collect();
        assert_eq!(unique.len(), drawn.len());

        if first_winner_at.is_none() && !bingo.winners(1).is_empty() {
            first_winner_at = Some(drawn.len());
        }
    }

    let game = bingo.game(1).unwrap();
    assert!(game.finished);
    assert_eq!(game.turn_deadline, 10_020 + 75 * 10);
    // Every card has a line once all 75 numbers are out
    assert_eq!(bingo.winners(1), vec![addr1, addr2]);
    assert!(first_winner_at.is_some_and(|n| n >= 4));
}

#[test]
fn test_parameter_updates_only_affect_new_games() {
    let Fixture { mut bingo, owner, addr1, .. } = deploy_fixture();
    fund(&mut bingo, addr1, 10_000, 10_000);

    bingo.create_board(CallContext::new(addr1, 20_000), 1).unwrap();
    let admin = CallContext::new(owner, 20_001);
    bingo.update_fees(admin, 250).unwrap();
    bingo.update_join_duration_time(admin, 100).unwrap();
    bingo.update_turn_duration_time(admin, 30).unwrap();
    bingo.create_board(CallContext::new(addr1, 20_002), 2).unwrap();

    let first = bingo.game(1).unwrap();
    assert_eq!((first.fee, first.join_deadline, first.turn_duration), (100, 20_010, 10));
    let second = bingo.game(2).unwrap();
    assert_eq!((second.fee, second.join_deadline, second.turn_duration), (250, 20_102, 30));

    bingo.start_new_game(CallContext::new(owner, 20_010), 1).unwrap();
    bingo.generate_random(CallContext::new(owner, 20_011), 1).unwrap();
    assert_eq!(bingo.game(1).unwrap().turn_deadline, 20_010 + 10 + 10);
    assert_eq!(bingo.ledger().balance_of(&bingo.address()), 350);
}

#[test]
fn test_ownership_transfer_moves_admin_rights() {
    let Fixture { mut bingo, owner, addr1, .. } = deploy_fixture();

    bingo
        .transfer_ownership(CallContext::new(owner, DEPLOYED_AT + 1), addr1)
        .unwrap();

    assert_eq!(bingo.owner(), addr1);
    assert!(bingo.update_fees(CallContext::new(owner, DEPLOYED_AT + 2), 1).is_err());
    bingo.update_fees(CallContext::new(addr1, DEPLOYED_AT + 2), 1).unwrap();
    assert_eq!(bingo.fees(), 1);
}
