//! Bingo CLI
//!
//! Drives a contract persisted in a JSON snapshot: deploy it, fund players
//! on the bundled ledger, and run games call by call.

use bingo::{
    config::{BingoConfig, ConfigLoader},
    storage::{Snapshot, StateStore},
    Address, Bingo, BingoEvent, CallContext, GameId, HashChainEntropy, MemoryLedger, Timestamp,
    TokenLedger,
};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bingo lottery contract CLI
#[derive(Parser)]
#[command(name = "bingo")]
#[command(about = "Fee-to-join bingo games with timed joins and owner-driven draws")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Snapshot file (overrides storage.state_path)
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Calling account: 0x-prefixed hex or a label hashed into an address
    #[arg(long, default_value = "owner")]
    caller: String,

    /// Logical time of the call in unix seconds (defaults to now)
    #[arg(long)]
    at: Option<Timestamp>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a new contract owned by --caller
    Deploy {
        /// Label or address of the contract's custody account
        #[arg(long, default_value = "bingo")]
        contract: String,

        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },

    #[command(flatten)]
    Contract(ContractCommand),
}

/// Calls against an existing deployment
#[derive(Subcommand)]
enum ContractCommand {
    /// Mint ledger tokens to an account
    Mint { account: String, amount: u64 },

    /// Let the contract spend --caller's tokens
    Approve { amount: u64 },

    /// Show an account's ledger balance
    Balance { account: String },

    /// Owner: create a game with a fresh join window
    Open { game: GameId },

    /// Pay the fee and receive a board
    Join { game: GameId },

    /// Owner: start a game whose join window has elapsed
    Start { game: GameId },

    /// Owner: generate the next random value (draws a number once started)
    Draw { game: GameId },

    /// Owner: set the entry fee for future games
    UpdateFee { fee: u64 },

    /// Owner: set the join window for future games
    UpdateJoinDuration { seconds: u64 },

    /// Owner: set the turn duration for future games
    UpdateTurnDuration { seconds: u64 },

    /// Owner: hand the contract to another account
    TransferOwnership { new_owner: String },

    /// Print contract parameters, or one game in detail
    Show { game: Option<GameId> },
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;
type Contract = Bingo<MemoryLedger, HashChainEntropy>;

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "bingo=debug" } else { "bingo=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path);
    }
    let config = loader.load()?;

    let store = StateStore::new(
        cli.state
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.storage.state_path)),
    );
    let caller = parse_account(&cli.caller)?;
    let ctx = match cli.at {
        Some(at) => CallContext::new(caller, at),
        None => CallContext::at_current_time(caller),
    };

    match cli.command {
        Commands::Deploy { contract, force } => deploy(&store, &config, ctx, &contract, force),
        Commands::Contract(command) => execute(&store, ctx, command),
    }
}

fn execute(store: &StateStore, ctx: CallContext, command: ContractCommand) -> CliResult<()> {
    let mut bingo = load_contract(store)?;

    match command {
        ContractCommand::Mint { account, amount } => {
            let account = parse_account(&account)?;
            bingo.ledger_mut().mint(account, amount)?;
            println!("Minted {} to {}", amount, account);
        }
        ContractCommand::Approve { amount } => {
            let spender = bingo.address();
            bingo.ledger_mut().approve(ctx.caller, spender, amount);
            println!("{} approved {} for {}", ctx.caller, amount, spender);
        }
        ContractCommand::Balance { account } => {
            let account = parse_account(&account)?;
            println!("{}: {}", account, bingo.ledger().balance_of(&account));
            return Ok(());
        }
        ContractCommand::Open { game } => bingo.open_game(ctx, game)?,
        ContractCommand::Join { game } => {
            let board = bingo.create_board(ctx, game)?;
            println!("Board for {} in game {}:\n{}", ctx.caller, game, board);
        }
        ContractCommand::Start { game } => bingo.start_new_game(ctx, game)?,
        ContractCommand::Draw { game } => {
            let random = bingo.generate_random(ctx, game)?;
            println!("Random number for game {}: {}", game, random);
        }
        ContractCommand::UpdateFee { fee } => bingo.update_fees(ctx, fee)?,
        ContractCommand::UpdateJoinDuration { seconds } => {
            bingo.update_join_duration_time(ctx, seconds)?
        }
        ContractCommand::UpdateTurnDuration { seconds } => {
            bingo.update_turn_duration_time(ctx, seconds)?
        }
        ContractCommand::TransferOwnership { new_owner } => {
            bingo.transfer_ownership(ctx, parse_account(&new_owner)?)?
        }
        ContractCommand::Show { game } => {
            match game {
                Some(game_id) => show_game(&bingo, game_id, ctx.now),
                None => show_contract(&bingo),
            }
            return Ok(());
        }
    }

    print_events(bingo.drain_events())?;
    save_contract(store, bingo)
}

fn deploy(
    store: &StateStore,
    config: &BingoConfig,
    ctx: CallContext,
    contract: &str,
    force: bool,
) -> CliResult<()> {
    if store.exists() && !force {
        return Err(format!(
            "{} already holds a deployment (use --force to replace it)",
            store.path().display()
        )
        .into());
    }

    let entropy = match config.randomness.seed_bytes()? {
        Some(seed) => HashChainEntropy::new(seed),
        None => HashChainEntropy::from_os(),
    };
    let bingo = Bingo::deploy(
        ctx,
        parse_account(contract)?,
        config.game.global_config(),
        MemoryLedger::new(),
        entropy,
    )
    .with_max_players(config.game.max_players);

    println!("Bingo deployed to: {}", bingo.address());
    println!("Owner: {}", bingo.owner());
    println!("Join window closes at: {}", format_timestamp(bingo.join_duration_time()));
    save_contract(store, bingo)
}

fn load_contract(store: &StateStore) -> CliResult<Contract> {
    let snapshot = store.load()?.ok_or_else(|| {
        format!(
            "No deployment found at {} (run `bingo deploy` first)",
            store.path().display()
        )
    })?;
    Ok(Bingo::from_state(snapshot.contract, snapshot.ledger, snapshot.entropy))
}

fn save_contract(store: &StateStore, bingo: Contract) -> CliResult<()> {
    let (contract, ledger, entropy) = bingo.into_parts();
    store.save(&Snapshot {
        contract,
        ledger,
        entropy,
    })?;
    Ok(())
}

fn parse_account(raw: &str) -> CliResult<Address> {
    if raw.starts_with("0x") {
        return raw.parse::<Address>().map_err(Into::into);
    }
    Ok(Address::derive(raw))
}

fn print_events(events: Vec<BingoEvent>) -> CliResult<()> {
    for event in events {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

fn format_timestamp(ts: Timestamp) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| format!("{} ({})", ts, dt.to_rfc3339()))
        .unwrap_or_else(|| ts.to_string())
}

fn show_contract(bingo: &Contract) {
    println!("Contract: {}", bingo.address());
    println!("Owner:    {}", bingo.owner());
    println!("Fee:      {}", bingo.fees());
    println!("Join:     {}", bingo.join_duration_time());
    println!("Turn:     {}s", bingo.turn_duration_time());
    println!("Custody:  {}", bingo.ledger().balance_of(&bingo.address()));
    for game in bingo.games() {
        println!(
            "  game {:>4}  players {:>4}  pot {:>8}  drawn {:>2}",
            game.id,
            game.player_count(),
            game.pot,
            game.drawn_numbers.len()
        );
    }
}

fn show_game(bingo: &Contract, game_id: GameId, now: Timestamp) {
    let Some(game) = bingo.game(game_id) else {
        println!("Game {} does not exist", game_id);
        return;
    };

    println!("Game {} ({})", game.id, game.phase(now));
    println!("  join deadline: {}", format_timestamp(game.join_deadline));
    if game.started {
        println!("  turn deadline: {}", format_timestamp(game.turn_deadline));
    }
    println!("  fee: {}  pot: {}", game.fee, game.pot);
    println!("  random: {}", game.current_random);
    println!("  drawn: {:?}", game.drawn_numbers);
    for player in &game.players {
        let marker = if bingo.is_winner(game_id, player) { "  BINGO" } else { "" };
        println!("  player {}{}", player, marker);
        if let Some(board) = game.board_of(player) {
            print!("{}", board);
        }
    }
}
