//! Persistence tests for chain state snapshots.
//!
//! Each test opens its own sled database in a temporary directory, writes a
//! populated `ChainState`, reopens the database from disk, and checks that
//! nothing was lost or reordered.

use agora_protocol::identity::{Address, Keypair};
use agora_protocol::ledger::{MemoryLedger, TokenLedger};
use agora_protocol::storage::{ChainState, LedgerDb, Marketplace, Receipt, Service};
use agora_protocol::transaction::{ExecutionRecord, ExecutionStatus};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn populated_state() -> ChainState {
    let operator = Keypair::generate().address();
    let vendor = Keypair::generate().address();
    let buyer = Keypair::generate().address();
    let asset = Keypair::generate().address();

    let mut state = ChainState::with_ledger(MemoryLedger::new());
    state
        .accounts
        .create_marketplace(
            Address::new([1u8; 32]),
            Marketplace {
                authority: operator,
                fee: 100,
            },
        )
        .unwrap();

    let service_addr = Address::new([2u8; 32]);
    state
        .accounts
        .create_service(
            service_addr,
            Service {
                vendor,
                name: "Test Service".into(),
                description: "This is a test service".into(),
                price: 1_000,
                is_soulbound: true,
                is_active: true,
            },
        )
        .unwrap();

    let receipt_addr = state
        .accounts
        .next_receipt_address(&service_addr, &buyer)
        .unwrap();
    state
        .accounts
        .create_receipt(
            receipt_addr,
            Receipt {
                owner: buyer,
                service: service_addr,
                is_soulbound: true,
            },
        )
        .unwrap();

    state.ledger.mint(&asset, &buyer, 2_000).unwrap();
    state
        .ledger
        .mint(&Receipt::asset_id(&receipt_addr), &buyer, 1)
        .unwrap();
    state
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = populated_state();

    {
        let db = LedgerDb::open(dir.path()).expect("open");
        db.save_state(&state).expect("save");
    }

    let db = LedgerDb::open(dir.path()).expect("reopen");
    let loaded: ChainState = db.load_state().expect("load").expect("snapshot present");
    assert_eq!(loaded, state);
    assert_eq!(loaded.digest(), state.digest());
    assert_eq!(loaded.accounts.receipt_sequence(), 1);
}

#[test]
fn later_snapshot_replaces_earlier() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = LedgerDb::open(dir.path()).expect("open");

    let first = populated_state();
    db.save_state(&first).expect("save first");

    let mut second = first.clone();
    second
        .ledger
        .mint(&Address::new([9u8; 32]), &Address::new([8u8; 32]), 5)
        .unwrap();
    db.save_state(&second).expect("save second");

    let loaded: ChainState = db.load_state().unwrap().unwrap();
    assert_eq!(loaded, second);
    assert_eq!(db.state_digest().unwrap(), Some(second.digest()));
}

#[test]
fn journal_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let records: Vec<ExecutionRecord> = ["initialize", "create_service", "purchase_service"]
        .iter()
        .map(|op| {
            ExecutionRecord::new(
                uuid::Uuid::new_v4(),
                op,
                ExecutionStatus::Committed,
                "digest".into(),
            )
        })
        .collect();

    {
        let db = LedgerDb::open(dir.path()).expect("open");
        db.append_journal(&records[..2]).unwrap();
        db.append_journal(&records[2..]).unwrap();
    }

    let db = LedgerDb::open(dir.path()).expect("reopen");
    let journal = db.journal().unwrap();
    let ops: Vec<&str> = journal.iter().map(|r| r.operation.as_str()).collect();
    assert_eq!(ops, vec!["initialize", "create_service", "purchase_service"]);
}
