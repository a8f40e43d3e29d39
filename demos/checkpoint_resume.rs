//! Checkpoint and Resume
//!
//! This example saves a machine mid-run and restores it into a freshly
//! declared one.
//!
//! Key concepts:
//! - Checkpoints capture data only: current state, values, history
//! - Callbacks are re-declared by the program that restores
//! - JSON for inspection, bincode for compact storage
//!
//! Run with: cargo run --example checkpoint_resume

use tickstate::core::Value;
use tickstate::machine::StateMachine;
use tickstate::{Checkpoint, State};

fn door() -> StateMachine {
    StateMachine::builder()
        .state(State::new("closed"))
        .state(State::new("open").on_arrive(|_| println!("  door opened")))
        .state(State::new("locked"))
        .action("closed", "open", "open")
        .action("open", "close", "closed")
        .action("closed", "lock", "locked")
        .build()
        .unwrap()
}

fn main() {
    println!("=== Checkpoint and Resume ===\n");

    let machine = door();
    machine.initialize("closed", None).unwrap();
    machine.do_action("open", Some(Value::Int(90))).unwrap();
    machine.do_action("close", None).unwrap();
    machine.set_value(Some(Value::from("front door")));

    let checkpoint = machine.checkpoint();
    let json = checkpoint.to_json().unwrap();
    let bytes = checkpoint.to_bytes().unwrap();
    println!("Checkpoint {}:", checkpoint.id);
    println!("{json}\n");
    println!("Binary size: {} bytes (JSON: {} bytes)\n", bytes.len(), json.len());

    let resumed = door();
    resumed.restore(&Checkpoint::from_bytes(&bytes).unwrap()).unwrap();
    println!("Resumed in state: {}", resumed.current_state_name().unwrap());
    println!("Open angle kept: {:?}", resumed.state("open").unwrap().value());

    resumed.do_action("lock", None).unwrap();
    println!("Path after resume: {:?}", resumed.history().path());

    println!("\n=== Example Complete ===");
}
