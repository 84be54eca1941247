//! Basic example of using the ledger core directly.
//!
//! Run with: `cargo run --example basic`

use card_ledger::{AccountStore, BankingCore, Config, TransactionKind, TransactionRequest};

fn main() {
    // Initialize logger (optional, but shows what's happening)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let accounts = AccountStore::with_demo_accounts().expect("Failed to seed demo accounts");
    let core = BankingCore::new(accounts, &Config::default());

    let requests = [
        ("4123456789012345", "1234", "100.00", TransactionKind::Topup),
        ("4123456789012345", "1234", "250", TransactionKind::Withdraw),
        ("4123456789012345", "0000", "10", TransactionKind::Withdraw),
        ("4987654321098765", "4321", "9999", TransactionKind::Withdraw),
        ("4987654321098765", "4321", "-3", TransactionKind::Topup),
        ("4000000000000000", "1111", "5", TransactionKind::Topup),
    ];

    for (card, pin, amount, kind) in requests {
        let tx = core
            .ledger()
            .apply_transaction(TransactionRequest::new(card, pin, amount, kind))
            .expect("Ledger unavailable");
        println!("{tx} -> {}", tx.message());
    }

    println!(
        "\nBalance of 4123********2345: {}",
        core.queries()
            .balance("4123456789012345")
            .expect("Failed to read balance")
    );

    // Export the ledger to stdout
    println!("\n=== Ledger ===");
    core.log()
        .export_csv(std::io::stdout())
        .expect("Failed to export ledger");
}
