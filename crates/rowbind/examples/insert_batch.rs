//! Batch insert example.
//!
//! This example demonstrates:
//! - Deriving `Reflect` and `SqlEnum` for a table type
//! - Generating a multi-row INSERT batch on one command
//! - Mapping rows returned by the database back onto the type
//!
//! # Running
//!
//! ```bash
//! RUST_LOG=rowbind=trace cargo run --example insert_batch
//! ```

// Allow common patterns in example code
#![allow(clippy::unwrap_used, clippy::expect_used)]

use rowbind::{
    Command, Dialect, Reflect, Row, RowIteratorExt, SqlEnum, SqlValue, anonymous, map_row_dynamic,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, SqlEnum)]
enum AccountType {
    Checking,
    Savings,
    MoneyMarket,
}

#[derive(Debug, Default, Reflect)]
#[rowbind(rename_all = "PascalCase")]
struct Customer {
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    account_type: AccountType,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let customers = vec![
        Customer {
            first_name: "Clark".into(),
            middle_name: Some("Joseph".into()),
            last_name: "Kent".into(),
            account_type: AccountType::Savings,
        },
        Customer {
            first_name: "Lois".into(),
            middle_name: None,
            last_name: "Lane".into(),
            account_type: AccountType::Checking,
        },
        Customer {
            first_name: "Jimmy".into(),
            middle_name: None,
            last_name: "Olsen".into(),
            account_type: AccountType::MoneyMarket,
        },
    ];

    // One command, one statement per row, unique parameter names throughout.
    let mut cmd = Command::new();
    Dialect::SqlServer.generate_insert_batch(&mut cmd, &customers, None)?;

    // Values without a named type need an explicit table name.
    let audit = anonymous! { Action: "import", Rows: customers.len() as i64 };
    Dialect::SqlServer.generate_insert(&mut cmd, &audit, Some("[AuditLog]"))?;

    println!("-- statement");
    for statement in cmd.text().split_inclusive(';') {
        println!("{}", statement.trim());
    }

    println!("-- parameters");
    for param in cmd.params() {
        println!("{} = {}", param.name, param.value);
    }

    // Rows as an execution layer would hand them back.
    let rows = vec![
        Row::from_pairs([
            ("FirstName", SqlValue::from("Clark")),
            ("LastName", SqlValue::from("Kent")),
            ("AccountType", SqlValue::from("savings")),
        ]),
        Row::from_pairs([
            ("FirstName", SqlValue::from("Lois")),
            ("LastName", SqlValue::from("Lane")),
            ("AccountType", SqlValue::Int(0)),
        ]),
    ];

    println!("-- mapped");
    let mapped = rows
        .iter()
        .cloned()
        .map(Ok::<_, rowbind::Error>)
        .map_rows::<Customer>();
    for customer in mapped {
        println!("{:?}", customer?);
    }

    for row in &rows {
        let obj = map_row_dynamic(row);
        println!("{} -> {}", obj["firstname"], obj["ACCOUNTTYPE"]);
    }

    Ok(())
}
