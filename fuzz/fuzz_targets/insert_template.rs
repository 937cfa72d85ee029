#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rowbind::{Command, DynamicObject, Escaping, generate_insert, map_row_dynamic};

/// Fuzz input: a template, identifiers and an escaping selector.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    template: String,
    table: Option<String>,
    columns: Vec<(String, Option<i64>)>,
    escaping: u8,
}

fuzz_target!(|input: FuzzInput| {
    let escaping = match input.escaping % 4 {
        0 => Escaping::None,
        1 => Escaping::SquareBracket,
        2 => Escaping::DoubleQuote,
        _ => Escaping::Backtick,
    };

    let row: Vec<(String, rowbind::SqlValue)> = input
        .columns
        .into_iter()
        .map(|(name, value)| (name, value.into()))
        .collect();
    let obj: DynamicObject = map_row_dynamic(&row);

    let mut cmd = Command::new();
    if generate_insert(&mut cmd, &obj, &input.template, input.table.as_deref(), escaping).is_ok() {
        let bound = obj.iter().filter(|(_, v)| !v.is_null()).count();
        assert_eq!(cmd.params().len(), bound);
    }
});
