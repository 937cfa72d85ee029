//! INSERT generation: templates, table names, escaping, null omission and
//! batch parameter naming.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use rowbind::{
    AnonymousRecord, Command, CommandSink, Dialect, DynamicObject, Error, Escaping, Reflect,
    SqlValue, anonymous, generate_insert, generate_insert_batch,
};

const TEMPLATE: &str = "INSERT INTO {0} ({1}) VALUES({2});";

#[derive(Debug, Default, Reflect)]
#[rowbind(rename_all = "PascalCase")]
struct Customer {
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    age: i32,
}

fn clark() -> Customer {
    Customer {
        first_name: "Clark".to_string(),
        middle_name: None,
        last_name: "Kent".to_string(),
        age: 35,
    }
}

fn parameter_names(cmd: &Command) -> Vec<&str> {
    cmd.params().iter().map(|p| p.name.as_str()).collect()
}

mod arguments {
    use super::*;

    #[test]
    fn test_blank_template_is_an_argument_error() {
        let mut cmd = Command::new();
        let err = generate_insert(&mut cmd, &clark(), "  \t", None, Escaping::None).unwrap_err();
        assert!(err.is_argument_error());
    }

    #[test]
    fn test_missing_placeholder_is_a_format_error() {
        let mut cmd = Command::new();
        let err = generate_insert(
            &mut cmd,
            &clark(),
            "INSERT INTO {0} VALUES({2});",
            None,
            Escaping::None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_extra_placeholder_is_a_format_error() {
        let mut cmd = Command::new();
        let result = generate_insert(
            &mut cmd,
            &clark(),
            "INSERT INTO {0} ({1}) VALUES({2}); -- {3}",
            None,
            Escaping::None,
        );
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_anonymous_object_requires_table_name() {
        let record = anonymous! { FirstName: "Clark" };

        let mut cmd = Command::new();
        let err = generate_insert(&mut cmd, &record, TEMPLATE, None, Escaping::None).unwrap_err();
        assert!(err.is_argument_error());
        assert!(err.to_string().contains("table name is required"));
        assert!(cmd.text().is_empty());

        let mut cmd = Command::new();
        generate_insert(&mut cmd, &record, TEMPLATE, Some("Customer"), Escaping::None).unwrap();
        assert!(cmd.text().contains("Customer"));
    }

    #[test]
    fn test_map_backed_object_requires_table_name() {
        let mut obj = DynamicObject::new();
        obj.insert("Id", 1i32);

        let mut cmd = Command::new();
        assert!(
            generate_insert(&mut cmd, &obj, TEMPLATE, None, Escaping::None)
                .unwrap_err()
                .is_argument_error()
        );
    }

    #[test]
    fn test_type_marked_anonymous_requires_table_name() {
        #[derive(Default, Reflect)]
        #[rowbind(anonymous)]
        struct Projection {
            id: i32,
        }

        let mut cmd = Command::new();
        let result = generate_insert(&mut cmd, &Projection { id: 1 }, TEMPLATE, None, Escaping::None);
        assert!(result.unwrap_err().is_argument_error());
    }
}

mod statements {
    use super::*;

    #[test]
    fn test_reflected_object_uses_type_name_and_member_order() {
        let mut cmd = Command::new();
        generate_insert(&mut cmd, &clark(), TEMPLATE, None, Escaping::None).unwrap();

        assert_eq!(
            cmd.text(),
            "INSERT INTO Customer (FirstName, LastName, Age) \
             VALUES(@FirstName_p0, @LastName_p1, @Age_p2);"
        );
        assert_eq!(cmd.params().get("@Age_p2").unwrap().value, SqlValue::Int(35));
        assert!(cmd.params().get("@Age_p2").unwrap().declared_type.is_some());
    }

    #[test]
    fn test_null_members_are_omitted() {
        let mut cmd = Command::new();
        generate_insert(&mut cmd, &clark(), TEMPLATE, None, Escaping::SquareBracket).unwrap();

        assert!(!cmd.text().contains("MiddleName"));
        assert!(parameter_names(&cmd).iter().all(|p| !p.contains("MiddleName")));
        assert_eq!(cmd.parameter_count(), 3);
    }

    #[test]
    fn test_null_omission_for_anonymous_records() {
        let record = anonymous! { FirstName: "Clark", MiddleName: None::<String> };
        let mut cmd = Command::new();
        generate_insert(&mut cmd, &record, TEMPLATE, Some("Customer"), Escaping::None).unwrap();

        assert_eq!(cmd.text(), "INSERT INTO Customer (FirstName) VALUES(@FirstName_p0);");
        assert_eq!(parameter_names(&cmd), vec!["@FirstName_p0"]);
    }

    #[test]
    fn test_text_is_appended_not_replaced() {
        let mut cmd = Command::with_text("SET NOCOUNT ON; ");
        generate_insert(&mut cmd, &clark(), TEMPLATE, Some("People"), Escaping::None).unwrap();
        assert!(cmd.text().starts_with("SET NOCOUNT ON; INSERT INTO People"));
    }

    #[test]
    fn test_supplied_table_name_is_used_as_is() {
        let mut cmd = Command::new();
        generate_insert(&mut cmd, &clark(), TEMPLATE, Some("dbo.People"), Escaping::SquareBracket)
            .unwrap();
        assert!(cmd.text().starts_with("INSERT INTO dbo.People ([FirstName]"));
    }

    #[test]
    fn test_object_without_values_is_well_formed() {
        let mut cmd = Command::new();
        generate_insert(&mut cmd, &DynamicObject::new(), TEMPLATE, Some("t"), Escaping::None).unwrap();
        assert_eq!(cmd.text(), "INSERT INTO t () VALUES();");
        assert_eq!(cmd.parameter_count(), 0);
    }

    #[test]
    fn test_dynamic_object_keeps_insertion_order() {
        let obj: DynamicObject = [
            ("B", SqlValue::Int(2)),
            ("A", SqlValue::Int(1)),
            ("C", SqlValue::Null),
        ]
        .into_iter()
        .collect();

        let mut cmd = Command::new();
        generate_insert(&mut cmd, &obj, TEMPLATE, Some("t"), Escaping::DoubleQuote).unwrap();
        assert_eq!(cmd.text(), "INSERT INTO t (\"B\", \"A\") VALUES(@B_p0, @A_p1);");
    }
}

mod escaping {
    use super::*;

    fn table_text(escaping: Escaping) -> String {
        let mut cmd = Command::new();
        generate_insert(&mut cmd, &clark(), TEMPLATE, None, escaping).unwrap();
        cmd.text().to_string()
    }

    #[test]
    fn test_square_bracket() {
        let text = table_text(Escaping::SquareBracket);
        assert!(text.contains("[Customer]"));
        assert!(text.contains("[FirstName]"));
    }

    #[test]
    fn test_backtick() {
        assert!(table_text(Escaping::Backtick).contains("`Customer`"));
    }

    #[test]
    fn test_double_quote() {
        assert!(table_text(Escaping::DoubleQuote).contains("\"Customer\""));
    }

    #[test]
    fn test_none() {
        assert!(table_text(Escaping::None).starts_with("INSERT INTO Customer ("));
    }
}

mod batches {
    use super::*;

    #[derive(Debug, Default, Reflect)]
    struct Order {
        id: i32,
        sku: String,
        quantity: i16,
    }

    fn orders() -> Vec<Order> {
        (1..=3)
            .map(|i| Order {
                id: i,
                sku: format!("SKU-{i}"),
                quantity: 1,
            })
            .collect()
    }

    #[test]
    fn test_repeated_calls_produce_unique_parameters() {
        let mut cmd = Command::new();
        for order in &orders() {
            generate_insert(&mut cmd, order, TEMPLATE, None, Escaping::None).unwrap();
        }

        let names = parameter_names(&cmd);
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), 9);
        assert_eq!(unique.len(), 9);
        assert_eq!(cmd.text().matches("INSERT INTO Order").count(), 3);
        assert!(cmd.text().contains("VALUES(@id_p6, @sku_p7, @quantity_p8);"));
    }

    #[test]
    fn test_batch_helper_matches_repeated_calls() {
        let orders = orders();

        let mut looped = Command::new();
        for order in &orders {
            generate_insert(&mut looped, order, TEMPLATE, None, Escaping::Backtick).unwrap();
        }

        let mut batched = Command::new();
        generate_insert_batch(&mut batched, &orders, TEMPLATE, None, Escaping::Backtick).unwrap();

        assert_eq!(looped.text(), batched.text());
        assert_eq!(parameter_names(&looped), parameter_names(&batched));
    }

    #[test]
    fn test_mixed_sources_share_one_command() {
        let mut cmd = Command::new();
        generate_insert(&mut cmd, &orders()[0], TEMPLATE, None, Escaping::None).unwrap();
        generate_insert(
            &mut cmd,
            &AnonymousRecord::new().with("id", 4i32),
            TEMPLATE,
            Some("Order"),
            Escaping::None,
        )
        .unwrap();
        assert_eq!(parameter_names(&cmd).last(), Some(&"@id_p3"));
    }

    #[test]
    fn test_dialect_batch_appends_identity_tail_per_row() {
        let mut cmd = Command::new();
        Dialect::SqlServer
            .generate_insert_batch(&mut cmd, &orders(), None)
            .unwrap();
        assert_eq!(cmd.text().matches("SELECT SCOPE_IDENTITY();").count(), 3);
        assert_eq!(cmd.text().matches("[Order]").count(), 3);
    }
}
