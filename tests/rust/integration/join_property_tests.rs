//! Join and projection behaviour observed through `wrangle_with`.

#[cfg(test)]
mod join_property_tests {
    use std::collections::HashMap;

    use serde_json::{json, Value};
    use test_case::test_case;
    use wrangle::{
        wrangle_with, Binder, JoinKind, Row, RowBinder, RowWrangler, SecondarySourceSpec,
        TargetDescriptor, WrangleError,
    };

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn row(value: Value) -> Row {
        value.as_object().cloned().expect("test rows are objects")
    }

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values.into_iter().map(row).collect()
    }

    fn classes() -> Vec<Row> {
        rows(vec![
            json!({"id": 12, "className": "CS"}),
            json!({"id": 9, "className": "Math"}),
        ])
    }

    fn class_descriptor(kind: JoinKind) -> TargetDescriptor {
        TargetDescriptor::new("Student")
            .primary("primary")
            .secondary(SecondarySourceSpec::new(
                "class",
                "primary.classId",
                "class.id",
                kind,
            ))
            .direct("firstName", "primary.firstName")
            .direct("className", "class.className")
    }

    fn run(
        descriptor: TargetDescriptor,
        primary: Vec<Row>,
        sources: HashMap<String, Vec<Row>>,
    ) -> anyhow::Result<Vec<Value>> {
        let records = wrangle_with::<Row, _, _, _>(descriptor, primary, sources, RowBinder)?
            .map(|record| record.map(Value::Object))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    #[test]
    fn test_no_secondary_sources_one_record_per_row() -> anyhow::Result<()> {
        init_logging();
        let descriptor = TargetDescriptor::new("Student")
            .primary("primary")
            .direct("firstName", "primary.firstName")
            .direct("age", "primary.age");

        let primary = rows(vec![
            json!({"firstName": "James", "age": 21}),
            json!({"firstName": "Ada"}),
            json!({}),
        ]);
        let no_sources: HashMap<String, Vec<Row>> = HashMap::new();

        let records = run(descriptor, primary, no_sources)?;
        assert_eq!(
            records,
            vec![
                json!({"firstName": "James", "age": 21}),
                json!({"firstName": "Ada", "age": null}),
                json!({"firstName": null, "age": null}),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_inner_join_scenario() -> anyhow::Result<()> {
        init_logging();
        let sources = HashMap::from([("class".to_string(), classes())]);
        let wrangler = RowWrangler::new(class_descriptor(JoinKind::Inner), sources, RowBinder)?;

        let joined = wrangler.join(row(json!({"classId": 12, "firstName": "James"})));
        assert_eq!(joined.len(), 1);
        assert_eq!(
            joined[0].to_value(),
            json!({
                "primary": {"classId": 12, "firstName": "James"},
                "class": {"id": 12, "className": "CS"}
            })
        );

        let values = wrangler.populate(&joined[0]);
        assert_eq!(values.get("className"), Some(&json!("CS")));
        Ok(())
    }

    #[test]
    fn test_outer_join_scenario() -> anyhow::Result<()> {
        let sources = HashMap::from([("class".to_string(), classes())]);
        let wrangler = RowWrangler::new(class_descriptor(JoinKind::Outer), sources, RowBinder)?;

        let joined = wrangler.join(row(json!({"classId": 99, "firstName": "James"})));
        assert_eq!(joined.len(), 1);
        assert!(!joined[0].contains("class"));
        assert_eq!(
            Value::Object(wrangler.materialize(&joined[0])?),
            json!({"firstName": "James", "className": null})
        );
        Ok(())
    }

    #[test_case(JoinKind::Inner, vec![json!({"firstName": "James", "className": "CS"})] ; "inner drops unmatched")]
    #[test_case(JoinKind::Outer, vec![
        json!({"firstName": "James", "className": "CS"}),
        json!({"firstName": "Lost", "className": null}),
    ] ; "outer keeps unmatched")]
    fn test_unmatched_primary_rows(kind: JoinKind, expected: Vec<Value>) {
        let primary = rows(vec![
            json!({"classId": 12, "firstName": "James"}),
            json!({"classId": 99, "firstName": "Lost"}),
        ]);
        let sources = HashMap::from([("class".to_string(), classes())]);

        let records = run(class_descriptor(kind), primary, sources).unwrap();
        assert_eq!(records, expected);
    }

    #[test]
    fn test_duplicate_keys_fan_out() -> anyhow::Result<()> {
        let mut class_rows = classes();
        class_rows.push(row(json!({"id": 12, "className": "CS Lab"})));
        let sources = HashMap::from([("class".to_string(), class_rows)]);

        let records = run(
            class_descriptor(JoinKind::Inner),
            rows(vec![json!({"classId": 12, "firstName": "James"})]),
            sources,
        )?;

        assert_eq!(
            records,
            vec![
                json!({"firstName": "James", "className": "CS"}),
                json!({"firstName": "James", "className": "CS Lab"}),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_string_key_matches_numeric_key() -> anyhow::Result<()> {
        let sources = HashMap::from([("class".to_string(), classes())]);
        let records = run(
            class_descriptor(JoinKind::Inner),
            rows(vec![json!({"classId": "9", "firstName": "Emmy"})]),
            sources,
        )?;
        assert_eq!(records, vec![json!({"firstName": "Emmy", "className": "Math"})]);
        Ok(())
    }

    #[test]
    fn test_nested_paths_and_chained_joins() -> anyhow::Result<()> {
        init_logging();
        let descriptor = TargetDescriptor::new("Enrolment")
            .primary("student")
            .secondary(SecondarySourceSpec::inner(
                "class",
                "student.enrolment.classId",
                "class.id",
            ))
            .secondary(SecondarySourceSpec::outer(
                "teacher",
                "class.staff.teacherId",
                "teacher.id",
            ))
            .direct("student", "student.name.first")
            .direct("class", "class.className")
            .direct("teacher", "teacher.name");

        let sources = HashMap::from([
            (
                "class".to_string(),
                rows(vec![
                    json!({"id": 12, "className": "CS", "staff": {"teacherId": "t1"}}),
                    json!({"id": 9, "className": "Math", "staff": {"teacherId": "t9"}}),
                ]),
            ),
            (
                "teacher".to_string(),
                rows(vec![json!({"id": "t1", "name": "Turing"})]),
            ),
        ]);
        let primary = rows(vec![
            json!({"name": {"first": "James"}, "enrolment": {"classId": 12}}),
            json!({"name": {"first": "Emmy"}, "enrolment": {"classId": 9}}),
            json!({"name": {"first": "Nobody"}}),
        ]);

        let records = run(descriptor, primary, sources)?;
        assert_eq!(
            records,
            vec![
                json!({"student": "James", "class": "CS", "teacher": "Turing"}),
                json!({"student": "Emmy", "class": "Math", "teacher": null}),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_missing_source_fails_before_reading_primary() {
        let primary = std::iter::from_fn(|| -> Option<Row> {
            panic!("primary rows must not be read when validation fails")
        });
        let no_sources: HashMap<String, Vec<Row>> = HashMap::new();

        let err = wrangle_with::<Row, _, _, _>(
            class_descriptor(JoinKind::Inner),
            primary,
            no_sources,
            RowBinder,
        )
        .unwrap_err();

        assert_eq!(
            err,
            WrangleError::MissingSource {
                target: "Student".to_string(),
                source_name: "class".to_string(),
            }
        );
    }

    #[derive(Debug, Default, PartialEq)]
    struct Student {
        first_name: String,
        class_name: Option<String>,
    }

    #[test]
    fn test_null_into_required_field_is_assignment_error() {
        let binder = Binder::<Student>::with_default()
            .json_field("firstName", |s: &mut Student, v| s.first_name = v)
            .json_field("className", |s: &mut Student, v| s.class_name = v);
        let sources = HashMap::from([("class".to_string(), classes())]);
        let primary = rows(vec![
            json!({"classId": 12, "firstName": "James"}),
            json!({"classId": 9}),
        ]);

        let results: Vec<_> = wrangle_with::<Student, _, _, _>(
            class_descriptor(JoinKind::Inner),
            primary,
            sources,
            binder,
        )
        .unwrap()
        .collect();

        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0],
            Ok(Student {
                first_name: "James".to_string(),
                class_name: Some("CS".to_string()),
            })
        );
        match &results[1] {
            Err(WrangleError::Assignment { field, value, .. }) => {
                assert_eq!(field, "firstName");
                assert_eq!(value, "null");
            }
            other => panic!("expected an assignment error, got {:?}", other),
        }
    }
}
