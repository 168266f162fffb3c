use tinyjs_core::{Engine, EvalError, Value, eval};

fn number(source: &str) -> f64 {
    match eval(source) {
        Ok(Value::Number(n)) => n,
        other => panic!("expected a number from {:?}, got {:?}", source, other),
    }
}

fn error_message(source: &str) -> String {
    match eval(source) {
        Err(e) => e.to_string(),
        Ok(v) => panic!("expected an error from {:?}, got {:?}", source, v),
    }
}

#[test]
fn numeric_literals_round_trip() {
    for (source, expected) in [
        ("0;", 0.0),
        ("42;", 42.0),
        ("3.25;", 3.25),
        ("1000000.5;", 1000000.5),
    ] {
        assert_eq!(number(source), expected);
    }
}

#[test]
fn empty_program_is_null() {
    assert_eq!(eval(""), Ok(Value::Null));
    assert_eq!(eval("   \n\t "), Ok(Value::Null));
}

#[test]
fn last_statement_wins() {
    assert_eq!(eval("1; 2; 3;"), Ok(Value::Number(3.0)));
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(number("1 + 2;"), 3.0);
    assert_eq!(number("2 * 3 + 4;"), 10.0);
    assert_eq!(number("4 + 2 * 3;"), 10.0);
    assert_eq!(number("(4 + 2) * 3;"), 18.0);
    assert_eq!(number("10 - 4 - 3;"), 3.0); // left-associative
    assert_eq!(number("7 % 4;"), 3.0);
    assert_eq!(number("1 / 4;"), 0.25);
}

#[test]
fn division_follows_js_float_semantics() {
    assert_eq!(number("1 / 0;"), f64::INFINITY);
    assert!(number("0 / 0;").is_nan());
}

#[test]
fn plus_concatenates_when_a_string_is_involved() {
    assert_eq!(eval("'foo' + 'bar';"), Ok(Value::String("foobar".into())));
    assert_eq!(eval("'n=' + 1;"), Ok(Value::String("n=1".into())));
    assert_eq!(eval("1 + '2';"), Ok(Value::String("12".into())));
    assert_eq!(eval("true + '!';"), Ok(Value::String("true!".into())));
    // Without a string, booleans and null coerce numerically.
    assert_eq!(number("true + true;"), 2.0);
    assert_eq!(number("null + 1;"), 1.0);
}

#[test]
fn string_to_number_only_accepts_decimal_spellings() {
    // Spellings `f64::parse` knows but the ToNumber grammar does not.
    assert!(number("'inf' * 1;").is_nan());
    assert!(number("'nan' * 1;").is_nan());
    assert!(number("'Infinity' * 1;").is_nan());
    assert_eq!(number("'2.5' * 2;"), 5.0);
    assert_eq!(number("' -3 ' * 1;"), -3.0);
}

#[test]
fn shifts_use_32_bit_semantics() {
    assert_eq!(number("1 << 4;"), 16.0);
    assert_eq!(number("256 >> 4;"), 16.0);
    assert_eq!(number("0 - 1 >> 28;"), -1.0);
    assert_eq!(number("0 - 1 >>> 28;"), 15.0);
    // Shift count is masked to five bits.
    assert_eq!(number("1 << 33;"), 2.0);
}

#[test]
fn bitwise_operators_truncate_to_int32() {
    assert_eq!(number("6 & 3;"), 2.0);
    assert_eq!(number("6 | 3;"), 7.0);
    assert_eq!(number("6 ^ 3;"), 5.0);
    assert_eq!(number("1.9 | 0;"), 1.0);
    assert_eq!(number("4294967296 | 0;"), 0.0);
}

#[test]
fn bitwise_precedence_order() {
    // & binds tighter than ^, which binds tighter than |.
    assert_eq!(number("1 | 2 ^ 2 & 3;"), 1.0);
    assert_eq!(number("4 | 1 & 1;"), 5.0);
}

#[test]
fn relational_operators() {
    assert_eq!(eval("1 < 2;"), Ok(Value::Boolean(true)));
    assert_eq!(eval("2 <= 1;"), Ok(Value::Boolean(false)));
    assert_eq!(eval("'abc' < 'abd';"), Ok(Value::Boolean(true)));
    assert_eq!(eval("'2' < 12;"), Ok(Value::Boolean(true))); // numeric, not lexicographic
    assert_eq!(eval("'x' < 1;"), Ok(Value::Boolean(false))); // NaN comparison
    assert_eq!(eval("3 >= 3;"), Ok(Value::Boolean(true)));
}

#[test]
fn loose_equality() {
    assert_eq!(eval("1 == 1;"), Ok(Value::Boolean(true)));
    assert_eq!(eval("1 == '1';"), Ok(Value::Boolean(true)));
    assert_eq!(eval("true == 1;"), Ok(Value::Boolean(true)));
    assert_eq!(eval("null == null;"), Ok(Value::Boolean(true)));
    assert_eq!(eval("null == 0;"), Ok(Value::Boolean(false)));
    assert_eq!(eval("1 != 2;"), Ok(Value::Boolean(true)));
    assert_eq!(eval("'' == 0;"), Ok(Value::Boolean(true)));
}

#[test]
fn equality_binds_looser_than_relational() {
    // Parsed as (1 < 2) == true.
    assert_eq!(eval("1 < 2 == true;"), Ok(Value::Boolean(true)));
}

#[test]
fn ternary_evaluates_exactly_one_branch() {
    assert_eq!(eval("1 < 2 ? 10 : 20;"), Ok(Value::Number(10.0)));
    assert_eq!(eval("2 < 1 ? 10 : 20;"), Ok(Value::Number(20.0)));

    // The untaken branch would fail if executed: `1 = 2` reports
    // "not implement" only when actually evaluated.
    assert_eq!(eval("1 < 2 ? 10 : (1 = 2);"), Ok(Value::Number(10.0)));
    assert_eq!(eval("2 < 1 ? (1 = 2) : 20;"), Ok(Value::Number(20.0)));
}

#[test]
fn logical_operators_short_circuit() {
    assert_eq!(eval("true && false;"), Ok(Value::Boolean(false)));
    assert_eq!(eval("false || true;"), Ok(Value::Boolean(true)));

    // Right-hand probes that fail only when executed.
    assert_eq!(eval("false && (1 = 2);"), Ok(Value::Boolean(false)));
    assert_eq!(eval("true || (1 = 2);"), Ok(Value::Boolean(true)));

    // When the left side does not decide, the probe must fire.
    assert_eq!(error_message("true && (1 = 2);"), "= not implement");
    assert_eq!(error_message("false || (1 = 2);"), "= not implement");
}

#[test]
fn reserved_keywords_report_not_implement() {
    for kw in [
        "case",
        "catch",
        "class",
        "const",
        "default",
        "delete",
        "do",
        "finally",
        "in",
        "instanceof",
        "new",
        "switch",
        "this",
        "throw",
        "try",
        "var",
        "void",
        "with",
        "while",
        "yield",
    ] {
        let source = format!("{} x;", kw);
        assert_eq!(
            error_message(&source),
            format!("{} not implement", kw),
            "keyword {:?}",
            kw
        );
    }
    assert_eq!(error_message("while (true) {}"), "while not implement");
}

#[test]
fn missing_semicolon_is_reported() {
    assert_eq!(error_message("1 2;"), "expect ;");
    assert_eq!(error_message("1 + 2"), "expect ;");
}

#[test]
fn unparseable_literals_are_parse_errors() {
    assert_eq!(error_message("+;"), "parse error");
    assert_eq!(error_message("foo;"), "parse error"); // identifiers have no binding yet
    assert_eq!(error_message("();"), "parse error");
}

#[test]
fn lex_errors_abort_evaluation() {
    assert!(matches!(eval("1 + @;"), Err(EvalError::Lex(_))));
    assert!(matches!(eval("\"unterminated;"), Err(EvalError::Lex(_))));
}

#[test]
fn first_error_aborts_remaining_statements() {
    // The failing statement must mask the statements after it.
    assert_eq!(error_message("1 2; 3;"), "expect ;");
    assert_eq!(error_message("var x; 3;"), "var not implement");
}

#[test]
fn string_literals_and_escapes() {
    assert_eq!(eval("'hi';"), Ok(Value::String("hi".into())));
    assert_eq!(eval("\"a\\nb\";"), Ok(Value::String("a\nb".into())));
    assert_eq!(eval("'it\\'s';"), Ok(Value::String("it's".into())));
}

#[test]
fn keyword_literals() {
    assert_eq!(eval("true;"), Ok(Value::Boolean(true)));
    assert_eq!(eval("false;"), Ok(Value::Boolean(false)));
    assert_eq!(eval("null;"), Ok(Value::Null));
}

#[test]
fn eval_is_idempotent_across_engines() {
    let source = "1 + 2 * 3 << 1;";
    let first = Engine::new().eval(source);
    for _ in 0..3 {
        assert_eq!(Engine::new().eval(source), first);
    }
    // And across calls on the same engine: no state carries over.
    let engine = Engine::new();
    assert_eq!(engine.eval(source), first);
    assert_eq!(engine.eval(source), first);
}

#[test]
fn engine_is_shareable_across_threads() {
    let engine = std::sync::Arc::new(Engine::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            std::thread::spawn(move || engine.eval(&format!("{} * 2;", i)))
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Ok(Value::Number(i as f64 * 2.0)));
    }
}

#[test]
fn json_export() {
    let value = eval("'a' + 1;").unwrap();
    assert_eq!(value.to_json(), serde_json::json!("a1"));
    assert_eq!(eval("1 / 0;").unwrap().to_json(), serde_json::Value::Null);
}
