use rpn_calc::{
    evaluate, evaluate_with, BinaryOp, Config, Error, EvalError, LexError, Number, Operator,
};

fn value(input: &str) -> Number {
    evaluate(input).unwrap_or_else(|e| panic!("`{input}` failed: {e}"))
}

fn shown(input: &str) -> String {
    value(input).to_string()
}

#[test]
fn simple_expressions() {
    assert_eq!(Number::Integer(11), value("3 4 2 * +"));
    assert_eq!(Number::Integer(70), value("10 5 2 + *"));
    assert_eq!("5", shown("15 7 1 1 + - / 3 * 2 1 1 + + -"));
    assert_eq!(Number::Integer(998_001), value("999 999 *"));
    assert_eq!(Number::Integer(3_000_000), value("1000000 2000000 +"));
}

#[test]
fn whitespace_is_optional_between_single_character_tokens() {
    assert_eq!(Number::Integer(7), value("  3   4   +  "));
    assert_eq!(Number::Integer(-2), value("5~ 3 +"));
    assert_eq!(Number::Integer(-15), value("10~ 5~ +"));
    assert_eq!(Number::Integer(-12), value("3~ 4 *"));
    assert_eq!(Number::Integer(2), value("5 3-"));
    assert_eq!(Number::Integer(14), value("2(3 4+)*"));
}

#[test]
fn brackets_are_transparent() {
    for inner in ["3 4 2 * +", "5 ~", "7 2 /", "2 3 **"] {
        assert_eq!(value(inner), value(&format!("( {inner} )")));
    }
    assert_eq!(Number::Integer(14), value("2 ( 3 4 + ) *"));
    assert_eq!(Number::Integer(-5), value("( 2 3 + ~ )"));
}

#[test]
fn unary_operators() {
    assert_eq!(Number::Integer(-5), value("5 ~"));
    assert_eq!(Number::Integer(5), value("5 $"));
    assert_eq!(Number::Integer(-7), value("3 4 + ~"));
    assert_eq!(Number::Integer(5), value("10 5 ~ +"));
}

#[test]
fn integer_only_operators() {
    assert_eq!(Number::Integer(3), value("7 2 //"));
    assert_eq!(Number::Integer(1), value("7 3 %"));
    assert_eq!(Number::Float(2.0), value("5.0 2.0 //"));
    assert_eq!("2", shown("5.0 2.0 //"));
    assert_eq!("1", shown("5.0 2.0 %"));

    for input in ["7.5 2 //", "10 2.3 //", "7.5 2 %", "10 2.3 %"] {
        assert!(
            matches!(
                evaluate(input),
                Err(Error::Eval(EvalError::IntegerOnlyOperator { .. }))
            ),
            "{input}"
        );
    }
}

#[test]
fn division_by_zero() {
    for input in ["5 0 /", "10 0 //", "7 0 %", "1 0.0 /", "0 1 ~ **", "0.0 0.5 ~ **"] {
        assert!(
            matches!(
                evaluate(input),
                Err(Error::Eval(EvalError::DivisionByZero { .. }))
            ),
            "{input}"
        );
    }
}

#[test]
fn float_results() {
    assert_eq!(Number::Float(3.5), value("7 2 /"));
    assert_eq!(Number::Float(5.5), value("2 3.5 +"));
    assert_eq!("4", shown("10 2.5 /"));
    assert_eq!("0.666667", shown("2 3 /"));
    assert_eq!("5.14", shown("3.14 2 +"));
    assert_eq!("0.003", shown("0.001 0.002 +"));
    assert_eq!("0.5", shown("2 1 ~ **"));
}

#[test]
fn out_of_range_results() {
    for input in ["2 64 **", "9223372036854775807 1 +", "10.0 400 **", "10 400.0 **"] {
        assert!(
            matches!(
                evaluate(input),
                Err(Error::Eval(EvalError::Overflow {
                    op: Operator::Binary(_),
                    ..
                }))
            ),
            "{input}"
        );
    }
    assert!(matches!(value("8 ~ 0.5 **"), Number::Float(x) if x.is_nan()));
}

#[test]
fn malformed_input() {
    assert!(matches!(
        evaluate("( )"),
        Err(Error::Eval(EvalError::EmptyBrackets { .. }))
    ));
    assert!(matches!(
        evaluate("4 + 3"),
        Err(Error::Eval(EvalError::NotEnoughBinaryArgs {
            op: BinaryOp::Add,
            ..
        }))
    ));
    assert_eq!(
        Err(Error::Eval(EvalError::InvalidExpression { count: 3 })),
        evaluate("2 3 4")
    );
    assert!(matches!(
        evaluate("( 2 3 +"),
        Err(Error::Lex(LexError::UnbalancedBrackets { .. }))
    ));
    assert!(matches!(
        evaluate("2 3 @"),
        Err(Error::Lex(LexError::UnknownSymbol { symbol: '@', .. }))
    ));
    assert_eq!(Err(Error::Lex(LexError::EmptyExpression)), evaluate("  "));
}

#[test]
fn nesting_limit_is_configurable() {
    let input = "( ( ( 1 ) ) )";
    assert_eq!(Ok(Number::Integer(1)), evaluate(input));
    assert!(matches!(
        evaluate_with(input, &Config::new().with_max_depth(2)),
        Err(Error::Eval(EvalError::NestingTooDeep { max: 2, .. }))
    ));
}

#[test]
fn evaluation_is_repeatable() {
    for input in ["3 4 2 * +", "2 3 /", "5 0 /", "( 2 3 )", "2 3 @"] {
        let first = evaluate(input);
        for _ in 0..3 {
            assert_eq!(first, evaluate(input));
        }
    }
}

#[test]
fn evaluation_is_thread_safe() {
    let handles: Vec<_> = (0..4i64)
        .map(|i| std::thread::spawn(move || evaluate(&format!("{i} ( {i} 1 + ) *"))))
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let i = i as i64;
        assert_eq!(Ok(Number::Integer(i * (i + 1))), handle.join().unwrap());
    }
}

