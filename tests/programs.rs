//! Whole programs run through `run_program` under both scoping disciplines.

#![expect(clippy::unwrap_used)] // test code OK

use dynlisp::ast::{Value, nil, val};
use dynlisp::screen::BufferScreen;
use dynlisp::{Error, Scoping, run_program};

/// Expected outcome of running a program
#[derive(Debug, Clone)]
enum TestResult {
    EvalResult(Value),           // Program should succeed with this value
    SpecificError(&'static str), // Program should fail with error containing this string
    Error,                       // Program should fail (any error)
}
use TestResult::*;

const MODES: [Scoping; 2] = [Scoping::Dynamic, Scoping::Static];

fn run(source: &str, scoping: Scoping) -> (Result<Value, Error>, BufferScreen) {
    let mut screen = BufferScreen::new();
    let result = run_program(source, scoping, &mut screen);
    (result, screen)
}

fn check(test_id: &str, source: &str, scoping: Scoping, expected: &TestResult) {
    let (result, _) = run(source, scoping);
    match (result, expected) {
        (Ok(actual), EvalResult(expected)) => {
            assert_eq!(actual, *expected, "{test_id} ({scoping:?}): '{source}'");
        }
        (Err(err), SpecificError(fragment)) => {
            let message = err.to_string();
            assert!(
                message.contains(fragment),
                "{test_id} ({scoping:?}): '{source}' failed with '{message}', expected '{fragment}'"
            );
        }
        (Err(_), TestResult::Error) => {}
        (actual, expected) => {
            panic!("{test_id} ({scoping:?}): '{source}' gave {actual:?}, expected {expected:?}")
        }
    }
}

#[test]
fn test_programs_agree_across_scoping() {
    let test_cases = vec![
        ("", EvalResult(nil())),
        ("(+ 5 3 2)", EvalResult(val(10))),
        ("(+)", EvalResult(val(0))),
        ("(*)", EvalResult(val(1))),
        ("(- 5)", EvalResult(val(5))),
        ("(- 10 1 2)", EvalResult(val(7))),
        ("(/ 7 2)", EvalResult(val(3))),
        ("(/ -7 2)", EvalResult(val(-4))),
        ("(/ 7 -2)", EvalResult(val(-4))),
        ("(/ 7 0)", SpecificError("division by zero")),
        ("(* 9223372036854775807 2)", SpecificError("integer overflow")),
        ("(let x 10) (+ x 0)", EvalResult(val(10))),
        ("(let x 10) (let y 20) (= x y) x", EvalResult(val(20))),
        ("(let x 1) (let x (+ x 1)) x", EvalResult(val(2))),
        ("(defun double (x) (+ x x)) (double 7)", EvalResult(val(14))),
        ("(defun double (x) (+ x x)) (double (double 3))", EvalResult(val(12))),
        ("(let x 4) (defun foo () (let x 10) (= x 11)) (foo) x", EvalResult(val(4))),
        ("(defun f () 5) (f)", EvalResult(val(5))),
        ("(defun f (a b) (let c (+ a b)) (* c c)) (f 1 2)", EvalResult(val(9))),
        (
            "(defun outer (x) (defun inner (y) (+ x y)) (inner 1)) (outer 10)",
            EvalResult(val(11)),
        ),
        // Functions defined inside a call disappear with the call's frame
        (
            "(defun outer () (defun inner () 1) (inner)) (outer) (inner)",
            SpecificError("undefined function inner"),
        ),
        ("(cons 1 (cons 2 ()))", EvalResult(val(vec![val(1), val(2)]))),
        ("(list 1 2)", EvalResult(val(vec![val(1), val(2)]))),
        ("(list)", EvalResult(nil())),
        ("(cons 1 2)", SpecificError("cons needs a list")),
        ("(cons 1)", SpecificError("cons needs exactly 2 arguments")),
        ("(print 7)", EvalResult(nil())),
        ("(nothing 1)", SpecificError("undefined function nothing")),
        ("(defun f (a b) (+ a b)) (f 1)", SpecificError("expected 2 arguments but got 1")),
        ("(defun f (n) (f n)) (f 1)", SpecificError("evaluation depth limit exceeded")),
        ("(defun f (n) (* n n)) (+ 1 (f (list 1)))", SpecificError("In function: f")),
        // A function named like a generated variable stays callable
        ("(defun x_0 () 5) (let x 7) (x_0)", EvalResult(val(5))),
        ("(1 2)", TestResult::Error),
        ("(+ 1 2", SpecificError("expected ')'")),
        (")", SpecificError("unexpected ')'")),
        ("(+ 1 2))", SpecificError("line 1, character 8")),
    ];

    for (i, (source, expected)) in test_cases.iter().enumerate() {
        for scoping in MODES {
            check(&format!("Program #{}", i + 1), source, scoping, expected);
        }
    }
}

#[test]
fn test_programs_that_depend_on_scoping() {
    // (source, dynamic result, static result)
    let test_cases = vec![
        // A callee sees the caller's parameter only under dynamic scope
        (
            "(let x 1) (defun show () x) (defun wrapper (x) (show)) (wrapper 2)",
            EvalResult(val(2)),
            EvalResult(val(1)),
        ),
        // Later arguments are evaluated after earlier parameters are bound
        (
            "(let a 1) (defun f (a b) b) (f 10 a)",
            EvalResult(val(10)),
            EvalResult(val(1)),
        ),
        // Free variables are rejected before evaluation in static mode
        (
            "(defun get () y) (defun caller (y) (get)) (caller 5)",
            EvalResult(val(5)),
            SpecificError("undefined variable y"),
        ),
        // A `let` inside a user call's argument lives in the callee's frame
        (
            "(defun id (a) a) (id (let x 1)) x",
            SpecificError("unknown symbol x"),
            SpecificError("undefined variable x"),
        ),
        ("(= z 1)", SpecificError("unknown symbol z"), SpecificError("undefined variable z")),
        ("y", SpecificError("unknown symbol y"), SpecificError("undefined variable y")),
        // Function names are only callable, not readable, once renamed
        (
            "(defun sq (n) (* n n)) (let f sq) (f 4)",
            EvalResult(val(16)),
            SpecificError("undefined variable sq"),
        ),
        (
            "(let 1 2)",
            SpecificError("can't perform attribution using '1'"),
            SpecificError("unexpected form"),
        ),
    ];

    for (i, (source, dynamic, lexical)) in test_cases.iter().enumerate() {
        let test_id = format!("Scoped program #{}", i + 1);
        check(&test_id, source, Scoping::Dynamic, dynamic);
        check(&test_id, source, Scoping::Static, lexical);
    }
}

#[test]
fn test_printed_output() {
    let source = "
        (let x 1)
        (defun show () (print x))
        (defun wrapper (x) (show))
        (wrapper 2)
        (print (list 1 2) (cons 3 ()) -4)";

    let (result, screen) = run(source, Scoping::Dynamic);
    assert_eq!(result.unwrap(), nil());
    assert_eq!(screen.lines(), vec!["2", "(1 (2 ()))", "(3 ())", "-4"]);

    let (result, screen) = run(source, Scoping::Static);
    assert_eq!(result.unwrap(), nil());
    assert_eq!(screen.lines(), vec!["1", "(1 (2 ()))", "(3 ())", "-4"]);
}

#[test]
fn test_output_before_failure() {
    let source = "(print 1) (print y) (print 2)";

    // Dynamic scope only finds the problem when it gets there
    let (result, screen) = run(source, Scoping::Dynamic);
    assert_eq!(result, Err(Error::UnknownSymbol("y".into())));
    assert_eq!(screen.contents(), "1\n");

    // The binder rejects the program before anything runs
    let (result, screen) = run(source, Scoping::Static);
    assert_eq!(result, Err(Error::UndefinedVariable("y".into())));
    assert_eq!(screen.contents(), "");
}

#[test]
fn test_floor_division_matches_host() {
    for a in [-9i64, -7, -1, 0, 1, 6, 7, 100] {
        for b in [-4i64, -3, -1, 1, 2, 5] {
            let source = format!("(/ {a} {b})");
            let (result, _) = run(&source, Scoping::Dynamic);
            let quotient = a / b;
            let floor = if a % b != 0 && (a < 0) != (b < 0) {
                quotient - 1
            } else {
                quotient
            };
            assert_eq!(result.unwrap(), val(floor), "{source}");
        }
    }
}
