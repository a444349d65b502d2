//! End-to-end tests: script text through the lexer, parser and interpreter
//! against registered command hosts, plus the serialized tree contract.

use std::cell::RefCell;
use std::rc::Rc;

use drover_core::budget::ExecutionBudget;
use drover_core::error::ScriptError;
use drover_core::host::{CommandRegistry, NullHost};
use drover_core::interp::Interpreter;
use drover_core::parser::Parser;
use drover_core::value::Value;

/// Registry with a couple of scene commands that log what they were called
/// with.
fn scripted_host() -> (CommandRegistry, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut registry = CommandRegistry::new();

    let sink = Rc::clone(&log);
    registry.register("load", "scene", "Load an asset", move |args| {
        sink.borrow_mut().push(format!("load {}", args[0]));
        Ok(Value::Bool(true))
    });

    let sink = Rc::clone(&log);
    registry.register("move_to", "scene", "Move the cursor", move |args| {
        sink.borrow_mut().push(format!("move_to {} {}", args[0], args[1]));
        Ok(Value::Null)
    });

    (registry, log)
}

// ---------------------------------------------------------------------------
// 1. A realistic script drives host commands in order
// ---------------------------------------------------------------------------

#[test]
fn test_full_script_drives_host_commands() {
    let (registry, log) = scripted_host();
    let mut interp = Interpreter::new(registry);

    let script = "\
assets = [\"a.png\", \"b.png\"]
foreach asset in assets: load(asset)
if len(assets) == 2: move_to(10, 20)
";
    interp.run_source(script).expect("script should run");

    assert_eq!(
        *log.borrow(),
        vec![
            "load a.png".to_string(),
            "load b.png".to_string(),
            "move_to 10 20".to_string(),
        ]
    );
}

// ---------------------------------------------------------------------------
// 2. Interpreter state persists across run_source calls
// ---------------------------------------------------------------------------

#[test]
fn test_session_state_persists_between_runs() {
    let mut interp = Interpreter::new(NullHost::new());

    interp.run_source("total = 10").unwrap();
    interp.run_source("push total * 2").unwrap();
    assert_eq!(interp.run_source("pop doubled").unwrap(), Value::Int(20));
    assert_eq!(interp.state().get("doubled"), Some(&Value::Int(20)));
    assert_eq!(interp.state().get("total"), Some(&Value::Int(10)));
}

// ---------------------------------------------------------------------------
// 3. One budget spans parsing and execution
// ---------------------------------------------------------------------------

#[test]
fn test_budget_is_shared_between_parse_and_execute() {
    // Parsing the list literal costs 8 units, so the budget survives the
    // parse and then cannot afford the assignment.
    let budget = ExecutionBudget::new(8);
    let mut interp = Interpreter::with_budget(NullHost::new(), budget);

    let err = interp.run_source("x = [1, 2, 3]").unwrap_err();
    match err {
        ScriptError::Budget(b) => {
            assert_eq!(b.operation, "assignment");
            assert_eq!(b.limit, 8);
        }
        other => panic!("expected a budget error, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// 4. Name resolution order differs between statement and expression position
// ---------------------------------------------------------------------------

#[test]
fn test_host_wins_statements_builtins_win_expressions() {
    let mut registry = CommandRegistry::new();
    registry.register("print", "output", "Host print", |_args| {
        Ok(Value::Str("host print".to_string()))
    });
    let mut interp = Interpreter::new(registry);

    // Command position: the host shadows the built-in.
    assert_eq!(
        interp.run_source("print(\"x\")").unwrap(),
        Value::Str("host print".to_string())
    );

    // Expression position: the built-in shadows the host and returns null.
    assert_eq!(interp.run_source("y = print(\"x\")").unwrap(), Value::Null);
}

// ---------------------------------------------------------------------------
// 5. Dry runs against the null host keep built-ins live
// ---------------------------------------------------------------------------

#[test]
fn test_null_host_dry_run() {
    let mut interp = Interpreter::new(NullHost::new());

    let script = "\
tap(\"login-button\")
swipe(\"up\")
n = len(\"abc\")
";
    assert_eq!(interp.run_source(script).unwrap(), Value::Int(3));
    assert_eq!(
        interp.host().calls(),
        &["tap".to_string(), "swipe".to_string()]
    );
}

// ---------------------------------------------------------------------------
// 6. The serialized tree keeps its JSON contract
// ---------------------------------------------------------------------------

#[test]
fn test_serialized_tree_contract() {
    let mut parser = Parser::new();
    let statements = parser
        .parse_script("count = 1 + 2\nif count > 2: push count")
        .unwrap();
    let json = serde_json::to_value(&statements).unwrap();

    assert_eq!(json[0]["type"], "assignment");
    assert_eq!(json[0]["variable"], "count");
    assert_eq!(json[0]["value"]["type"], "BINARY_OPERATION");
    assert_eq!(json[0]["value"]["operator"], "+");
    assert_eq!(json[0]["value"]["left"], 1);

    assert_eq!(json[1]["type"], "if");
    assert_eq!(json[1]["condition"]["operator"], ">");
    assert_eq!(json[1]["then"][0]["type"], "push");
    assert_eq!(json[1]["then"][0]["value"]["type"], "variable");
    assert!(json[1].get("else").is_none());
}
