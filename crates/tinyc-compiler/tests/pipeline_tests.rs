//! End-to-end pipeline tests: source → lex → parse → codegen → .wasm →
//! execution, plus the structured result handed to hosts.

use tinyc_compiler::{compile, compile_to_result, CompileResult};
use tinyc_types::ErrorCode;
use wasmi::{Engine, Linker, Module, Store};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Compile, instantiate and call `main`.
fn run(source: &str) -> i32 {
    let wasm = compile(source, "test.c").unwrap_or_else(|errors| {
        panic!(
            "compile errors:\n{}",
            errors
                .errors
                .iter()
                .map(|e| format!("  [{}] {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("\n")
        )
    });
    let engine = Engine::default();
    let module = Module::new(&engine, &wasm[..]).expect("failed to parse wasm module");
    let mut store = Store::new(&engine, ());
    let instance = Linker::<()>::new(&engine)
        .instantiate(&mut store, &module)
        .expect("failed to instantiate")
        .start(&mut store)
        .expect("failed to start instance");
    instance
        .get_typed_func::<(), i32>(&store, "main")
        .expect("main has type () -> i32")
        .call(&mut store, ())
        .unwrap_or_else(|e| panic!("main trapped: {e}"))
}

// ══════════════════════════════════════════════════════════════════════════════
// 1. Scenarios
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn returns_literal() {
    assert_eq!(run("int main() { return 7; }"), 7);
}

#[test]
fn pointer_write_through() {
    assert_eq!(run("int main() { int x = 3; int *y = &x; *y = 4; return x; }"), 4);
}

#[test]
fn for_loop_sum() {
    let src = "int main() { int s = 0; for (int i = 0; i < 5; i = i + 1) s = s + i; return s; }";
    assert_eq!(run(src), 10);
}

#[test]
fn two_argument_call() {
    let src = "int add(int a, int b) { return a + b; } int main() { return add(3, 4); }";
    assert_eq!(run(src), 7);
}

#[test]
fn arity_mismatch_is_reported() {
    let src = "int add(int a, int b) { return a + b; }\nint main() { return add(3); }";
    let errors = compile(src, "add.c").unwrap_err();
    assert_eq!(errors.total_errors, 1);
    let e = &errors.errors[0];
    assert_eq!(e.code, ErrorCode::WRONG_ARG_COUNT);
    assert!(e.message.contains("requires 2 arguments, but 1 were given"));
    assert_eq!(e.span.start_line, 2);
}

#[test]
fn pointer_to_pointer() {
    let src = "int main() { int x = 10; int *p = &x; int **pp = &p; **pp = 20; return x; }";
    assert_eq!(run(src), 20);
}

#[test]
fn bracket_mismatch_produces_no_module() {
    let result = compile_to_result("int main() { return 1;", "open.c");
    assert!(!result.success);
    assert!(result.wasm.is_none());
    assert_eq!(result.errors.errors[0].code, ErrorCode::BRACKET_MISMATCH);
    assert!(result.errors.errors[0].message.starts_with("Bracket mismatch"));
}

#[test]
fn nested_calls() {
    let src = "int add(int a, int b) { return a + b; }
               int sub(int a, int b) { return a - b; }
               int ret15() { return 15; }
               int main() { return add(add(5, 5), sub(10, 8)) * 100 + add(ret15(), 2); }";
    assert_eq!(run(src), 1217);
}

#[test]
fn while_and_do_while() {
    assert_eq!(
        run("int main() {\n\tint i = 0;\n\twhile (i < 5) {\n\t\ti = i + 1;\n\t}\n\treturn i;\n}"),
        5
    );
    assert_eq!(run("int main() { int i = 0; do { i = i + 2; } while (i < 9); return i; }"), 10);
}

#[test]
fn comments_are_ignored() {
    let src = "// leading comment\nint main() {\n  /* block\n comment */ return 3; // trailing\n}";
    assert_eq!(run(src), 3);
}

#[test]
fn recursive_gcd() {
    let src = "int mod(int a, int b) { return a - a / b * b; }
               int gcd(int a, int b) { if (b == 0) return a; return gcd(b, mod(a, b)); }
               int main() { return gcd(1071, 462); }";
    assert_eq!(run(src), 21);
}

#[test]
fn pointer_walk_over_locals() {
    // Locals are laid out downward from the first declared, so stepping a
    // pointer backwards visits them in declaration order.
    let src = "int main() {
        int a = 1; int b = 2; int c = 3; int d = 4;
        int *p = &a; int s = 0;
        for (int i = 0; i < 4; i = i + 1) s = s * 10 + *(p - i);
        return s;
    }";
    assert_eq!(run(src), 1234);
}

// ══════════════════════════════════════════════════════════════════════════════
// 2. Structured result
// ══════════════════════════════════════════════════════════════════════════════

const SIMPLE: &str = "int main() { return 42; }";

#[test]
fn valid_program_produces_success_result() {
    let result = compile_to_result(SIMPLE, "simple.c");
    assert!(result.success);
    assert!(result.wasm.is_some());
    assert!(!result.errors.has_errors());
    assert_eq!(result.source_hash.len(), 64);
    assert_eq!(result.wasm_hash.as_ref().map(String::len), Some(64));

    let json = serde_json::to_string(&result).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["success"], true);
    assert!(!parsed["wasm"].is_null());
    assert_eq!(parsed["errors"]["total_errors"], 0);
}

#[test]
fn syntax_error_produces_structured_json() {
    let result = compile_to_result("int main() {\n  return 1 +;\n}", "bad.c");
    assert!(!result.success);
    assert!(result.wasm.is_none());
    assert!(result.wasm_hash.is_none());

    let json = serde_json::to_string(&result).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["success"], false);
    let error = &parsed["errors"]["errors"][0];
    assert_eq!(error["code"], 101);
    assert_eq!(error["category"], "syntax");
    assert_eq!(error["file"], "bad.c");
    assert_eq!(error["line"], 2);
    assert_eq!(error["source_line"], "  return 1 +;");
    assert_eq!(parsed["errors"]["total_errors"], 1);
}

#[test]
fn compile_result_json_roundtrip() {
    let result = compile_to_result(SIMPLE, "simple.c");
    let json = serde_json::to_string(&result).unwrap();
    let rt: CompileResult = serde_json::from_str(&json).unwrap();
    assert_eq!(rt.success, result.success);
    assert_eq!(rt.wasm, result.wasm);
    assert_eq!(rt.source_hash, result.source_hash);
    assert_eq!(rt.wasm_hash, result.wasm_hash);
}

#[test]
fn hashes_track_content() {
    let a = compile_to_result(SIMPLE, "a.c");
    let b = compile_to_result(SIMPLE, "b.c");
    let c = compile_to_result("int main() { return 43; }", "a.c");
    assert_eq!(a.source_hash, b.source_hash);
    assert_eq!(a.wasm_hash, b.wasm_hash);
    assert_ne!(a.source_hash, c.source_hash);
    assert_ne!(a.wasm_hash, c.wasm_hash);
}

#[test]
fn error_result_still_hashes_source() {
    let result = compile_to_result("", "empty.c");
    assert!(!result.success);
    assert_eq!(
        result.source_hash,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// 3. Isolation
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn compilations_are_independent() {
    // A failed compilation leaves nothing behind for the next one.
    assert!(compile("int main() { return x; }", "bad.c").is_err());
    assert_eq!(run("int main() { int x = 5; return x; }"), 5);
}

#[test]
fn concurrent_compilations_agree() {
    let src = "int f(int n) { if (n < 2) return 1; return n * f(n - 1); } int main() { return f(5); }";
    let expected = compile(src, "f.c").unwrap();
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(move || compile(src, "f.c").unwrap()))
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
    assert_eq!(run(src), 120);
}
