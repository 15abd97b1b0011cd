use compiler_core::CompilerSession;
use qbe_backend::QbeGenerator;

fn emit(source: &str) -> String {
    let output = CompilerSession::new()
        .compile(source)
        .expect("compilation should succeed");
    QbeGenerator::new(&output.ir, &output.program, &output.types)
        .generate()
        .expect("codegen should succeed")
}

#[test]
fn module_carries_helper_and_main() {
    let qbe = emit("let x = 1;");
    assert!(qbe.starts_with("data $fmt = { b \"%d\\n\", b 0 }\n"));
    assert!(qbe.contains("export function w $printi(w %n) {"));
    assert!(qbe.contains("call $printf(l $fmt, ..., w %n)"));
    assert!(qbe.contains("export function w $main() {"));
    assert!(qbe.trim_end().ends_with("ret 0\n}"));
}

#[test]
fn numeric_variable_gets_slot_and_store() {
    let qbe = emit("let x = 42;");
    assert!(qbe.contains("    %x =l alloc4 4\n"));
    assert!(qbe.contains("    storew 42, %x\n"));
}

#[test]
fn each_variable_gets_one_slot() {
    let qbe = emit("let x = 1;\nx = 2;\nlet y = 3;");
    assert_eq!(qbe.matches("%x =l alloc4 4").count(), 1);
    assert_eq!(qbe.matches("%y =l alloc4 4").count(), 1);
}

#[test]
fn variable_uses_load_before_arithmetic() {
    let qbe = emit("let x = 1;\nlet y = x + 2;");
    assert!(qbe.contains("=w loadw %x\n"));
    assert!(qbe.contains("=w add "));
    assert!(qbe.contains("    storew %t0, %y\n"));
}

#[test]
fn print_of_variable_loads_then_calls_helper() {
    let qbe = emit("let x = 7;\nconsole.log(x);");
    let call_pos = qbe.find("call $printi(w %p").expect("call should be present");
    let load_pos = qbe.rfind("=w loadw %x").expect("load should be present");
    assert!(load_pos < call_pos);
}

#[test]
fn print_of_literal_passes_it_directly() {
    let qbe = emit("console.log(5);");
    assert!(qbe.contains("    call $printi(w 5)\n"));
}

#[test]
fn while_loop_lowers_to_labels_and_jumps() {
    let qbe = emit("let i = 0;\nwhile (i < 3) {\ni = i + 1;\nconsole.log(i);\n}");
    assert!(qbe.contains("@L0\n"));
    assert!(qbe.contains("@L1\n"));
    assert!(qbe.contains("    jmp @L0\n"));
    assert!(qbe.contains("=w csltw "));
    // ifFalse: fall through on true, jump to the exit label on false.
    assert!(qbe.contains(", @L1\n"));
    assert!(qbe.contains("jnz %t0, @next_"));
}

#[test]
fn comparison_operators_map_to_qbe_forms() {
    let qbe = emit("let a = 1;\nif (a === 1) { a = 2; }\nif (a !== 5) { a = 3; }");
    assert!(qbe.contains("=w ceqw "));
    assert!(qbe.contains("=w cnew "));
}

#[test]
fn hex_literals_are_stored_as_decimal() {
    let qbe = emit("let x = 0x10;");
    assert!(qbe.contains("    storew 16, %x\n"));
}

#[test]
fn booleans_store_as_ints() {
    let qbe = emit("let flag = true;\nflag = false;");
    assert!(qbe.contains("    %flag =l alloc4 4\n"));
    assert!(qbe.contains("    storew 1, %flag\n"));
    assert!(qbe.contains("    storew 0, %flag\n"));
}

#[test]
fn string_variables_are_skipped_entirely() {
    let qbe = emit("let s = \"hello\";\nconsole.log(s);");
    assert!(!qbe.contains("%s =l"));
    assert!(!qbe.contains("storew"));
    assert!(!qbe.contains("hello"));
}

#[test]
fn for_loop_emits_update_before_back_jump() {
    let qbe = emit("for (let i = 0; i < 3; i++) { console.log(i); }");
    let add_pos = qbe.find("=w add ").expect("update add should be present");
    let jmp_pos = qbe.find("jmp @L0").expect("back jump should be present");
    assert!(add_pos < jmp_pos);
}
