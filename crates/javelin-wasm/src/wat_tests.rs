//! Tests for the text-code parser.

use super::instruction::{Instruction, LocalOp, NO_LINE, NumericOp};
use super::types::{ValueType, WasmValue};
use super::wat::{WatError, parse};

#[test]
fn folded_const() {
    assert_eq!(
        parse("(i32.const 42)").unwrap(),
        vec![Instruction::i32_const(42)]
    );
}

#[test]
fn flat_sequence() {
    let instructions = parse("local.get 0 local.get 1 i32.add return").unwrap();
    assert_eq!(
        instructions,
        vec![
            Instruction::local_get(0),
            Instruction::local_get(1),
            Instruction::Numeric {
                op: NumericOp::Add,
                ty: ValueType::I32,
                line: NO_LINE,
            },
            Instruction::Return { line: NO_LINE },
        ]
    );
}

#[test]
fn folded_operands_emit_before_operator() {
    let instructions = parse("(i32.add (i32.const 1) (i32.const 2))").unwrap();
    assert_eq!(
        instructions,
        vec![
            Instruction::i32_const(1),
            Instruction::i32_const(2),
            Instruction::Numeric {
                op: NumericOp::Add,
                ty: ValueType::I32,
                line: NO_LINE,
            },
        ]
    );
}

#[test]
fn call_with_signature_reference() {
    let instructions = parse("local.get 0 call $java/lang/Math.sqrt(D)D return").unwrap();
    let Instruction::Call { target, .. } = &instructions[1] else {
        panic!("expected call, got {:?}", instructions[1]);
    };
    assert_eq!(target.signature_name(), "java/lang/Math.sqrt(D)D");
}

#[test]
fn float_consts_and_tee() {
    let instructions = parse("(f64.const 2.5) local.tee 3").unwrap();
    assert_eq!(
        instructions,
        vec![
            Instruction::Const {
                value: WasmValue::F64(2.5),
                line: NO_LINE,
            },
            Instruction::Local {
                op: LocalOp::Tee,
                index: 3,
                line: NO_LINE,
            },
        ]
    );
}

#[test]
fn line_comments_are_skipped() {
    let instructions = parse(";; answer\n(i32.const 42) ;; trailing\n").unwrap();
    assert_eq!(instructions, vec![Instruction::i32_const(42)]);
}

#[test]
fn unknown_instruction_is_rejected() {
    assert_eq!(
        parse("i32.popcnt_wrong"),
        Err(WatError::UnknownInstruction("i32.popcnt_wrong".to_string()))
    );
}

#[test]
fn bad_number_is_rejected() {
    assert_eq!(
        parse("i32.const abc"),
        Err(WatError::InvalidNumber("abc".to_string()))
    );
}

#[test]
fn call_reference_must_carry_signature() {
    assert_eq!(
        parse("call $log"),
        Err(WatError::InvalidName("log".to_string()))
    );
}

#[test]
fn unbalanced_parens_are_rejected() {
    assert!(parse("(i32.const 1").is_err());
    assert!(parse("i32.const 1)").is_err());
}
