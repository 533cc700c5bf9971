//! The single peephole pass.
//!
//! Runs once per emitted function, after scanning is complete and before
//! the instruction stream reaches the writer. Patterns:
//! - `local.set x; local.get x` collapses to `local.tee x`
//! - a constant immediately dropped disappears
//! - `nop` disappears

use javelin_wasm::{Instruction, LocalOp};

pub struct CodeOptimizer;

impl CodeOptimizer {
    /// Rewrite the instruction list in place.
    pub fn optimize(instructions: &mut Vec<Instruction>) {
        let mut i = 0;
        while i < instructions.len() {
            if matches!(instructions[i], Instruction::Nop) {
                instructions.remove(i);
                continue;
            }

            if i + 1 < instructions.len() {
                if let (
                    Instruction::Local {
                        op: LocalOp::Set,
                        index: set_index,
                        line,
                    },
                    Instruction::Local {
                        op: LocalOp::Get,
                        index: get_index,
                        ..
                    },
                ) = (&instructions[i], &instructions[i + 1])
                    && set_index == get_index
                {
                    let (index, line) = (*set_index, *line);
                    instructions[i] = Instruction::Local {
                        op: LocalOp::Tee,
                        index,
                        line,
                    };
                    instructions.remove(i + 1);
                    continue;
                }

                if matches!(instructions[i], Instruction::Const { .. })
                    && matches!(instructions[i + 1], Instruction::Drop { .. })
                {
                    instructions.drain(i..i + 2);
                    continue;
                }
            }

            i += 1;
        }
    }
}
