//! QBE backend. Consumes the three-address IR and prints QBE text: one
//! stack slot per numeric variable, `loadw`/`storew` around every use,
//! and a `$printi` helper for `console.log`. String values have no
//! representation here and are silently skipped.

use std::fmt::{self, Write as _};

use frontend::ast::{Operator, Program};
use frontend::ir::{Instr, IrProgram};
use frontend::semantic::{SemType, TypeTable};

#[derive(Debug)]
pub struct QbeGenError(fmt::Error);

impl fmt::Display for QbeGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "qbe code generation failed: {}", self.0)
    }
}

impl std::error::Error for QbeGenError {}

impl From<fmt::Error> for QbeGenError {
    fn from(err: fmt::Error) -> Self {
        QbeGenError(err)
    }
}

pub struct QbeGenerator<'a> {
    ir: &'a IrProgram,
    program: &'a Program,
    types: &'a TypeTable,
    output: String,
    params: Vec<String>,
}

impl<'a> QbeGenerator<'a> {
    pub fn new(ir: &'a IrProgram, program: &'a Program, types: &'a TypeTable) -> Self {
        QbeGenerator {
            ir,
            program,
            types,
            output: String::new(),
            params: Vec::new(),
        }
    }

    pub fn generate(mut self) -> Result<String, QbeGenError> {
        self.output.push_str("data $fmt = { b \"%d\\n\", b 0 }\n\n");
        self.output.push_str("export function w $printi(w %n) {\n");
        self.output.push_str("@start\n");
        self.output
            .push_str("    call $printf(l $fmt, ..., w %n)\n");
        self.output.push_str("    ret 0\n");
        self.output.push_str("}\n\n");

        self.output.push_str("export function w $main() {\n");
        self.output.push_str("@start\n");
        self.emit_slots()?;
        for (index, instr) in self.ir.iter().enumerate() {
            self.emit_instr(instr, index)?;
        }
        self.output.push_str("    ret 0\n");
        self.output.push_str("}\n");
        Ok(self.output)
    }

    /// One 4-byte slot per numeric or boolean variable, in first
    /// assignment order.
    fn emit_slots(&mut self) -> Result<(), QbeGenError> {
        let mut seen: Vec<String> = Vec::new();
        for instr in self.ir.iter() {
            let Instr::Assign { dst, .. } = instr else {
                continue;
            };
            if seen.iter().any(|name| name == dst) {
                continue;
            }
            match self.var_type(dst) {
                Some(SemType::String) | None => continue,
                Some(_) => {}
            }
            writeln!(self.output, "    %{dst} =l alloc4 4")?;
            seen.push(dst.clone());
        }
        Ok(())
    }

    fn emit_instr(&mut self, instr: &Instr, index: usize) -> Result<(), QbeGenError> {
        match instr {
            Instr::Assign { dst, src } => {
                if !matches!(
                    self.var_type(dst),
                    Some(SemType::Number) | Some(SemType::Boolean)
                ) {
                    return Ok(());
                }
                let Some(value) = self.value_operand(src, 's', index)? else {
                    return Ok(());
                };
                writeln!(self.output, "    storew {value}, %{dst}")?;
            }
            Instr::BinOp { dst, lhs, op, rhs } => {
                let Some(left) = self.value_operand(lhs, 'a', index)? else {
                    return Ok(());
                };
                let Some(right) = self.value_operand(rhs, 'b', index)? else {
                    return Ok(());
                };
                writeln!(
                    self.output,
                    "    %{dst} =w {} {left}, {right}",
                    qbe_binop(*op)
                )?;
            }
            Instr::Label(label) => {
                writeln!(self.output, "@{label}")?;
            }
            Instr::Goto(label) => {
                writeln!(self.output, "    jmp @{label}")?;
            }
            Instr::IfFalseGoto { cond, target } => {
                let Some(value) = self.value_operand(cond, 'c', index)? else {
                    return Ok(());
                };
                // jnz falls through on nonzero, jumps on zero.
                writeln!(self.output, "    jnz {value}, @next_{index}, @{target}")?;
                writeln!(self.output, "@next_{index}")?;
            }
            Instr::Param(operand) => {
                self.params.push(operand.clone());
            }
            Instr::Call { callee, argc } => {
                let start = self.params.len().saturating_sub(*argc);
                let args: Vec<String> = self.params.drain(start..).collect();
                if callee.as_str() == "console.log" {
                    for arg in &args {
                        if let Some(value) = self.value_operand(arg, 'p', index)? {
                            writeln!(self.output, "    call $printi(w {value})")?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolves an IR operand to a QBE value, emitting a `loadw` for
    /// variables. `None` means the operand is a string and the caller
    /// should drop the instruction.
    fn value_operand(
        &mut self,
        name: &str,
        slot: char,
        index: usize,
    ) -> Result<Option<String>, QbeGenError> {
        if is_temp(name) {
            return Ok(Some(format!("%{name}")));
        }
        if let Some(value) = literal_value(name) {
            return Ok(Some(value.to_string()));
        }
        match self.var_type(name) {
            Some(SemType::String) | None => Ok(None),
            Some(_) => {
                let reg = format!("%{slot}{index}");
                writeln!(self.output, "    {reg} =w loadw %{name}")?;
                Ok(Some(reg))
            }
        }
    }

    fn var_type(&self, name: &str) -> Option<SemType> {
        let symbol = self.program.interner.get(name)?;
        self.types.lookup(symbol)
    }
}

/// Generated temporaries are `t` followed by digits. A source variable
/// spelled that way is indistinguishable from one.
fn is_temp(name: &str) -> bool {
    name.len() > 1
        && name.starts_with('t')
        && name[1..].bytes().all(|b| b.is_ascii_digit())
}

fn literal_value(text: &str) -> Option<i64> {
    match text {
        "true" => return Some(1),
        "false" => return Some(0),
        _ => {}
    }
    if let Some(rest) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i64::from_str_radix(rest, 16).ok();
    }
    if let Some(rest) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        return i64::from_str_radix(rest, 2).ok();
    }
    text.parse().ok()
}

fn qbe_binop(op: Operator) -> &'static str {
    match op {
        Operator::Add => "add",
        Operator::Sub => "sub",
        Operator::Mul => "mul",
        Operator::Div => "div",
        Operator::Eq => "ceqw",
        Operator::Ne => "cnew",
        Operator::Lt => "csltw",
        Operator::Gt => "csgtw",
        Operator::Le => "cslew",
        Operator::Ge => "csgew",
    }
}
