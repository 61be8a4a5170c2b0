use crate::diagnostics::TranslateError;
use crate::lexer::{Opcode, Token, TokenKind};
use crate::origin::Origin;

use super::ast::{ExprArena, ExprId, ExprKind, ExprTree};

/// What kind of thing the token immediately to the left looked like, for the
/// prev-kind/next-kind ambiguity table this parser applies to `+ - * & ++ --` (each of which can
/// be a unary prefix operator or a binary/postfix operator depending on context).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotKind {
	/// Nothing yet, or the last thing seen was itself an operator expecting an operand next.
	ExpectOperand,
	/// The last thing seen was a complete operand (identifier, literal, `)`, `]`, postfix `++`).
	ExpectOperator,
}

struct ShuntingYard<'a> {
	tokens: &'a [Token],
	position: usize,
	arena: ExprArena,
	output: Vec<ExprId>,
	operators: Vec<PendingOp>,
}

#[derive(Debug, Clone, Copy)]
enum PendingOp {
	Binary(Opcode, Origin),
	Prefix(Opcode, Origin),
	/// `(` used as a grouping paren, not a call.
	Group(Origin),
	/// `(` immediately following an operand, i.e. a call's argument-list opener. `mark` is
	/// `output.len()` at the moment it was pushed (the callee is already the top of `output`), so
	/// the number of arguments collected by the time `)` closes it is `output.len() - mark`.
	CallOpen(Origin, usize),
	/// `[` as a subscript opener.
	IndexOpen(Origin),
	/// A `?` whose matching `:` hasn't been seen yet. Reaching this in a generic pop (rather than
	/// via the dedicated `:` handler below) means the expression never supplied one.
	TernaryQuestion(Origin),
	/// A `?`/`:` pair with the already-reduced "then" branch, waiting on the "else" branch.
	TernaryColon(ExprId, Origin),
}

impl<'a> ShuntingYard<'a> {
	fn new(tokens: &'a [Token]) -> Self {
		Self { tokens, position: 0, arena: ExprArena::default(), output: Vec::new(), operators: Vec::new() }
	}

	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.position)
	}

	fn bump(&mut self) -> Option<&'a Token> {
		let token = self.tokens.get(self.position);
		self.position += 1;
		token
	}

	fn push_output(&mut self, kind: ExprKind, origin: Origin) {
		let id = self.arena.push(kind, origin);
		self.output.push(id);
	}

	fn pop_operand(&mut self, origin: &Origin) -> anyhow::Result<ExprId> {
		self.output.pop().ok_or_else(|| TranslateError::OperatorArityMismatch { origin: origin.clone(), lexeme: String::new(), arity: 1, available: 0 }.into())
	}

	fn apply(&mut self, op: PendingOp) -> anyhow::Result<()> {
		match op {
			PendingOp::Binary(opcode, origin) => {
				let right = self.pop_operand(&origin)?;
				let left = self.pop_operand(&origin)?;
				self.push_output(ExprKind::Binary { op: opcode, left, right }, origin);
			},
			PendingOp::Prefix(opcode, origin) => {
				let operand = self.pop_operand(&origin)?;
				self.push_output(ExprKind::Unary { op: opcode, operand, prefix: true }, origin);
			},
			PendingOp::TernaryColon(if_true, origin) => {
				let if_false = self.pop_operand(&origin)?;
				let condition = self.pop_operand(&origin)?;
				self.push_output(ExprKind::Ternary { condition, if_true, if_false }, origin);
			},
			PendingOp::TernaryQuestion(origin) => {
				anyhow::bail!(TranslateError::UnbalancedPair { origin, open: "?", close: ":" });
			},
			PendingOp::Group(_) | PendingOp::CallOpen(..) | PendingOp::IndexOpen(_) => {
				unreachable!("brackets are resolved by their closing token, not popped by precedence")
			},
		}
		Ok(())
	}

	fn precedence_of(op: PendingOp) -> u8 {
		match op {
			PendingOp::Binary(opcode, _) => opcode.entry().precedence,
			PendingOp::Prefix(_, _) => 14,
			PendingOp::TernaryQuestion(_) | PendingOp::TernaryColon(..) => Opcode::Question.entry().precedence,
			PendingOp::Group(_) | PendingOp::CallOpen(..) | PendingOp::IndexOpen(_) => 0,
		}
	}

	fn is_open_marker(op: &PendingOp) -> bool {
		matches!(op, PendingOp::Group(_) | PendingOp::CallOpen(..) | PendingOp::IndexOpen(_))
	}
}

/// Parses a flat token slice (no newlines, no preprocessor directives — those have already been
/// stripped out upstream) into an [`ExprTree`] via shunting-yard.
pub fn parse_tokens(tokens: &[Token]) -> anyhow::Result<ExprTree> {
	let filtered: Vec<Token> = tokens.iter().filter(|token| !matches!(token.kind, TokenKind::Newline)).cloned().collect();
	let mut yard = ShuntingYard::new(&filtered);
	let mut slot = SlotKind::ExpectOperand;

	while let Some(token) = yard.peek().cloned() {
		match &token.kind {
			TokenKind::Identifier(name) => {
				yard.bump();
				yard.push_output(ExprKind::Identifier(name.clone()), token.origin.clone());
				slot = SlotKind::ExpectOperator;
			},
			TokenKind::Primitive(value) => {
				yard.bump();
				yard.push_output(ExprKind::Primitive(value.clone()), token.origin.clone());
				slot = SlotKind::ExpectOperator;
			},
			TokenKind::Char(lexeme) => {
				yard.bump();
				yard.push_output(ExprKind::CharLiteral(lexeme.clone()), token.origin.clone());
				slot = SlotKind::ExpectOperator;
			},
			TokenKind::Str { encoding, lexeme } => {
				yard.bump();
				yard.push_output(ExprKind::StringLiteral { encoding: encoding.clone(), lexeme: lexeme.clone() }, token.origin.clone());
				slot = SlotKind::ExpectOperator;
			},
			TokenKind::Operator(opcode) => {
				handle_operator(&mut yard, *opcode, token.origin.clone(), &mut slot)?;
			},
			TokenKind::Newline => unreachable!("newlines are filtered out above"),
			TokenKind::Pragma(_) | TokenKind::Header { .. } => {
				anyhow::bail!(TranslateError::UnexpectedToken { origin: token.origin.clone(), found: token.lexeme(), expected: "expression".to_owned() });
			},
		}
	}

	while let Some(op) = yard.operators.pop() {
		if ShuntingYard::is_open_marker(&op) {
			let origin = match op {
				PendingOp::Group(origin) | PendingOp::CallOpen(origin, _) | PendingOp::IndexOpen(origin) => origin,
				_ => unreachable!(),
			};
			anyhow::bail!(TranslateError::UnbalancedPair { origin, open: "(", close: ")" });
		}
		yard.apply(op)?;
	}

	let root = yard.output.pop().ok_or_else(|| anyhow::anyhow!("empty expression"))?;
	if !yard.output.is_empty() {
		anyhow::bail!("expression left {} unconsumed operand(s) on the stack", yard.output.len());
	}
	Ok(ExprTree { arena: yard.arena, root })
}

fn handle_operator(yard: &mut ShuntingYard<'_>, opcode: Opcode, origin: Origin, slot: &mut SlotKind) -> anyhow::Result<()> {
	let flags = opcode.flags();

	match opcode {
		Opcode::LParen => {
			yard.bump();
			if *slot == SlotKind::ExpectOperator {
				let mark = yard.output.len();
				yard.operators.push(PendingOp::CallOpen(origin, mark));
			} else {
				yard.operators.push(PendingOp::Group(origin));
			}
			*slot = SlotKind::ExpectOperand;
			return Ok(());
		},
		Opcode::RParen => {
			yard.bump();
			close_paren(yard, origin)?;
			*slot = SlotKind::ExpectOperator;
			return Ok(());
		},
		Opcode::LBracket => {
			yard.bump();
			yard.operators.push(PendingOp::IndexOpen(origin));
			*slot = SlotKind::ExpectOperand;
			return Ok(());
		},
		Opcode::RBracket => {
			yard.bump();
			loop {
				let Some(op) = yard.operators.pop() else {
					anyhow::bail!(TranslateError::UnbalancedPair { origin, open: "[", close: "]" });
				};
				if let PendingOp::IndexOpen(open_origin) = op {
					let index = yard.pop_operand(&open_origin)?;
					let base = yard.pop_operand(&open_origin)?;
					yard.push_output(ExprKind::Subscript { base, index }, open_origin);
					break;
				}
				yard.apply(op)?;
			}
			*slot = SlotKind::ExpectOperator;
			return Ok(());
		},
		Opcode::Comma if yard.operators.iter().rev().any(|op| matches!(op, PendingOp::CallOpen(..))) => {
			yard.bump();
			while !matches!(yard.operators.last(), Some(PendingOp::CallOpen(..))) {
				let op = yard.operators.pop().expect("a CallOpen marker is known to be on the stack");
				yard.apply(op)?;
			}
			*slot = SlotKind::ExpectOperand;
			return Ok(());
		},
		Opcode::Dot | Opcode::Arrow | Opcode::DotStar | Opcode::ArrowStar => {
			yard.bump();
			let Some(name_token) = yard.bump().cloned() else {
				anyhow::bail!(TranslateError::UnexpectedToken { origin, found: "end of expression".to_owned(), expected: "member name".to_owned() });
			};
			let Some(name) = name_token.identifier_name().map(str::to_owned) else {
				anyhow::bail!(TranslateError::UnexpectedToken { origin: name_token.origin.clone(), found: name_token.lexeme(), expected: "member name".to_owned() });
			};
			let base = yard.pop_operand(&origin)?;
			yard.push_output(ExprKind::Member { base, op: opcode, name }, origin);
			*slot = SlotKind::ExpectOperator;
			return Ok(());
		},
		Opcode::Question => {
			yard.bump();
			let ternary_precedence = opcode.entry().precedence;
			while let Some(op) = yard.operators.last().copied() {
				if ShuntingYard::is_open_marker(&op) || ShuntingYard::precedence_of(op) <= ternary_precedence {
					break;
				}
				yard.operators.pop();
				yard.apply(op)?;
			}
			yard.operators.push(PendingOp::TernaryQuestion(origin));
			*slot = SlotKind::ExpectOperand;
			return Ok(());
		},
		Opcode::Colon => {
			yard.bump();
			loop {
				match yard.operators.pop() {
					Some(PendingOp::TernaryQuestion(question_origin)) => {
						let if_true = yard.pop_operand(&question_origin)?;
						yard.operators.push(PendingOp::TernaryColon(if_true, question_origin));
						break;
					},
					Some(op) if !ShuntingYard::is_open_marker(&op) => yard.apply(op)?,
					_ => anyhow::bail!(TranslateError::UnexpectedToken { origin, found: ":".to_owned(), expected: "matching '?'".to_owned() }),
				}
			}
			*slot = SlotKind::ExpectOperand;
			return Ok(());
		},
		_ => {},
	}

	let is_prefix_position = *slot == SlotKind::ExpectOperand;
	if is_prefix_position && !flags.left_unary {
		anyhow::bail!(TranslateError::AmbiguousOperator { origin, lexeme: opcode.lexeme().to_owned() });
	}
	if !is_prefix_position && !flags.binary && !(flags.increment || flags.decrement) {
		anyhow::bail!(TranslateError::UnexpectedToken { origin, found: opcode.lexeme().to_owned(), expected: "binary operator".to_owned() });
	}

	yard.bump();

	if !is_prefix_position && (flags.increment || flags.decrement) {
		// Postfix `++`/`--`: applies immediately to the one already-parsed operand rather than
		// deferring through the operator stack, since nothing else competes with it for operands.
		let operand = yard.pop_operand(&origin)?;
		yard.push_output(ExprKind::Unary { op: opcode, operand, prefix: false }, origin);
		*slot = SlotKind::ExpectOperator;
		return Ok(());
	}

	if is_prefix_position {
		yard.operators.push(PendingOp::Prefix(opcode, origin));
		*slot = SlotKind::ExpectOperand;
		return Ok(());
	}

	let new_precedence = opcode.entry().precedence;
	while let Some(op) = yard.operators.last().copied() {
		if ShuntingYard::is_open_marker(&op) {
			break;
		}
		let existing_precedence = ShuntingYard::precedence_of(op);
		let right_associative_tie = opcode.entry().right_associative && existing_precedence == new_precedence;
		let should_pop = if right_associative_tie { false } else { existing_precedence >= new_precedence };
		if !should_pop {
			break;
		}
		yard.operators.pop();
		yard.apply(op)?;
	}
	yard.operators.push(PendingOp::Binary(opcode, origin));
	*slot = SlotKind::ExpectOperand;
	Ok(())
}

fn close_paren(yard: &mut ShuntingYard<'_>, origin: Origin) -> anyhow::Result<()> {
	loop {
		let Some(op) = yard.operators.pop() else {
			anyhow::bail!(TranslateError::UnbalancedPair { origin, open: "(", close: ")" });
		};
		match op {
			PendingOp::Group(_) => return Ok(()),
			PendingOp::CallOpen(call_origin, mark) => {
				let arg_count = yard.output.len() - mark;
				let mut args = Vec::with_capacity(arg_count);
				for _ in 0..arg_count {
					args.push(yard.pop_operand(&call_origin)?);
				}
				args.reverse();
				let callee = yard.pop_operand(&call_origin)?;
				yard.push_output(ExprKind::Call { callee, args }, call_origin);
				return Ok(());
			},
			other => yard.apply(other)?,
		}
	}
}
