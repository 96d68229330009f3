//! Spend predicates and their evaluation.
//!
//! Outputs carry a [`Predicate`] — a first-class piece of data standing in
//! for a scripting language. Spenders supply a *satisfier*: an ordered list
//! of opaque [`Value`]s handed to the predicate unchanged. Evaluation is
//! total: `Ok(bool)` is a verdict, `Err(ScriptError)` is what a script
//! runtime would have raised (missing argument, type mismatch, overflow).
//! The transaction layer treats anything but `Ok(true)` as a refusal.

use serde::{Deserialize, Serialize};

use crate::error::ScriptError;
use crate::hash::{U256, sha256_bytes};

/// A single satisfier element.
///
/// Values are opaque to the engine: they pass from the spender to the
/// predicate unchanged.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Signed integer.
    Int(i64),
    /// Raw byte string.
    Bytes(Vec<u8>),
    /// UTF-8 text.
    Str(String),
    /// Boolean.
    Bool(bool),
}

impl Value {
    /// Variant name, for error reporting.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bytes(_) => "bytes",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Expression AST for the [`Predicate::Expr`] escape hatch.
///
/// Just enough structure to express the spend conditions the primitive
/// predicate forms cannot; not a general-purpose language. Operands that
/// do not fit an operator raise a [`ScriptError`], mirroring a dynamic
/// script runtime.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    /// The satisfier element at a 0-based index.
    Arg(usize),
    /// A literal.
    Const(Value),
    /// Integer addition, or byte/string concatenation.
    Add(Box<Expr>, Box<Expr>),
    /// Equality. Operands of different types compare unequal.
    Eq(Box<Expr>, Box<Expr>),
    /// Integer `>=`.
    Ge(Box<Expr>, Box<Expr>),
    /// Boolean conjunction.
    And(Box<Expr>, Box<Expr>),
    /// Boolean disjunction.
    Or(Box<Expr>, Box<Expr>),
    /// Boolean negation.
    Not(Box<Expr>),
    /// SHA-256 of a byte-string operand, yielding the 32-byte digest.
    Sha256(Box<Expr>),
}

impl Expr {
    /// Evaluate against a satisfier.
    pub fn eval(&self, args: &[Value]) -> Result<Value, ScriptError> {
        match self {
            Expr::Arg(index) => args.get(*index).cloned().ok_or(ScriptError::MissingArgument {
                index: *index,
                len: args.len(),
            }),
            Expr::Const(value) => Ok(value.clone()),
            Expr::Add(lhs, rhs) => match (lhs.eval(args)?, rhs.eval(args)?) {
                (Value::Int(a), Value::Int(b)) => {
                    a.checked_add(b).map(Value::Int).ok_or(ScriptError::Overflow)
                }
                (Value::Bytes(mut a), Value::Bytes(b)) => {
                    a.extend_from_slice(&b);
                    Ok(Value::Bytes(a))
                }
                (Value::Str(mut a), Value::Str(b)) => {
                    a.push_str(&b);
                    Ok(Value::Str(a))
                }
                (a, _) => Err(ScriptError::TypeMismatch {
                    op: "add",
                    found: a.type_name(),
                }),
            },
            Expr::Eq(lhs, rhs) => Ok(Value::Bool(lhs.eval(args)? == rhs.eval(args)?)),
            Expr::Ge(lhs, rhs) => match (lhs.eval(args)?, rhs.eval(args)?) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a >= b)),
                (a, _) => Err(ScriptError::TypeMismatch {
                    op: "ge",
                    found: a.type_name(),
                }),
            },
            Expr::And(lhs, rhs) => Ok(Value::Bool(
                bool_of("and", lhs.eval(args)?)? && bool_of("and", rhs.eval(args)?)?,
            )),
            Expr::Or(lhs, rhs) => Ok(Value::Bool(
                bool_of("or", lhs.eval(args)?)? || bool_of("or", rhs.eval(args)?)?,
            )),
            Expr::Not(inner) => Ok(Value::Bool(!bool_of("not", inner.eval(args)?)?)),
            Expr::Sha256(inner) => match inner.eval(args)? {
                Value::Bytes(bytes) => {
                    Ok(Value::Bytes(sha256_bytes(&bytes).to_big_endian().to_vec()))
                }
                other => Err(ScriptError::TypeMismatch {
                    op: "sha256",
                    found: other.type_name(),
                }),
            },
        }
    }
}

fn bool_of(op: &'static str, value: Value) -> Result<bool, ScriptError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(ScriptError::TypeMismatch {
            op,
            found: other.type_name(),
        }),
    }
}

/// Spend authorization for an [`Output`](crate::transaction::Output).
///
/// A predicate is data, not code: it can be inspected, serialized, and
/// committed to. [`Predicate::Open`] is the absent predicate — it always
/// authorizes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub enum Predicate {
    /// Anyone can spend.
    #[default]
    Open,
    /// The first satisfier element must equal the expected value.
    /// Differently-typed values compare unequal rather than erroring.
    Equals(Value),
    /// Every satisfier element must be an integer and their sum must hit
    /// the threshold exactly.
    Sum(i64),
    /// The first satisfier element must be a byte string whose SHA-256
    /// digest equals the committed image.
    Preimage(U256),
    /// Arbitrary boolean expression over the satisfier.
    Expr(Expr),
}

impl Predicate {
    /// Commit to the SHA-256 image of `secret`.
    pub fn preimage_of(secret: &[u8]) -> Self {
        Predicate::Preimage(sha256_bytes(secret))
    }

    /// Evaluate against a satisfier.
    ///
    /// `Err` models a thrown constraint script; the transaction layer
    /// treats it exactly like `Ok(false)`.
    pub fn evaluate(&self, satisfier: &[Value]) -> Result<bool, ScriptError> {
        match self {
            Predicate::Open => Ok(true),
            Predicate::Equals(expected) => {
                let got = satisfier.first().ok_or(ScriptError::MissingArgument {
                    index: 0,
                    len: satisfier.len(),
                })?;
                Ok(got == expected)
            }
            Predicate::Sum(threshold) => {
                let mut sum = 0i64;
                for value in satisfier {
                    match value {
                        Value::Int(n) => {
                            sum = sum.checked_add(*n).ok_or(ScriptError::Overflow)?;
                        }
                        other => {
                            return Err(ScriptError::TypeMismatch {
                                op: "sum",
                                found: other.type_name(),
                            });
                        }
                    }
                }
                Ok(sum == *threshold)
            }
            Predicate::Preimage(image) => match satisfier.first() {
                Some(Value::Bytes(bytes)) => Ok(sha256_bytes(bytes) == *image),
                Some(other) => Err(ScriptError::TypeMismatch {
                    op: "sha256",
                    found: other.type_name(),
                }),
                None => Err(ScriptError::MissingArgument { index: 0, len: 0 }),
            },
            Predicate::Expr(expr) => match expr.eval(satisfier)? {
                Value::Bool(verdict) => Ok(verdict),
                other => Err(ScriptError::NotABoolean {
                    found: other.type_name(),
                }),
            },
        }
    }
}
