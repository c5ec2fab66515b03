//! Collects `/name { ... }` blocks before execution.
//!
//! Definitions are flat token macros: a body can not nest braces, and is
//! expanded one level deep when its name is executed.
use crate::{
    machine::{Diagnostic, MachineError},
    parser::{Token, TokenKind},
};
use log::debug;
use std::{collections::HashMap, rc::Rc};

pub type Body<'a> = Rc<[Token<'a>]>;

/// Name to body table. Later definition overwrites earlier one with the same
/// name.
#[derive(Debug, Clone, Default)]
pub struct Definitions<'a> {
    table: HashMap<&'a str, Body<'a>>,
}

impl<'a> Definitions<'a> {
    pub fn get(&self, name: &str) -> Option<Body<'a>> {
        self.table.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Definitions sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &Body<'a>)> {
        let mut r: Vec<_> = self.table.iter().map(|(k, v)| (*k, v)).collect();
        r.sort_unstable_by_key(|(k, _)| *k);
        r.into_iter()
    }
}

/// Result of the collect pass: definitions, and top level tokens with
/// definition blocks removed.
#[derive(Debug, Clone, Default)]
pub struct Program<'a> {
    pub definitions: Definitions<'a>,
    pub tokens: Vec<Token<'a>>,
}

struct Pending<'a> {
    start: Token<'a>,
    name: &'a str,
    body: Vec<Token<'a>>,
}

/// Single forward pass over tokens, moves definition blocks into
/// [`Definitions`].
///
/// An unterminated definition is dropped together with its partial body.
/// A new name beyond `max_definitions` is dropped, redefining an existing
/// name is always accepted.
pub fn collect<'a>(
    tokens: impl IntoIterator<Item = Token<'a>>,
    max_definitions: usize,
) -> (Program<'a>, Vec<Diagnostic>) {
    let mut program = Program::default();
    let mut diagnostics = vec![];
    let mut pending: Option<Pending<'a>> = None;

    for token in tokens {
        match pending.take() {
            Some(Pending { start, name, body }) if token.kind() == TokenKind::DefinitionEnd => {
                let table = &mut program.definitions.table;
                if table.len() >= max_definitions && !table.contains_key(name) {
                    diagnostics.push(Diagnostic::new(
                        start,
                        MachineError::TooManyDefinitions {
                            name: name.to_owned(),
                            limit: max_definitions,
                        },
                    ));
                } else {
                    debug!("defined `{}`: {} tokens", name, body.len());
                    table.insert(name, body.into());
                }
            }
            Some(mut def) => {
                // `{` right after the name opens the block, not part of the body
                if !(token.pos == def.start.pos + 1 && token.text == "{") {
                    def.body.push(token);
                }
                pending = Some(def);
            }
            None => match token.kind() {
                TokenKind::DefinitionStart(name) => {
                    debug!("start definition of `{}`", name);
                    pending = Some(Pending {
                        start: token,
                        name,
                        body: vec![],
                    });
                }
                _ => program.tokens.push(token),
            },
        }
    }

    if let Some(def) = pending {
        debug!("{} tokens of `{}` discarded", def.body.len(), def.name);
        diagnostics.push(Diagnostic::new(
            def.start,
            MachineError::UnterminatedDefinition(def.name.to_owned()),
        ));
    }

    (program, diagnostics)
}

#[cfg(test)]
mod tests;
