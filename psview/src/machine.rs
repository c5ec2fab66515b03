use crate::{
    definition::{collect, Definitions},
    graphics::{GraphicsState, GraphicsStateStack, Point, Rgba},
    parser::{tokenize, Token, TokenKind},
    surface::Surface,
};
use educe::Educe;
use log::{debug, trace, warn};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MachineError {
    #[error("stack underflow, requires {required} operands, {available} available")]
    StackUnderflow { required: usize, available: usize },
    #[error("stack overflow, limit {limit}")]
    StackOverflow { limit: usize },
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),
    #[error("malformed number `{0}`")]
    MalformedNumber(String),
    #[error("unterminated definition `{0}`")]
    UnterminatedDefinition(String),
    #[error("too many tokens, limit {limit}")]
    TooManyTokens { limit: usize },
    #[error("too many definitions, `{name}` dropped, limit {limit}")]
    TooManyDefinitions { name: String, limit: usize },
}

pub type MachineResult<T> = Result<T, MachineError>;

/// An error and the token caused it. Errors never abort a run, they are
/// logged and collected.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Index of the token in the raw token stream.
    pub pos: usize,
    pub token: String,
    pub error: MachineError,
}

impl Diagnostic {
    pub fn new(token: Token<'_>, error: MachineError) -> Self {
        let r = Self {
            pos: token.pos,
            token: token.text.to_owned(),
            error,
        };
        warn!("{}", r);
        r
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} `{}`: {}", self.pos, self.token, self.error)
    }
}

/// LIFO of numbers, top is the last element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperandStack {
    stack: Vec<f32>,
    limit: Option<usize>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack refuses to grow beyond `limit` items.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            stack: vec![],
            limit: Some(limit),
        }
    }

    pub fn push(&mut self, v: f32) -> MachineResult<()> {
        match self.limit {
            Some(limit) if self.stack.len() >= limit => Err(MachineError::StackOverflow { limit }),
            _ => {
                self.stack.push(v);
                Ok(())
            }
        }
    }

    pub fn pop(&mut self) -> MachineResult<f32> {
        self.stack.pop().ok_or(MachineError::StackUnderflow {
            required: 1,
            available: 0,
        })
    }

    /// Pop `N` operands, returns them in push order: the top of stack is the
    /// last element. Stack is unchanged if less than `N` operands available.
    pub fn pop_n<const N: usize>(&mut self) -> MachineResult<[f32; N]> {
        let available = self.stack.len();
        if available < N {
            return Err(MachineError::StackUnderflow {
                required: N,
                available,
            });
        }
        let mut r = [0.0; N];
        r.copy_from_slice(&self.stack[available - N..]);
        self.stack.truncate(available - N);
        Ok(r)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Items from bottom to top.
    pub fn as_slice(&self) -> &[f32] {
        &self.stack
    }
}

impl Display for OperandStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.stack.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "] (length: {})", self.stack.len())
    }
}

/// Recognized operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Operator {
    NewPath,
    MoveTo,
    LineTo,
    RLineTo,
    Arc,
    ClosePath,
    GSave,
    GRestore,
    SetLineWidth,
    SetGray,
    SetRgbColor,
    Fill,
    Stroke,
    Translate,
    Scale,
    ShowPage,
    #[strum(serialize = "#!PS")]
    Header,
}

impl Operator {
    /// Operands the operator pops.
    pub fn arity(self) -> usize {
        match self {
            Self::NewPath
            | Self::ClosePath
            | Self::GSave
            | Self::GRestore
            | Self::Fill
            | Self::Stroke
            | Self::ShowPage
            | Self::Header => 0,
            Self::SetLineWidth | Self::SetGray => 1,
            Self::MoveTo | Self::LineTo | Self::RLineTo | Self::Translate | Self::Scale => 2,
            Self::SetRgbColor => 3,
            Self::Arc => 5,
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Options of an interpreter session, bounds memory used by pathological
/// scripts.
#[derive(Debug, Clone, Copy, PartialEq, Educe)]
#[educe(Default)]
pub struct SessionOption {
    /// Tokens beyond the limit are dropped.
    #[educe(Default = 1_048_576)]
    max_tokens: usize,
    #[educe(Default = 4096)]
    max_definitions: usize,
    #[educe(Default = 65536)]
    max_stack_depth: usize,
    /// Stop after executed `steps` top level tokens.
    steps: Option<usize>,
}

impl SessionOption {
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn max_definitions(&self) -> usize {
        self.max_definitions
    }

    pub fn max_stack_depth(&self) -> usize {
        self.max_stack_depth
    }

    pub fn steps(&self) -> Option<usize> {
        self.steps
    }

    pub fn with_steps(mut self, steps: Option<usize>) -> Self {
        self.steps = steps;
        self
    }
}

#[derive(Educe)]
#[educe(Default(new))]
pub struct SessionOptionBuilder(SessionOption);

impl SessionOptionBuilder {
    pub fn max_tokens(mut self, n: usize) -> Self {
        self.0.max_tokens = n;
        self
    }

    pub fn max_definitions(mut self, n: usize) -> Self {
        self.0.max_definitions = n;
        self
    }

    pub fn max_stack_depth(mut self, n: usize) -> Self {
        self.0.max_stack_depth = n;
        self
    }

    pub fn steps(mut self, steps: Option<usize>) -> Self {
        self.0.steps = steps;
        self
    }

    pub fn build(self) -> SessionOption {
        self.0
    }
}

/// State of the session when it finishes.
#[derive(Debug)]
pub struct Report<S> {
    pub surface: S,
    pub stack: OperandStack,
    pub state: GraphicsState,
    pub diagnostics: Vec<Diagnostic>,
}

/// Interpreter session: executes one script against a surface.
///
/// Definitions are collected when the machine is created, so a name can be
/// used before it is defined. A defined name expands its body one level
/// deep: body tokens are numbers or operators, a defined name inside a body
/// is an unknown operator.
pub struct Machine<'a, S> {
    definitions: Definitions<'a>,
    tokens: std::vec::IntoIter<Token<'a>>,
    executed: usize,
    stack: OperandStack,
    state: GraphicsState,
    saved: GraphicsStateStack,
    surface: S,
    diagnostics: Vec<Diagnostic>,
    option: SessionOption,
}

impl<'a, S: Surface> Machine<'a, S> {
    pub fn new(script: &'a str, surface: S) -> Self {
        Self::with_option(script, surface, SessionOption::default())
    }

    pub fn with_option(script: &'a str, surface: S, option: SessionOption) -> Self {
        let mut diagnostics = vec![];
        let mut tokens = tokenize(script);
        let bounded = tokens.by_ref().take(option.max_tokens);
        let (program, collect_diagnostics) = collect(bounded, option.max_definitions);
        if let Some(extra) = tokens.next() {
            diagnostics.push(Diagnostic::new(
                extra,
                MachineError::TooManyTokens {
                    limit: option.max_tokens,
                },
            ));
        }
        diagnostics.extend(collect_diagnostics);

        Self {
            definitions: program.definitions,
            tokens: program.tokens.into_iter(),
            executed: 0,
            stack: OperandStack::with_limit(option.max_stack_depth),
            state: GraphicsState::default(),
            saved: GraphicsStateStack::new(),
            surface,
            diagnostics,
            option,
        }
    }

    /// Execute next top level token, returns the token, or None if all
    /// tokens executed or `steps` reached.
    pub fn step(&mut self) -> Option<Token<'a>> {
        if self.option.steps.is_some_and(|steps| self.executed >= steps) {
            return None;
        }
        let token = self.tokens.next()?;
        self.exec(token);
        self.executed += 1;
        trace!("stack: {}", self.stack);
        Some(token)
    }

    pub fn execute(&mut self) {
        while self.step().is_some() {}
    }

    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    pub fn saved_states(&self) -> &GraphicsStateStack {
        &self.saved
    }

    pub fn definitions(&self) -> &Definitions<'a> {
        &self.definitions
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn finish(self) -> Report<S> {
        Report {
            surface: self.surface,
            stack: self.stack,
            state: self.state,
            diagnostics: self.diagnostics,
        }
    }

    fn report(&mut self, token: Token<'_>, error: MachineError) {
        self.diagnostics.push(Diagnostic::new(token, error));
    }

    fn exec(&mut self, token: Token<'a>) {
        debug!("exec `{}`", token.text);
        // any non-number token can name a definition, `3d` included
        if !matches!(token.kind(), TokenKind::Number(_)) {
            if let Some(body) = self.definitions.get(token.text) {
                debug!("expand `{}`", token.text);
                for token in body.iter().copied() {
                    self.exec_in_definition(token);
                }
                return;
            }
        }
        self.exec_in_definition(token);
    }

    /// Number or operator, a defined name is not expanded.
    fn exec_in_definition(&mut self, token: Token<'a>) {
        match token.kind() {
            TokenKind::Number(v) => {
                if let Err(e) = self.stack.push(v) {
                    self.report(token, e);
                }
            }
            TokenKind::MalformedNumber => {
                self.report(token, MachineError::MalformedNumber(token.text.to_owned()));
            }
            TokenKind::Header => debug!("header `{}` (no-op)", token.text),
            _ => self.exec_operator(token),
        }
    }

    fn exec_operator(&mut self, token: Token<'a>) {
        let Ok(op) = token.text.parse::<Operator>() else {
            self.report(token, MachineError::UnknownOperator(token.text.to_owned()));
            return;
        };
        let available = self.stack.len();
        if available < op.arity() {
            self.report(
                token,
                MachineError::StackUnderflow {
                    required: op.arity(),
                    available,
                },
            );
            return;
        }
        if let Err(e) = self.operate(op) {
            self.report(token, e);
        }
    }

    fn operate(&mut self, op: Operator) -> MachineResult<()> {
        match op {
            Operator::NewPath => self.surface.begin_path(),
            Operator::MoveTo => {
                let [x, y] = self.stack.pop_n()?;
                let p = Point::new(x, y);
                self.surface.move_to(p);
                self.state.current_point = p;
                debug!("moved to: ({x}, {y})");
            }
            Operator::LineTo => {
                let [x, y] = self.stack.pop_n()?;
                let p = Point::new(x, y);
                self.surface.line_to(p);
                self.state.current_point = p;
                debug!("line to: ({x}, {y})");
            }
            Operator::RLineTo => {
                let [dx, dy] = self.stack.pop_n()?;
                let p = self.state.current_point.offset(dx, dy);
                self.surface.line_to(p);
                self.state.current_point = p;
                debug!("relative line to: ({}, {})", p.x, p.y);
            }
            Operator::Arc => {
                let [x, y, radius, start, end] = self.stack.pop_n()?;
                let (start, end) = (start.to_radians(), end.to_radians());
                let center = Point::new(x, y);
                self.surface.arc(center, radius, start, end);
                self.state.current_point =
                    center.offset(radius * end.cos(), radius * end.sin());
                debug!("arc center: ({x}, {y}), radius: {radius}, angles: {start}..{end}");
            }
            Operator::ClosePath => self.surface.close_path(),
            Operator::GSave => self.saved.save(&self.state),
            Operator::GRestore => {
                if let Some(state) = self.saved.restore() {
                    self.state = state;
                    self.sync_surface();
                }
            }
            Operator::SetLineWidth => {
                let [width] = self.stack.pop_n()?;
                self.state.line_width = width;
                self.surface.set_line_width(width);
            }
            Operator::SetGray => {
                let [g] = self.stack.pop_n()?;
                self.set_color(Rgba::gray(g));
            }
            Operator::SetRgbColor => {
                let [r, g, b] = self.stack.pop_n()?;
                self.set_color(Rgba::from_unit(r, g, b));
            }
            Operator::Fill => self.surface.fill(),
            Operator::Stroke => self.surface.stroke(),
            Operator::Translate => {
                let [tx, ty] = self.stack.pop_n()?;
                self.state.translate(tx, ty);
                self.surface.set_transform(&self.state.transform);
            }
            Operator::Scale => {
                let [sx, sy] = self.stack.pop_n()?;
                self.state.scale(sx, sy);
                self.surface.set_transform(&self.state.transform);
            }
            Operator::ShowPage | Operator::Header => debug!("{} (no-op)", op.name()),
        }
        Ok(())
    }

    fn set_color(&mut self, color: Rgba) {
        self.state.set_color(color);
        self.surface.set_fill_color(color);
        self.surface.set_stroke_color(color);
    }

    /// Push all of current state to the surface, after `grestore`.
    fn sync_surface(&mut self) {
        self.surface.set_line_width(self.state.line_width);
        self.surface.set_fill_color(self.state.fill_color);
        self.surface.set_stroke_color(self.state.stroke_color);
        self.surface.set_transform(&self.state.transform);
    }
}

/// Run script to the end on a fresh session.
pub fn interpret<S: Surface>(script: &str, surface: S) -> Report<S> {
    let mut machine = Machine::new(script, surface);
    machine.execute();
    machine.finish()
}
