use drop_bomb::DropBomb;
use kopi_errors::{Diagnostic, DiagnosticKind};
use kopi_syntax::SyntaxKind::{self, *};
use kopi_syntax::{Builder, SyntaxSet, SyntaxTree};
use text_size::TextRange;
use tracing::debug;

use crate::token_source::{Checkpoint, TokenSource};
use crate::{ParseMode, ParseOptions, RecoveryState};

pub(crate) struct Parser<'t> {
    source: TokenSource<'t>,
    events: Vec<Event>,
    diagnostics: Vec<Diagnostic>,
    /// Every reported error, including ones deduplicated away. Speculative
    /// parses compare it to detect failure.
    error_count: usize,
    expected: SyntaxSet,
    state: RecoveryState,
    depth: u32,
    options: ParseOptions,
    restrictions: Restrictions,
}

/// Context flags that change how expressions are parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Restrictions {
    /// `x -> ...` is not a lambda here: switch labels and guards end in `->`.
    pub(crate) no_lambda: bool,
}

struct Snapshot {
    events: usize,
    source: Checkpoint,
    diagnostics: usize,
    error_count: usize,
    expected: SyntaxSet,
    state: RecoveryState,
    depth: u32,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(source: TokenSource<'t>, options: ParseOptions) -> Self {
        Self {
            events: Vec::with_capacity(source.len() * 2),
            source,
            diagnostics: Vec::new(),
            error_count: 0,
            expected: SyntaxSet::EMPTY,
            state: RecoveryState::Normal,
            depth: 0,
            options,
            restrictions: Restrictions::default(),
        }
    }

    pub(crate) fn current(&self) -> SyntaxKind {
        self.source.current()
    }

    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.source.nth(n)
    }

    pub(crate) fn nth_text(&self, n: usize) -> &'t str {
        self.source.nth_text(n)
    }

    pub(crate) fn is_joint(&self, n: usize) -> bool {
        self.source.is_joint(n)
    }

    pub(crate) fn position(&self) -> usize {
        self.source.position()
    }

    pub(crate) fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub(crate) fn restrictions(&self) -> Restrictions {
        self.restrictions
    }

    /// Checks the current token and remembers `kind` as acceptable here.
    pub(crate) fn at(&mut self, kind: SyntaxKind) -> bool {
        self.expected.insert(kind);
        self.current() == kind
    }

    pub(crate) fn at_ts(&mut self, set: SyntaxSet) -> bool {
        self.expected = self.expected.union(&set);
        set.contains(self.current())
    }

    pub(crate) fn nth_at(&self, n: usize, kind: SyntaxKind) -> bool {
        self.nth(n) == kind
    }

    /// Whether the token `n` ahead is the identifier spelled like `keyword`.
    pub(crate) fn nth_at_contextual(&self, n: usize, keyword: SyntaxKind) -> bool {
        self.nth(n) == NAME && Some(self.nth_text(n)) == keyword.text()
    }

    pub(crate) fn at_contextual(&mut self, keyword: SyntaxKind) -> bool {
        self.expected.insert(keyword);
        self.nth_at_contextual(0, keyword)
    }

    /// Adds `set` to the tokens reported as expected at the current position.
    pub(crate) fn expect_any(&mut self, set: SyntaxSet) {
        self.expected = self.expected.union(&set);
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if !self.at(kind) {
            return false;
        }
        self.bump(kind);
        true
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(format!("expected {kind}, found {}", self.current()));
        false
    }

    /// Consumes the current token, which must be `kind`.
    pub(crate) fn bump(&mut self, kind: SyntaxKind) {
        assert!(self.current() == kind, "expected {kind:?}, found {:?}", self.current());
        self.push_token(kind, 1);
    }

    pub(crate) fn bump_any(&mut self) {
        if self.current() == EOF {
            return;
        }
        self.push_token(self.current(), 1);
    }

    /// Consumes an identifier as the contextual keyword `kind`.
    pub(crate) fn bump_remap(&mut self, kind: SyntaxKind) {
        debug_assert!(self.current() == NAME || self.current() == kind);
        self.push_token(kind, 1);
    }

    /// Consumes `n_raw` joint tokens as one `kind` token.
    pub(crate) fn bump_composite(&mut self, kind: SyntaxKind, n_raw: u8) {
        self.push_token(kind, n_raw);
    }

    fn push_token(&mut self, kind: SyntaxKind, n_raw: u8) {
        self.events.push(Event::Token { kind, n_raw });
        self.source.bump(n_raw as usize);
        self.expected = SyntaxSet::EMPTY;
        if self.state == RecoveryState::Recovering {
            self.state = RecoveryState::Normal;
        }
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(pos)
    }

    /// Records a syntax error at the current token.
    pub(crate) fn error(&mut self, message: impl Into<String>) {
        self.report(DiagnosticKind::Syntax, message.into());
    }

    pub(crate) fn report(&mut self, kind: DiagnosticKind, message: String) {
        self.error_count += 1;
        if self.state == RecoveryState::Abandoned {
            return;
        }

        let token_index = self.position();
        let duplicate = self.state == RecoveryState::Recovering
            && self.diagnostics.last().is_some_and(|last| last.token_index() == token_index);
        if duplicate {
            return;
        }

        let range = self.source.nth_token(0).range;
        let diagnostic =
            Diagnostic::new(kind, message, range, token_index).with_expected(self.expected);
        self.diagnostics.push(diagnostic);
        self.state = RecoveryState::Recovering;

        if self.options.mode == ParseMode::Strict {
            self.abandon("strict mode stops at the first error");
        }
    }

    /// Wraps the current token in an `ERROR` node after reporting `message`.
    pub(crate) fn err_and_bump(&mut self, message: impl Into<String>) {
        self.error(message);
        if self.current() == EOF || self.state == RecoveryState::Abandoned {
            return;
        }
        let m = self.start();
        self.bump_any();
        m.complete(self, ERROR);
    }

    /// Reports `message` and skips ahead to the next token in `recovery`.
    pub(crate) fn error_recover(&mut self, message: impl Into<String>, recovery: SyntaxSet) {
        self.error(message);
        self.recover(recovery);
    }

    /// Skips tokens into an `ERROR` node until one in `recovery`, a closing
    /// brace or the end of input. Braced regions are skipped as a whole.
    ///
    /// Running into the end of input abandons the parse.
    pub(crate) fn recover(&mut self, recovery: SyntaxSet) {
        if self.state == RecoveryState::Abandoned || self.at_sync(recovery) {
            return;
        }

        self.state = RecoveryState::Recovering;
        let start = self.position();
        let m = self.start();
        while !self.at_sync(recovery) {
            if self.current() == LEFT_BRACE {
                self.skip_braces();
            } else {
                self.push_token(self.current(), 1);
                self.state = RecoveryState::Recovering;
            }
        }
        m.complete(self, ERROR);
        debug!(skipped = self.position() - start, at = ?self.current(), "resynchronized");

        self.state = RecoveryState::Normal;
        if self.current() == EOF && !recovery.contains(EOF) {
            self.report(DiagnosticKind::Abandoned, "reached end of input while recovering".into());
            self.state = RecoveryState::Abandoned;
        }
    }

    fn at_sync(&self, recovery: SyntaxSet) -> bool {
        matches!(self.current(), EOF | RIGHT_BRACE) || recovery.contains(self.current())
    }

    fn skip_braces(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current() {
                EOF => return,
                LEFT_BRACE => depth += 1,
                RIGHT_BRACE => depth -= 1,
                _ => {}
            }
            self.push_token(self.current(), 1);
            self.state = RecoveryState::Recovering;
            if depth == 0 {
                return;
            }
        }
    }

    /// Swallows the rest of the input into an `ERROR` node and stops
    /// reporting further errors.
    pub(crate) fn abandon(&mut self, reason: &'static str) {
        if self.state == RecoveryState::Abandoned {
            return;
        }
        debug!(reason, at = self.position(), "abandoning parse");
        self.state = RecoveryState::Abandoned;
        if self.current() == EOF {
            return;
        }
        let m = self.start();
        while self.current() != EOF {
            self.push_token(self.current(), 1);
        }
        m.complete(self, ERROR);
        self.state = RecoveryState::Abandoned;
    }

    /// Runs a recursive rule one nesting level deeper.
    ///
    /// Past the configured bound the rule is not entered; the parse is
    /// abandoned with a nesting diagnostic instead of overflowing the stack.
    pub(crate) fn nested<T: Default>(&mut self, rule: impl FnOnce(&mut Self) -> T) -> T {
        if self.depth >= self.options.max_depth {
            if self.state != RecoveryState::Abandoned {
                debug!(depth = self.depth, "nesting bound exceeded");
                let message = format!("nesting exceeds the limit of {} levels", self.options.max_depth);
                self.report(DiagnosticKind::NestingTooDeep, message);
                self.abandon("nesting too deep");
            }
            return T::default();
        }

        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn with_restrictions<T>(
        &mut self,
        restrictions: Restrictions,
        rule: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = std::mem::replace(&mut self.restrictions, restrictions);
        let result = rule(self);
        self.restrictions = saved;
        result
    }

    /// Attempts `rule` and keeps its output only if it succeeded without
    /// reporting an error; otherwise every effect is undone.
    ///
    /// `rule` must complete or abandon every marker it starts and must not
    /// touch markers started before the attempt.
    pub(crate) fn speculate<T>(
        &mut self,
        what: &'static str,
        rule: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        let snapshot = self.snapshot();
        match rule(self) {
            Some(output) if self.error_count == snapshot.error_count => Some(output),
            _ => {
                debug!(what, from = ?snapshot.source, to = self.position(), "rewinding speculative parse");
                self.restore(snapshot);
                None
            }
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            events: self.events.len(),
            source: self.source.checkpoint(),
            diagnostics: self.diagnostics.len(),
            error_count: self.error_count,
            expected: self.expected,
            state: self.state,
            depth: self.depth,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.events.truncate(snapshot.events);
        self.source.rewind(snapshot.source);
        self.diagnostics.truncate(snapshot.diagnostics);
        self.error_count = snapshot.error_count;
        self.expected = snapshot.expected;
        self.state = snapshot.state;
        self.depth = snapshot.depth;
    }

    pub(crate) fn build_tree(self) -> (SyntaxTree, Vec<Diagnostic>, RecoveryState) {
        let Parser { source, mut events, diagnostics, state, .. } = self;
        let mut builder = Builder::new(source.text());
        let mut forward_parents = Vec::new();
        let mut raw = 0;

        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::TOMBSTONE) {
                Event::Start { kind, forward_parent } => {
                    if kind == TOMBSTONE {
                        continue;
                    }

                    forward_parents.push(kind);
                    let mut idx = i;
                    let mut fp = forward_parent;
                    while let Some(fwd) = fp {
                        idx += fwd as usize;

                        fp = match std::mem::replace(&mut events[idx], Event::TOMBSTONE) {
                            Event::Start { kind, forward_parent } => {
                                if kind != TOMBSTONE {
                                    forward_parents.push(kind);
                                }
                                forward_parent
                            }
                            _ => unreachable!(),
                        };
                    }

                    for kind in forward_parents.drain(..).rev() {
                        builder.start_node(kind);
                    }
                }
                Event::Finish => {
                    builder.finish_node();
                }
                Event::Token { kind, n_raw } => {
                    let first = source.token(raw);
                    let last = source.token(raw + n_raw as usize - 1);
                    let range = TextRange::new(first.range.start(), last.range.end());
                    builder.token(kind, range, first.leading.clone(), last.trailing.clone());
                    raw += n_raw as usize;
                }
            }
        }

        let state = match state {
            RecoveryState::Recovering => RecoveryState::Normal,
            state => state,
        };
        (builder.finish(), diagnostics, state)
    }
}

enum Event {
    Start { kind: SyntaxKind, forward_parent: Option<u32> },
    /// One tree token made of `n_raw` consecutive raw tokens.
    Token { kind: SyntaxKind, n_raw: u8 },
    Finish,
}

impl Event {
    const TOMBSTONE: Self = Event::Start { kind: TOMBSTONE, forward_parent: None };
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: u32) -> Self {
        Self { position: pos, bomb: DropBomb::new("Marker must be either completed or abandoned") }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot, .. } => {
                *slot = kind;
            }
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
        CompletedMarker::new(self.position, kind)
    }

    /// Drops the node; its contents stay attached to the parent.
    pub(crate) fn abandon(mut self, p: &mut Parser<'_>) {
        self.bomb.defuse();
        if self.position as usize == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Start { kind: TOMBSTONE, forward_parent: None }) => {}
                _ => unreachable!(),
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CompletedMarker {
    pos: u32,
    kind: SyntaxKind,
}

impl CompletedMarker {
    fn new(pos: u32, kind: SyntaxKind) -> Self {
        Self { pos, kind }
    }

    pub(crate) fn kind(self) -> SyntaxKind {
        self.kind
    }

    /// Starts a node that will become the parent of this one.
    pub(crate) fn precede(self, p: &mut Parser<'_>) -> Marker {
        let new_pos = p.start();

        match &mut p.events[self.pos as usize] {
            Event::Start { forward_parent, .. } => {
                *forward_parent = Some(new_pos.position - self.pos);
            }
            _ => unreachable!(),
        }

        new_pos
    }
}
