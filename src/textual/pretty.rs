use crate::ast::{AppTerm, Query, Rule, Term, VarScope};
use crate::symbols::SymbolStore;
use crate::theory::Theory;

/// A pretty-printer rendering terms, rules and queries back into the
/// surface syntax.
///
/// Variables render as `$name` when the given [`VarScope`] knows their
/// name, and as `$<index>` otherwise (fresh variables minted by rule
/// activation have no names).
pub struct Prettifier<'a> {
    symbols: &'a SymbolStore,
}

impl<'a> Prettifier<'a> {
    pub fn new(symbols: &'a SymbolStore) -> Self {
        Self { symbols }
    }

    pub fn term_to_string(&self, term: &Term, scope: Option<&VarScope>) -> String {
        let mut out = String::new();
        self.pretty(&mut out, term, scope).unwrap();
        out
    }

    pub fn rule_to_string(&self, rule: &Rule) -> String {
        let mut out = String::new();
        self.pretty_rule(&mut out, rule).unwrap();
        out
    }

    pub fn query_to_string(&self, query: &Query) -> String {
        let mut out = String::new();
        self.pretty_conjunction(&mut out, &query.goals, query.scope.as_ref())
            .unwrap();
        out
    }

    /// Render a whole theory, one clause per line. Clause order within a
    /// predicate follows insertion order.
    pub fn theory_to_string(&self, theory: &Theory) -> String {
        let mut out = String::new();
        for rule in theory.iter_rules() {
            self.pretty_rule(&mut out, rule).unwrap();
            out.push('\n');
        }
        out
    }

    pub fn pretty<W: std::fmt::Write>(
        &self,
        writer: &mut W,
        term: &Term,
        scope: Option<&VarScope>,
    ) -> std::fmt::Result {
        match term {
            Term::Var(v) => match scope.and_then(|scope| scope.name(*v)) {
                Some(name) => write!(writer, "${}", name),
                None => write!(writer, "${}", v.ord()),
            },
            Term::App(app) => self.pretty_app(writer, app, scope),
        }
    }

    pub fn pretty_app<W: std::fmt::Write>(
        &self,
        writer: &mut W,
        term: &AppTerm,
        scope: Option<&VarScope>,
    ) -> std::fmt::Result {
        if term.is_cut() {
            return write!(writer, "!");
        }
        if let Some(name) = self.symbols.name(term.functor) {
            write!(writer, "{}", name)?;
        } else {
            write!(writer, "<unk:{}>", term.functor.ord())?;
        }

        if let Some((first, rest)) = term.args.split_first() {
            write!(writer, "(")?;
            self.pretty(writer, first, scope)?;
            for arg in rest {
                write!(writer, ", ")?;
                self.pretty(writer, arg, scope)?;
            }
            write!(writer, ")")?;
        }

        Ok(())
    }

    pub fn pretty_conjunction<W: std::fmt::Write>(
        &self,
        writer: &mut W,
        goals: &[Term],
        scope: Option<&VarScope>,
    ) -> std::fmt::Result {
        if let Some((first, rest)) = goals.split_first() {
            self.pretty(writer, first, scope)?;
            for goal in rest {
                write!(writer, ", ")?;
                self.pretty(writer, goal, scope)?;
            }
        }
        write!(writer, ".")
    }

    pub fn pretty_rule<W: std::fmt::Write>(&self, writer: &mut W, rule: &Rule) -> std::fmt::Result {
        let scope = rule.scope.as_ref();
        self.pretty_app(writer, &rule.head, scope)?;
        if rule.body.is_empty() {
            write!(writer, ".")
        } else {
            write!(writer, " :- ")?;
            self.pretty_conjunction(writer, &rule.body, scope)
        }
    }
}
