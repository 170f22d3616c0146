//! Filter expression parser using chumsky.
//!
//! Expressions select variant calls by any field a call exposes:
//! - `VAF >= 5`
//! - `GENE == "EGFR" || GENE == 'KRAS'`
//! - `FUNCTION contains "missense" && !exists(OVAT)`
//! - `FUNC[*].gene == "TP53"` (any FUNC entry of the row)
//! - `PROTEIN =~ "^p\\.G12"` (regular expression)
//! - `ID[0] == "COSM6224"`

use chumsky::prelude::*;

use crate::error::IonVcfError;

/// Binary operators for comparisons and logic.
#[derive(Debug, Clone, PartialEq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    /// Substring test.
    Contains,
    /// Regular expression search.
    Matches,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnaryOp {
    Not,
}

/// Part of a variable access path.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessPart {
    /// A field name (e.g., "FUNC", "gene").
    Field(String),
    /// An array index (e.g., [0]).
    Index(usize),
    /// `[*]`, true when any element matches.
    Wildcard,
}

/// A filter expression AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    String(String),
    Bool(bool),
    /// `FUNC[0].gene` becomes `Var([Field("FUNC"), Index(0), Field("gene")])`.
    Var(Vec<AccessPart>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    /// True when the field is present and not missing.
    Exists(Vec<AccessPart>),
}

impl Expr {
    /// Create a simple variable expression.
    pub fn var(name: &str) -> Self {
        Expr::Var(vec![AccessPart::Field(name.to_string())])
    }
}

fn quoted(delimiter: char) -> impl Parser<char, String, Error = Simple<char>> + Clone {
    just(delimiter)
        .ignore_then(filter(move |c| *c != delimiter).repeated())
        .then_ignore(just(delimiter))
        .collect::<String>()
}

fn access_path() -> impl Parser<char, Vec<AccessPart>, Error = Simple<char>> + Clone {
    let index = just('[')
        .ignore_then(
            just('*').to(AccessPart::Wildcard).or(text::int(10).try_map(|s: String, span| {
                s.parse()
                    .map(AccessPart::Index)
                    .map_err(|e| Simple::custom(span, format!("bad index: {e}")))
            })),
        )
        .then_ignore(just(']'));

    let member = just('.')
        .ignore_then(text::ident())
        .map(AccessPart::Field);

    text::ident()
        .map(AccessPart::Field)
        .then(index.or(member).repeated())
        .map(|(first, rest)| {
            let mut parts = vec![first];
            parts.extend(rest);
            parts
        })
}

/// Create the filter expression parser.
pub fn parser() -> impl Parser<char, Expr, Error = Simple<char>> {
    recursive(|full_expr| {
        let number = just('-')
            .or_not()
            .chain::<char, _, _>(text::int(10))
            .chain::<char, _, _>(just('.').chain(text::digits(10)).or_not().flatten())
            .collect::<String>()
            .try_map(|s, span| {
                s.parse()
                    .map(Expr::Number)
                    .map_err(|e| Simple::custom(span, format!("bad number: {e}")))
            })
            .padded();

        let string = quoted('"').or(quoted('\'')).map(Expr::String).padded();

        let boolean = choice((
            text::keyword("true").to(Expr::Bool(true)),
            text::keyword("false").to(Expr::Bool(false)),
        ))
        .padded();

        let variable = access_path().map(Expr::Var).padded();

        let exists_fn = text::keyword("exists")
            .padded()
            .ignore_then(
                access_path()
                    .padded()
                    .delimited_by(just('(').padded(), just(')').padded()),
            )
            .map(Expr::Exists);

        let paren_expr = full_expr.delimited_by(just('(').padded(), just(')').padded());

        let atom = choice((exists_fn, boolean, number, string, paren_expr, variable));

        let unary = just('!')
            .padded()
            .repeated()
            .then(atom)
            .foldr(|_op, expr| Expr::Unary(UnaryOp::Not, Box::new(expr)));

        let cmp_op = choice((
            just("==").to(BinaryOp::Eq),
            just("=~").to(BinaryOp::Matches),
            just("!=").to(BinaryOp::NotEq),
            just("<=").to(BinaryOp::LtEq),
            just(">=").to(BinaryOp::GtEq),
            just("<").to(BinaryOp::Lt),
            just(">").to(BinaryOp::Gt),
            text::keyword("contains").to(BinaryOp::Contains),
        ))
        .padded();

        let comparison = unary
            .clone()
            .then(cmp_op.then(unary).repeated())
            .foldl(|left, (op, right)| Expr::Binary(Box::new(left), op, Box::new(right)));

        let and_expr = comparison
            .clone()
            .then(just("&&").padded().to(BinaryOp::And).then(comparison).repeated())
            .foldl(|left, (op, right)| Expr::Binary(Box::new(left), op, Box::new(right)));

        and_expr
            .clone()
            .then(just("||").padded().to(BinaryOp::Or).then(and_expr).repeated())
            .foldl(|left, (op, right)| Expr::Binary(Box::new(left), op, Box::new(right)))
    })
    .then_ignore(end())
}

/// Parse a filter expression string into an AST.
pub fn parse_filter(filter: &str) -> Result<Expr, Vec<Simple<char>>> {
    parser().parse(filter)
}

/// [`parse_filter`] with the parser errors folded into one message.
pub fn compile_filter(filter: &str) -> crate::error::Result<Expr> {
    parse_filter(filter).map_err(|errs| {
        IonVcfError::FilterParseError(
            errs.into_iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        )
    })
}
