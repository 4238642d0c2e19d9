//! Parse pest pairs into AST nodes

use glam::{DVec2, dvec2};
use miette::SourceSpan;
use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::{Pair, Pairs};

use crate::ast::*;
use crate::errors::{ScriptError, SourceContext};
use crate::{Rule, SceneParser};

/// Parse a scene script into an AST
pub fn parse(ctx: &SourceContext) -> Result<Script, ScriptError> {
    let pairs =
        SceneParser::parse(Rule::program, &ctx.source).map_err(|e| pest_error(ctx, e))?;

    let mut statements = Vec::new();
    for pair in pairs {
        if pair.as_rule() != Rule::program {
            continue;
        }
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::EOI {
                continue;
            }
            let span = span_of(&inner);
            let node = parse_statement(ctx, inner)?;
            statements.push(Spanned { node, span });
        }
    }
    Ok(Script { statements })
}

fn pest_error(ctx: &SourceContext, err: pest::error::Error<Rule>) -> ScriptError {
    let span = match err.location {
        InputLocation::Pos(p) => SourceSpan::from((p, 0)),
        InputLocation::Span((start, end)) => SourceSpan::from((start, end - start)),
    };
    ScriptError::Syntax {
        message: err.variant.message().into_owned(),
        src: ctx.named_source(),
        span,
    }
}

fn span_of(pair: &Pair<Rule>) -> SourceSpan {
    let span = pair.as_span();
    SourceSpan::from((span.start(), span.end() - span.start()))
}

/// Cursor over a pair's children that reports a syntax error at the parent
/// when a child is missing.
struct Children<'a, 'i> {
    ctx: &'a SourceContext,
    span: SourceSpan,
    pairs: Pairs<'i, Rule>,
}

impl<'a, 'i> Children<'a, 'i> {
    fn of(ctx: &'a SourceContext, pair: Pair<'i, Rule>) -> Self {
        Children {
            ctx,
            span: span_of(&pair),
            pairs: pair.into_inner(),
        }
    }

    fn next(&mut self) -> Result<Pair<'i, Rule>, ScriptError> {
        self.pairs.next().ok_or_else(|| ScriptError::Syntax {
            message: "incomplete statement".to_string(),
            src: self.ctx.named_source(),
            span: self.span,
        })
    }

    fn peek(&self) -> Option<Pair<'i, Rule>> {
        self.pairs.peek()
    }

    fn number(&mut self) -> Result<f64, ScriptError> {
        let pair = self.next()?;
        parse_number(self.ctx, &pair)
    }

    fn integer<T: std::str::FromStr>(&mut self) -> Result<T, ScriptError> {
        let pair = self.next()?;
        parse_integer(self.ctx, &pair)
    }

    fn vector(&mut self) -> Result<DVec2, ScriptError> {
        let pair = self.next()?;
        let mut xy = Children::of(self.ctx, pair);
        Ok(dvec2(xy.number()?, xy.number()?))
    }
}

fn invalid(ctx: &SourceContext, pair: &Pair<Rule>, cause: impl Into<String>) -> ScriptError {
    ScriptError::InvalidValue {
        cause: cause.into(),
        src: ctx.named_source(),
        span: span_of(pair),
    }
}

fn parse_number(ctx: &SourceContext, pair: &Pair<Rule>) -> Result<f64, ScriptError> {
    pair.as_str()
        .parse::<f64>()
        .map_err(|e| invalid(ctx, pair, e.to_string()))
}

fn parse_integer<T: std::str::FromStr>(
    ctx: &SourceContext,
    pair: &Pair<Rule>,
) -> Result<T, ScriptError> {
    pair.as_str()
        .parse::<T>()
        .map_err(|_| invalid(ctx, pair, format!("`{}` is out of range", pair.as_str())))
}

fn parse_statement(ctx: &SourceContext, pair: Pair<Rule>) -> Result<Statement, ScriptError> {
    let rule = pair.as_rule();
    let mut c = Children::of(ctx, pair);
    let statement = match rule {
        Rule::defaults_stmt => Statement::Setup(Setup::Defaults),
        Rule::viewport_stmt => Statement::Setup(Setup::Viewport {
            width: c.number()?,
            height: c.number()?,
        }),
        Rule::family_stmt => Statement::Setup(Setup::Family(parse_family(ctx, c)?)),
        Rule::point_stmt => Statement::Setup(Setup::Point(c.vector()?)),
        Rule::heading_stmt => Statement::Setup(Setup::Heading(c.vector()?)),
        Rule::speed_stmt => Statement::Setup(Setup::Speed(c.number()?)),
        Rule::turn_stmt => Statement::Setup(Setup::Turn(c.number()?)),
        Rule::accel_stmt => Statement::Setup(Setup::Accel(c.number()?)),
        Rule::hover_stmt => Statement::Setup(Setup::Hover(c.number()?)),
        Rule::rate_stmt => Statement::Setup(Setup::Rate(c.number()?)),

        Rule::run_stmt => Statement::Action(Action::Run(c.integer()?)),
        Rule::hold_stmt => Statement::Action(parse_hold(c)?),
        Rule::add_stmt => Statement::Action(Action::Add(c.vector()?)),
        Rule::remove_stmt => Statement::Action(Action::Remove(c.integer()?)),
        Rule::click_stmt => Statement::Action(Action::Click(c.vector()?)),
        Rule::cursor_stmt => {
            let target = match c.peek().map(|p| p.as_rule()) {
                Some(Rule::vector) => Some(c.vector()?),
                _ => None,
            };
            Statement::Action(Action::Cursor(target))
        }
        Rule::frame_stmt => Statement::Frame,
        Rule::assert_stmt => Statement::Assert(parse_check(ctx, c.next()?)?),
        other => {
            return Err(ScriptError::Syntax {
                message: format!("unexpected {other:?}"),
                src: ctx.named_source(),
                span: c.span,
            });
        }
    };
    Ok(statement)
}

fn parse_family(ctx: &SourceContext, mut c: Children<'_, '_>) -> Result<FamilyDecl, ScriptError> {
    let normal = c.vector()?;
    let spacing = c.number()?;
    let mut options = Vec::new();
    while let Some(opt) = c.pairs.next() {
        let rule = opt.as_rule();
        let mut o = Children::of(ctx, opt);
        options.push(match rule {
            Rule::offset_opt => FamilyOption::Offset(o.number()?),
            Rule::phase_opt => FamilyOption::Phase(o.number()?),
            Rule::thickness_opt => FamilyOption::Thickness(o.number()?),
            Rule::dash_opt => FamilyOption::Dash {
                dash: o.number()?,
                gap: o.number()?,
            },
            Rule::solid_opt => FamilyOption::Solid,
            Rule::color_opt => {
                let string = o.next()?;
                let span = span_of(&string);
                let text = string
                    .into_inner()
                    .next()
                    .map(|inner| inner.as_str().to_string())
                    .unwrap_or_default();
                FamilyOption::Color(Spanned { node: text, span })
            }
            other => {
                return Err(ScriptError::Syntax {
                    message: format!("unexpected family option {other:?}"),
                    src: ctx.named_source(),
                    span: o.span,
                });
            }
        });
    }
    Ok(FamilyDecl {
        normal,
        spacing,
        options,
    })
}

fn parse_hold(mut c: Children<'_, '_>) -> Result<Action, ScriptError> {
    let mut controls = Vec::new();
    while let Some(Rule::control) = c.peek().map(|p| p.as_rule()) {
        let pair = c.next()?;
        controls.push(match pair.as_str() {
            "left" => Control::Left,
            "right" => Control::Right,
            "up" => Control::Up,
            "down" => Control::Down,
            other => return Err(invalid(c.ctx, &pair, format!("unknown control `{other}`"))),
        });
    }
    let ticks = c.integer()?;
    Ok(Action::Hold { controls, ticks })
}

fn parse_check(ctx: &SourceContext, pair: Pair<Rule>) -> Result<Check, ScriptError> {
    let rule = pair.as_rule();
    let mut c = Children::of(ctx, pair);
    let check = match rule {
        Rule::triggers_check => {
            let first: u64 = c.integer()?;
            match c.peek() {
                // `triggers F P == N`
                Some(_) => {
                    let point: usize = c.integer()?;
                    let expected = c.integer()?;
                    let family = usize::try_from(first).map_err(|_| ScriptError::InvalidValue {
                        cause: "family index out of range".to_string(),
                        src: ctx.named_source(),
                        span: c.span,
                    })?;
                    Check::Triggers {
                        pair: Some((family, point)),
                        expected,
                    }
                }
                None => Check::Triggers {
                    pair: None,
                    expected: first,
                },
            }
        }
        Rule::points_check => Check::Points(c.integer()?),
        Rule::hovered_check => {
            let target = c.next()?;
            match target.as_rule() {
                Rule::integer => Check::Hovered(Some(parse_integer(ctx, &target)?)),
                _ => Check::Hovered(None),
            }
        }
        Rule::inside_check => Check::Inside {
            family: c.integer()?,
            point: c.integer()?,
        },
        Rule::outside_check => Check::Outside {
            family: c.integer()?,
            point: c.integer()?,
        },
        other => {
            return Err(ScriptError::Syntax {
                message: format!("unexpected check {other:?}"),
                src: ctx.named_source(),
                span: c.span,
            });
        }
    };
    Ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(source: &str) -> Result<Script, ScriptError> {
        parse(&SourceContext::new("<test>", source))
    }

    fn nodes(source: &str) -> Vec<Statement> {
        parse_str(source)
            .unwrap()
            .statements
            .into_iter()
            .map(|s| s.node)
            .collect()
    }

    #[test]
    fn parses_setup_statements() {
        let stmts = nodes(
            "viewport 960 x 640\n\
             family normal (1, 0) spacing 60 dash 60 gap 60 color \"#6666ff\"\n\
             family normal (0, 1) spacing 60 offset -5.5 thickness 2 solid\n\
             point (240, 320)\n\
             heading (1, 0.3)\n\
             speed 120\n\
             turn 90 deg\n\
             accel 120\n\
             hover 10\n\
             rate 60\n",
        );
        assert_eq!(stmts.len(), 10);
        assert_eq!(
            stmts[0],
            Statement::Setup(Setup::Viewport {
                width: 960.0,
                height: 640.0
            })
        );
        let Statement::Setup(Setup::Family(fam)) = &stmts[1] else {
            panic!("expected family, got {:?}", stmts[1]);
        };
        assert_eq!(fam.normal, dvec2(1.0, 0.0));
        assert_eq!(fam.spacing, 60.0);
        assert_eq!(fam.options[0], FamilyOption::Dash { dash: 60.0, gap: 60.0 });
        assert!(matches!(&fam.options[1], FamilyOption::Color(c) if c.node == "#6666ff"));

        let Statement::Setup(Setup::Family(fam)) = &stmts[2] else {
            panic!("expected family");
        };
        assert_eq!(
            fam.options,
            vec![
                FamilyOption::Offset(-5.5),
                FamilyOption::Thickness(2.0),
                FamilyOption::Solid
            ]
        );
        assert_eq!(stmts[6], Statement::Setup(Setup::Turn(90.0)));
    }

    #[test]
    fn parses_script_statements() {
        let stmts = nodes(
            "# a comment line\n\
             \n\
             run 10   # trailing comment\n\
             hold left, up 5\n\
             add (1.5, 2)\n\
             remove 3\n\
             click (10, 20)\n\
             cursor none\n\
             cursor (5, 5)\n\
             frame\n",
        );
        assert_eq!(
            stmts,
            vec![
                Statement::Action(Action::Run(10)),
                Statement::Action(Action::Hold {
                    controls: vec![Control::Left, Control::Up],
                    ticks: 5
                }),
                Statement::Action(Action::Add(dvec2(1.5, 2.0))),
                Statement::Action(Action::Remove(3)),
                Statement::Action(Action::Click(dvec2(10.0, 20.0))),
                Statement::Action(Action::Cursor(None)),
                Statement::Action(Action::Cursor(Some(dvec2(5.0, 5.0)))),
                Statement::Frame,
            ]
        );
    }

    #[test]
    fn parses_checks() {
        let stmts = nodes(
            "assert triggers == 3\n\
             assert triggers 1 4 == 2\n\
             assert points == 5\n\
             assert hovered == none\n\
             assert hovered == 2\n\
             assert inside 0 1\n\
             assert outside 1 0",
        );
        assert_eq!(
            stmts,
            vec![
                Statement::Assert(Check::Triggers {
                    pair: None,
                    expected: 3
                }),
                Statement::Assert(Check::Triggers {
                    pair: Some((1, 4)),
                    expected: 2
                }),
                Statement::Assert(Check::Points(5)),
                Statement::Assert(Check::Hovered(None)),
                Statement::Assert(Check::Hovered(Some(2))),
                Statement::Assert(Check::Inside {
                    family: 0,
                    point: 1
                }),
                Statement::Assert(Check::Outside {
                    family: 1,
                    point: 0
                }),
            ]
        );
    }

    #[test]
    fn spans_cover_statements() {
        let source = "run 1\nframe\n";
        let script = parse_str(source).unwrap();
        assert_eq!(script.statements[1].span, SourceSpan::from((6, 5)));
    }

    #[test]
    fn syntax_errors_point_into_the_source() {
        let err = parse_str("run 1\nfly away\n").unwrap_err();
        let ScriptError::Syntax { span, .. } = err else {
            panic!("expected syntax error, got {err:?}");
        };
        // Somewhere on the second line
        assert!((6..15).contains(&span.offset()), "{span:?}");
    }

    #[test]
    fn oversized_integers_are_invalid_values() {
        let err = parse_str("run 99999999999999999999999").unwrap_err();
        assert!(matches!(err, ScriptError::InvalidValue { .. }), "{err:?}");
    }
}
