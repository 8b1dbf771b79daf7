use crate::outcome::ParseResult;
use crate::parser::Parser;

/// One `guard => body` arm of a [`switch`].
pub struct SwitchCase<T> {
    guard: Parser<()>,
    body: Parser<T>,
}

/// Build a switch arm; the guard's value is discarded.
pub fn case<G: 'static, T>(guard: Parser<G>, body: Parser<T>) -> SwitchCase<T> {
    let name = guard.name().to_string();
    SwitchCase {
        guard: Parser::new(name, move |cursor| guard.parse(cursor).map(|_| ())),
        body,
    }
}

/// Keyword dispatch.
///
/// Guards are tried in order. The first guard that matches commits the
/// switch to its body, which runs from the switch's own cursor (the guard's
/// consumption is discarded). A failing body fails the switch with the
/// body's failure as cause; later arms are not tried. When no guard matches,
/// `default` runs if present.
///
/// Named `switch(g1 => b1, g2 => b2)`.
pub fn switch<T: 'static>(cases: Vec<SwitchCase<T>>, default: Option<Parser<T>>) -> Parser<T> {
    let mut arms: Vec<String> = cases
        .iter()
        .map(|c| format!("{} => {}", c.guard.name(), c.body.name()))
        .collect();
    if let Some(default) = &default {
        arms.push(format!("_ => {}", default.name()));
    }
    let name = format!("switch({})", arms.join(", "));
    let expected = name.clone();
    Parser::new(name, move |cursor| {
        let chosen = cases
            .iter()
            .find(|c| c.guard.parse(cursor).is_success())
            .map(|c| &c.body)
            .or(default.as_ref());
        match chosen.map(|body| body.parse(cursor)) {
            Some(ParseResult::Failure(f)) => {
                ParseResult::failure_with_cause(expected.as_str(), cursor.clone(), f)
            }
            Some(success) => success,
            None => ParseResult::failure(expected.as_str(), cursor.clone()),
        }
    })
}
