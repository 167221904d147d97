//! Named matcher definitions (`@name ...` segments).

use serde_json::Value;

use crate::error::{CompileError, CompileResult};
use crate::matchers::{MatcherDefs, MatcherSet};
use crate::tokens::{Dispenser, ServerBlock, Token};

/// True if the segment defines a named matcher rather than invoking a directive.
pub fn is_matcher_definition(segment: &[Token]) -> bool {
    segment.first().is_some_and(|t| t.text.starts_with('@'))
}

/// Parse one `@name` segment, either inline (`@api path /api/*`) or as a block
/// with one `<kind> <args...>` line per matcher.
pub fn parse_definition(segment: &[Token]) -> CompileResult<(String, MatcherSet)> {
    let mut d = Dispenser::new(segment.to_vec());
    if !d.next() {
        return Err(d.arg_err());
    }
    let name = d.val().trim_start_matches('@').to_string();
    if name.is_empty() {
        return Err(malformed(&d, "matcher name missing after '@'".to_string()));
    }

    let mut set = MatcherSet::new();
    if d.next_arg() {
        add_matcher(&mut d, &mut set)?;
    }
    while d.next_block(0) {
        add_matcher(&mut d, &mut set)?;
    }

    if set.is_empty() {
        return Err(malformed(&d, format!("matcher @{name} defines no matchers")));
    }
    Ok((name, set))
}

/// The cursor sits on a matcher kind; its arguments follow on the same line.
fn add_matcher(d: &mut Dispenser, set: &mut MatcherSet) -> CompileResult<()> {
    let kind = d.val().to_string();
    let args = d.remaining_args();
    if args.is_empty() {
        return Err(d.arg_err());
    }
    let entry = set
        .entry(kind.clone())
        .or_insert_with(|| Value::Array(Vec::new()));
    match entry {
        Value::Array(values) => values.extend(args.into_iter().map(Value::String)),
        _ => return Err(malformed(d, format!("matcher kind {kind} is not a list"))),
    }
    Ok(())
}

fn malformed(d: &Dispenser, message: String) -> CompileError {
    CompileError::MalformedMatcher {
        file: d.file().to_string(),
        line: d.line(),
        message,
    }
}

/// Collect every matcher defined in a server block.
pub fn collect_definitions(block: &ServerBlock) -> CompileResult<MatcherDefs> {
    let mut defs = MatcherDefs::new();
    for segment in block.segments.iter().filter(|s| is_matcher_definition(s)) {
        let (name, set) = parse_definition(segment)?;
        if defs.contains_key(&name) {
            let first = &segment[0];
            return Err(CompileError::Syntax {
                file: first.file.clone(),
                line: first.line,
                message: format!("matcher is defined more than once: {name}"),
            });
        }
        defs.insert(name, set);
    }
    Ok(defs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lines(lines: &[(usize, &str)]) -> Vec<Token> {
        lines
            .iter()
            .flat_map(|(line, text)| {
                text.split_whitespace()
                    .map(move |t| Token::new("Caddyfile", *line, t))
            })
            .collect()
    }

    #[test]
    fn test_inline_definition() {
        let (name, set) = parse_definition(&lines(&[(1, "@api path /api/* /v1/*")])).unwrap();
        assert_eq!(name, "api");
        assert_eq!(set["path"], json!(["/api/*", "/v1/*"]));
    }

    #[test]
    fn test_block_definition_merges_repeated_kinds() {
        let segment = lines(&[
            (1, "@static {"),
            (2, "path /css/*"),
            (3, "path /js/*"),
            (4, "method GET HEAD"),
            (5, "}"),
        ]);
        let (name, set) = parse_definition(&segment).unwrap();
        assert_eq!(name, "static");
        assert_eq!(set["path"], json!(["/css/*", "/js/*"]));
        assert_eq!(set["method"], json!(["GET", "HEAD"]));
    }

    #[test]
    fn test_empty_definition_is_malformed() {
        let err = parse_definition(&lines(&[(3, "@nothing")])).unwrap_err();
        assert!(matches!(err, CompileError::MalformedMatcher { line: 3, .. }));
    }

    #[test]
    fn test_matcher_without_args_is_argument_error() {
        let err = parse_definition(&lines(&[(2, "@x path")])).unwrap_err();
        assert!(matches!(err, CompileError::ArgumentCount { line: 2, .. }));
    }

    #[test]
    fn test_duplicate_definition_in_block() {
        let block = ServerBlock::new(
            vec![":80".into()],
            vec![
                lines(&[(1, "@a path /a")]),
                lines(&[(2, "respond ok")]),
                lines(&[(3, "@a path /b")]),
            ],
        );
        let err = collect_definitions(&block).unwrap_err();
        assert!(err.to_string().contains("defined more than once"));
    }

    #[test]
    fn test_collect_skips_directives() {
        let block = ServerBlock::new(
            vec![":80".into()],
            vec![lines(&[(1, "@a path /a")]), lines(&[(2, "respond ok")])],
        );
        let defs = collect_definitions(&block).unwrap();
        assert_eq!(defs.len(), 1);
        assert!(defs.contains_key("a"));
    }
}
