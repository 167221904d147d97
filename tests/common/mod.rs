//! Shared fixtures for integration tests.

use directive_compiler::{DirectiveRegistry, ModuleTable, Route, ServerBlock, Token};

/// One segment from source lines: every line becomes one line of tokens,
/// starting at `first_line` in `file`.
pub fn segment(file: &str, first_line: usize, lines: &[&str]) -> Vec<Token> {
    lines
        .iter()
        .enumerate()
        .flat_map(|(i, &line)| {
            line.split_whitespace()
                .map(move |text| Token::new(file, first_line + i, text))
        })
        .collect()
}

/// A server block whose segments each start on their own line of `Caddyfile`.
pub fn site(key: &str, segments: &[&[&str]]) -> ServerBlock {
    let mut line = 1;
    let segments = segments
        .iter()
        .map(|lines| {
            let seg = segment("Caddyfile", line, lines);
            line += lines.len();
            seg
        })
        .collect();
    ServerBlock::new(vec![key.to_string()], segments)
}

#[allow(dead_code)]
pub fn builtins() -> (DirectiveRegistry, ModuleTable) {
    (DirectiveRegistry::with_builtins(), ModuleTable::with_builtins())
}

/// `handler` name of each route's first handler.
#[allow(dead_code)]
pub fn handler_names(routes: &[Route]) -> Vec<String> {
    routes
        .iter()
        .map(|r| r.handlers[0]["handler"].as_str().unwrap_or_default().to_string())
        .collect()
}
