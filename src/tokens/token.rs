//! Positioned tokens and the block structure they arrive in.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A single token with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Token {
    /// Source file the token was read from.
    pub file: String,

    /// 1-based line number.
    pub line: usize,

    /// Token text with quotes already removed.
    pub text: String,
}

impl Token {
    pub fn new(file: impl Into<String>, line: usize, text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            text: text.into(),
        }
    }

    /// True if both tokens sit on the same line of the same file.
    pub fn same_line(&self, other: &Token) -> bool {
        self.line == other.line && self.file == other.file
    }
}

/// Tokens of one directive occurrence, directive name first.
pub type Segment = Vec<Token>;

/// A group of segments that share a set of site keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerBlock {
    /// Site addresses this block applies to.
    pub keys: Vec<String>,

    /// Directive segments in source order.
    pub segments: Vec<Segment>,
}

impl ServerBlock {
    pub fn new(keys: Vec<String>, segments: Vec<Segment>) -> Self {
        Self { keys, segments }
    }

    /// Deduplicated names of every file that contributed tokens to this block,
    /// in first-seen order.
    pub fn files(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for token in self.segments.iter().flatten() {
            if seen.insert(token.file.as_str()) {
                files.push(token.file.clone());
            }
        }
        files
    }
}

/// Already-tokenized configuration as produced by the lexer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdapterInput {
    pub server_blocks: Vec<ServerBlock>,
}

impl AdapterInput {
    /// Read tokenized input from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let content = fs::read_to_string(path).map_err(InputError::Io)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, InputError> {
        serde_json::from_str(content).map_err(InputError::Parse)
    }
}

/// Error reading tokenized input.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error("Parse error: {0}")]
    Parse(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_are_deduplicated_in_first_seen_order() {
        let block = ServerBlock::new(
            vec!["example.com".into()],
            vec![
                vec![Token::new("b.conf", 1, "root"), Token::new("b.conf", 1, "/srv")],
                vec![Token::new("a.conf", 4, "file_server")],
                vec![Token::new("b.conf", 9, "respond")],
            ],
        );
        assert_eq!(block.files(), vec!["b.conf".to_string(), "a.conf".to_string()]);
    }

    #[test]
    fn test_input_from_json() {
        let json = r#"{
            "server_blocks": [
                { "keys": [":8080"], "segments": [[{"file": "Caddyfile", "line": 2, "text": "file_server"}]] }
            ]
        }"#;
        let input = AdapterInput::from_json(json).unwrap();
        assert_eq!(input.server_blocks.len(), 1);
        assert_eq!(input.server_blocks[0].segments[0][0].text, "file_server");
    }

    #[test]
    fn test_input_parse_error() {
        assert!(matches!(AdapterInput::from_json("{ nope"), Err(InputError::Parse(_))));
    }
}
