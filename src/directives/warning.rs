//! Non-fatal compilation warnings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Something was dropped from the config, but the pass carried on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Warning {
    pub file: String,
    pub line: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directive: Option<String>,

    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)?;
        if let Some(directive) = &self.directive {
            write!(f, ": {directive}")?;
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = Warning {
            file: "Caddyfile".into(),
            line: 4,
            directive: Some("respond".into()),
            message: "module not registered: Foo".into(),
        };
        assert_eq!(warning.to_string(), "Caddyfile:4: respond: module not registered: Foo");
    }
}
