//! Engine identifiers and capability traits.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::options::FeatureTag;

/// Converts markdown into HTML.
///
/// Implementations hold their native options and are shared across threads
/// through the converter cache, so `convert` must not rely on mutable state.
pub trait Parser: Send + Sync {
    /// Stable identifier, used in cache keys.
    fn name(&self) -> &'static str;

    /// Features this backend honors.
    ///
    /// Used for capability queries only; requesting an unsupported feature
    /// drops it silently.
    fn supported_features(&self) -> BTreeSet<FeatureTag>;

    /// Render `markdown` to HTML.
    fn convert(&self, markdown: &str) -> Result<String, EngineError>;
}

/// Converts HTML back into markdown.
pub trait HtmlToMarkdown: Send + Sync {
    /// Stable identifier, used in cache keys.
    fn name(&self) -> &'static str;

    /// Render `html` to markdown.
    fn convert(&self, html: &str) -> Result<String, EngineError>;
}

/// Known markdown to HTML engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParserEngine {
    Comrak,
    PulldownCmark,
}

impl ParserEngine {
    /// Every known engine, in preference order.
    pub const ALL: [Self; 2] = [Self::Comrak, Self::PulldownCmark];

    /// Stable identifier.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Comrak => "comrak",
            Self::PulldownCmark => "pulldown-cmark",
        }
    }

    /// Cargo feature that compiles this backend in.
    #[must_use]
    pub fn feature(self) -> &'static str {
        self.name()
    }

    /// Whether the backend was compiled into this build.
    #[must_use]
    pub fn is_compiled(self) -> bool {
        match self {
            Self::Comrak => cfg!(feature = "comrak"),
            Self::PulldownCmark => cfg!(feature = "pulldown-cmark"),
        }
    }
}

impl FromStr for ParserEngine {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comrak" => Ok(Self::Comrak),
            "pulldown-cmark" | "pulldown_cmark" | "pulldown" => Ok(Self::PulldownCmark),
            _ => Err(EngineError::UnsupportedEngine {
                name: s.to_owned(),
                expected: join_names(Self::ALL.iter().map(|e| e.name())),
            }),
        }
    }
}

impl TryFrom<String> for ParserEngine {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParserEngine> for String {
    fn from(engine: ParserEngine) -> Self {
        engine.name().to_owned()
    }
}

impl fmt::Display for ParserEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Known HTML to markdown engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HtmlEngine {
    Htmd,
}

impl HtmlEngine {
    /// Every known engine, in preference order.
    pub const ALL: [Self; 1] = [Self::Htmd];

    /// Stable identifier.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Htmd => "htmd",
        }
    }

    /// Cargo feature that compiles this backend in.
    #[must_use]
    pub fn feature(self) -> &'static str {
        self.name()
    }

    /// Whether the backend was compiled into this build.
    #[must_use]
    pub fn is_compiled(self) -> bool {
        match self {
            Self::Htmd => cfg!(feature = "htmd"),
        }
    }
}

impl FromStr for HtmlEngine {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "htmd" => Ok(Self::Htmd),
            _ => Err(EngineError::UnsupportedEngine {
                name: s.to_owned(),
                expected: join_names(Self::ALL.iter().map(|e| e.name())),
            }),
        }
    }
}

impl TryFrom<String> for HtmlEngine {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HtmlEngine> for String {
    fn from(engine: HtmlEngine) -> Self {
        engine.name().to_owned()
    }
}

impl fmt::Display for HtmlEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_parser_engine_aliases() {
        for name in ["comrak", "Comrak", " COMRAK "] {
            assert_eq!(name.parse::<ParserEngine>().unwrap(), ParserEngine::Comrak);
        }
        for name in ["pulldown-cmark", "pulldown_cmark", "pulldown", "Pulldown-CMark"] {
            assert_eq!(
                name.parse::<ParserEngine>().unwrap(),
                ParserEngine::PulldownCmark
            );
        }
    }

    #[test]
    fn test_unknown_engine_is_unsupported() {
        let err = "marko".parse::<ParserEngine>().unwrap_err();

        assert!(
            matches!(err, EngineError::UnsupportedEngine { ref name, .. } if name == "marko"),
            "Expected UnsupportedEngine, got {err:?}"
        );
        assert!(err.to_string().contains("comrak, pulldown-cmark"));
    }

    #[test]
    fn test_unknown_html_engine_is_unsupported() {
        let err = "html2text".parse::<HtmlEngine>().unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedEngine { .. }));
    }

    #[test]
    fn test_engine_serde_uses_names() {
        let json = serde_json::to_string(&ParserEngine::PulldownCmark).unwrap();
        assert_eq!(json, r#""pulldown-cmark""#);

        let parsed: ParserEngine = serde_json::from_str(r#""pulldown""#).unwrap();
        assert_eq!(parsed, ParserEngine::PulldownCmark);

        assert!(serde_json::from_str::<HtmlEngine>(r#""nope""#).is_err());
    }
}
