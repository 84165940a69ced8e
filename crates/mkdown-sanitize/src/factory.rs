//! Runtime sanitizer selection.

use std::fmt;
use std::str::FromStr;

use crate::dom::DomSanitizer;
use crate::error::SanitizerError;
use crate::{Sanitizer, SanitizerOptions};

/// Known sanitizer backends, most preferred first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SanitizerBackend {
    Ammonia,
    Dom,
}

impl SanitizerBackend {
    pub const ALL: [Self; 2] = [Self::Ammonia, Self::Dom];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ammonia => "ammonia",
            Self::Dom => "dom",
        }
    }

    /// Whether the backend was compiled into this build.
    #[must_use]
    pub fn is_compiled(self) -> bool {
        match self {
            Self::Ammonia => cfg!(feature = "ammonia"),
            Self::Dom => true,
        }
    }

    /// Whether the backend can escape disallowed tags instead of removing them.
    #[must_use]
    pub fn supports_escape(self) -> bool {
        matches!(self, Self::Dom)
    }

    fn install_hint(self) -> String {
        match self {
            Self::Ammonia => "ammonia (cargo feature `ammonia`)".to_owned(),
            Self::Dom => "dom (built in)".to_owned(),
        }
    }
}

impl fmt::Display for SanitizerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SanitizerBackend {
    type Err = SanitizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|b| b.name() == normalized)
            .ok_or_else(|| SanitizerError::UnknownSanitizer {
                name: s.to_owned(),
                expected: Self::ALL.map(Self::name).join(", "),
            })
    }
}

/// Resolves a [`Sanitizer`] from the backends available at runtime.
#[derive(Clone, Debug, Default)]
pub struct SanitizerFactory {
    backends: Option<Vec<SanitizerBackend>>,
}

impl SanitizerFactory {
    /// Factory exposing every compiled-in backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory exposing only the listed backends (still subject to compilation).
    #[must_use]
    pub fn restricted(backends: impl IntoIterator<Item = SanitizerBackend>) -> Self {
        Self {
            backends: Some(backends.into_iter().collect()),
        }
    }

    #[must_use]
    pub fn is_available(&self, backend: SanitizerBackend) -> bool {
        backend.is_compiled() && self.backends.as_ref().is_none_or(|b| b.contains(&backend))
    }

    /// Available backends in preference order.
    #[must_use]
    pub fn available(&self) -> Vec<SanitizerBackend> {
        SanitizerBackend::ALL
            .into_iter()
            .filter(|b| self.is_available(*b))
            .collect()
    }

    /// Build a sanitizer for `options`.
    ///
    /// An explicitly named backend is used when available. An unknown or
    /// unavailable one falls back to auto-selection in preference order,
    /// skipping backends that cannot honor escape mode.
    ///
    /// # Errors
    ///
    /// - [`SanitizerError::UnsupportedMode`] if the explicit backend is
    ///   available but cannot escape and `options.strip` is unset
    /// - [`SanitizerError::NoSanitizerAvailable`] if auto-selection finds nothing
    pub fn create(
        &self,
        options: &SanitizerOptions,
        explicit: Option<&str>,
    ) -> Result<Box<dyn Sanitizer>, SanitizerError> {
        if let Some(name) = explicit {
            match name.parse::<SanitizerBackend>() {
                Ok(backend) => {
                    if let Some(sanitizer) = self.create_explicit(backend, options)? {
                        return Ok(sanitizer);
                    }
                }
                Err(error) => tracing::debug!(%error, "auto-selecting sanitizer"),
            }
        }

        self.available()
            .into_iter()
            .filter(|b| options.strip || b.supports_escape())
            .find_map(|backend| {
                let sanitizer = instantiate(backend, options)?;
                tracing::debug!(backend = backend.name(), "selected sanitizer");
                Some(sanitizer)
            })
            .ok_or_else(|| SanitizerError::NoSanitizerAvailable {
                alternatives: SanitizerBackend::ALL
                    .into_iter()
                    .filter(|b| options.strip || b.supports_escape())
                    .map(SanitizerBackend::install_hint)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    fn create_explicit(
        &self,
        backend: SanitizerBackend,
        options: &SanitizerOptions,
    ) -> Result<Option<Box<dyn Sanitizer>>, SanitizerError> {
        if self.is_available(backend) {
            if !options.strip && !backend.supports_escape() {
                return Err(SanitizerError::UnsupportedMode {
                    backend: backend.name(),
                });
            }
            if let Some(sanitizer) = instantiate(backend, options) {
                tracing::debug!(backend = backend.name(), "using requested sanitizer");
                return Ok(Some(sanitizer));
            }
        }
        tracing::debug!(
            backend = backend.name(),
            "requested sanitizer unavailable, auto-selecting"
        );
        Ok(None)
    }
}

fn instantiate(backend: SanitizerBackend, options: &SanitizerOptions) -> Option<Box<dyn Sanitizer>> {
    match backend {
        #[cfg(feature = "ammonia")]
        SanitizerBackend::Ammonia => Some(Box::new(crate::ammonia::AmmoniaSanitizer::new(
            options.clone(),
        ))),
        SanitizerBackend::Dom => Some(Box::new(DomSanitizer::new(options.clone()))),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_backend_names() {
        assert_eq!("Ammonia".parse::<SanitizerBackend>().unwrap(), SanitizerBackend::Ammonia);
        assert_eq!(" dom ".parse::<SanitizerBackend>().unwrap(), SanitizerBackend::Dom);

        let err = "bleach".parse::<SanitizerBackend>().unwrap_err();
        assert!(
            matches!(err, SanitizerError::UnknownSanitizer { ref name, .. } if name == "bleach"),
            "Expected UnknownSanitizer, got {err:?}"
        );
        assert!(err.to_string().contains("ammonia, dom"));
    }

    #[test]
    fn test_auto_selects_preferred_backend() {
        let sanitizer = SanitizerFactory::new()
            .create(&SanitizerOptions::default(), None)
            .unwrap();

        let expected = if cfg!(feature = "ammonia") { "ammonia" } else { "dom" };
        assert_eq!(sanitizer.name(), expected);
    }

    #[test]
    fn test_explicit_backend_is_used() {
        let sanitizer = SanitizerFactory::new()
            .create(&SanitizerOptions::default(), Some("dom"))
            .unwrap();

        assert_eq!(sanitizer.name(), "dom");
    }

    #[test]
    fn test_unavailable_explicit_backend_falls_back() {
        let factory = SanitizerFactory::restricted([SanitizerBackend::Dom]);
        let sanitizer = factory
            .create(&SanitizerOptions::default(), Some("ammonia"))
            .unwrap();

        assert_eq!(sanitizer.name(), "dom");
    }

    #[test]
    fn test_unknown_explicit_backend_falls_back() {
        let factory = SanitizerFactory::new();
        let sanitizer = factory
            .create(&SanitizerOptions::default(), Some("nh3"))
            .unwrap();

        assert_eq!(sanitizer.name(), factory.available()[0].name());
    }

    #[test]
    fn test_escape_mode_skips_strip_only_backend() {
        let sanitizer = SanitizerFactory::new()
            .create(&SanitizerOptions::default().escaping(), None)
            .unwrap();

        assert_eq!(sanitizer.name(), "dom");
    }

    #[cfg(feature = "ammonia")]
    #[test]
    fn test_explicit_strip_only_backend_rejects_escape_mode() {
        let result = SanitizerFactory::new()
            .create(&SanitizerOptions::default().escaping(), Some("ammonia"));

        assert!(
            matches!(result, Err(SanitizerError::UnsupportedMode { backend: "ammonia" })),
            "Expected UnsupportedMode"
        );
    }

    #[test]
    fn test_no_sanitizer_available() {
        let none: [SanitizerBackend; 0] = [];
        let factory = SanitizerFactory::restricted(none);

        let err = match factory.create(&SanitizerOptions::default(), None) {
            Ok(_) => panic!("no backend should be available"),
            Err(err) => err,
        };
        assert!(
            matches!(err, SanitizerError::NoSanitizerAvailable { .. }),
            "Expected NoSanitizerAvailable, got {err:?}"
        );
        assert!(err.to_string().contains("ammonia (cargo feature `ammonia`)"));
    }

    #[test]
    fn test_backends_agree_on_allow_list() {
        let factory = SanitizerFactory::new();
        let inputs = [
            "<p class=\"x\" onclick=\"y()\">Hello <em>world</em></p>",
            "<a href=\"javascript:alert(1)\" title=\"t\">link</a>",
            "<div><blink>keep text</blink><script>drop()</script></div>",
            "<p>a<!-- comment -->b</p>",
            "<ul><li><input type=\"checkbox\" checked=\"\" disabled=\"\"> task</li></ul>",
            "<svg><a href=\"/x\">t</a></svg>",
            "<math><mi>x</mi></math>",
            "<p>a<svg><title>t</title></svg>b</p>",
            "<pre>\n\nx</pre>",
        ];

        let outputs: Vec<Vec<String>> = factory
            .available()
            .into_iter()
            .map(|backend| {
                let sanitizer = factory
                    .create(&SanitizerOptions::default(), Some(backend.name()))
                    .unwrap();
                inputs.iter().map(|i| sanitizer.sanitize(i)).collect()
            })
            .collect();

        for pair in outputs.windows(2) {
            assert_eq!(pair[0], pair[1]);
        }
    }
}
