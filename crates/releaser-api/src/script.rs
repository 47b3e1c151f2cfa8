//! # Install Script Rendering
//!
//! The bootstrap script is a POSIX shell template embedded at compile time
//! and rendered with Handlebars. HTML escaping is off and strict mode is on,
//! so a placeholder without a value fails the render instead of silently
//! producing an empty string.
//!
//! | Placeholder | Value |
//! |---|---|
//! | `domain` | Public host clients reach the mirror on |
//! | `version` | Release the script installs |
//! | `prefix` | URL scheme, `http` or `https` |
//! | `binary` | Name of the installed executable |

use handlebars::{Handlebars, RenderError};
use serde::Serialize;

/// Script shipped with the binary.
pub const DEFAULT_TEMPLATE: &str = include_str!("../assets/install.sh");

/// Values substituted into the template.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScriptVars<'a> {
    pub domain: &'a str,
    pub version: &'a str,
    pub prefix: &'a str,
    pub binary: &'a str,
}

/// An install-script template and the registry that renders it.
#[derive(Debug, Clone)]
pub struct InstallScript {
    template: String,
    registry: Handlebars<'static>,
}

impl Default for InstallScript {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl InstallScript {
    pub fn new(template: impl Into<String>) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        Self {
            template: template.into(),
            registry,
        }
    }

    /// Substitute `vars` into the template.
    pub fn render(&self, vars: &ScriptVars<'_>) -> Result<String, RenderError> {
        self.registry.render_template(&self.template, vars)
    }
}
