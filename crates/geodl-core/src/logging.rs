//! Logging init for an interactive one-shot tool: tracing to stderr, level
//! picked from the CLI's quiet/verbose switches, `RUST_LOG` wins when set.

use tracing_subscriber::EnvFilter;

/// Console verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet,
    #[default]
    Normal,
    /// Include per-step debug detail (URLs, digests).
    Verbose,
}

impl Verbosity {
    fn default_filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "warn,geodl_core=info,geodl_cli=info",
            Verbosity::Verbose => "info,geodl_core=debug,geodl_cli=debug",
        }
    }
}

/// Initialize stderr logging. An explicit `RUST_LOG` overrides `verbosity`.
pub fn init(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();
}
