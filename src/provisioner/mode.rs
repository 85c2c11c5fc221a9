//! Execution mode, decided once at the entry point

use std::str::FromStr;

/// Where the provisioned clients run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Long-lived browser session; one client is kept and reused
    Browser,
    /// Server-side render; a new client per invocation
    Server,
}

impl ExecutionMode {
    pub fn is_server(self) -> bool {
        matches!(self, ExecutionMode::Server)
    }

    pub fn is_browser(self) -> bool {
        matches!(self, ExecutionMode::Browser)
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Browser => write!(f, "browser"),
            ExecutionMode::Server => write!(f, "server"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "browser" | "client" => Ok(ExecutionMode::Browser),
            "server" | "ssr" => Ok(ExecutionMode::Server),
            other => Err(format!(
                "unknown execution mode '{}' (expected browser or server)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("browser".parse::<ExecutionMode>(), Ok(ExecutionMode::Browser));
        assert_eq!("SSR".parse::<ExecutionMode>(), Ok(ExecutionMode::Server));
        assert!("edge".parse::<ExecutionMode>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for mode in [ExecutionMode::Browser, ExecutionMode::Server] {
            assert_eq!(mode.to_string().parse::<ExecutionMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_predicates() {
        assert!(ExecutionMode::Server.is_server());
        assert!(!ExecutionMode::Server.is_browser());
        assert!(ExecutionMode::Browser.is_browser());
    }
}
