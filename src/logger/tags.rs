/// Log tags identifying the subsystem a message originates from
///
/// Each tag maps to a --debug-<key> command-line flag for targeted
/// diagnostics.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    Server,
    Gateway,
    Registry,
    Router,
    Broker,
    Publisher,
    Traces,
    Config,
}

impl LogTag {
    /// All known tags (used by logger::init to scan debug flags)
    pub fn all() -> &'static [LogTag] {
        &[
            LogTag::Server,
            LogTag::Gateway,
            LogTag::Registry,
            LogTag::Router,
            LogTag::Broker,
            LogTag::Publisher,
            LogTag::Traces,
            LogTag::Config,
        ]
    }

    /// Key used in --debug-<key> flags
    pub fn to_debug_key(&self) -> &'static str {
        match self {
            LogTag::Server => "webserver",
            LogTag::Gateway => "gateway",
            LogTag::Registry => "registry",
            LogTag::Router => "router",
            LogTag::Broker => "broker",
            LogTag::Publisher => "publisher",
            LogTag::Traces => "traces",
            LogTag::Config => "config",
        }
    }

    /// Fixed-width label for console output
    pub fn label(&self) -> &'static str {
        match self {
            LogTag::Server => "SERVER",
            LogTag::Gateway => "GATEWAY",
            LogTag::Registry => "REGISTRY",
            LogTag::Router => "ROUTER",
            LogTag::Broker => "BROKER",
            LogTag::Publisher => "PUBLISH",
            LogTag::Traces => "TRACES",
            LogTag::Config => "CONFIG",
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
