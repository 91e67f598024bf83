use std::ops::RangeInclusive;
use std::time::Duration;

/// Prefix written before every formatted browser log line.
pub const PROGRAM_TAG: &str = "FROM CHROME >>";

/// Prefix written before every diagnostic line.
pub const DIAGNOSTIC_TAG: &str = "[browser-log]";

/// Substring of the `DEBUG` environment variable that turns on verbose diagnostics.
pub const DEBUG_NAMESPACE: &str = "browser-log";

/// Launch argument that selects the remote debugging port.
pub const REMOTE_DEBUGGING_PORT_FLAG: &str = "--remote-debugging-port";

/// Range a fresh remote debugging port is drawn from.
pub const DEBUG_PORT_RANGE: RangeInclusive<u16> = 40000..=65000;

/// Default total budget for connecting to the debugging protocol.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Delay between two connection attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Environment variable that switches redirection on (`true`) or off.
pub const ENV_REDIRECT_BROWSER_LOG: &str = "REDIRECT_BROWSER_LOG";

/// Environment variable overriding the connect timeout budget, in milliseconds.
pub const ENV_BROWSER_CONNECT_TIMEOUT: &str = "BROWSER_CONNECT_TIMEOUT";

/// Environment variable inspected for [`DEBUG_NAMESPACE`].
pub const ENV_DEBUG: &str = "DEBUG";

/// Written when a value cannot be serialized.
pub const COULD_NOT_STRINGIFY: &str = "Could not stringify";

/// Written when a timestamp cannot be rendered as an ISO-8601 date.
pub const COULD_NOT_PARSE_DATE: &str = "<could not parse date>";

/// Placeholder for call frames without a function name.
pub const NO_FUNCTION_NAME: &str = "<no functionName>";

/// Prefix for console arguments that carry no value.
pub const NO_MESSAGE_PARSED: &str = "<No message parsed>";

/// Marker separating an exception message from its call stack.
pub const STACK_MARKER: &str = " at ";

/// CDP methods whose parameters are forwarded to the dispatcher.
pub mod cdp_method {
    pub const CONSOLE_API_CALLED: &str = "Runtime.consoleAPICalled";
    pub const EXCEPTION_THROWN: &str = "Runtime.exceptionThrown";
    pub const ENTRY_ADDED: &str = "Log.entryAdded";
    pub const RUNTIME_ENABLE: &str = "Runtime.enable";
    pub const LOG_ENABLE: &str = "Log.enable";

    /// Returns `true` for event methods carrying a log payload.
    pub fn is_log_event(method: &str) -> bool {
        matches!(method, CONSOLE_API_CALLED | EXCEPTION_THROWN | ENTRY_ADDED)
    }
}
