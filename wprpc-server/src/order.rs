//! Output ordering of responses
//!
//! Every line is processed on its own task, so requests always run
//! concurrently. The ordering mode only decides when a finished response is
//! written.
//!
//! # Trade-offs
//!
//! - **Completion**: A response is written as soon as it is ready. A slow
//!   backend call never delays answers to later lines, but output order may
//!   differ from input order. Callers match responses by id.
//! - **Arrival**: Responses are written in input order. A slow request holds
//!   back the responses queued behind it, though their work still proceeds.

use std::fmt;
use std::str::FromStr;

/// Environment variable selecting the ordering mode
pub const OUTPUT_ORDER_ENV: &str = "WPRPC_OUTPUT_ORDER";

/// When finished responses are written to the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputOrder {
    /// Write each response as soon as its request finishes
    #[default]
    Completion,
    /// Write responses in the order their lines arrived
    Arrival,
}

impl OutputOrder {
    /// Read the mode from `WPRPC_OUTPUT_ORDER`, defaulting to `Completion`
    ///
    /// Unrecognised values are logged and ignored.
    pub fn from_env() -> Self {
        match std::env::var(OUTPUT_ORDER_ENV) {
            Ok(value) => value.parse().unwrap_or_else(|e: String| {
                tracing::warn!(value = %value, error = %e, "Ignoring output order setting");
                OutputOrder::default()
            }),
            Err(_) => OutputOrder::default(),
        }
    }
}

impl FromStr for OutputOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completion" => Ok(OutputOrder::Completion),
            "arrival" => Ok(OutputOrder::Arrival),
            other => Err(format!("unknown output order '{}'", other)),
        }
    }
}

impl fmt::Display for OutputOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputOrder::Completion => write!(f, "completion"),
            OutputOrder::Arrival => write!(f, "arrival"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("completion".parse::<OutputOrder>(), Ok(OutputOrder::Completion));
        assert_eq!(" Arrival ".parse::<OutputOrder>(), Ok(OutputOrder::Arrival));
        assert!("fifo".parse::<OutputOrder>().is_err());
    }

    #[test]
    fn test_default_is_completion() {
        assert_eq!(OutputOrder::default(), OutputOrder::Completion);
        assert_eq!(OutputOrder::default().to_string(), "completion");
    }
}
