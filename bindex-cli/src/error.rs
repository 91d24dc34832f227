//! Error types for the binary.

use bindex_core::{ConfigError, ErrorKind, ExportError, ParameterTuple};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Interrupted by Ctrl-C")]
    Interrupted,
}

impl CliError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CliError::Config(_) => ErrorKind::Setup,
            CliError::Export(e) => e.kind(),
            CliError::Interrupted => ErrorKind::Interrupted,
        }
    }

    /// True when nothing was queried or written before the failure.
    pub fn is_setup(&self) -> bool {
        match self {
            CliError::Config(_) => true,
            CliError::Export(e) => e.is_setup(),
            CliError::Interrupted => false,
        }
    }

    /// The parameter tuple in flight when the run failed, if any.
    pub fn params(&self) -> Option<&ParameterTuple> {
        match self {
            CliError::Export(e) => e.params(),
            _ => None,
        }
    }

    /// 2 for anything that failed before the first query, 1 otherwise.
    pub fn exit_status(&self) -> u8 {
        if self.is_setup() {
            2
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_wrapped_error() {
        let missing: CliError = ConfigError::MissingConfigPath.into();
        assert_eq!(missing.kind(), ErrorKind::Setup);

        let query: CliError = ExportError::Query {
            params: ParameterTuple::from(vec!["A"]),
            reason: "boom".to_string(),
        }
        .into();
        assert_eq!(query.kind(), ErrorKind::Source);
        assert_eq!(query.to_string(), "Query failed for parameters (A): boom");
    }

    #[test]
    fn test_exit_codes() {
        let setup: CliError = ExportError::DriverLoad {
            driver: "x".to_string(),
        }
        .into();
        assert_eq!(setup.exit_status(), 2);

        let interrupted: CliError = ExportError::SleepInterrupted {
            completed: 1,
            total: 2,
        }
        .into();
        assert_eq!(interrupted.exit_status(), 1);
        assert_eq!(CliError::Interrupted.exit_status(), 1);
    }

    #[test]
    fn test_params_of_source_failure() {
        let params = ParameterTuple::from(vec!["A", "B"]);
        let err: CliError = ExportError::Close {
            params: params.clone(),
            reason: "reset".to_string(),
        }
        .into();
        assert_eq!(err.params(), Some(&params));
        assert!(!err.is_setup());

        let config: CliError = ConfigError::MissingConfigPath.into();
        assert_eq!(config.params(), None);
        assert!(config.is_setup());
    }
}
