//! Unit tests for session error types

#[cfg(test)]
mod tests {
    use crate::config::InvalidConfig;
    use crate::registry::RegistryError;
    use crate::session::error::SessionError;
    use crate::session::SessionState;

    #[test]
    fn test_terminated_display() {
        let error = SessionError::Terminated(SessionState::Resolved);
        assert_eq!(error.to_string(), "Session already finished (resolved)");
    }

    #[test]
    fn test_invalid_transition_display() {
        let error = SessionError::InvalidTransition {
            state: SessionState::CapturePending,
            intent: "confirm",
        };
        assert_eq!(error.to_string(), "Cannot confirm while waiting for capture");
    }

    #[test]
    fn test_desync_wraps_registry_error() {
        let error = SessionError::Desync(RegistryError::IndexOutOfRange { index: 2, len: 1 });
        let display = format!("{error}");
        assert!(display.contains("out of sync"));
        assert!(display.contains("Index 2"));
    }

    #[test]
    fn test_config_error_is_transparent() {
        let error: SessionError = InvalidConfig::new("threshold", "must be at least 1").into();
        assert_eq!(
            error.to_string(),
            "Invalid configuration: threshold must be at least 1"
        );
    }

    #[test]
    fn test_registry_error_from() {
        let error: SessionError = RegistryError::ThresholdExceeded { threshold: 1 }.into();
        assert!(error.to_string().contains("Registry error"));
    }

    #[test]
    fn test_grid_lookup_displays() {
        assert_eq!(
            SessionError::NoSuchCandidate { position: 7, len: 3 }.to_string(),
            "No candidate at position 7 (grid shows 3)"
        );
        assert_eq!(
            SessionError::UnknownFolder { index: 4, count: 2 }.to_string(),
            "No folder 4 (there are 2)"
        );
        assert_eq!(
            SessionError::NothingToPreview.to_string(),
            "Nothing selected to preview"
        );
    }

    #[test]
    fn test_invalid_transition_while_previewing() {
        let error = SessionError::InvalidTransition {
            state: SessionState::PreviewPending,
            intent: "capture",
        };
        assert_eq!(error.to_string(), "Cannot capture while previewing");
    }
}
