use crate::CoreError;
use shadeplan_schema::TargetId;
use std::fmt;

/// Configuration phase of a target profile.
///
/// All `register`/`relocate` calls happen while `Configuring`; the single
/// `resolve` call moves the profile to `Resolved`, after which it is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Configuring,
    Resolved,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Configuring => write!(f, "configuring"),
            Phase::Resolved => write!(f, "resolved"),
        }
    }
}

pub fn validate_transition(
    target: &TargetId,
    from: Phase,
    to: Phase,
    operation: &str,
) -> Result<(), CoreError> {
    let valid = matches!(
        (from, to),
        (Phase::Configuring, Phase::Configuring | Phase::Resolved)
    );

    if valid {
        Ok(())
    } else {
        Err(CoreError::PhaseViolation {
            target: target.clone(),
            operation: operation.to_owned(),
            phase: from,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t() -> TargetId {
        TargetId::new("spigot")
    }

    #[test]
    fn valid_transitions() {
        let t = t();
        assert!(validate_transition(&t, Phase::Configuring, Phase::Configuring, "add").is_ok());
        assert!(validate_transition(&t, Phase::Configuring, Phase::Resolved, "resolve").is_ok());
    }

    #[test]
    fn invalid_transitions() {
        let t = t();
        assert!(validate_transition(&t, Phase::Resolved, Phase::Configuring, "register").is_err());
        assert!(validate_transition(&t, Phase::Resolved, Phase::Resolved, "resolve").is_err());
    }

    #[test]
    fn violation_names_operation_and_phase() {
        let err = validate_transition(&t(), Phase::Resolved, Phase::Configuring, "relocate")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "target 'spigot': cannot relocate in phase 'resolved'"
        );
    }
}
