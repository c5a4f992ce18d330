use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("Le job est déjà en cours")]
    AlreadyRunning,

    #[error("Le job n'est pas en cours")]
    NotRunning,

    #[error("Index de commande en recul: {current} -> {requested}")]
    CommandRegression { current: usize, requested: usize },

    #[error("Index de commande {index} hors limites ({len} commandes)")]
    CommandOutOfRange { index: usize, len: usize },

    #[error("Le job n'a pas encore de verdict (succès ou erreur)")]
    NoVerdict,

    #[error("Status incohérent: {0}")]
    Inconsistent(&'static str),
}

/// Phase observable d'un job d'encodage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Running,
    Success,
    Error,
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobPhase::Idle => write!(f, "Idle"),
            JobPhase::Running => write!(f, "Running"),
            JobPhase::Success => write!(f, "Success"),
            JobPhase::Error => write!(f, "Error"),
        }
    }
}

/// Status d'un job d'encodage
///
/// Les champs ne sont modifiables qu'à travers les transitions, qui
/// maintiennent les invariants:
/// - `running` implique ni `success` ni `error`
/// - à la sortie de `running`, exactement un de `success`/`error` est vrai
/// - `current_command` ne recule pas tant que le job tourne
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    success: bool,
    error: bool,
    complete: bool,
    running: bool,
    current_command: usize,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> bool {
        self.error
    }

    pub fn complete(&self) -> bool {
        self.complete
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn current_command(&self) -> usize {
        self.current_command
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn phase(&self) -> JobPhase {
        if self.running {
            JobPhase::Running
        } else if self.success {
            JobPhase::Success
        } else if self.error {
            JobPhase::Error
        } else {
            JobPhase::Idle
        }
    }

    /// Démarrer (ou relancer) le job
    pub fn start(&mut self) -> Result<(), StatusError> {
        if self.running {
            return Err(StatusError::AlreadyRunning);
        }
        *self = Self {
            running: true,
            started_at: Some(Utc::now()),
            ..Self::default()
        };
        Ok(())
    }

    /// Passer à la commande `index` (vérifié contre `command_count`)
    pub fn advance_to(&mut self, index: usize, command_count: usize) -> Result<(), StatusError> {
        if !self.running {
            return Err(StatusError::NotRunning);
        }
        if index < self.current_command {
            return Err(StatusError::CommandRegression {
                current: self.current_command,
                requested: index,
            });
        }
        if index >= command_count {
            return Err(StatusError::CommandOutOfRange {
                index,
                len: command_count,
            });
        }
        self.current_command = index;
        Ok(())
    }

    /// Terminer avec succès
    pub fn succeed(&mut self) -> Result<(), StatusError> {
        self.finish(true)
    }

    /// Terminer en erreur
    pub fn fail(&mut self) -> Result<(), StatusError> {
        self.finish(false)
    }

    fn finish(&mut self, success: bool) -> Result<(), StatusError> {
        if !self.running {
            return Err(StatusError::NotRunning);
        }
        self.running = false;
        self.success = success;
        self.error = !success;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Marquer la fin du suivi (orthogonal à succès/erreur)
    pub fn mark_complete(&mut self) -> Result<(), StatusError> {
        if self.running {
            return Err(StatusError::AlreadyRunning);
        }
        if !self.success && !self.error {
            return Err(StatusError::NoVerdict);
        }
        self.complete = true;
        Ok(())
    }

    /// Revenir à l'état initial
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Vérifier les invariants (utile pour un status désérialisé)
    pub fn validate(&self) -> Result<(), StatusError> {
        if self.success && self.error {
            return Err(StatusError::Inconsistent("success et error tous deux vrais"));
        }
        if self.running && (self.success || self.error) {
            return Err(StatusError::Inconsistent("verdict posé pendant l'exécution"));
        }
        if self.complete && self.running {
            return Err(StatusError::Inconsistent("complete pendant l'exécution"));
        }
        if self.complete && !self.success && !self.error {
            return Err(StatusError::Inconsistent("complete sans verdict"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle_keeps_invariants() {
        let mut status = Status::new();
        assert_eq!(status.phase(), JobPhase::Idle);
        status.validate().unwrap();

        status.start().unwrap();
        assert_eq!(status.phase(), JobPhase::Running);
        assert!(!status.success() && !status.error());
        status.validate().unwrap();

        status.advance_to(1, 3).unwrap();
        status.advance_to(2, 3).unwrap();
        assert_eq!(status.current_command(), 2);
        status.validate().unwrap();

        status.succeed().unwrap();
        assert!(!status.running());
        assert!(status.success() ^ status.error());
        assert!(status.finished_at().is_some());
        status.validate().unwrap();

        status.mark_complete().unwrap();
        assert!(status.complete());
        assert_eq!(status.phase(), JobPhase::Success);
        status.validate().unwrap();
    }

    #[test]
    fn test_failure_sets_only_error() {
        let mut status = Status::new();
        status.start().unwrap();
        status.fail().unwrap();
        assert!(status.error());
        assert!(!status.success());
        assert_eq!(status.phase(), JobPhase::Error);
    }

    #[test]
    fn test_command_index_never_regresses() {
        let mut status = Status::new();
        status.start().unwrap();
        status.advance_to(2, 4).unwrap();
        assert_eq!(
            status.advance_to(1, 4),
            Err(StatusError::CommandRegression {
                current: 2,
                requested: 1
            })
        );
        assert_eq!(
            status.advance_to(4, 4),
            Err(StatusError::CommandOutOfRange { index: 4, len: 4 })
        );
        assert_eq!(status.current_command(), 2);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut status = Status::new();
        assert_eq!(status.succeed(), Err(StatusError::NotRunning));
        assert_eq!(status.mark_complete(), Err(StatusError::NoVerdict));
        assert_eq!(status.advance_to(0, 1), Err(StatusError::NotRunning));

        status.start().unwrap();
        assert_eq!(status.start(), Err(StatusError::AlreadyRunning));
        assert_eq!(status.mark_complete(), Err(StatusError::AlreadyRunning));
    }

    #[test]
    fn test_restart_clears_previous_verdict() {
        let mut status = Status::new();
        status.start().unwrap();
        status.fail().unwrap();
        status.mark_complete().unwrap();

        status.start().unwrap();
        assert!(!status.error());
        assert!(!status.complete());
        assert_eq!(status.current_command(), 0);
    }

    #[test]
    fn test_validate_reports_double_verdict() {
        let status: Status = serde_json::from_str(r#"{"success": true, "error": true}"#).unwrap();
        assert!(matches!(status.validate(), Err(StatusError::Inconsistent(_))));

        let status: Status = serde_json::from_str(r#"{"running": true, "error": true}"#).unwrap();
        assert!(status.validate().is_err());
    }
}
