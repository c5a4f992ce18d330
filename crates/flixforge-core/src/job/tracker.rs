use flixforge_common::{ConversionCommand, JobPhase, Status, Video, VideoError};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Progression lisible par la couche de présentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobProgress {
    pub phase: JobPhase,
    pub current_command: usize,
    pub total_commands: usize,
}

/// Tracker d'un job vidéo (thread-safe)
///
/// Le pipeline écrit via les transitions, la présentation lit des copies.
/// Un verrou empoisonné est récupéré plutôt que de propager la panique.
#[derive(Debug, Clone)]
pub struct JobTracker {
    video: Arc<RwLock<Video>>,
}

impl JobTracker {
    /// Créer un nouveau tracker
    pub fn new(video: Video) -> Self {
        Self {
            video: Arc::new(RwLock::new(video)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Video> {
        self.video.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Video> {
        self.video.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copie du status actuel
    pub fn status(&self) -> Status {
        self.read().status.clone()
    }

    /// Copie des commandes de conversion
    pub fn commands(&self) -> Vec<ConversionCommand> {
        self.read().video_settings.conversion_commands.clone()
    }

    pub fn progress(&self) -> JobProgress {
        let video = self.read();
        JobProgress {
            phase: video.status.phase(),
            current_command: video.status.current_command(),
            total_commands: video.video_settings.conversion_commands.len(),
        }
    }

    /// Copie complète du job
    pub fn snapshot(&self) -> Video {
        self.read().clone()
    }

    /// Ajouter des commandes (refusé pendant l'exécution)
    pub fn push_commands(&self, commands: Vec<ConversionCommand>) -> Result<(), VideoError> {
        let mut video = self.write();
        for command in commands {
            video.push_command(command)?;
        }
        Ok(())
    }

    /// Démarrer le job
    pub fn start(&self) -> Result<(), VideoError> {
        let mut video = self.write();
        video.status.start()?;
        debug!("Job {} démarré", video.id());
        Ok(())
    }

    /// Passer à la commande suivante
    pub fn advance(&self, index: usize) -> Result<(), VideoError> {
        self.write().advance_command(index)
    }

    /// Terminer avec succès
    pub fn succeed(&self) -> Result<(), VideoError> {
        let mut video = self.write();
        video.status.succeed()?;
        debug!("Job {} terminé avec succès", video.id());
        Ok(())
    }

    /// Terminer en erreur
    pub fn fail(&self) -> Result<(), VideoError> {
        let mut video = self.write();
        video.status.fail()?;
        warn!("Job {} terminé en erreur", video.id());
        Ok(())
    }

    /// Marquer le suivi comme terminé
    pub fn complete(&self) -> Result<(), VideoError> {
        self.write().status.mark_complete()?;
        Ok(())
    }
}
