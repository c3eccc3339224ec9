use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the generated description file inside a workspace.
pub const DESCRIPTION_FILE: &str = "job.sub";

/// Name of the event log the scheduler writes inside a workspace.
pub const EVENT_LOG_FILE: &str = "job.log";

/// Per-invocation scratch directory holding the description file and the
/// job's event log.
///
/// The directory and everything in it is removed when the value is dropped,
/// unless it was created with `preserve`.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    preserve: bool,
}

impl Workspace {
    /// Create `cui-<uuid>` under `root`.
    pub fn create(root: &Path, preserve: bool) -> Result<Self, std::io::Error> {
        let path = root.join(format!("cui-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path)?;
        info!("Created workspace {}", path.display());
        Ok(Self { path, preserve })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn description_path(&self) -> PathBuf {
        self.path.join(DESCRIPTION_FILE)
    }

    pub fn event_log_path(&self) -> PathBuf {
        self.path.join(EVENT_LOG_FILE)
    }

    /// End the scope now and hand back the path it occupied.
    pub fn close(self) -> PathBuf {
        let path = self.path.clone();
        drop(self);
        path
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.preserve {
            info!("Preserving workspace {}", self.path.display());
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("Removed workspace {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove workspace {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populate(ws: &Workspace) {
        std::fs::write(ws.description_path(), "queue\n").unwrap();
        std::fs::write(ws.event_log_path(), "...\n").unwrap();
        std::fs::create_dir(ws.path().join("nested")).unwrap();
        std::fs::write(ws.path().join("nested").join("f"), "x").unwrap();
    }

    #[test]
    fn removed_with_contents_on_close() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::create(root.path(), false).unwrap();
        populate(&ws);

        let path = ws.close();
        assert!(path.starts_with(root.path()));
        assert!(!path.exists());
    }

    #[test]
    fn preserved_workspace_survives() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::create(root.path(), true).unwrap();
        populate(&ws);

        let path = ws.close();
        assert!(path.exists());
        assert!(path.join(DESCRIPTION_FILE).exists());
    }

    #[test]
    fn removed_when_scope_fails() {
        let root = tempfile::tempdir().unwrap();
        let mut seen = None;

        let result: Result<(), std::io::Error> = (|| {
            let ws = Workspace::create(root.path(), false)?;
            populate(&ws);
            seen = Some(ws.path().to_path_buf());
            Err(std::io::Error::new(std::io::ErrorKind::Other, "submit failed"))
        })();

        assert!(result.is_err());
        assert!(!seen.unwrap().exists());
    }

    #[test]
    fn names_are_unique() {
        let root = tempfile::tempdir().unwrap();
        let a = Workspace::create(root.path(), false).unwrap();
        let b = Workspace::create(root.path(), false).unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().file_name().unwrap().to_string_lossy().starts_with("cui-"));
    }
}
