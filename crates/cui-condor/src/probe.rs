//! Optional environment probes that annotate the job description.
//!
//! Both probes degrade instead of failing: a missing tool, mount or
//! credential just means the conservative default is used.

use cui_core::config::MountConfig;
use cui_core::env::Environment;
use cui_core::process::Invocation;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Revision of the shared filesystem at `mount.path`, if it can be read.
pub async fn mount_revision(mount: &MountConfig) -> Option<u64> {
    let invocation = Invocation::new(&mount.tool)
        .args(["-q", "-g", "revision"])
        .arg(mount.path.display().to_string());

    match invocation.run().await {
        Ok(output) => {
            let revision = parse_revision(&output.stdout);
            if revision.is_none() {
                debug!(
                    "Unreadable revision {:?} for {}",
                    output.stdout.trim(),
                    mount.path.display()
                );
            }
            revision
        }
        Err(e) => {
            debug!("Mount probe for {} unavailable: {}", mount.path.display(), e);
            None
        }
    }
}

pub fn parse_revision(output: &str) -> Option<u64> {
    output.trim().parse().ok()
}

/// Requirement constraining machines to a mount at least as new as ours.
pub fn mount_requirement(attribute: &str, revision: Option<u64>) -> String {
    match revision {
        Some(rev) => format!("(TARGET.{} >= {})", attribute, rev),
        None => format!("(TARGET.{} > 0)", attribute),
    }
}

/// Default credential location for a user id.
pub fn default_credential_path(uid: &str) -> PathBuf {
    PathBuf::from(format!("/tmp/x509up_u{}", uid))
}

/// Locate the user's security credential.
///
/// Only existence is checked: the file may hold a stale or expired
/// credential, which the submit tool rejects at submission time.
pub async fn credential(env: &Environment) -> Option<PathBuf> {
    let path = match &env.credential_override {
        Some(path) => path.clone(),
        None => default_credential_path(&current_uid().await?),
    };
    existing(&path)
}

fn existing(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        Some(path.to_path_buf())
    } else {
        debug!("No credential at {}", path.display());
        None
    }
}

async fn current_uid() -> Option<String> {
    match Invocation::new("id").arg("-u").run().await {
        Ok(output) => Some(output.stdout.trim().to_string()).filter(|uid| !uid.is_empty()),
        Err(e) => {
            debug!("Cannot determine uid: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(credential: Option<PathBuf>) -> Environment {
        Environment {
            user: "alice".to_string(),
            shell: "/bin/sh".to_string(),
            credential_override: credential,
        }
    }

    #[test]
    fn requirement_uses_revision_or_falls_back() {
        assert_eq!(
            mount_requirement("CVMFS_REVISION", Some(4242)),
            "(TARGET.CVMFS_REVISION >= 4242)"
        );
        assert_eq!(mount_requirement("CVMFS_REVISION", None), "(TARGET.CVMFS_REVISION > 0)");
    }

    #[test]
    fn revision_parsing() {
        assert_eq!(parse_revision("1234\n"), Some(1234));
        assert_eq!(parse_revision(""), None);
        assert_eq!(parse_revision("attr: no such attribute"), None);
    }

    #[tokio::test]
    async fn missing_tool_degrades() {
        let mount = MountConfig {
            path: PathBuf::from("/nonexistent/mount"),
            tool: "/nonexistent/attr-tool".to_string(),
            attribute: "CVMFS_REVISION".to_string(),
        };
        assert_eq!(mount_revision(&mount).await, None);
    }

    #[tokio::test]
    async fn probe_reads_tool_output() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("fake-attr");
        std::fs::write(&tool, "#!/bin/sh\necho 77\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        let mount = MountConfig {
            path: dir.path().to_path_buf(),
            tool: tool.display().to_string(),
            attribute: "CVMFS_REVISION".to_string(),
        };
        assert_eq!(mount_revision(&mount).await, Some(77));
    }

    #[tokio::test]
    async fn credential_override_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let proxy = dir.path().join("x509up");

        assert_eq!(credential(&env_with(Some(proxy.clone()))).await, None);

        std::fs::write(&proxy, "cert").unwrap();
        assert_eq!(credential(&env_with(Some(proxy.clone()))).await, Some(proxy));
    }

    #[test]
    fn default_path_embeds_uid() {
        assert_eq!(default_credential_path("1000"), PathBuf::from("/tmp/x509up_u1000"));
    }
}
