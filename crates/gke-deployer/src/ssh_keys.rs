use std::ffi::OsString;
use std::path::{Path, PathBuf};

use system_utils::path::home_join;

use crate::error::DeployerError;

pub const SSH_KEY_NAME: &str = "google_compute_engine";

/// Private and public key paths under `home/.ssh`.
pub fn key_paths(home: &Path) -> (PathBuf, PathBuf) {
    let private = home_join(home, &[".ssh", SSH_KEY_NAME]);
    let mut public = OsString::from(private.as_os_str());
    public.push(".pub");
    (private, PathBuf::from(public))
}

/// Checks existence only; key contents are never read.
pub async fn verify_ssh_keys(home: &Path) -> Result<(), DeployerError> {
    let (private, public) = key_paths(home);
    ensure_exists(private).await?;
    ensure_exists(public).await
}

async fn ensure_exists(path: PathBuf) -> Result<(), DeployerError> {
    match tokio::fs::metadata(&path).await {
        Ok(_) => Ok(()),
        Err(source) => Err(DeployerError::SshKeyMissing { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::home_with_keys;

    #[test]
    fn public_key_is_private_plus_pub() {
        let (private, public) = key_paths(Path::new("/home/ci"));
        assert_eq!(private, PathBuf::from("/home/ci/.ssh/google_compute_engine"));
        assert_eq!(public, PathBuf::from("/home/ci/.ssh/google_compute_engine.pub"));
    }

    #[tokio::test]
    async fn accepts_existing_pair() {
        let home = home_with_keys(true, true);
        verify_ssh_keys(home.path()).await.expect("keys present");
    }

    #[tokio::test]
    async fn names_missing_private_key_first() {
        let home = home_with_keys(false, false);
        let err = verify_ssh_keys(home.path()).await.unwrap_err();
        match err {
            DeployerError::SshKeyMissing { path, .. } => {
                assert_eq!(path, home.path().join(".ssh").join(SSH_KEY_NAME))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn names_missing_public_key() {
        let home = home_with_keys(true, false);
        let err = verify_ssh_keys(home.path()).await.unwrap_err();
        match err {
            DeployerError::SshKeyMissing { path, .. } => {
                assert!(path.to_string_lossy().ends_with("google_compute_engine.pub"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
