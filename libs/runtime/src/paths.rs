use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Resolve the application home directory to an absolute path.
///
/// `None` (or a blank value) selects `<user home>/<default_subdir>`. A leading
/// `~` is expanded to the user home; other relative paths are taken against
/// the current working directory. With `create`, the directory is created.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let raw = configured
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let resolved = match raw {
        None => user_home()?.join(default_subdir),
        Some(p) => expand(&p)?,
    };

    if create {
        std::fs::create_dir_all(&resolved)
            .with_context(|| format!("cannot create home_dir '{}'", resolved.display()))?;
    }
    Ok(resolved)
}

fn user_home() -> Result<PathBuf> {
    match dirs::home_dir() {
        Some(h) => Ok(h),
        None => bail!("user home directory is not known on this platform"),
    }
}

fn expand(p: &str) -> Result<PathBuf> {
    if p == "~" {
        return user_home();
    }
    if let Some(rest) = p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        return Ok(user_home()?.join(rest));
    }
    let path = Path::new(p);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("current directory is not accessible")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("nested/home");

        let got = resolve_home_dir(Some(target.to_string_lossy().into()), ".x", true).unwrap();

        assert_eq!(got, target);
        assert!(target.is_dir());
    }

    #[test]
    fn tilde_expands_to_user_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let got = resolve_home_dir(Some("~/.users-api-test".into()), ".x", false).unwrap();
        assert_eq!(got, home.join(".users-api-test"));
    }

    #[test]
    fn blank_selects_default_subdir() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let got = resolve_home_dir(Some("   ".into()), ".users-api", false).unwrap();
        assert_eq!(got, home.join(".users-api"));
        assert!(got.is_absolute());
    }

    #[test]
    fn relative_path_is_made_absolute() {
        let got = resolve_home_dir(Some("data/home".into()), ".x", false).unwrap();
        assert!(got.is_absolute());
        assert!(got.ends_with("data/home"));
    }
}
