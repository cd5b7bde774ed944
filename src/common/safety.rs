use std::path::Path;

/// Directories that must NEVER be swept.
/// A retention sweep deletes every stale direct child, so pointing it at
/// one of these would wipe a system.
const PROTECTED_PATHS: &[&str] = &[
    "/",
    "/bin",
    "/boot",
    "/dev",
    "/etc",
    "/home",
    "/lib",
    "/lib64",
    "/opt",
    "/proc",
    "/root",
    "/sbin",
    "/srv",
    "/sys",
    "/usr",
    "/var",
    "/System",
    "/Applications",
    "/Users",
    "/Library",
    "/private",
    "/Volumes",
];

/// Directories under home that must never be swept
const PROTECTED_HOME_DIRS: &[&str] = &[
    "", // home dir itself
    "Desktop",
    "Documents",
    "Downloads",
    "Pictures",
    "Music",
    "Movies",
    "Library",
    ".config",
    ".ssh",
    ".gnupg",
];

/// Check if a directory is protected and must NEVER be swept
pub fn is_protected(path: &Path) -> bool {
    if PROTECTED_PATHS.iter().any(|p| path == Path::new(p)) {
        return true;
    }

    if let Some(home) = dirs::home_dir() {
        return PROTECTED_HOME_DIRS.iter().any(|dir| {
            let protected = if dir.is_empty() {
                home.clone()
            } else {
                home.join(dir)
            };
            path == protected
        });
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_protected() {
        assert!(is_protected(Path::new("/")));
    }

    #[test]
    fn test_system_dirs_protected() {
        assert!(is_protected(Path::new("/etc")));
        assert!(is_protected(Path::new("/usr")));
        assert!(is_protected(Path::new("/Users")));
        assert!(is_protected(Path::new("/Library")));
    }

    #[test]
    fn test_home_dir_protected() {
        if let Some(home) = dirs::home_dir() {
            assert!(is_protected(&home));
            assert!(is_protected(&home.join("Documents")));
            assert!(is_protected(&home.join(".ssh")));
        }
    }

    #[test]
    fn test_run_dirs_not_protected() {
        assert!(!is_protected(Path::new("/tmp/run")));
        assert!(!is_protected(Path::new("/var/tmp/scratch")));
        if let Some(home) = dirs::home_dir() {
            assert!(!is_protected(&home.join("sim/run")));
        }
    }
}
