/// Build-time git commit SHA stamped by build.rs when available.
pub fn git_sha() -> Option<&'static str> {
    option_env!("BLOGIMPORT_BUILD_GIT_SHA")
}

/// Abbreviated SHA for human-facing output.
pub fn short_git_sha() -> Option<&'static str> {
    git_sha().map(|sha| &sha[..sha.len().min(12)])
}
