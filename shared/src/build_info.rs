use serde::Serialize;

/// Version details baked in by `build.rs`.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_branch: &'static str,
    pub build_time: &'static str,
    pub target_os: &'static str,
    pub profile: &'static str,
}

impl BuildInfo {
    /// `name` is the binary reporting the info; the rest comes from this crate's build.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            version: env!("CARGO_PKG_VERSION"),
            git_hash: env!("GIT_HASH"),
            git_branch: env!("GIT_BRANCH"),
            build_time: env!("BUILD_TIME"),
            target_os: env!("CARGO_CFG_TARGET_OS"),
            profile: env!("PROFILE"),
        }
    }
}
