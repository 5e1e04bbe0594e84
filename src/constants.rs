//! Common constants used throughout nextkit.

/// Manifest file name at the root of every template
pub const MANIFEST_FILE: &str = "manifest.yml";

/// Suffix marking a source file as a substitution template
pub const TEMPLATE_SUFFIX: &str = ".j2";

/// Bundled template used when `--template` is not given
pub const DEFAULT_TEMPLATE: &str = "nextjs";

/// Environment variable forcing a template directory on disk
pub const TEMPLATE_DIR_ENV: &str = "NEXTKIT_TEMPLATE_DIR";

/// Manifest group left out by `--skip-tests`
pub const TESTS_GROUP: &str = "tests";

/// Prefix of the staging and backup directories created next to the target
pub const STAGING_PREFIX: &str = ".nextkit-";
