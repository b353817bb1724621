//! Site key normalization.

/// Group key used for records that carry no site.
pub const UNKNOWN_SITE: &str = "_";

/// Normalize an optional site code into the key records are grouped under.
#[must_use]
pub fn site_key(site: Option<&str>) -> &str {
    site.unwrap_or(UNKNOWN_SITE)
}
