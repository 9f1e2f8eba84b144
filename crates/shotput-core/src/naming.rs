//! Artifact naming
//!
//! Names are `<%Y%m%d%H%M%S local time>_<8 hex chars>.<extension>`. No state is kept and
//! collisions are not deduplicated; the store refuses to overwrite instead.

use chrono::{DateTime, Local, TimeZone};
use uuid::Uuid;

use crate::models::ArtifactIdentity;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const DISAMBIGUATOR_LEN: usize = 8;

/// Generate a fresh identity for an artifact with the given extension.
pub fn generate_name(extension: &str) -> ArtifactIdentity {
    generate_name_at(&Local::now(), extension)
}

/// Generate an identity using `now` as the time-ordered component.
pub fn generate_name_at<Tz>(now: &DateTime<Tz>, extension: &str) -> ArtifactIdentity
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let random = Uuid::new_v4().simple().to_string();
    ArtifactIdentity::new(
        now.format(TIMESTAMP_FORMAT).to_string(),
        &random[..DISAMBIGUATOR_LEN],
        extension.trim_start_matches('.'),
    )
}
