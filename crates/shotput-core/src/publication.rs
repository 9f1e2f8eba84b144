//! CDN address resolution

use crate::config::RepositoryConfig;
use crate::models::{ArtifactIdentity, PublicationStatus, PublishedArtifact};

/// Derive the public address of an artifact.
///
/// Pure string composition: `https://<host>/gh/<user>/<repo>/<branch>/<sub_dir>/<name>`.
/// The result starts out [`PublicationStatus::Pending`]; use
/// [`PublishedArtifact::published_by`] once the commit outcome is known.
pub fn resolve_url(config: &RepositoryConfig, identity: &ArtifactIdentity) -> PublishedArtifact {
    let cdn = &config.cdn;
    let name = identity.file_name();
    let cdn_url = format!(
        "https://{}/gh/{}/{}/{}/{}/{}",
        cdn.host.trim_end_matches('/'),
        cdn.user,
        cdn.repo,
        cdn.branch,
        config.image_sub_dir,
        name
    );
    let markdown = format!("![{}]({})", name, cdn_url);

    PublishedArtifact {
        identity: identity.clone(),
        cdn_url,
        markdown,
        status: PublicationStatus::Pending,
    }
}
