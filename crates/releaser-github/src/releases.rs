//! Wire types for the GitHub releases endpoints.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/repos/{owner}/{repo}/releases?per_page=&page=` | List releases, newest first |
//! | GET | `/repos/{owner}/{repo}/releases/assets/{asset_id}` | Download asset (`Accept: application/octet-stream`) |
//!
//! Only the fields the mirror needs are modeled; unknown fields are ignored.
//! Drafts are only visible to authenticated callers and are never mirrored.

use releaser_core::{Asset, AssetId, Release};
use serde::Deserialize;

/// A release as returned by `GET /repos/{owner}/{repo}/releases`.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_commitish: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub assets: Vec<GithubAsset>,
}

/// An asset attached to a [`GithubRelease`].
#[derive(Debug, Clone, Deserialize)]
pub struct GithubAsset {
    pub id: u64,
    pub name: String,
}

impl From<GithubRelease> for Release {
    /// Untitled releases fall back to their tag as the display name.
    fn from(release: GithubRelease) -> Self {
        let name = release
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| release.tag_name.clone());
        Release {
            name,
            tag: release.tag_name,
            commit: release.target_commitish,
            assets: release
                .assets
                .into_iter()
                .map(|a| Asset {
                    id: AssetId(a.id),
                    name: a.name,
                })
                .collect(),
        }
    }
}
