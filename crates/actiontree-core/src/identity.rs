use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^/@]+)/([^/@]+)(?:/([^@]+))?@(.+)$").expect("reference pattern is valid")
});

const GITHUB_URL: &str = "https://github.com";

/// A single action reference: `owner/repo[/sub_path]@revision`.
///
/// Two references are the same action only when all four fields match,
/// so `org/repo@v1` and `org/repo/sub@v1` are distinct nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionRef {
    owner: String,
    repo: String,
    sub_path: String,
    revision: String,
}

impl ActionRef {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        sub_path: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            sub_path: sub_path.into(),
            revision: revision.into(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let captures = REFERENCE_PATTERN
            .captures(trimmed)
            .ok_or_else(|| Error::MalformedReference(raw.to_string()))?;

        Ok(Self::new(
            &captures[1],
            &captures[2],
            captures.get(3).map_or("", |m| m.as_str()),
            &captures[4],
        ))
    }

    /// `uses` values that name a local path or a container image rather than a repository.
    pub fn is_local_or_docker(uses: &str) -> bool {
        let uses = uses.trim();
        uses.starts_with("./") || uses.starts_with("../") || uses.starts_with("docker://")
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Directory inside the repository holding the manifest; empty for the repo root.
    pub fn sub_path(&self) -> &str {
        &self.sub_path
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn has_sub_path(&self) -> bool {
        !self.sub_path.is_empty()
    }

    /// True when the revision is a full 40-character commit SHA.
    pub fn is_commit_pinned(&self) -> bool {
        self.revision.len() == 40 && self.revision.chars().all(|c| c.is_ascii_hexdigit())
    }

    pub fn url(&self) -> String {
        let mut url = format!(
            "{GITHUB_URL}/{}/{}/tree/{}",
            self.owner, self.repo, self.revision
        );
        if self.has_sub_path() {
            url.push('/');
            url.push_str(&self.sub_path);
        }
        url
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)?;
        if self.has_sub_path() {
            write!(f, "/{}", self.sub_path)?;
        }
        write!(f, "@{}", self.revision)
    }
}

impl FromStr for ActionRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ActionRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ActionRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
