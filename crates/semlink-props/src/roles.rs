use regex::Regex;
use thiserror::Error;

/// `address:height-ROLE`, capturing everything after the height.
pub const ROLE_PATTERN: &str = r"^\S+:\d+-(\S+)$";
/// Leading role name (or `ARGM-` tag) of a role part; trailing qualifiers are dropped.
pub const CLEAN_ROLE_PATTERN: &str = r"^(ARGM-[a-zA-Z0-9]+|[a-zA-Z0-9]+)";

/// Mislabel found in SemLink 1.0/1.1 data for what should be `Topic`.
const LEGACY_TOPIC_LABEL: &str = "announcement";
const TOPIC_LABEL: &str = "Topic";
const ARGM_PREFIX: &str = "ARGM-";
const ARGM_LABEL_LEN: usize = 8;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("unexpected role format: {token}")]
    MalformedRole { token: String },
    #[error("unexpected ARGM-* role: {label}")]
    UnexpectedArgmModifier { label: String },
}

/// How far the `announcement` -> `Topic` correction reaches within a record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LegacyTopicScope {
    /// The corrected token ends cleaning: the rest of the tail is kept as-is,
    /// unchecked. Matches the historical behaviour of the SemLink tooling.
    #[default]
    WholeRecord,
    /// Only the offending token is corrected; cleaning carries on.
    SingleToken,
}

/// Compiled role patterns, built once and shared by cleaning and counting.
#[derive(Clone, Debug)]
pub struct RolePatterns {
    role: Regex,
    clean: Regex,
}

impl RolePatterns {
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            role: Regex::new(ROLE_PATTERN)?,
            clean: Regex::new(CLEAN_ROLE_PATTERN)?,
        })
    }

    /// The role part of a pointer token, or the token itself when it has no
    /// `address:height-` prefix.
    pub fn role_part<'a>(&self, token: &'a str) -> &'a str {
        self.role
            .captures(token)
            .and_then(|caps| caps.get(1))
            .map_or(token, |m| m.as_str())
    }
}

/// Result of cleaning one tail token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CleanedToken {
    /// Whitespace (or empty) separator, passed through untouched.
    Separator(String),
    Role(String),
    /// The legacy `announcement` label, rewritten to `Topic`.
    LegacyTopic(String),
}

impl CleanedToken {
    pub fn as_str(&self) -> &str {
        match self {
            CleanedToken::Separator(s) | CleanedToken::Role(s) | CleanedToken::LegacyTopic(s) => s,
        }
    }

    fn into_string(self) -> String {
        match self {
            CleanedToken::Separator(s) | CleanedToken::Role(s) | CleanedToken::LegacyTopic(s) => s,
        }
    }
}

/// Per-record cleaning decision.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecordRoles {
    Cleaned(Vec<String>),
    Rejected(RoleError),
}

/// Canonicalises role pointer tokens (`0:1-ARGM-TM*` -> `0:1-ARGM-TMP`).
#[derive(Clone, Debug)]
pub struct RoleCleaner {
    patterns: RolePatterns,
    legacy_topic: LegacyTopicScope,
}

impl RoleCleaner {
    pub fn new(patterns: RolePatterns, legacy_topic: LegacyTopicScope) -> Self {
        Self {
            patterns,
            legacy_topic,
        }
    }

    pub fn patterns(&self) -> &RolePatterns {
        &self.patterns
    }

    /// Clean a single token, keeping its address/height prefix intact.
    pub fn clean_token(&self, token: &str) -> Result<CleanedToken, RoleError> {
        if token.trim().is_empty() {
            return Ok(CleanedToken::Separator(token.to_string()));
        }
        let part = self
            .patterns
            .role
            .captures(token)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| RoleError::MalformedRole {
                token: token.to_string(),
            })?;

        let role_part = part.as_str();
        let mut cleaned = self
            .patterns
            .clean
            .captures(role_part)
            .and_then(|caps| caps.get(1))
            .map_or(role_part, |m| m.as_str())
            .to_string();

        if cleaned == LEGACY_TOPIC_LABEL {
            return Ok(CleanedToken::LegacyTopic(splice(
                token,
                part.range(),
                TOPIC_LABEL,
            )));
        }
        if cleaned.starts_with(ARGM_PREFIX) {
            if cleaned == "ARGM-TM" {
                cleaned = "ARGM-TMP".to_string();
            }
            if cleaned.len() != ARGM_LABEL_LEN {
                return Err(RoleError::UnexpectedArgmModifier { label: cleaned });
            }
        }
        Ok(CleanedToken::Role(splice(token, part.range(), &cleaned)))
    }

    /// Clean every tail token of a record; the first failure rejects the record.
    pub fn clean_tail<S: AsRef<str>>(&self, tail: &[S]) -> RecordRoles {
        let mut out = Vec::with_capacity(tail.len());
        let mut tokens = tail.iter().map(|t| t.as_ref());
        while let Some(token) = tokens.next() {
            match self.clean_token(token) {
                Ok(CleanedToken::LegacyTopic(fixed)) => {
                    out.push(fixed);
                    if self.legacy_topic == LegacyTopicScope::WholeRecord {
                        out.extend(tokens.by_ref().map(str::to_string));
                        break;
                    }
                }
                Ok(cleaned) => out.push(cleaned.into_string()),
                Err(err) => return RecordRoles::Rejected(err),
            }
        }
        RecordRoles::Cleaned(out)
    }
}

fn splice(token: &str, range: std::ops::Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(token.len() - range.len() + replacement.len());
    out.push_str(&token[..range.start]);
    out.push_str(replacement);
    out.push_str(&token[range.end..]);
    out
}
