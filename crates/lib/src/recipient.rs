//! Recipient resolution: a request's `umo` or the configured default.
//!
//! A umo ("unified message origin") names a chat on the host, usually
//! `platform:message_type:session_id` (e.g. `telegram:FriendMessage:12345`).

/// A resolved recipient identifier, never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient(String);

impl Recipient {
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Outcome of resolving a recipient for one push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Recipient),
    /// Neither the request nor the config named a recipient.
    Unresolved,
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Pick the request's umo when present, else the configured default.
pub fn resolve_recipient(requested: Option<&str>, default: Option<&str>) -> Resolution {
    match non_blank(requested).or_else(|| non_blank(default)) {
        Some(umo) => Resolution::Resolved(Recipient(umo.to_string())),
        None => Resolution::Unresolved,
    }
}

/// Structured view of a `platform:message_type:session_id` umo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Umo<'a> {
    pub platform: &'a str,
    pub message_type: &'a str,
    /// Chat id on the platform; may itself contain ':'.
    pub session_id: &'a str,
}

impl<'a> Umo<'a> {
    /// Split a umo into its parts. None when it is not in the three-part form.
    pub fn parse(umo: &'a str) -> Option<Self> {
        let mut parts = umo.splitn(3, ':');
        let platform = parts.next()?.trim();
        let message_type = parts.next()?.trim();
        let session_id = parts.next()?.trim();
        if platform.is_empty() || session_id.is_empty() {
            return None;
        }
        Some(Self {
            platform,
            message_type,
            session_id,
        })
    }
}
