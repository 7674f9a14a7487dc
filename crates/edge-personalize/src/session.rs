//! Per-request personalization session.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use edge_core::ResponseContext;
use http::header::{HeaderValue, SET_COOKIE};

use crate::manifest::Manifest;

/// Cookie holding the visitor's user uid.
pub const USER_UID_COOKIE: &str = "cs-personalize-user-uid";

/// Cookie holding the encoded manifest for client-side reuse.
pub const MANIFEST_COOKIE: &str = "cs-personalize-manifest";

/// One year, in seconds.
const USER_UID_MAX_AGE: u64 = 31_536_000;

/// Visitor identifier shared with the decision service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserUid(String);

impl UserUid {
    /// Generate a new random user uid.
    pub fn generate() -> Self {
        use rand::Rng;

        let bytes: [u8; 16] = rand::thread_rng().gen();
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Accept a uid from a cookie. Values that could not have been issued
    /// by this site are rejected.
    pub fn parse(value: &str) -> Option<Self> {
        let valid = !value.is_empty()
            && value.len() <= 64
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session bound to one decision for one request.
///
/// Its only effect on the outside world is [`PersonalizeSession::serialize_onto`].
#[derive(Debug, Clone)]
pub struct PersonalizeSession {
    user_uid: UserUid,
    manifest: Manifest,
    new_visitor: bool,
}

impl PersonalizeSession {
    pub fn new(user_uid: UserUid, manifest: Manifest, new_visitor: bool) -> Self {
        Self {
            user_uid,
            manifest,
            new_visitor,
        }
    }

    pub fn user_uid(&self) -> &UserUid {
        &self.user_uid
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Whether the user uid was created for this request.
    pub fn is_new_visitor(&self) -> bool {
        self.new_visitor
    }

    /// Wire-format variant parameter for this decision.
    pub fn variant_param(&self) -> String {
        self.manifest.assignment().to_wire()
    }

    /// `Set-Cookie` values carrying this session's state.
    pub fn cookies(&self) -> Vec<String> {
        let manifest = serde_json::to_vec(&self.manifest).unwrap_or_default();
        vec![
            format!(
                "{}={}; Path=/; Max-Age={}; SameSite=Lax",
                USER_UID_COOKIE, self.user_uid, USER_UID_MAX_AGE
            ),
            format!(
                "{}={}; Path=/; SameSite=Lax",
                MANIFEST_COOKIE,
                URL_SAFE_NO_PAD.encode(manifest)
            ),
        ]
    }

    /// Write the session cookies onto a response.
    ///
    /// Idempotent: cookies previously written by a session are replaced,
    /// other `Set-Cookie` values are kept in order.
    pub fn serialize_onto(&self, response: &mut ResponseContext) {
        let kept: Vec<HeaderValue> = response
            .headers
            .get_all(SET_COOKIE)
            .iter()
            .filter(|value| !is_session_cookie(value))
            .cloned()
            .collect();

        response.headers.remove(SET_COOKIE);
        for value in kept {
            response.headers.append(SET_COOKIE, value);
        }
        for cookie in self.cookies() {
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers.append(SET_COOKIE, value);
            }
        }
    }
}

fn is_session_cookie(value: &HeaderValue) -> bool {
    let Ok(value) = value.to_str() else {
        return false;
    };
    let name = value.split('=').next().unwrap_or_default().trim();
    name == USER_UID_COOKIE || name == MANIFEST_COOKIE
}

/// Decode a manifest cookie value.
pub fn decode_manifest_cookie(value: &str) -> Option<Manifest> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&bytes).ok()
}
