//! License-terms handshake helpers.
//!
//! Movebank answers the first request for licensed data with the license text
//! instead of CSV. Data is released once the request is repeated with the MD5 of
//! that exact text. The notice is recognised by a marker substring; a data value
//! containing the marker would be misread, so this is a heuristic until the
//! upstream exposes an explicit response type.

use crate::common::constants::LICENSE_MARKER;
use md5::{Digest, Md5};

/// A response body, classified by the license marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResponse {
    /// Tabular CSV payload.
    Data(String),
    /// License-terms notice. Returned to callers only when the acknowledgement
    /// request still produced a notice.
    LicenseNotice(String),
}

impl RawResponse {
    pub fn classify(body: String) -> Self {
        if is_license_notice(&body) {
            RawResponse::LicenseNotice(body)
        } else {
            RawResponse::Data(body)
        }
    }

    pub fn text(&self) -> &str {
        match self {
            RawResponse::Data(s) | RawResponse::LicenseNotice(s) => s,
        }
    }

    pub fn is_license_notice(&self) -> bool {
        matches!(self, RawResponse::LicenseNotice(_))
    }
}

pub fn is_license_notice(body: &str) -> bool {
    body.contains(LICENSE_MARKER)
}

/// Lowercase hex MD5 of the complete license text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseAcknowledgement(String);

impl LicenseAcknowledgement {
    /// The whole body is the terms text; no sub-range is extracted.
    pub fn from_terms(terms: &str) -> Self {
        let mut hasher = Md5::new();
        hasher.update(terms.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
