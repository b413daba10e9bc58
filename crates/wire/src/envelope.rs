// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `{version, type, content}` envelope exchanged over the IPC channel.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Wire versions this codec understands. New versions are added here and
/// dispatched explicitly in [`Datagram::parse`]; there is no silent
/// fallback to an older marshaling discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireVersion {
    #[serde(rename = "1.0")]
    V1_0,
}

impl WireVersion {
    pub const CURRENT: WireVersion = WireVersion::V1_0;

    fn as_str(&self) -> &'static str {
        match self {
            WireVersion::V1_0 => "1.0",
        }
    }

    fn parse(raw: &str) -> Result<Self, ProtocolError> {
        match raw {
            "1.0" => Ok(WireVersion::V1_0),
            other => Err(ProtocolError::UnsupportedVersion(other.to_string())),
        }
    }
}

/// The datagram types exchanged between an Executer Backend and a Worker
/// Backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Pluginconfig,
    Reply,
    Complete,
    Cancel,
}

impl MessageKind {
    fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Pluginconfig => "pluginconfig",
            MessageKind::Reply => "reply",
            MessageKind::Complete => "complete",
            MessageKind::Cancel => "cancel",
        }
    }

    fn parse(raw: &str) -> Result<Self, ProtocolError> {
        match raw {
            "pluginconfig" => Ok(MessageKind::Pluginconfig),
            "reply" => Ok(MessageKind::Reply),
            "complete" => Ok(MessageKind::Complete),
            "cancel" => Ok(MessageKind::Cancel),
            other => Err(ProtocolError::UnsupportedType(other.to_string())),
        }
    }
}

/// A versioned envelope carrying one typed message. `content` is the
/// already-marshaled inner JSON payload, re-marshaled per [`WireVersion`]
/// rather than flattened into the envelope, so an unknown `content` shape
/// never breaks parsing the envelope itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datagram {
    version: String,
    #[serde(rename = "type")]
    kind: String,
    content: String,
}

impl Datagram {
    /// Marshal `obj` to JSON under the current wire version and wrap it in
    /// an envelope tagged with `kind`.
    pub fn create<T: Serialize>(kind: MessageKind, obj: &T) -> Result<Self, ProtocolError> {
        let content = serde_json::to_string(obj)?;
        Ok(Self {
            version: WireVersion::CURRENT.as_str().to_string(),
            kind: kind.as_str().to_string(),
            content,
        })
    }

    /// Serialize this envelope to the line of UTF-8 written to the IPC
    /// channel.
    pub fn to_wire(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a raw envelope off the wire, validating the version and kind,
    /// and returning the kind plus its still-opaque content string.
    pub fn parse(raw: &str) -> Result<(MessageKind, String), ProtocolError> {
        let datagram: Datagram = serde_json::from_str(raw)?;
        WireVersion::parse(&datagram.version)?;
        let kind = MessageKind::parse(&datagram.kind)?;
        Ok((kind, datagram.content))
    }

    /// Like [`Datagram::parse`], but keeps the envelope around so the caller
    /// can also pull the content out as a typed value via
    /// [`Datagram::content_as`].
    pub fn from_wire(raw: &str) -> Result<Self, ProtocolError> {
        let datagram: Datagram = serde_json::from_str(raw)?;
        WireVersion::parse(&datagram.version)?;
        MessageKind::parse(&datagram.kind)?;
        Ok(datagram)
    }

    /// Deserialize this envelope's content as `T`.
    pub fn content_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, ProtocolError> {
        Ok(serde_json::from_str(&self.content)?)
    }

    pub fn kind(&self) -> Result<MessageKind, ProtocolError> {
        MessageKind::parse(&self.kind)
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
