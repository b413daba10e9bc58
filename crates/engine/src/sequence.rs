// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The IPC channel's sequence-name grammar: `<role>-<YYYYMMDDhhmmss>-<NNN>`.

use chrono::{DateTime, Utc};

/// Endpoint role encoded in a sequence name; also used for self-filtering
/// during drain (a receiver skips files carrying its own role tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Master,
    Worker,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Worker => "worker",
        }
    }

    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "master" => Some(Role::Master),
            "worker" => Some(Role::Worker),
            _ => None,
        }
    }
}

/// A parsed sequence name: `role`, the UTC timestamp it was minted at, and
/// the sender-local monotonic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SequenceId {
    pub role_tag: &'static str,
    pub timestamp: u64,
    pub counter: u64,
}

/// Formats a sequence name for `role`'s `counter`-th send at `now`.
pub fn format_name(role: Role, now: DateTime<Utc>, counter: u64) -> String {
    format!("{}-{}-{:03}", role.as_str(), now.format("%Y%m%d%H%M%S"), counter)
}

/// Parses a sequence name back into its role tag, timestamp, and counter.
/// Returns `None` for names that do not match the grammar (e.g. `tmp`).
pub fn parse_name(name: &str) -> Option<(Role, SequenceId)> {
    let mut parts = name.splitn(3, '-');
    let role_str = parts.next()?;
    let timestamp_str = parts.next()?;
    let counter_str = parts.next()?;

    let role = Role::parse(role_str)?;
    let parsed = chrono::NaiveDateTime::parse_from_str(timestamp_str, "%Y%m%d%H%M%S").ok()?;
    let timestamp = parsed.and_utc().timestamp() as u64;
    let counter: u64 = counter_str.parse().ok()?;

    Some((role, SequenceId { role_tag: role.as_str(), timestamp, counter }))
}

/// Whether `name` belongs to `role` — used to self-filter during drain.
pub fn is_own_role(name: &str, role: Role) -> bool {
    name.starts_with(role.as_str())
        && name.as_bytes().get(role.as_str().len()) == Some(&b'-')
}

#[cfg(test)]
#[path = "sequence_tests.rs"]
mod tests;
