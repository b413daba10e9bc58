// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes used throughout the document model.
//!
//! Each is a type-prefixed [`crate::id::IdBuf`] generated by [`crate::define_id`],
//! so a `DocumentId` can never be accidentally passed where a `CommandId` is
//! expected.

crate::define_id! {
    /// Identifies one document run. Globally unique and stable across
    /// master restarts; the rendezvous identity for the IPC channel handle
    /// and the worker process.
    pub struct DocumentId("doc-");
}

crate::define_id! {
    /// Identifies the cloud-side command that produced this document.
    pub struct CommandId("cmd-");
}

crate::define_id! {
    /// Identifies the association (for Association-type documents).
    pub struct AssociationId("asc-");
}

crate::define_id! {
    /// Identifies the managed instance executing the document.
    pub struct InstanceId("mi--");
}

crate::define_id! {
    /// Identifies the originating cloud message.
    pub struct MessageId("msg-");
}

crate::define_id! {
    /// Identifies one (re)attempt of a document; incremented with `RunCount`.
    pub struct RunId("run-");
}

crate::define_id! {
    /// Identifies one plugin step within a document. For schema v2+ this is
    /// the step name; for v1.x it is the plugin name (see the Open Question
    /// in the design notes about keying plugin results by id vs. name).
    pub struct PluginId("plg-");
}
