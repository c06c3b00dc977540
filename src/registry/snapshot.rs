use crate::api::{CallId, CallRecording, CallStatus};
use std::collections::HashSet;
use tracing::warn;

/// Ordered list of call recordings as last seen from the server
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallSnapshot {
    calls: Vec<CallRecording>,
}

impl CallSnapshot {
    /// Build a snapshot from a list response, keeping server order.
    ///
    /// A repeated id keeps its first occurrence.
    pub fn from_server(calls: Vec<CallRecording>) -> Self {
        let mut seen = HashSet::with_capacity(calls.len());
        let calls = calls
            .into_iter()
            .filter(|call| {
                let fresh = seen.insert(call.id.clone());
                if !fresh {
                    warn!("Dropping duplicate call {} from list response", call.id);
                }
                fresh
            })
            .collect();

        Self { calls }
    }

    pub fn calls(&self) -> &[CallRecording] {
        &self.calls
    }

    pub fn get(&self, id: &CallId) -> Option<&CallRecording> {
        self.calls.iter().find(|call| &call.id == id)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Fields of a cached entry to overwrite locally
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallPatch {
    pub status: Option<CallStatus>,
    pub transcript_text: Option<String>,
}

impl CallPatch {
    pub fn status(status: CallStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Overwrite fields of the entry with `id`, last write wins.
///
/// A terminal status is never replaced by a different one. Returns whether the
/// entry changed.
pub fn patch(snapshot: &mut CallSnapshot, id: &CallId, fields: CallPatch) -> bool {
    let Some(call) = snapshot.calls.iter_mut().find(|call| &call.id == id) else {
        return false;
    };

    let mut changed = false;

    if let Some(status) = fields.status {
        if call.status.is_terminal() && call.status != status {
            warn!(
                "Refusing to move call {} from {} to {}",
                call.id, call.status, status
            );
        } else if call.status != status {
            call.status = status;
            changed = true;
        }
    }

    if let Some(text) = fields.transcript_text {
        if call.transcript_text.as_deref() != Some(text.as_str()) {
            call.transcript_text = Some(text);
            changed = true;
        }
    }

    changed
}
