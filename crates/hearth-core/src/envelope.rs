//! Envelope model for the Hearth wire protocol
//!
//! An envelope is an ordered sequence of sections, one per record kind, each
//! holding an ordered list of `{status, value}` sub-records. The runtime keeps
//! one outbound envelope as a scratch object and clears it before every
//! encode, so the accessors here are built around in-place reuse.

use serde::{Deserialize, Serialize};

use crate::errors::CodecError;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Maximum size of a single sub-record value on the wire.
///
/// Violations are a hard encoding failure, never a truncation.
pub const MAX_FIELD_SIZE: usize = 11_056_943;

// ----------------------------------------------------------------------------
// Record Kinds and Status
// ----------------------------------------------------------------------------

/// Type tag identifying which sub-record list a section populates
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// Message originated by one side and consumed by a handler
    Message = 0x01,
    /// Reply to a synchronous message
    Reply = 0x02,
}

impl RecordKind {
    pub fn from_u8(value: u8) -> Result<Self, CodecError> {
        match value {
            0x01 => Ok(RecordKind::Message),
            0x02 => Ok(RecordKind::Reply),
            other => Err(CodecError::malformed(format!(
                "unknown record kind: 0x{other:02x}"
            ))),
        }
    }
}

/// Outcome carried by a sub-record
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Success = 0x00,
    Failure = 0x01,
}

impl Status {
    pub fn from_u8(value: u8) -> Result<Self, CodecError> {
        match value {
            0x00 => Ok(Status::Success),
            0x01 => Ok(Status::Failure),
            other => Err(CodecError::malformed(format!(
                "unknown status byte: 0x{other:02x}"
            ))),
        }
    }
}

// ----------------------------------------------------------------------------
// Sub-records and Sections
// ----------------------------------------------------------------------------

/// A single `{status, value}` record inside an envelope section.
///
/// The codec does not interpret `value`; callers layer their own structured
/// payload inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRecord {
    pub status: Status,
    pub value: Vec<u8>,
}

impl SubRecord {
    pub fn new(status: Status, value: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            value: value.into(),
        }
    }

    /// Convenience constructor for a successful record
    pub fn success(value: impl Into<Vec<u8>>) -> Self {
        Self::new(Status::Success, value)
    }
}

/// One populated record list, tagged by kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: RecordKind,
    pub records: Vec<SubRecord>,
}

// ----------------------------------------------------------------------------
// Envelope
// ----------------------------------------------------------------------------

/// Wire-level container for one or more typed sub-records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    sections: Vec<Section>,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a one-record envelope of the given kind
    pub fn single(kind: RecordKind, status: Status, value: impl Into<Vec<u8>>) -> Self {
        let mut envelope = Self::new();
        envelope.push(kind, SubRecord::new(status, value));
        envelope
    }

    /// Build a one-record `Message` envelope carrying `value`
    pub fn message(value: impl Into<Vec<u8>>) -> Self {
        Self::single(RecordKind::Message, Status::Success, value)
    }

    /// Build a one-record `Reply` envelope carrying `value`
    pub fn reply(value: impl Into<Vec<u8>>) -> Self {
        Self::single(RecordKind::Reply, Status::Success, value)
    }

    /// Drop all sections, keeping allocations for reuse
    pub fn clear(&mut self) {
        self.sections.clear();
    }

    /// Clear and repopulate with a single record, reusing the section
    /// allocation where possible
    pub fn compose(&mut self, kind: RecordKind, status: Status, value: &[u8]) {
        self.clear();
        self.push(kind, SubRecord::new(status, value.to_vec()));
    }

    /// Append a sub-record, extending the trailing section when the kind
    /// matches (sections stay in first-appearance order)
    pub fn push(&mut self, kind: RecordKind, record: SubRecord) {
        match self.sections.last_mut() {
            Some(section) if section.kind == kind => section.records.push(record),
            _ => self.sections.push(Section {
                kind,
                records: vec![record],
            }),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Value of the first sub-record of the first section, if any.
    ///
    /// This is the message body for every inbound frontend envelope.
    pub fn first_value(&self) -> Option<&[u8]> {
        self.sections
            .first()
            .and_then(|s| s.records.first())
            .map(|r| r.value.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_kind_conversion() {
        assert_eq!(RecordKind::from_u8(0x01).unwrap(), RecordKind::Message);
        assert_eq!(RecordKind::from_u8(0x02).unwrap(), RecordKind::Reply);
        assert!(RecordKind::from_u8(0xff).is_err());
    }

    #[test]
    fn status_conversion() {
        assert_eq!(Status::from_u8(0x00).unwrap(), Status::Success);
        assert_eq!(Status::from_u8(0x01).unwrap(), Status::Failure);
        assert!(Status::from_u8(0x02).is_err());
    }

    #[test]
    fn push_groups_consecutive_records_by_kind() {
        let mut envelope = Envelope::new();
        envelope.push(RecordKind::Message, SubRecord::success(b"a".to_vec()));
        envelope.push(RecordKind::Message, SubRecord::success(b"b".to_vec()));
        envelope.push(RecordKind::Reply, SubRecord::success(b"c".to_vec()));

        assert_eq!(envelope.sections().len(), 2);
        assert_eq!(envelope.sections()[0].records.len(), 2);
        assert_eq!(envelope.sections()[1].records.len(), 1);
    }

    #[test]
    fn compose_resets_previous_contents() {
        let mut envelope = Envelope::message(b"old".to_vec());
        envelope.compose(RecordKind::Reply, Status::Success, b"new");

        assert_eq!(envelope.sections().len(), 1);
        assert_eq!(envelope.sections()[0].kind, RecordKind::Reply);
        assert_eq!(envelope.first_value(), Some(&b"new"[..]));
    }

    #[test]
    fn first_value_on_empty_envelope_is_none() {
        assert_eq!(Envelope::new().first_value(), None);
    }
}
