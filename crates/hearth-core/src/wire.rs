//! Binary wire format for envelopes
//!
//! Layout, all integers big-endian:
//!
//! ```text
//! u8  section count
//! per section:
//!     u8  record kind
//!     u16 record count
//!     per record:
//!         u8  status
//!         u32 value length
//!         ... value bytes
//! ```
//!
//! Encoding is deterministic: the same logical envelope always serializes to
//! the same bytes. Oversize values are rejected outright on both paths.

use core::convert::TryInto;

use crate::envelope::{Envelope, RecordKind, Status, SubRecord, MAX_FIELD_SIZE};
use crate::errors::CodecError;

// ----------------------------------------------------------------------------
// Wire Format Codec
// ----------------------------------------------------------------------------

/// Binary encoder/decoder for [`Envelope`]
pub struct WireFormat;

impl WireFormat {
    /// Encode an envelope to binary wire format
    pub fn encode(envelope: &Envelope) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::new();
        Self::encode_into(envelope, &mut bytes)?;
        Ok(bytes)
    }

    /// Encode an envelope into a caller-owned buffer.
    ///
    /// The buffer is cleared first; the runtime reuses one buffer across
    /// sends to avoid per-message allocation.
    pub fn encode_into(envelope: &Envelope, bytes: &mut Vec<u8>) -> Result<(), CodecError> {
        bytes.clear();

        let sections = envelope.sections();
        if sections.len() > u8::MAX as usize {
            return Err(CodecError::malformed(format!(
                "too many sections: {}",
                sections.len()
            )));
        }
        bytes.push(sections.len() as u8);

        for section in sections {
            if section.records.len() > u16::MAX as usize {
                return Err(CodecError::malformed(format!(
                    "too many records in section: {}",
                    section.records.len()
                )));
            }
            bytes.push(section.kind as u8);
            bytes.extend_from_slice(&(section.records.len() as u16).to_be_bytes());

            for record in &section.records {
                if record.value.len() > MAX_FIELD_SIZE {
                    return Err(CodecError::OversizeField {
                        size: record.value.len(),
                        max: MAX_FIELD_SIZE,
                    });
                }
                bytes.push(record.status as u8);
                bytes.extend_from_slice(&(record.value.len() as u32).to_be_bytes());
                bytes.extend_from_slice(&record.value);
            }
        }

        Ok(())
    }

    /// Decode an envelope from binary wire format
    pub fn decode(bytes: &[u8]) -> Result<Envelope, CodecError> {
        let mut offset = 0;

        let section_count = Self::take_u8(bytes, &mut offset, "section count")?;
        let mut envelope = Envelope::new();

        for _ in 0..section_count {
            let kind = RecordKind::from_u8(Self::take_u8(bytes, &mut offset, "record kind")?)?;
            let record_count = Self::take_u16(bytes, &mut offset, "record count")?;

            if record_count == 0 {
                return Err(CodecError::malformed("empty section"));
            }

            for _ in 0..record_count {
                let status = Status::from_u8(Self::take_u8(bytes, &mut offset, "status")?)?;
                let len = Self::take_u32(bytes, &mut offset, "value length")? as usize;

                if len > MAX_FIELD_SIZE {
                    return Err(CodecError::OversizeField {
                        size: len,
                        max: MAX_FIELD_SIZE,
                    });
                }
                if bytes.len() < offset + len {
                    return Err(CodecError::malformed("truncated value"));
                }

                let value = bytes[offset..offset + len].to_vec();
                offset += len;
                envelope.push(kind, SubRecord::new(status, value));
            }
        }

        if offset != bytes.len() {
            return Err(CodecError::malformed(format!(
                "trailing bytes after envelope: {}",
                bytes.len() - offset
            )));
        }

        Ok(envelope)
    }

    fn take_u8(bytes: &[u8], offset: &mut usize, what: &str) -> Result<u8, CodecError> {
        let value = *bytes
            .get(*offset)
            .ok_or_else(|| CodecError::malformed(format!("truncated {what}")))?;
        *offset += 1;
        Ok(value)
    }

    fn take_u16(bytes: &[u8], offset: &mut usize, what: &str) -> Result<u16, CodecError> {
        let end = *offset + 2;
        let slice = bytes
            .get(*offset..end)
            .ok_or_else(|| CodecError::malformed(format!("truncated {what}")))?;
        *offset = end;
        Ok(u16::from_be_bytes(slice.try_into().unwrap()))
    }

    fn take_u32(bytes: &[u8], offset: &mut usize, what: &str) -> Result<u32, CodecError> {
        let end = *offset + 4;
        let slice = bytes
            .get(*offset..end)
            .ok_or_else(|| CodecError::malformed(format!("truncated {what}")))?;
        *offset = end;
        Ok(u32::from_be_bytes(slice.try_into().unwrap()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_single_record() {
        let envelope = Envelope::message(b"ping".to_vec());
        let bytes = WireFormat::encode(&envelope).unwrap();
        let decoded = WireFormat::decode(&bytes).unwrap();
        assert_eq!(decoded, envelope);
        assert_eq!(decoded.first_value(), Some(&b"ping"[..]));
    }

    #[test]
    fn round_trip_multiple_sections_and_statuses() {
        let mut envelope = Envelope::new();
        envelope.push(RecordKind::Message, SubRecord::success(b"one".to_vec()));
        envelope.push(
            RecordKind::Message,
            SubRecord::new(Status::Failure, b"two".to_vec()),
        );
        envelope.push(RecordKind::Reply, SubRecord::success(b"".to_vec()));

        let bytes = WireFormat::encode(&envelope).unwrap();
        assert_eq!(WireFormat::decode(&bytes).unwrap(), envelope);
    }

    #[test]
    fn round_trip_empty_envelope() {
        let envelope = Envelope::new();
        let bytes = WireFormat::encode(&envelope).unwrap();
        assert_eq!(bytes, vec![0]);
        assert_eq!(WireFormat::decode(&bytes).unwrap(), envelope);
    }

    #[test]
    fn encoding_is_deterministic() {
        let envelope = Envelope::reply(b"stable".to_vec());
        let first = WireFormat::encode(&envelope).unwrap();
        let second = WireFormat::encode(&envelope).unwrap();
        assert_eq!(first, second);

        // Known byte layout: 1 section, Reply kind, 1 record, Success, len 6
        let expected = [
            &[0x01, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x06][..],
            b"stable",
        ]
        .concat();
        assert_eq!(first, expected);
    }

    #[test]
    fn oversize_value_is_a_hard_encode_failure() {
        let envelope = Envelope::message(vec![0u8; MAX_FIELD_SIZE + 1]);
        let err = WireFormat::encode(&envelope).unwrap_err();
        assert!(matches!(
            err,
            CodecError::OversizeField {
                size,
                max: MAX_FIELD_SIZE,
            } if size == MAX_FIELD_SIZE + 1
        ));
    }

    #[test]
    fn oversize_length_is_rejected_on_decode() {
        // 1 section, Message kind, 1 record, Success, then an absurd length
        let mut bytes = vec![0x01, 0x01, 0x00, 0x01, 0x00];
        bytes.extend_from_slice(&(u32::MAX).to_be_bytes());
        let err = WireFormat::decode(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::OversizeField { .. }));
    }

    #[test]
    fn truncated_input_is_malformed() {
        let envelope = Envelope::message(b"payload".to_vec());
        let bytes = WireFormat::encode(&envelope).unwrap();
        for cut in 1..bytes.len() {
            assert!(WireFormat::decode(&bytes[..cut]).is_err());
        }
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let envelope = Envelope::message(b"x".to_vec());
        let mut bytes = WireFormat::encode(&envelope).unwrap();
        bytes.push(0x00);
        let err = WireFormat::decode(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::MalformedEnvelope(_)));
    }

    #[test]
    fn unknown_kind_is_malformed() {
        let bytes = vec![0x01, 0x7f, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert!(WireFormat::decode(&bytes).is_err());
    }

    #[test]
    fn encode_into_reuses_the_buffer() {
        let mut buf = b"stale contents".to_vec();
        let envelope = Envelope::message(b"fresh".to_vec());
        WireFormat::encode_into(&envelope, &mut buf).unwrap();
        assert_eq!(buf, WireFormat::encode(&envelope).unwrap());
    }
}
