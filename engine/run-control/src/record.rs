//! Inbound record model
//!
//! The front end tags each delivery with a numeric event id. Those ids map
//! onto a closed tagged variant here, so dispatch is an exhaustive `match`
//! checked at compile time rather than an open id-keyed table.

use crate::error::RunControlError;
use tstamp::{Payload, RawClock, Serial, Source};

/// Head (gamma) trigger event id
pub const EVID_HEAD: u16 = 1;
/// Tail (heavy-ion) trigger event id
pub const EVID_TAIL: u16 = 2;
/// Head scaler block event id
pub const EVID_HEAD_SCALER: u16 = 3;
/// Tail scaler block event id
pub const EVID_TAIL_SCALER: u16 = 4;
/// Run parameter record event id
pub const EVID_RUN_PARAMETER: u16 = 5;

/// A trigger event as delivered by the front end, before timestamping.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub serial: Serial,
    pub raw_clock: RawClock,
    pub payload: Payload,
}

/// Periodic scaler readout. The payload stays opaque; unpacking belongs to
/// the hardware layer.
#[derive(Debug, Clone)]
pub struct ScalerBlock {
    pub source: Source,
    pub serial: Serial,
    pub payload: Payload,
}

/// Run metadata delivered at transitions.
#[derive(Debug, Clone, Copy)]
pub struct RunParam {
    pub run_number: u32,
}

/// Everything the front end can deliver.
#[derive(Debug, Clone)]
pub enum Record {
    Head(RawEvent),
    Tail(RawEvent),
    HeadScaler(ScalerBlock),
    TailScaler(ScalerBlock),
    RunParameter(RunParam),
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RecordKind {
    Head = 0,
    Tail = 1,
    HeadScaler = 2,
    TailScaler = 3,
    RunParameter = 4,
}

impl Record {
    #[inline]
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Head(_) => RecordKind::Head,
            Record::Tail(_) => RecordKind::Tail,
            Record::HeadScaler(_) => RecordKind::HeadScaler,
            Record::TailScaler(_) => RecordKind::TailScaler,
            Record::RunParameter(_) => RecordKind::RunParameter,
        }
    }

    /// Build a record from a raw front-end tuple.
    ///
    /// An unknown event id is a hard per-event error: the caller decides
    /// whether to skip the record or abort its stream. Run-parameter
    /// records carry the run number in the serial field.
    pub fn from_parts(
        event_id: u16,
        serial: Serial,
        raw_clock: RawClock,
        payload: Payload,
    ) -> Result<Record, RunControlError> {
        match event_id {
            EVID_HEAD => Ok(Record::Head(RawEvent { serial, raw_clock, payload })),
            EVID_TAIL => Ok(Record::Tail(RawEvent { serial, raw_clock, payload })),
            EVID_HEAD_SCALER => {
                Ok(Record::HeadScaler(ScalerBlock { source: Source::Head, serial, payload }))
            }
            EVID_TAIL_SCALER => {
                Ok(Record::TailScaler(ScalerBlock { source: Source::Tail, serial, payload }))
            }
            EVID_RUN_PARAMETER => Ok(Record::RunParameter(RunParam { run_number: serial })),
            _ => Err(RunControlError::UnknownEventId { event_id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn payload() -> Payload {
        Arc::from(&[1u8, 2, 3][..])
    }

    #[test]
    fn known_ids_map_to_variants() {
        let r = Record::from_parts(EVID_HEAD, 10, 500, payload()).unwrap();
        assert_eq!(r.kind(), RecordKind::Head);

        let r = Record::from_parts(EVID_TAIL, 11, 501, payload()).unwrap();
        assert_eq!(r.kind(), RecordKind::Tail);

        let r = Record::from_parts(EVID_HEAD_SCALER, 12, 0, payload()).unwrap();
        match r {
            Record::HeadScaler(ref s) => assert_eq!(s.source, Source::Head),
            ref other => panic!("expected head scaler, got {other:?}"),
        }

        let r = Record::from_parts(EVID_RUN_PARAMETER, 1234, 0, payload()).unwrap();
        match r {
            Record::RunParameter(p) => assert_eq!(p.run_number, 1234),
            other => panic!("expected run parameter, got {other:?}"),
        }
    }

    #[test]
    fn unknown_id_is_a_hard_error() {
        let err = Record::from_parts(42, 1, 0, payload()).unwrap_err();
        match err {
            RunControlError::UnknownEventId { event_id } => assert_eq!(event_id, 42),
            other => panic!("expected unknown event id, got {other:?}"),
        }
    }
}
