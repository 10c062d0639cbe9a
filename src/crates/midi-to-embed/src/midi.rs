use log::{debug, info, warn};
use melody_core::timing::tempo_from_bytes;
use melody_core::{encode_source, Encoded, EventKind, MidiSource, TimedEvent, Track};
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Largest delta a variable-length quantity can hold (28 bits)
const MAX_DELTA: u32 = 0x0FFF_FFFF;

/// Largest ticks-per-quarter-note value of a metrical header (15 bits)
const MAX_RESOLUTION: u16 = 0x7FFF;

/// A parsed MIDI file in codec form
#[derive(Debug, Clone)]
pub struct MidiData {
    pub path: Option<PathBuf>,
    pub source: MidiSource,
}

impl MidiData {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut midi = Self::from_bytes(&data)?;
        debug!(
            "{}: {} track(s) at {} ticks per beat",
            path.display(),
            midi.track_count(),
            midi.resolution()
        );
        midi.path = Some(path.to_path_buf());
        Ok(midi)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data)?;

        let resolution = match smf.header.timing {
            Timing::Metrical(tpb) => tpb.as_int(),
            Timing::Timecode(fps, _) => return Err(Error::TimecodeTiming { fps: fps.as_int() }),
        };

        let tracks: Vec<Track> = smf
            .tracks
            .iter()
            .map(|track| track.iter().map(convert_event).collect())
            .collect();

        Ok(MidiData {
            path: None,
            source: MidiSource::new(resolution, tracks),
        })
    }

    /// Ticks per quarter note
    pub fn resolution(&self) -> u16 {
        self.source.resolution
    }

    pub fn track_count(&self) -> usize {
        self.source.tracks.len()
    }

    /// Resolution and raw events of the first track
    pub fn first_track(&self) -> Option<(u16, &Track)> {
        self.source
            .tracks
            .first()
            .map(|track| (self.source.resolution, track))
    }

    /// Encode the file, which must hold exactly one track
    pub fn encode(&self) -> Result<Encoded> {
        Ok(encode_source(&self.source)?)
    }
}

impl From<MidiData> for MidiSource {
    fn from(midi: MidiData) -> Self {
        midi.source
    }
}

fn convert_event(event: &TrackEvent) -> TimedEvent {
    let kind = match event.kind {
        TrackEventKind::Midi { message, .. } => match message {
            // Running-status note off
            MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => EventKind::NoteOff {
                note: key.as_int(),
                velocity: 0,
            },
            MidiMessage::NoteOn { key, vel } => EventKind::NoteOn {
                note: key.as_int(),
                velocity: vel.as_int(),
            },
            MidiMessage::NoteOff { key, vel } => EventKind::NoteOff {
                note: key.as_int(),
                velocity: vel.as_int(),
            },
            _ => EventKind::Other,
        },
        TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
            let [_, hi, mid, lo] = tempo.as_int().to_be_bytes();
            EventKind::SetTempo { bytes: [hi, mid, lo] }
        }
        TrackEventKind::Meta(MetaMessage::TimeSignature(numerator, ..)) => {
            EventKind::TimeSignature { numerator }
        }
        TrackEventKind::Meta(MetaMessage::EndOfTrack) => EventKind::EndOfTrack,
        _ => EventKind::Other,
    };

    TimedEvent::new(event.delta.as_int(), kind)
}

fn to_u7(what: &'static str, value: u8) -> Result<u7> {
    if value > 127 {
        return Err(Error::OutOfRange {
            what,
            value: value as u32,
        });
    }
    Ok(u7::new(value))
}

fn to_track_event(delta: u32, kind: TrackEventKind<'static>) -> Result<TrackEvent<'static>> {
    if delta > MAX_DELTA {
        return Err(Error::OutOfRange {
            what: "delta",
            value: delta,
        });
    }
    Ok(TrackEvent {
        delta: u28::new(delta),
        kind,
    })
}

fn build_smf(track: &[TimedEvent], resolution: u16) -> Result<Smf<'static>> {
    if resolution == 0 || resolution > MAX_RESOLUTION {
        return Err(Error::OutOfRange {
            what: "resolution",
            value: resolution as u32,
        });
    }

    let channel = u4::new(0);
    let mut events: Vec<TrackEvent<'static>> = Vec::with_capacity(track.len() + 1);
    // Deltas of skipped events move onto the next written event
    let mut pending: u32 = 0;
    let mut closed = false;

    for event in track {
        let delta = pending.saturating_add(event.delta);
        let kind = match event.kind {
            EventKind::NoteOn { note, velocity } => TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key: to_u7("note", note)?,
                    vel: to_u7("velocity", velocity)?,
                },
            },
            EventKind::NoteOff { note, velocity } => TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key: to_u7("note", note)?,
                    vel: to_u7("velocity", velocity)?,
                },
            },
            EventKind::SetTempo { bytes } => {
                TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_from_bytes(bytes))))
            }
            EventKind::TimeSignature { numerator } => {
                TrackEventKind::Meta(MetaMessage::TimeSignature(numerator, 2, 24, 8))
            }
            EventKind::EndOfTrack => TrackEventKind::Meta(MetaMessage::EndOfTrack),
            EventKind::Other => {
                warn!("skipping event with no MIDI representation");
                pending = delta;
                continue;
            }
        };
        pending = 0;
        events.push(to_track_event(delta, kind)?);

        if event.kind == EventKind::EndOfTrack {
            closed = true;
            break;
        }
    }

    if !closed {
        events.push(to_track_event(pending, TrackEventKind::Meta(MetaMessage::EndOfTrack))?);
    }

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(resolution)),
    ));
    smf.tracks.push(events);
    Ok(smf)
}

/// Serialize one track as a single-track (format 0) Standard MIDI File
pub fn write_track(track: &[TimedEvent], resolution: u16) -> Result<Vec<u8>> {
    let smf = build_smf(track, resolution)?;
    let mut bytes = Vec::new();
    smf.write_std(&mut bytes)?;
    Ok(bytes)
}

/// Write one track to `path` as a single-track Standard MIDI File
pub fn save_track(path: &Path, track: &[TimedEvent], resolution: u16) -> Result<()> {
    let bytes = write_track(track, resolution)?;
    std::fs::write(path, bytes).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Wrote MIDI file at {} with {} events", path.display(), track.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use melody_core::CodecError;

    #[test]
    fn test_write_then_read() {
        let track = vec![
            TimedEvent::set_tempo(0, 600_000).unwrap(),
            TimedEvent::time_signature(0, 4),
            TimedEvent::note_on(10, 60, 90),
            TimedEvent::note_off(480, 60, 64),
            TimedEvent::end_of_track(5),
        ];
        let bytes = write_track(&track, 480).unwrap();
        let midi = MidiData::from_bytes(&bytes).unwrap();
        assert_eq!(midi.resolution(), 480);
        assert_eq!(midi.track_count(), 1);
        assert_eq!(midi.first_track(), Some((480, &track)));
    }

    #[test]
    fn test_end_of_track_appended() {
        let track = vec![TimedEvent::note_on(0, 60, 90), TimedEvent::note_off(96, 60, 0)];
        let midi = MidiData::from_bytes(&write_track(&track, 96).unwrap()).unwrap();
        let (_, events) = midi.first_track().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], TimedEvent::end_of_track(0));
    }

    #[test]
    fn test_other_event_delta_is_kept() {
        let track = vec![
            TimedEvent::note_on(0, 60, 90),
            TimedEvent::new(100, EventKind::Other),
            TimedEvent::note_off(20, 60, 0),
        ];
        let midi = MidiData::from_bytes(&write_track(&track, 96).unwrap()).unwrap();
        let (_, events) = midi.first_track().unwrap();
        assert_eq!(events[1], TimedEvent::note_off(120, 60, 0));
    }

    #[test]
    fn test_zero_velocity_note_on_reads_as_note_off() {
        let event = TrackEvent {
            delta: u28::new(7),
            kind: TrackEventKind::Midi {
                channel: u4::new(3),
                message: MidiMessage::NoteOn {
                    key: u7::new(64),
                    vel: u7::new(0),
                },
            },
        };
        assert_eq!(convert_event(&event), TimedEvent::note_off(7, 64, 0));
    }

    #[test]
    fn test_unhandled_messages_are_other() {
        let event = TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::ProgramChange { program: u7::new(5) },
            },
        };
        assert_eq!(convert_event(&event).kind, EventKind::Other);
    }

    #[test]
    fn test_out_of_range_values() {
        assert!(matches!(
            write_track(&[TimedEvent::note_on(0, 200, 90)], 480),
            Err(Error::OutOfRange { what: "note", value: 200 })
        ));
        assert!(matches!(
            write_track(&[TimedEvent::note_on(MAX_DELTA + 1, 60, 90)], 480),
            Err(Error::OutOfRange { what: "delta", .. })
        ));
        assert!(matches!(
            write_track(&[], 0),
            Err(Error::OutOfRange { what: "resolution", value: 0 })
        ));
    }

    #[test]
    fn test_multi_track_file_fails_to_encode() {
        let mut smf = Smf::new(Header::new(Format::Parallel, Timing::Metrical(u15::new(480))));
        for _ in 0..2 {
            smf.tracks.push(vec![TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            }]);
        }
        let mut bytes = Vec::new();
        smf.write_std(&mut bytes).unwrap();

        let midi = MidiData::from_bytes(&bytes).unwrap();
        assert_eq!(midi.track_count(), 2);
        assert!(matches!(
            midi.encode(),
            Err(Error::Codec(CodecError::UnsupportedFormat { tracks: 2 }))
        ));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(MidiData::from_bytes(b"not a midi file"), Err(Error::Parse(_))));
    }
}
