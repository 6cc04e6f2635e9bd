//! Instrument and envelope parsing

use std::io::Cursor;

use crate::error::ItError;
use crate::module::{
    DuplicateCheckAction, DuplicateCheckType, Envelope, EnvelopeFlags, Instrument, NewInstrument,
    NewNoteAction, NodePoint, OldInstrument, OldInstrumentFlags, OldNodePoint,
};
use crate::parapointer::{ParaPointer, ParaPointer32};
use crate::{INSTRUMENT_FORMAT_SPLIT, MAX_ENVELOPE_POINTS};

use super::helpers::{read_array, read_i8, read_string, read_u8, read_u16, skip};

/// Decode the instrument record at `ptr`
///
/// The layout is chosen by the header's compatibility version: anything
/// below 2.00 uses the old single-envelope record.
pub(crate) fn parse_instrument(
    data: &[u8],
    ptr: ParaPointer32,
    compatible_with: u16,
) -> Result<Instrument, ItError> {
    let range = ptr.resolve(Instrument::SIZE, data.len())?;
    let mut cursor = Cursor::new(data);
    cursor.set_position(range.start as u64);

    if compatible_with < INSTRUMENT_FORMAT_SPLIT {
        Ok(Instrument::Old(Box::new(parse_old_instrument(&mut cursor)?)))
    } else {
        Ok(Instrument::New(Box::new(parse_new_instrument(&mut cursor)?)))
    }
}

fn parse_keyboard(cursor: &mut Cursor<&[u8]>) -> Result<[(u8, u8); 120], ItError> {
    // Note-Sample-Keyboard table (240 bytes = 120 × 2)
    let mut table = [(0u8, 0u8); 120];
    for entry in table.iter_mut() {
        let note = read_u8(cursor)?;
        let sample = read_u8(cursor)?;
        *entry = (note, sample);
    }
    Ok(table)
}

fn parse_old_instrument(cursor: &mut Cursor<&[u8]>) -> Result<OldInstrument, ItError> {
    let magic = read_array::<4>(cursor)?;
    let filename = read_string(&read_array::<12>(cursor)?);

    // Reserved (1 byte)
    skip(cursor, 1)?;

    let flags = OldInstrumentFlags::from_bits_retain(read_u8(cursor)?);

    // VLS, VLE, SLS, SLE
    let volume_loop = (read_u8(cursor)?, read_u8(cursor)?);
    let sustain_loop = (read_u8(cursor)?, read_u8(cursor)?);

    skip(cursor, 2)?;
    let fadeout = read_u16(cursor)?;
    let nna = NewNoteAction::from_u8(read_u8(cursor)?);
    let duplicate_note_check = read_u8(cursor)? != 0;

    // TrkVers, NoS
    let tracker_version = read_u16(cursor)?;
    let sample_count = read_u8(cursor)?;
    skip(cursor, 1)?;

    let name = read_string(&read_array::<26>(cursor)?);
    skip(cursor, 6)?;

    let note_sample_table = parse_keyboard(cursor)?;
    let volume_envelope = read_array::<200>(cursor)?;

    let mut node_points = [OldNodePoint::default(); MAX_ENVELOPE_POINTS];
    for node in node_points.iter_mut() {
        let tick = read_u8(cursor)?;
        let magnitude = read_u8(cursor)?;
        *node = OldNodePoint { tick, magnitude };
    }

    Ok(OldInstrument {
        magic,
        filename,
        flags,
        volume_loop,
        sustain_loop,
        fadeout,
        nna,
        duplicate_note_check,
        tracker_version,
        sample_count,
        name,
        note_sample_table,
        volume_envelope,
        node_points,
    })
}

/// Top bit marks a "use this value" byte; the low seven bits carry it
fn enabled_value(raw: u8) -> Option<u8> {
    (raw & 0x80 != 0).then_some(raw & 0x7F)
}

fn parse_new_instrument(cursor: &mut Cursor<&[u8]>) -> Result<NewInstrument, ItError> {
    let magic = read_array::<4>(cursor)?;
    let filename = read_string(&read_array::<12>(cursor)?);

    // Reserved (1 byte)
    skip(cursor, 1)?;

    // NNA, DCT, DCA
    let nna = NewNoteAction::from_u8(read_u8(cursor)?);
    let dct = DuplicateCheckType::from_u8(read_u8(cursor)?);
    let dca = DuplicateCheckAction::from_u8(read_u8(cursor)?);

    let fadeout = read_u16(cursor)?;

    // PPS, PPC
    let pitch_pan_separation = read_i8(cursor)?;
    let pitch_pan_center = read_u8(cursor)?;

    // GbV, DfP
    let global_volume = read_u8(cursor)?;
    let default_pan = enabled_value(read_u8(cursor)?);

    // RV, RP (random variation)
    let random_volume = read_u8(cursor)?;
    let random_pan = read_u8(cursor)?;

    // TrkVers, NoS (instrument files only)
    let tracker_version = read_u16(cursor)?;
    let sample_count = read_u8(cursor)?;
    skip(cursor, 1)?;

    let name = read_string(&read_array::<26>(cursor)?);

    // IFC, IFR (initial filter cutoff/resonance)
    let filter_cutoff = enabled_value(read_u8(cursor)?);
    let filter_resonance = enabled_value(read_u8(cursor)?);

    // MCh, MPr, MIDIBnk
    let midi_channel = read_u8(cursor)?;
    let midi_program = read_u8(cursor)?;
    let midi_bank = read_u16(cursor)?;

    let note_sample_table = parse_keyboard(cursor)?;

    let volume_envelope = parse_envelope(cursor)?;
    let panning_envelope = parse_envelope(cursor)?;
    let pitch_envelope = parse_envelope(cursor)?;

    Ok(NewInstrument {
        magic,
        filename,
        nna,
        dct,
        dca,
        fadeout,
        pitch_pan_separation,
        pitch_pan_center,
        global_volume,
        default_pan,
        random_volume,
        random_pan,
        tracker_version,
        sample_count,
        name,
        filter_cutoff,
        filter_resonance,
        midi_channel,
        midi_program,
        midi_bank,
        note_sample_table,
        volume_envelope,
        panning_envelope,
        pitch_envelope,
    })
}

/// Parse one 82-byte envelope
pub(crate) fn parse_envelope(cursor: &mut Cursor<&[u8]>) -> Result<Envelope, ItError> {
    let flags = EnvelopeFlags::from_bits_retain(read_u8(cursor)?);

    // Num (1 byte) - number of node points
    let count = read_u8(cursor)?;

    // LpB, LpE (loop begin/end)
    let loop_begin = read_u8(cursor)?;
    let loop_end = read_u8(cursor)?;

    // SLB, SLE (sustain loop begin/end)
    let sustain_begin = read_u8(cursor)?;
    let sustain_end = read_u8(cursor)?;

    // Node data (75 bytes = 25 × 3: 1 byte y-value + 2 bytes tick)
    let mut nodes = [NodePoint::default(); MAX_ENVELOPE_POINTS];
    for node in nodes.iter_mut() {
        let y = read_i8(cursor)?;
        let tick = read_u16(cursor)?;
        *node = NodePoint { y, tick };
    }

    // Reserved trailing byte
    skip(cursor, 1)?;

    Ok(Envelope {
        flags,
        count,
        loop_begin,
        loop_end,
        sustain_begin,
        sustain_end,
        nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_record() -> Vec<u8> {
        let mut rec = vec![0u8; Instrument::SIZE];
        rec[0..4].copy_from_slice(b"IMPI");
        rec[0x04..0x0B].copy_from_slice(b"LEAD.II");
        rec[0x11] = 2; // NNA: note off
        rec[0x12] = 1; // DCT: note
        rec[0x13] = 2; // DCA: fade
        rec[0x14..0x16].copy_from_slice(&256u16.to_le_bytes());
        rec[0x16] = 0xF8; // PPS -8
        rec[0x17] = 60;
        rec[0x18] = 128;
        rec[0x19] = 0x80 | 32;
        rec[0x20..0x24].copy_from_slice(b"Lead");
        rec[0x3A] = 0x80 | 100;
        rec[0x3B] = 10; // resonance disabled
        rec[0x3E..0x40].copy_from_slice(&0x0102u16.to_le_bytes());
        for i in 0..120 {
            rec[0x40 + i * 2] = i as u8;
            rec[0x40 + i * 2 + 1] = 1;
        }
        // Volume envelope: enabled, 2 points
        let env = 0x130;
        rec[env] = 0x01;
        rec[env + 1] = 2;
        rec[env + 6] = 64;
        rec[env + 9] = 0;
        rec[env + 10..env + 12].copy_from_slice(&10u16.to_le_bytes());
        // Pitch envelope slot used as filter
        rec[0x130 + 2 * Envelope::SIZE] = 0x81;
        rec
    }

    #[test]
    fn test_new_layout() {
        let mut data = vec![0u8; 0x100];
        data.extend(new_record());
        let inst = parse_instrument(&data, ParaPointer32(0x100), 0x0214).unwrap();

        let Instrument::New(inst) = inst else {
            panic!("expected new layout");
        };
        assert_eq!(inst.filename, "LEAD.II");
        assert_eq!(inst.nna, NewNoteAction::NoteOff);
        assert_eq!(inst.dct, DuplicateCheckType::Note);
        assert_eq!(inst.dca, DuplicateCheckAction::NoteFade);
        assert_eq!(inst.fadeout, 256);
        assert_eq!(inst.pitch_pan_separation, -8);
        assert_eq!(inst.default_pan, Some(32));
        assert_eq!(inst.filter_cutoff, Some(100));
        assert_eq!(inst.filter_resonance, None);
        assert_eq!(inst.midi_bank, 0x0102);
        assert_eq!(inst.name, "Lead");
        assert_eq!(inst.note_sample_table[60], (60, 1));
        assert!(inst.volume_envelope.is_enabled());
        assert_eq!(inst.volume_envelope.points().len(), 2);
        assert_eq!(inst.volume_envelope.points()[1].tick, 10);
        assert!(!inst.panning_envelope.is_enabled());
        assert!(inst.pitch_envelope.is_filter());
    }

    #[test]
    fn test_old_layout() {
        let mut rec = vec![0u8; Instrument::SIZE];
        rec[0..4].copy_from_slice(b"IMPI");
        rec[0x11] = 0x03;
        rec[0x12] = 1;
        rec[0x13] = 4;
        rec[0x18..0x1A].copy_from_slice(&32u16.to_le_bytes());
        rec[0x1A] = 3;
        rec[0x1B] = 1;
        rec[0x1E] = 2;
        rec[0x20..0x25].copy_from_slice(b"Piano");
        rec[0x130] = 64;
        rec[0x1F8] = 0;
        rec[0x1F9] = 64;
        rec[0x1FA] = 20;
        rec[0x1FB] = 0;
        rec[0x1FC] = 0xFF;

        let inst = parse_instrument(&rec, ParaPointer32(0), 0x0100).unwrap();
        let Instrument::Old(inst) = inst else {
            panic!("expected old layout");
        };
        assert!(inst.flags.contains(OldInstrumentFlags::VOLUME_LOOP));
        assert_eq!(inst.volume_loop, (1, 4));
        assert_eq!(inst.fadeout, 32);
        assert_eq!(inst.nna, NewNoteAction::NoteFade);
        assert!(inst.duplicate_note_check);
        assert_eq!(inst.sample_count, 2);
        assert_eq!(inst.name, "Piano");
        assert_eq!(inst.volume_envelope[0], 64);
        assert_eq!(inst.active_nodes().len(), 2);
    }

    #[test]
    fn test_truncated_record() {
        let data = vec![0u8; 0x100];
        let err = parse_instrument(&data, ParaPointer32(0x80), 0x0214).unwrap_err();
        assert!(matches!(err, ItError::StructuralRead { offset: 0x80, .. }));
    }
}
