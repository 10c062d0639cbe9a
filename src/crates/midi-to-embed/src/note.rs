use melody_core::Embedding;

/// Convert a MIDI note number to a string representation (e.g., "c4", "g#5")
pub fn note_num_to_str(note_num: u8) -> String {
    const NOTE_NAMES: [&str; 12] = [
        "c", "c#", "d", "d#", "e", "f", "f#", "g", "g#", "a", "a#", "b"
    ];

    let note_name = NOTE_NAMES[(note_num % 12) as usize];
    let octave = (note_num / 12) as i32 - 1;

    format!("{}{}", note_name, octave)
}

/// One-line description of an embedding, e.g. "c4 500.0ms" or "~ 250.0ms"
pub fn describe(embedding: &Embedding) -> String {
    let pitch = match embedding.top_note() {
        Ok(Some(note)) => note_num_to_str(note),
        Ok(None) => "~".to_string(),
        Err(_) => format!("?{:?}", embedding.active_slots()),
    };

    match embedding.duration_ms() {
        Some(ms) => format!("{} {:.1}ms", pitch, ms),
        None => pitch,
    }
}
