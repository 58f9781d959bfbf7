use regex::Regex;

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

lazy_static! {
    static ref PITCH_NAME_REGEX: Regex =
        Regex::new(r"^(?P<letter>[a-gA-G])(?P<accidentals>[#b]*)(?P<octave>-?\d+)$")
            .expect("Failed to compile pitch name regex");
}

/// Scientific pitch name for a MIDI note number, spelled with sharps.
/// Middle C (60) is `C4`; 0 is `C-1`.
pub fn pitch_name(pitch: i32) -> String {
    let name = SHARP_NAMES[pitch.rem_euclid(12) as usize];
    let octave = pitch.div_euclid(12) - 1;

    format!("{}{}", name, octave)
}

/// Parses either a bare MIDI number (`45`) or a pitch name (`A2`, `d#4`, `Bb3`).
pub fn parse_pitch(text: &str) -> Option<i32> {
    let text = text.trim();

    if let Ok(number) = text.parse::<i32>() {
        return Some(number);
    }

    let captures = PITCH_NAME_REGEX.captures(text)?;

    let letter = match captures["letter"].to_ascii_uppercase().as_str() {
        "C" => 0,
        "D" => 2,
        "E" => 4,
        "F" => 5,
        "G" => 7,
        "A" => 9,
        "B" => 11,
        _ => return None,
    };

    let accidentals = captures["accidentals"]
        .chars()
        .map(|accidental| if accidental == '#' { 1 } else { -1 })
        .sum::<i32>();

    let octave = captures["octave"].parse::<i32>().ok()?;

    Some((octave + 1) * 12 + letter + accidentals)
}
