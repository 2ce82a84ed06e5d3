//! The sparse sampled-piano set and its file naming.
//!
//! Samples are spaced a minor third apart from A0 to C7 and named with `s`
//! for sharp, e.g. `Ds1`, `Fs4`.

use super::SampleError;

pub const SAMPLE_NOTES: [&str; 26] = [
    "A0", "C1", "Ds1", "Fs1", "A1", "C2", "Ds2", "Fs2", "A2", "C3", "Ds3", "Fs3", "A3", "C4",
    "Ds4", "Fs4", "A4", "C5", "Ds5", "Fs5", "A5", "C6", "Ds6", "Fs6", "A6", "C7",
];

fn pitch_class(name: &str) -> Option<i32> {
    Some(match name {
        "C" => 0,
        "Cs" => 1,
        "D" => 2,
        "Ds" => 3,
        "E" => 4,
        "F" => 5,
        "Fs" => 6,
        "G" => 7,
        "Gs" => 8,
        "A" => 9,
        "As" => 10,
        "B" => 11,
        _ => return None,
    })
}

/// `A0` → 21, `C4` → 60, `Fs4` → 66.
pub fn sample_name_to_midi(name: &str) -> Result<i32, SampleError> {
    let unknown = || SampleError::UnknownName(name.to_string());

    let split = name
        .find(|c: char| c.is_ascii_digit() || c == '-')
        .ok_or_else(unknown)?;
    let (class, octave) = name.split_at(split);
    let class = pitch_class(class).ok_or_else(unknown)?;
    let octave: i32 = octave.parse().map_err(|_| unknown())?;

    Ok(12 + octave * 12 + class)
}
