use std::{fmt, str::FromStr};

/*
Key Table
=========

Two chromatic octaves, C4 to B5, laid across two rows of a QWERTY keyboard
the way a piano is: the bottom letter row plays the white keys of the lower
octave with the black keys on the row above, and the top letter row plays the
upper octave with the black keys on the digit row.

    lower octave   Z  S  X  D  C  V  G  B  H  N  J  M
                   C  C# D  D# E  F  F# G  G# A  A# B

    upper octave   Q  2  W  3  E  R  5  T  6  Y  7  U
                   C  C# D  D# E  F  F# G  G# A  A# B

Keys are identified by their classic key codes: the ASCII code of the
uppercase letter or the digit ('Z' = 90, '2' = 50). That keeps identifiers
stable across input sources and readable in logs.

Frequencies are equal-tempered with A4 = 440 Hz:

    f = 440 * 2^((midi - 69) / 12)
*/

/// Identifier of one playable key (its classic key code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(u16);

impl KeyId {
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn code(self) -> u16 {
        self.0
    }

    /// Identifier for a typed character. Letters are case-insensitive;
    /// anything that is not an ASCII letter or digit has no identifier.
    pub fn from_char(c: char) -> Option<Self> {
        if c.is_ascii_alphanumeric() {
            Some(Self(c.to_ascii_uppercase() as u16))
        } else {
            None
        }
    }

    /// The character that plays this key, if the code is a letter or digit.
    pub fn as_char(self) -> Option<char> {
        u8::try_from(self.0)
            .ok()
            .map(char::from)
            .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned when a key identifier string is not a decimal key code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKeyIdError(String);

impl fmt::Display for ParseKeyIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid key identifier '{}'", self.0)
    }
}

impl std::error::Error for ParseKeyIdError {}

impl FromStr for KeyId {
    type Err = ParseKeyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u16>()
            .map(KeyId)
            .map_err(|_| ParseKeyIdError(s.to_string()))
    }
}

/// One row of the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEntry {
    pub key: KeyId,
    /// Note name without octave, as drawn on the key.
    pub label: &'static str,
    pub frequency: f32,
}

const fn entry(code: u8, label: &'static str, frequency: f32) -> KeyEntry {
    KeyEntry {
        key: KeyId::new(code as u16),
        label,
        frequency,
    }
}

static STANDARD_KEYS: [KeyEntry; 24] = [
    entry(b'Z', "C", 261.625_57),
    entry(b'S', "C#", 277.182_63),
    entry(b'X', "D", 293.664_76),
    entry(b'D', "D#", 311.126_98),
    entry(b'C', "E", 329.627_56),
    entry(b'V', "F", 349.228_23),
    entry(b'G', "F#", 369.994_42),
    entry(b'B', "G", 391.995_43),
    entry(b'H', "G#", 415.304_7),
    entry(b'N', "A", 440.0),
    entry(b'J', "A#", 466.163_76),
    entry(b'M', "B", 493.883_3),
    entry(b'Q', "C", 523.251_13),
    entry(b'2', "C#", 554.365_26),
    entry(b'W', "D", 587.329_54),
    entry(b'3', "D#", 622.253_97),
    entry(b'E', "E", 659.255_1),
    entry(b'R', "F", 698.456_5),
    entry(b'5', "F#", 739.988_85),
    entry(b'T', "G", 783.990_9),
    entry(b'6', "G#", 830.609_4),
    entry(b'Y', "A", 880.0),
    entry(b'7', "A#", 932.327_5),
    entry(b'U', "B", 987.766_6),
];

/// Immutable key -> frequency mapping, in keyboard order.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyTable {
    entries: &'static [KeyEntry],
}

impl FrequencyTable {
    /// The two-octave QWERTY layout.
    pub fn standard() -> Self {
        Self {
            entries: &STANDARD_KEYS,
        }
    }

    pub fn frequency(&self, key: KeyId) -> Option<f32> {
        self.entry(key).map(|e| e.frequency)
    }

    pub fn entry(&self, key: KeyId) -> Option<&KeyEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn contains(&self, key: KeyId) -> bool {
        self.entry(key).is_some()
    }

    pub fn entries(&self) -> &[KeyEntry] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn midi_to_freq(note: u8) -> f32 {
        440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
    }

    #[test]
    fn table_has_24_unique_keys() {
        let table = FrequencyTable::standard();
        assert_eq!(table.len(), 24);
        let keys: HashSet<_> = table.entries().iter().map(|e| e.key).collect();
        assert_eq!(keys.len(), 24);
    }

    #[test]
    fn frequencies_are_chromatic_from_middle_c() {
        let table = FrequencyTable::standard();
        for (i, e) in table.entries().iter().enumerate() {
            let expected = midi_to_freq(60 + i as u8);
            assert!(
                (e.frequency - expected).abs() < 0.01,
                "{} ({}) expected {expected}, got {}",
                e.key,
                e.label,
                e.frequency
            );
        }
    }

    #[test]
    fn key_codes_follow_typed_characters() {
        assert_eq!(KeyId::from_char('z'), Some(KeyId::new(90)));
        assert_eq!(KeyId::from_char('Z'), Some(KeyId::new(90)));
        assert_eq!(KeyId::from_char('2'), Some(KeyId::new(50)));
        assert_eq!(KeyId::from_char(' '), None);
        assert_eq!(KeyId::new(83).as_char(), Some('S'));
    }

    #[test]
    fn parses_decimal_identifiers() {
        let key: KeyId = "90".parse().unwrap();
        assert_eq!(key, KeyId::new(90));
        assert_eq!(key.to_string(), "90");
        assert!("Z".parse::<KeyId>().is_err());
    }

    #[test]
    fn lookup_matches_known_notes() {
        let table = FrequencyTable::standard();
        let c4 = table.frequency("90".parse().unwrap()).unwrap();
        assert!((c4 - 261.63).abs() < 0.01);
        assert_eq!(table.frequency(KeyId::new(78)), Some(440.0));
        assert_eq!(table.frequency(KeyId::new(65)), None); // 'A' is unmapped
    }
}
