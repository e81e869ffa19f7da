use std::fmt;

// 12음계 피치 클래스
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    // C 기준 반음 번호 (0-11)
    pub fn semitone(self) -> i32 {
        match self {
            PitchClass::C => 0,
            PitchClass::CSharp => 1,
            PitchClass::D => 2,
            PitchClass::DSharp => 3,
            PitchClass::E => 4,
            PitchClass::F => 5,
            PitchClass::FSharp => 6,
            PitchClass::G => 7,
            PitchClass::GSharp => 8,
            PitchClass::A => 9,
            PitchClass::ASharp => 10,
            PitchClass::B => 11,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

/// 옥타브가 정해진 음 (예: C4, F#5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note {
    pub pitch: PitchClass,
    pub octave: i32,
}

impl Note {
    pub fn new(pitch: PitchClass, octave: i32) -> Self {
        Self { pitch, octave }
    }

    // MIDI 노트 번호 (C4 = 60)
    pub fn midi(&self) -> i32 {
        (self.octave + 1) * 12 + self.pitch.semitone()
    }

    // 평균율 주파수 (A4 = 440Hz)
    pub fn frequency(&self) -> f64 {
        440.0 * 2f64.powf((self.midi() - 69) as f64 / 12.0)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch.name(), self.octave)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColor {
    White,
    Black,
}

/// 키보드 문자 하나와 화면 건반 하나의 연결
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: char,
    pub pitch: PitchClass,
    pub octave_offset: i32, // 기준 옥타브에서 몇 옥타브 위인지 (0 또는 1)
    pub color: KeyColor,
}

impl KeyBinding {
    const fn white(key: char, pitch: PitchClass, octave_offset: i32) -> Self {
        Self { key, pitch, octave_offset, color: KeyColor::White }
    }

    const fn black(key: char, pitch: PitchClass, octave_offset: i32) -> Self {
        Self { key, pitch, octave_offset, color: KeyColor::Black }
    }

    /// 현재 옥타브 기준으로 이 건반이 내는 음
    pub fn note(&self, octave: i32) -> Note {
        Note::new(self.pitch, octave + self.octave_offset)
    }

    // 건반에 표시할 글자 (흰 건반은 대문자)
    pub fn label(&self) -> String {
        self.key.to_uppercase().collect()
    }

    pub fn is_black(&self) -> bool {
        self.color == KeyColor::Black
    }
}

/// 흰 건반 10개 + 검은 건반 7개. 한 옥타브와 다음 옥타브의 E까지 연주 가능.
/// 흰 건반은 왼쪽에서 오른쪽 순서로 나열되어 있고, 화면 배치도 이 순서를 따른다.
pub const KEY_BINDINGS: [KeyBinding; 17] = [
    KeyBinding::white('q', PitchClass::C, 0),
    KeyBinding::white('w', PitchClass::D, 0),
    KeyBinding::white('e', PitchClass::E, 0),
    KeyBinding::white('r', PitchClass::F, 0),
    KeyBinding::white('t', PitchClass::G, 0),
    KeyBinding::white('y', PitchClass::A, 0),
    KeyBinding::white('u', PitchClass::B, 0),
    KeyBinding::white('i', PitchClass::C, 1),
    KeyBinding::white('o', PitchClass::D, 1),
    KeyBinding::white('p', PitchClass::E, 1),
    KeyBinding::black('2', PitchClass::CSharp, 0),
    KeyBinding::black('3', PitchClass::DSharp, 0),
    KeyBinding::black('5', PitchClass::FSharp, 0),
    KeyBinding::black('6', PitchClass::GSharp, 0),
    KeyBinding::black('7', PitchClass::ASharp, 0),
    KeyBinding::black('9', PitchClass::CSharp, 1),
    KeyBinding::black('0', PitchClass::DSharp, 1),
];

// 문자에 해당하는 바인딩 인덱스 (대소문자 무시)
pub fn binding_index(key: char) -> Option<usize> {
    let key = key.to_ascii_lowercase();
    KEY_BINDINGS.iter().position(|binding| binding.key == key)
}

pub fn white_key_count() -> usize {
    KEY_BINDINGS.iter().filter(|binding| !binding.is_black()).count()
}

/// 검은 건반의 가로 위치 (건반 영역 너비 대비 %).
/// 바로 왼쪽 흰 건반과 다음 흰 건반의 경계에 중심이 오도록 한다.
pub fn black_key_position(binding: &KeyBinding) -> Option<f32> {
    if !binding.is_black() {
        return None;
    }

    let natural = match binding.pitch {
        PitchClass::CSharp => PitchClass::C,
        PitchClass::DSharp => PitchClass::D,
        PitchClass::FSharp => PitchClass::F,
        PitchClass::GSharp => PitchClass::G,
        PitchClass::ASharp => PitchClass::A,
        _ => return None,
    };

    let prev_white_idx = KEY_BINDINGS
        .iter()
        .filter(|k| !k.is_black())
        .position(|k| k.pitch == natural && k.octave_offset == binding.octave_offset)?;

    let white_key_width = 100.0 / white_key_count() as f32;
    Some((prev_white_idx + 1) as f32 * white_key_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_note(key: char, octave: i32) -> Option<Note> {
        binding_index(key).map(|index| KEY_BINDINGS[index].note(octave))
    }

    fn name(key: char, octave: i32) -> Option<String> {
        resolve_note(key, octave).map(|note| note.to_string())
    }

    #[test]
    fn test_resolve_at_octave_four() {
        assert_eq!(name('q', 4).as_deref(), Some("C4"));
        assert_eq!(name('2', 4).as_deref(), Some("C#4"));
        assert_eq!(name('u', 4).as_deref(), Some("B4"));
        assert_eq!(name('i', 4).as_deref(), Some("C5"));
        assert_eq!(name('p', 4).as_deref(), Some("E5"));
        assert_eq!(name('9', 4).as_deref(), Some("C#5"));
        assert_eq!(name('0', 4).as_deref(), Some("D#5"));
    }

    #[test]
    fn test_resolve_follows_octave() {
        assert_eq!(name('q', 5).as_deref(), Some("C5"));
        assert_eq!(name('7', 1).as_deref(), Some("A#1"));
        assert_eq!(name('o', 7).as_deref(), Some("D8"));
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(name('Q', 4).as_deref(), Some("C4"));
        assert_eq!(name('I', 3).as_deref(), Some("C4"));
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        for key in ['a', '1', '4', '8', 'z', ' ', '#'] {
            assert_eq!(resolve_note(key, 4), None, "key {:?}", key);
        }
    }

    #[test]
    fn test_table_shape() {
        assert_eq!(KEY_BINDINGS.len(), 17);
        assert_eq!(white_key_count(), 10);

        // 같은 옥타브 안에서 12음이 모두 한 번씩 나온다
        let mut semitones: Vec<i32> = KEY_BINDINGS
            .iter()
            .filter(|k| k.octave_offset == 0)
            .map(|k| k.pitch.semitone())
            .collect();
        semitones.sort();
        assert_eq!(semitones, (0..12).collect::<Vec<_>>());

        let keys: std::collections::HashSet<char> = KEY_BINDINGS.iter().map(|k| k.key).collect();
        assert_eq!(keys.len(), 17);
    }

    #[test]
    fn test_note_frequency() {
        let a4 = Note::new(PitchClass::A, 4);
        assert_eq!(a4.midi(), 69);
        assert!((a4.frequency() - 440.0).abs() < 1e-9);

        let c4 = Note::new(PitchClass::C, 4);
        assert_eq!(c4.midi(), 60);
        assert!((c4.frequency() - 261.6256).abs() < 1e-3);
    }

    #[test]
    fn test_black_key_positions() {
        let positions: Vec<f32> = KEY_BINDINGS
            .iter()
            .filter_map(black_key_position)
            .collect();
        assert_eq!(positions, vec![10.0, 20.0, 40.0, 50.0, 60.0, 80.0, 90.0]);
        assert_eq!(black_key_position(&KEY_BINDINGS[0]), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(KEY_BINDINGS[0].label(), "Q");
        assert_eq!(KEY_BINDINGS[10].label(), "2");
    }
}
