use serde::Deserialize;

pub const MIN_OCTAVE: i32 = 1;
pub const MAX_OCTAVE: i32 = 7;
pub const DEFAULT_OCTAVE: i32 = 4;

// 볼륨 (dB)
pub const MIN_VOLUME_DB: f64 = -100.0;
pub const MAX_VOLUME_DB: f64 = 20.0;
pub const DEFAULT_VOLUME_DB: f64 = 0.0;

// 건반을 뗀 뒤 릴리즈를 시작하기까지의 여유 (초). 즉시 끊으면 클릭 노이즈가 난다.
pub const RELEASE_DELAY: f64 = 0.1;

// 옥타브 라벨 애니메이션 길이 (ms)
pub const OCTAVE_FLASH_MS: u32 = 400;

pub fn clamp_octave(octave: i32) -> i32 {
    octave.clamp(MIN_OCTAVE, MAX_OCTAVE)
}

pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        return DEFAULT_VOLUME_DB;
    }
    volume.clamp(MIN_VOLUME_DB, MAX_VOLUME_DB)
}

/// 피아노 초기 설정. 페이지 URL 쿼리(`?octave=5&volume=-12`)로도 넘겨받는다.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PianoSettings {
    pub octave: i32,
    pub volume: f64,
}

impl Default for PianoSettings {
    fn default() -> Self {
        Self {
            octave: DEFAULT_OCTAVE,
            volume: DEFAULT_VOLUME_DB,
        }
    }
}

impl PianoSettings {
    // 범위를 벗어난 값은 거부하지 않고 잘라낸다
    pub fn clamped(self) -> Self {
        Self {
            octave: clamp_octave(self.octave),
            volume: clamp_volume(self.volume),
        }
    }
}

// dB -> 선형 게인
pub fn db_to_gain(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octave_clamp() {
        assert_eq!(clamp_octave(0), 1);
        assert_eq!(clamp_octave(1), 1);
        assert_eq!(clamp_octave(4), 4);
        assert_eq!(clamp_octave(7), 7);
        assert_eq!(clamp_octave(8), 7);
    }

    #[test]
    fn test_volume_clamp() {
        assert_eq!(clamp_volume(-150.0), -100.0);
        assert_eq!(clamp_volume(50.0), 20.0);
        assert_eq!(clamp_volume(-12.5), -12.5);
        assert_eq!(clamp_volume(f64::NAN), DEFAULT_VOLUME_DB);
    }

    #[test]
    fn test_settings_clamped() {
        let settings = PianoSettings { octave: 12, volume: -300.0 }.clamped();
        assert_eq!(settings, PianoSettings { octave: 7, volume: -100.0 });
        assert_eq!(PianoSettings::default().clamped(), PianoSettings::default());
    }

    #[test]
    fn test_db_to_gain() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-12);
        assert!((db_to_gain(20.0) - 10.0).abs() < 1e-9);
        assert!((db_to_gain(-20.0) - 0.1).abs() < 1e-12);
        assert!(db_to_gain(MIN_VOLUME_DB) < 1e-4);
    }
}
