use std::collections::HashSet;

use log::{debug, info};

use super::keyboard::PressedKeys;
use super::keymap::{binding_index, Note, KEY_BINDINGS};
use super::settings::{clamp_octave, clamp_volume, PianoSettings, RELEASE_DELAY};
use super::synth::{AudioBackend, Synth};

/// 피아노의 상태와 입력 처리.
///
/// 옥타브, 볼륨, 눌린 키, 울리고 있는 건반을 들고 있고 오디오 출력 하나와
/// 그 위의 신시사이저 인스턴스 하나를 소유한다. 옥타브나 볼륨이 바뀌면
/// 출력은 그대로 두고 신시사이저만 버리고 새로 만든다.
/// 모든 메서드는 화면을 다시 그려야 하는지를 bool로 돌려준다.
pub struct PianoEngine<B: AudioBackend> {
    octave: i32,
    volume: f64,
    pressed: PressedKeys,
    sounding: HashSet<usize>,
    backend: Option<B>,
    synth: Option<B::Synth>,
    torn_down: bool,
}

impl<B: AudioBackend> PianoEngine<B> {
    /// `backend`가 None이면 (오디오 초기화 실패) 소리 없이 하이라이트만 한다.
    pub fn new(settings: PianoSettings, backend: Option<B>) -> Self {
        let settings = settings.clamped();
        let mut engine = Self {
            octave: settings.octave,
            volume: settings.volume,
            pressed: PressedKeys::new(),
            sounding: HashSet::new(),
            backend,
            synth: None,
            torn_down: false,
        };
        engine.rebuild_synth();
        engine
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn has_synth(&self) -> bool {
        self.synth.is_some()
    }

    // 건반 하이라이트 여부
    pub fn is_sounding(&self, index: usize) -> bool {
        self.sounding.contains(&index)
    }

    /// 건반이 지금 옥타브에서 내는 음
    pub fn note_for(&self, index: usize) -> Option<Note> {
        KEY_BINDINGS.get(index).map(|binding| binding.note(self.octave))
    }

    // 물리 키보드 keydown (`keyboard::physical_key`로 구한 문자).
    // 표에 없는 키와 이미 눌려 있는 키는 무시
    pub fn key_down(&mut self, key: char) -> bool {
        let Some(index) = binding_index(key) else {
            return false;
        };
        if self.torn_down || !self.pressed.press(key) {
            return false;
        }
        self.note_on(index)
    }

    // 물리 키보드 keyup
    pub fn key_up(&mut self, key: char) -> bool {
        let Some(index) = binding_index(key) else {
            return false;
        };
        if !self.pressed.release(key) {
            return false;
        }
        self.note_off(index)
    }

    /// 음을 시작한다: 건반을 하이라이트하고 신시사이저에 어택을 보낸다.
    /// 신시사이저가 없으면 하이라이트만 한다.
    pub fn note_on(&mut self, index: usize) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(note) = self.note_for(index) else {
            return false;
        };

        let newly_sounding = self.sounding.insert(index);
        if let Some(synth) = self.synth.as_mut() {
            let now = synth.now();
            synth.trigger_attack(note, now);
        }
        debug!("note on: {}", note);

        newly_sounding
    }

    /// 음을 멈춘다. 울리고 있지 않은 건반이면 아무것도 하지 않는다.
    pub fn note_off(&mut self, index: usize) -> bool {
        if !self.sounding.remove(&index) {
            return false;
        }
        let Some(note) = self.note_for(index) else {
            return false;
        };

        if let Some(synth) = self.synth.as_mut() {
            let now = synth.now();
            synth.trigger_release(&[note], now + RELEASE_DELAY);
        }
        debug!("note off: {}", note);

        true
    }

    pub fn step_octave(&mut self, delta: i32) -> bool {
        self.apply(PianoSettings {
            octave: self.octave + delta,
            volume: self.volume,
        })
    }

    pub fn set_volume(&mut self, volume: f64) -> bool {
        self.apply(PianoSettings {
            octave: self.octave,
            volume,
        })
    }

    /// 새 설정을 적용한다. 값이 실제로 바뀐 경우에만 신시사이저를 다시 만든다.
    pub fn apply(&mut self, settings: PianoSettings) -> bool {
        if self.torn_down {
            return false;
        }
        let octave = clamp_octave(settings.octave);
        let volume = clamp_volume(settings.volume);
        if octave == self.octave && volume == self.volume {
            return false;
        }

        self.octave = octave;
        self.volume = volume;
        self.rebuild_synth();
        true
    }

    // 컴포넌트 제거 시 호출. 신시사이저를 정리한 뒤 출력을 닫는다.
    // 이후의 입력은 모두 무시된다.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.release_synth();
        if let Some(mut backend) = self.backend.take() {
            backend.close();
        }
    }

    fn rebuild_synth(&mut self) {
        self.release_synth();

        self.synth = self.backend.as_ref().and_then(|backend| backend.create_synth());
        if let Some(synth) = self.synth.as_mut() {
            synth.set_volume(self.volume);
            info!("synth ready (octave: {}, volume: {} dB)", self.octave, self.volume);
        }
    }

    // 기존 신시사이저가 사라지면 울리던 음도 모두 끊기므로 눌림 상태도 비운다
    fn release_synth(&mut self) {
        self.pressed.clear();
        self.sounding.clear();
        if let Some(mut synth) = self.synth.take() {
            synth.dispose();
        }
    }
}
