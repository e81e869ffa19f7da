use std::collections::HashMap;

use js_sys::Promise;
use log::{debug, error, info, warn};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use super::keymap::Note;
use super::settings::db_to_gain;

/// 피아노가 소리를 내기 위해 필요한 신시사이저 기능.
///
/// 시간 값은 모두 오디오 클럭 기준 초 단위이다. 구현체는 하나의 인스턴스가
/// 여러 음을 동시에 낼 수 있어야 한다 (폴리포닉).
pub trait Synth {
    /// 현재 오디오 클럭 시각
    fn now(&self) -> f64;
    /// 출력 볼륨 (dB)
    fn set_volume(&mut self, db: f64);
    fn trigger_attack(&mut self, note: Note, time: f64);
    fn trigger_release(&mut self, notes: &[Note], time: f64);
    /// 모든 소리를 멈추고 오디오 자원을 돌려준다. 여러 번 호출해도 안전해야 한다.
    fn dispose(&mut self);
}

/// 신시사이저들이 함께 쓰는 오디오 출력.
///
/// 컴포넌트 하나당 하나만 만들고, 설정이 바뀌면 이 위에서 신시사이저만 다시 만든다.
/// 오디오 클럭도 여기에 속하므로 신시사이저를 바꿔도 시간이 이어진다.
pub trait AudioBackend {
    type Synth: Synth;

    /// 새 신시사이저를 만든다. 실패하면 None (소리 없이 동작)
    fn create_synth(&self) -> Option<Self::Synth>;
    /// 출력을 닫는다. 이후에는 신시사이저를 만들 수 없다.
    fn close(&mut self);
}

const MAX_POLYPHONY: usize = 32;

// 엔벨로프 (초)
const ENV_ATTACK: f64 = 0.005;
const ENV_DECAY: f64 = 0.1;
const ENV_RELEASE: f64 = 1.0;
const ENV_SUSTAIN: f32 = 0.3;
// 여러 음이 겹쳐도 클리핑이 덜 나도록 음 하나의 최대 게인을 낮춘다
const VOICE_PEAK: f32 = 0.4;

// 음 하나 = 오실레이터 + 엔벨로프 게인
struct Voice {
    oscillator: OscillatorNode,
    envelope: GainNode,
}

impl Voice {
    fn start(ctx: &AudioContext, output: &GainNode, note: Note, time: f64) -> Result<Self, JsValue> {
        let oscillator = ctx.create_oscillator()?;
        oscillator.set_type(OscillatorType::Triangle);
        oscillator.frequency().set_value(note.frequency() as f32);

        let envelope = ctx.create_gain()?;
        let gain = envelope.gain();
        gain.set_value_at_time(0.0, time)?;
        gain.linear_ramp_to_value_at_time(VOICE_PEAK, time + ENV_ATTACK)?;
        gain.set_target_at_time(VOICE_PEAK * ENV_SUSTAIN, time + ENV_ATTACK, ENV_DECAY / 3.0)?;

        oscillator.connect_with_audio_node(&envelope)?;
        envelope.connect_with_audio_node(output)?;
        oscillator.start_with_when(time)?;

        Ok(Self { oscillator, envelope })
    }

    // time 이후 예약된 값은 지우고, 그 시점의 값에서 0으로 수렴시킨다
    fn release(&self, time: f64) -> Result<(), JsValue> {
        let gain = self.envelope.gain();
        gain.cancel_scheduled_values(time)?;
        gain.set_target_at_time(0.0, time, ENV_RELEASE / 5.0)?;
        self.oscillator.stop_with_when(time + ENV_RELEASE)?;
        Ok(())
    }

    fn stop(&self) {
        let _ = self.oscillator.stop();
        let _ = self.oscillator.disconnect();
        let _ = self.envelope.disconnect();
    }
}

/// 컴포넌트 수명 동안 유지되는 `AudioContext`.
pub struct WebAudio {
    audio_ctx: AudioContext,
    closed: bool,
}

impl WebAudio {
    pub fn new() -> Result<Self, JsValue> {
        let audio_ctx = AudioContext::new()?;
        info!("audio context created (sample rate: {} Hz)", audio_ctx.sample_rate());
        Ok(Self {
            audio_ctx,
            closed: false,
        })
    }
}

impl AudioBackend for WebAudio {
    type Synth = WebSynth;

    fn create_synth(&self) -> Option<WebSynth> {
        if self.closed {
            return None;
        }
        match WebSynth::new(&self.audio_ctx) {
            Ok(synth) => Some(synth),
            Err(err) => {
                error!("synth creation failed: {:?}", err);
                None
            }
        }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        match self.audio_ctx.close() {
            Ok(promise) => settle(promise, "close"),
            Err(err) => warn!("audio context close failed: {:?}", err),
        }
        info!("audio context closed");
    }
}

impl Drop for WebAudio {
    fn drop(&mut self) {
        self.close();
    }
}

/// WebAudio 기반 폴리포닉 신시사이저.
/// 음마다 삼각파 오실레이터를 하나씩 만들고 마스터 게인으로 모은다.
/// 컨텍스트는 빌려 쓰기만 하고, dispose는 마스터 게인과 음들만 정리한다.
pub struct WebSynth {
    audio_ctx: AudioContext,
    output: GainNode,
    voices: HashMap<Note, Voice>,
    disposed: bool,
}

impl WebSynth {
    pub fn new(audio_ctx: &AudioContext) -> Result<Self, JsValue> {
        let output = audio_ctx.create_gain()?;
        output.connect_with_audio_node(&audio_ctx.destination())?;

        Ok(Self {
            audio_ctx: audio_ctx.clone(),
            output,
            voices: HashMap::new(),
            disposed: false,
        })
    }

    // 브라우저 자동재생 정책 때문에 컨텍스트가 suspended 상태로 시작할 수 있다
    fn resume_if_suspended(&self) {
        if self.audio_ctx.state() != AudioContextState::Suspended {
            return;
        }
        match self.audio_ctx.resume() {
            Ok(promise) => settle(promise, "resume"),
            Err(err) => warn!("audio context resume failed: {:?}", err),
        }
    }
}

// Promise 결과는 기다리지 않고 실패만 기록한다
fn settle(promise: Promise, action: &'static str) {
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = JsFuture::from(promise).await {
            warn!("audio context {} failed: {:?}", action, err);
        }
    });
}

impl Synth for WebSynth {
    fn now(&self) -> f64 {
        self.audio_ctx.current_time()
    }

    fn set_volume(&mut self, db: f64) {
        if self.disposed {
            return;
        }
        self.output.gain().set_value(db_to_gain(db) as f32);
    }

    fn trigger_attack(&mut self, note: Note, time: f64) {
        if self.disposed {
            return;
        }
        self.resume_if_suspended();

        // 같은 음이 아직 울리고 있으면 먼저 놓아준다
        if let Some(previous) = self.voices.remove(&note) {
            if let Err(err) = previous.release(time) {
                warn!("release of {} failed: {:?}", note, err);
                previous.stop();
            }
        }

        if self.voices.len() >= MAX_POLYPHONY {
            warn!("max polyphony ({}) reached, dropping {}", MAX_POLYPHONY, note);
            return;
        }

        match Voice::start(&self.audio_ctx, &self.output, note, time) {
            Ok(voice) => {
                debug!("attack {} ({:.2} Hz) at {:.3}", note, note.frequency(), time);
                self.voices.insert(note, voice);
            }
            Err(err) => warn!("attack of {} failed: {:?}", note, err),
        }
    }

    fn trigger_release(&mut self, notes: &[Note], time: f64) {
        for note in notes {
            if let Some(voice) = self.voices.remove(note) {
                debug!("release {} at {:.3}", note, time);
                if let Err(err) = voice.release(time) {
                    warn!("release of {} failed: {:?}", note, err);
                    voice.stop();
                }
            }
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        for (_, voice) in self.voices.drain() {
            voice.stop();
        }
        let _ = self.output.disconnect();

        debug!("synth disposed");
    }
}

impl Drop for WebSynth {
    fn drop(&mut self) {
        self.dispose();
    }
}
