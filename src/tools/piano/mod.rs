use gloo::events::EventListener;
use gloo_timers::callback::Timeout;
use log::error;
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, KeyboardEvent};
use yew::prelude::*;

pub mod engine;
pub mod keyboard;
pub mod keymap;
pub mod settings;
pub mod synth;

use engine::PianoEngine;
use keyboard::physical_key;
use keymap::{black_key_position, KeyBinding, KEY_BINDINGS};
use settings::{PianoSettings, MAX_OCTAVE, MAX_VOLUME_DB, MIN_OCTAVE, MIN_VOLUME_DB, OCTAVE_FLASH_MS};
use synth::WebAudio;

// 피아노 컴포넌트 메시지
pub enum PianoMsg {
    KeyDown(char),      // 물리 키보드 keydown (건반 표의 문자)
    KeyUp(char),        // 물리 키보드 keyup
    PointerDown(usize), // 화면 건반 누름
    PointerUp(usize),   // 화면 건반에서 손을 떼거나 벗어남
    StepOctave(i32),
    SetVolume(f64),
    EndOctaveFlash,     // 옥타브 라벨 애니메이션 종료
}

#[derive(Properties, PartialEq)]
pub struct PianoProps {
    #[prop_or_default]
    pub settings: PianoSettings,
}

// 피아노 컴포넌트
pub struct PianoKeyboard {
    engine: PianoEngine<WebAudio>,
    octave_flash: bool,
    flash_timeout: Option<Timeout>,
    listeners: Vec<EventListener>, // document keydown/keyup
}

impl Component for PianoKeyboard {
    type Message = PianoMsg;
    type Properties = PianoProps;

    fn create(ctx: &Context<Self>) -> Self {
        // AudioContext는 컴포넌트당 하나. 설정이 바뀌어도 신시사이저만 다시 만든다.
        let audio = match WebAudio::new() {
            Ok(audio) => Some(audio),
            Err(err) => {
                error!("audio context creation failed: {:?}", err);
                None
            }
        };
        let engine = PianoEngine::new(ctx.props().settings, audio);

        // 문서 전체의 키 입력을 받는다. 리스너는 눌린 물리 키만 보내고,
        // 음 이름은 update에서 그 시점의 옥타브로 계산한다.
        let listeners = match web_sys::window().and_then(|window| window.document()) {
            Some(document) => {
                let keydown_link = ctx.link().clone();
                let keydown = EventListener::new(&document, "keydown", move |event| {
                    let key = event
                        .dyn_ref::<KeyboardEvent>()
                        .and_then(|event| physical_key(&event.code(), &event.key()));
                    if let Some(key) = key {
                        keydown_link.send_message(PianoMsg::KeyDown(key));
                    }
                });

                let keyup_link = ctx.link().clone();
                let keyup = EventListener::new(&document, "keyup", move |event| {
                    let key = event
                        .dyn_ref::<KeyboardEvent>()
                        .and_then(|event| physical_key(&event.code(), &event.key()));
                    if let Some(key) = key {
                        keyup_link.send_message(PianoMsg::KeyUp(key));
                    }
                });

                vec![keydown, keyup]
            }
            None => {
                error!("document not available, keyboard input disabled");
                Vec::new()
            }
        };

        Self {
            engine,
            octave_flash: false,
            flash_timeout: None,
            listeners,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            PianoMsg::KeyDown(key) => self.engine.key_down(key),
            PianoMsg::KeyUp(key) => self.engine.key_up(key),
            PianoMsg::PointerDown(index) => self.engine.note_on(index),
            PianoMsg::PointerUp(index) => self.engine.note_off(index),
            PianoMsg::StepOctave(delta) => {
                if !self.engine.step_octave(delta) {
                    return false;
                }

                // 라벨 애니메이션을 처음부터 다시 재생
                self.octave_flash = true;
                let link = ctx.link().clone();
                self.flash_timeout = Some(Timeout::new(OCTAVE_FLASH_MS, move || {
                    link.send_message(PianoMsg::EndOctaveFlash);
                }));
                true
            }
            PianoMsg::SetVolume(volume) => self.engine.set_volume(volume),
            PianoMsg::EndOctaveFlash => {
                self.flash_timeout = None;
                std::mem::replace(&mut self.octave_flash, false)
            }
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, _old_props: &Self::Properties) -> bool {
        self.engine.apply(ctx.props().settings)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let octave = self.engine.octave();
        let volume = self.engine.volume();

        let on_volume = ctx.link().batch_callback(|e: InputEvent| {
            let input = e.target_dyn_into::<HtmlInputElement>()?;
            input.value().parse::<f64>().ok().map(PianoMsg::SetVolume)
        });

        html! {
            <div class="piano-container">
                <div class="piano-row">
                    <button
                        class="octave-button"
                        onclick={ctx.link().callback(|_| PianoMsg::StepOctave(-1))}
                        disabled={octave <= MIN_OCTAVE}
                        title="Octave down"
                    >
                        {"◀"}
                    </button>
                    <div class="piano-keyboard">
                        {
                            // 흰 건반 먼저, 검은 건반은 그 위에 겹치게
                            KEY_BINDINGS.iter().enumerate()
                                .filter(|(_, binding)| !binding.is_black())
                                .map(|(index, binding)| self.view_key(ctx, index, binding))
                                .collect::<Html>()
                        }
                        {
                            KEY_BINDINGS.iter().enumerate()
                                .filter(|(_, binding)| binding.is_black())
                                .map(|(index, binding)| self.view_key(ctx, index, binding))
                                .collect::<Html>()
                        }
                    </div>
                    <button
                        class="octave-button"
                        onclick={ctx.link().callback(|_| PianoMsg::StepOctave(1))}
                        disabled={octave >= MAX_OCTAVE}
                        title="Octave up"
                    >
                        {"▶"}
                    </button>
                </div>
                <p
                    key={octave.to_string()}
                    class={classes!("octave-display", self.octave_flash.then_some("bump"))}
                >
                    {format!("Current Octave: {}", octave)}
                </p>
                <div class="volume-control">
                    <span class="volume-value">{format!("Volume: {}", volume)}</span>
                    <input
                        type="range"
                        min={MIN_VOLUME_DB.to_string()}
                        max={MAX_VOLUME_DB.to_string()}
                        step="1"
                        value={volume.to_string()}
                        oninput={on_volume}
                    />
                </div>
                {
                    if self.engine.has_synth() {
                        html! {}
                    } else {
                        html! { <p class="audio-warning">{"Audio unavailable"}</p> }
                    }
                }
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        // 리스너를 먼저 떼어야 제거 뒤에 키 입력이 들어오지 않는다
        self.listeners.clear();
        self.flash_timeout = None;
        self.engine.teardown();
    }
}

impl PianoKeyboard {
    fn view_key(&self, ctx: &Context<Self>, index: usize, binding: &KeyBinding) -> Html {
        let pressed = self.engine.is_sounding(index);
        let title = self
            .engine
            .note_for(index)
            .map(|note| note.to_string())
            .unwrap_or_default();

        let (color, style) = match black_key_position(binding) {
            Some(position) => ("black-key", Some(format!("left: {}%;", position))),
            None => ("white-key", None),
        };

        html! {
            <button
                key={binding.key.to_string()}
                class={classes!("piano-key", color, pressed.then_some("pressed"))}
                style={style}
                onmousedown={ctx.link().callback(move |_| PianoMsg::PointerDown(index))}
                onmouseup={ctx.link().callback(move |_| PianoMsg::PointerUp(index))}
                onmouseleave={ctx.link().callback(move |_| PianoMsg::PointerUp(index))}
                title={title}
            >
                <span class="key-label">{binding.label()}</span>
            </button>
        }
    }
}
