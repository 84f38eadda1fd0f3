use memoria_core::Sound;
use wasm_bindgen::JsValue;
use web_sys::{AudioContext, AudioContextState, OscillatorType};

#[derive(Copy, Clone, Debug, PartialEq)]
struct Tone {
    frequency: f32,
    kind: OscillatorType,
    /// Seconds after the sound is triggered.
    offset: f64,
    duration: f64,
}

impl Tone {
    const fn new(frequency: f32, kind: OscillatorType, offset: f64, duration: f64) -> Self {
        Self {
            frequency,
            kind,
            offset,
            duration,
        }
    }
}

const FLIP: &[Tone] = &[Tone::new(300., OscillatorType::Sine, 0., 0.05)];
const MATCH: &[Tone] = &[
    Tone::new(600., OscillatorType::Sine, 0., 0.1),
    Tone::new(900., OscillatorType::Triangle, 0.15, 0.2),
];
const WRONG: &[Tone] = &[Tone::new(150., OscillatorType::Sawtooth, 0., 0.3)];
const WIN: &[Tone] = &[
    Tone::new(400., OscillatorType::Square, 0., 0.2),
    Tone::new(500., OscillatorType::Square, 0.2, 0.2),
    Tone::new(600., OscillatorType::Square, 0.4, 0.2),
    Tone::new(800., OscillatorType::Square, 0.6, 0.2),
];
const LOSE: &[Tone] = &[
    Tone::new(300., OscillatorType::Sawtooth, 0., 0.4),
    Tone::new(200., OscillatorType::Sawtooth, 0.3, 0.4),
    Tone::new(100., OscillatorType::Sawtooth, 0.6, 0.4),
];

fn tones(sound: Sound) -> &'static [Tone] {
    use Sound::*;
    match sound {
        Flip => FLIP,
        Match => MATCH,
        Wrong => WRONG,
        Win => WIN,
        Lose => LOSE,
    }
}

/// Short synthesized cues. Every failure is logged and swallowed, the game runs fine muted.
#[derive(Debug, Default)]
pub(crate) struct SoundBoard {
    context: Option<AudioContext>,
    unsupported: bool,
}

impl SoundBoard {
    /// Creates or resumes the audio context, browsers only allow this from a user gesture.
    pub(crate) fn wake(&mut self) {
        if self.context.is_none() && !self.unsupported {
            match AudioContext::new() {
                Ok(context) => self.context = Some(context),
                Err(err) => {
                    log::warn!("Web Audio not supported: {:?}", err);
                    self.unsupported = true;
                }
            }
        }

        if let Some(context) = &self.context {
            if context.state() == AudioContextState::Suspended {
                if let Err(err) = context.resume() {
                    log::warn!("could not resume audio: {:?}", err);
                }
            }
        }
    }

    pub(crate) fn play(&self, sound: Sound) {
        let Some(context) = &self.context else {
            return;
        };

        for tone in tones(sound) {
            if let Err(err) = play_tone(context, tone) {
                log::error!("sound error on {:?}: {:?}", sound, err);
                return;
            }
        }
    }
}

fn play_tone(context: &AudioContext, tone: &Tone) -> Result<(), JsValue> {
    let oscillator = context.create_oscillator()?;
    let gain = context.create_gain()?;

    oscillator.set_type(tone.kind);
    oscillator.frequency().set_value(tone.frequency);
    oscillator.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&context.destination())?;

    let start = context.current_time() + tone.offset;
    let end = start + tone.duration;
    oscillator.start_with_when(start)?;
    gain.gain().exponential_ramp_to_value_at_time(0.00001, end)?;
    oscillator.stop_with_when(end)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sound_has_audible_tones() {
        use Sound::*;

        for sound in [Flip, Match, Wrong, Win, Lose] {
            let tones = tones(sound);
            assert!(!tones.is_empty());
            assert!(tones.iter().all(|tone| tone.frequency > 0. && tone.duration > 0.));
        }
    }

    #[test]
    fn fanfare_tones_follow_each_other() {
        let offsets: Vec<f64> = tones(Sound::Win).iter().map(|tone| tone.offset).collect();

        assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
