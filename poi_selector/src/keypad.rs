//! Keypad input.
//!
//! The selector only needs key-change events. `AnalogKeypad` decodes the common
//! LCD shield where all five buttons share one analog pin through a resistor ladder.

/// Keys on the LCD keypad. `None` means no key is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyId {
    Select,
    Left,
    Right,
    Up,
    Down,
    None,
}

/// Source of key-change events, polled once per UI tick.
pub trait Keypad {
    /// The new key state if it changed since the last poll. A release reports `KeyId::None`.
    fn key_changed(&mut self) -> Option<KeyId>;
}

/// A 10-bit analog input.
pub trait AnalogSource {
    fn read(&mut self) -> u16;
}

impl<F: FnMut() -> u16> AnalogSource for F {
    fn read(&mut self) -> u16 {
        self()
    }
}

/// Map a raw ladder reading to the key it represents.
pub fn key_for_reading(value: u16) -> KeyId {
    match value {
        v if v > 1000 => KeyId::None,
        v if v < 50 => KeyId::Right,
        v if v < 240 => KeyId::Up,
        v if v < 400 => KeyId::Down,
        v if v < 600 => KeyId::Left,
        v if v < 920 => KeyId::Select,
        _ => KeyId::None,
    }
}

/// Debounced decoder for a resistor-ladder keypad.
///
/// A new key is reported only once it has been read on `debounce_samples`
/// consecutive polls.
pub struct AnalogKeypad<S: AnalogSource> {
    source: S,
    debounce_samples: u8,
    current: KeyId,
    candidate: KeyId,
    stable_count: u8,
}

impl<S: AnalogSource> AnalogKeypad<S> {
    pub fn new(source: S, debounce_samples: u8) -> Self {
        Self {
            source,
            debounce_samples: debounce_samples.max(1),
            current: KeyId::None,
            candidate: KeyId::None,
            stable_count: 0,
        }
    }

    /// The last debounced key state.
    pub fn current_key(&self) -> KeyId {
        self.current
    }
}

impl<S: AnalogSource> Keypad for AnalogKeypad<S> {
    fn key_changed(&mut self) -> Option<KeyId> {
        let key = key_for_reading(self.source.read());

        if key == self.current {
            self.candidate = key;
            self.stable_count = 0;
            return None;
        }

        if key == self.candidate {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.candidate = key;
            self.stable_count = 1;
        }

        if self.stable_count >= self.debounce_samples {
            tracing::trace!("keypad: {:?} -> {:?}", self.current, key);
            self.current = key;
            self.stable_count = 0;
            Some(key)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn scripted(readings: &[u16]) -> impl FnMut() -> u16 {
        let mut queue: VecDeque<u16> = readings.iter().copied().collect();
        move || queue.pop_front().unwrap_or(1023)
    }

    #[test]
    fn ladder_thresholds() {
        assert_eq!(key_for_reading(0), KeyId::Right);
        assert_eq!(key_for_reading(144), KeyId::Up);
        assert_eq!(key_for_reading(329), KeyId::Down);
        assert_eq!(key_for_reading(504), KeyId::Left);
        assert_eq!(key_for_reading(741), KeyId::Select);
        assert_eq!(key_for_reading(950), KeyId::None);
        assert_eq!(key_for_reading(1023), KeyId::None);
    }

    #[test]
    fn reports_press_and_release_once_each() {
        let mut keypad = AnalogKeypad::new(scripted(&[1023, 741, 741, 741, 1023]), 1);
        assert_eq!(keypad.key_changed(), None);
        assert_eq!(keypad.key_changed(), Some(KeyId::Select));
        assert_eq!(keypad.key_changed(), None);
        assert_eq!(keypad.key_changed(), None);
        assert_eq!(keypad.current_key(), KeyId::Select);
        assert_eq!(keypad.key_changed(), Some(KeyId::None));
    }

    #[test]
    fn bounce_shorter_than_window_is_ignored() {
        // Up glitches for one sample, then Down holds for three.
        let mut keypad = AnalogKeypad::new(scripted(&[144, 329, 329, 329, 329]), 3);
        assert_eq!(keypad.key_changed(), None);
        assert_eq!(keypad.key_changed(), None);
        assert_eq!(keypad.key_changed(), None);
        assert_eq!(keypad.key_changed(), Some(KeyId::Down));
        assert_eq!(keypad.key_changed(), None);
    }

    #[test]
    fn zero_debounce_behaves_like_one() {
        let mut keypad = AnalogKeypad::new(scripted(&[504]), 0);
        assert_eq!(keypad.key_changed(), Some(KeyId::Left));
    }
}
