//! Terminal stand-ins for the LCD keypad and the page menu.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use poi_selector::{KeyId, Keypad, Menu};
use std::time::Duration;

/// What a terminal key means to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Key(KeyId),
    Quit,
    Ignored,
}

pub fn map_key(code: KeyCode) -> KeyInput {
    match code {
        KeyCode::Up => KeyInput::Key(KeyId::Up),
        KeyCode::Down => KeyInput::Key(KeyId::Down),
        KeyCode::Left => KeyInput::Key(KeyId::Left),
        KeyCode::Right => KeyInput::Key(KeyId::Right),
        KeyCode::Enter | KeyCode::Char(' ') => KeyInput::Key(KeyId::Select),
        KeyCode::Esc | KeyCode::Char('q') => KeyInput::Quit,
        _ => KeyInput::Ignored,
    }
}

/// Keypad fed by terminal key events.
///
/// Terminals do not report key release, so every press is followed by a
/// synthesized `KeyId::None` on the next poll.
#[derive(Default)]
pub struct TerminalKeypad {
    held: Option<KeyCode>,
    pending: Option<KeyEvent>,
    quit: bool,
}

impl TerminalKeypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    fn next_key_event(&mut self) -> Option<KeyEvent> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => {
                    tracing::warn!("keypad: poll failed: {}", e);
                    return None;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => return Some(key),
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("keypad: read failed: {}", e);
                    return None;
                }
            }
        }
    }

    /// Discard auto-repeat of the key that just acted. Stops at the first different key.
    pub fn drain_repeats(&mut self) {
        let Some(held) = self.held else {
            return;
        };
        while let Some(key) = self.next_key_event() {
            if key.code != held {
                self.pending = Some(key);
                break;
            }
        }
    }
}

impl Keypad for TerminalKeypad {
    fn key_changed(&mut self) -> Option<KeyId> {
        while let Some(key) = self.next_key_event() {
            match map_key(key.code) {
                KeyInput::Key(id) => {
                    self.held = Some(key.code);
                    return Some(id);
                }
                KeyInput::Quit => {
                    self.quit = true;
                    return None;
                }
                KeyInput::Ignored => {}
            }
        }
        self.held.take().map(|_| KeyId::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Poi,
    Status,
    Help,
}

impl Page {
    fn next(self) -> Page {
        match self {
            Page::Poi => Page::Status,
            Page::Status => Page::Help,
            Page::Help => Page::Poi,
        }
    }
}

/// The console's page ring. RIGHT on the POI page moves to the next one.
#[derive(Debug, Default)]
pub struct ConsoleMenu {
    page: Page,
}

impl ConsoleMenu {
    pub fn page(&self) -> Page {
        self.page
    }
}

impl Menu for ConsoleMenu {
    fn set_next_active(&mut self) {
        self.page = self.page.next();
        tracing::debug!("menu: page {:?}", self.page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_enter_map_to_keypad() {
        assert_eq!(map_key(KeyCode::Up), KeyInput::Key(KeyId::Up));
        assert_eq!(map_key(KeyCode::Down), KeyInput::Key(KeyId::Down));
        assert_eq!(map_key(KeyCode::Left), KeyInput::Key(KeyId::Left));
        assert_eq!(map_key(KeyCode::Right), KeyInput::Key(KeyId::Right));
        assert_eq!(map_key(KeyCode::Enter), KeyInput::Key(KeyId::Select));
        assert_eq!(map_key(KeyCode::Char(' ')), KeyInput::Key(KeyId::Select));
    }

    #[test]
    fn quit_and_other_keys() {
        assert_eq!(map_key(KeyCode::Char('q')), KeyInput::Quit);
        assert_eq!(map_key(KeyCode::Esc), KeyInput::Quit);
        assert_eq!(map_key(KeyCode::Char('x')), KeyInput::Ignored);
        assert_eq!(map_key(KeyCode::Tab), KeyInput::Ignored);
    }

    #[test]
    fn menu_cycles_through_pages() {
        let mut menu = ConsoleMenu::default();
        assert_eq!(menu.page(), Page::Poi);
        menu.set_next_active();
        assert_eq!(menu.page(), Page::Status);
        menu.set_next_active();
        assert_eq!(menu.page(), Page::Help);
        menu.set_next_active();
        assert_eq!(menu.page(), Page::Poi);
    }
}
