//! Selection and dispatch.
//!
//! `PoiController` owns the cursor into the catalog, reacts to keypad events and,
//! when an entry is confirmed, turns it into mount commands.

use crate::catalog::{Catalog, Selection};
use crate::keypad::{KeyId, Keypad};
use crate::menu::Menu;
use crate::mount::{Directions, Mount};

/// Wrap `value` into the inclusive range `[low, high]`.
///
/// One step past either end lands on the opposite end.
pub fn wrap(value: isize, low: isize, high: isize) -> isize {
    if value > high {
        low
    } else if value < low {
        high
    } else {
        value
    }
}

pub struct PoiController<K: Keypad, M: Mount, P: Menu> {
    catalog: Catalog,
    selection: Selection,
    keypad: K,
    mount: M,
    menu: P,
}

impl<K: Keypad, M: Mount, P: Menu> PoiController<K, M, P> {
    /// The cursor starts on the first catalog position.
    pub fn new(catalog: Catalog, keypad: K, mount: M, menu: P) -> Self {
        let selection = catalog.selection_at(0);
        Self {
            catalog,
            selection,
            keypad,
            mount,
            menu,
        }
    }

    /// Poll the keypad and act on a key change.
    ///
    /// Returns `true` when an event was consumed, telling the caller to hold off
    /// repeating the action until the key is released.
    pub fn handle_input(&mut self) -> bool {
        let Some(key) = self.keypad.key_changed() else {
            return false;
        };

        match key {
            KeyId::Select => self.confirm(),
            KeyId::Left | KeyId::Down => self.step(1),
            KeyId::Up => self.step(-1),
            KeyId::Right => self.menu.set_next_active(),
            KeyId::None => {}
        }

        true
    }

    /// Label of the entry under the cursor, or `None` while the mount is slewing
    /// so the caller keeps its current screen.
    pub fn render(&self) -> Option<&str> {
        if self.mount.is_slewing_idle() {
            Some(self.catalog.entry(self.selection).label.as_str())
        } else {
            None
        }
    }

    pub fn cursor(&self) -> usize {
        self.catalog.position(self.selection)
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn mount(&self) -> &M {
        &self.mount
    }

    pub fn keypad_mut(&mut self) -> &mut K {
        &mut self.keypad
    }

    pub fn menu(&self) -> &P {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut P {
        &mut self.menu
    }

    fn step(&mut self, delta: isize) {
        let high = self.catalog.park_index() as isize;
        let next = wrap(self.cursor() as isize + delta, 0, high);
        self.selection = self.catalog.selection_at(next as usize);
        tracing::trace!("[POI]: cursor at {}", next);
    }

    /// Dispatch the entry under the cursor. Motion is always stopped first.
    fn confirm(&mut self) {
        self.mount.stop_slewing(Directions::ALL_DIRECTIONS);

        match self.selection {
            Selection::Home => {
                tracing::info!("[POI]: Slewing to home");
                self.mount.start_slewing_to_home();
            }
            Selection::Park => {
                tracing::info!("[POI]: Parking");
                self.mount.park();
            }
            Selection::Unpark => {
                tracing::info!("[POI]: Unparking, resuming tracking");
                self.mount.start_slewing(Directions::TRACKING);
            }
            Selection::Body(_) => {
                let poi = self.catalog.entry(self.selection);
                let ra = poi.right_ascension();
                let dec = poi.declination();
                tracing::info!(
                    "[POI]: Selected {}. RA: {} {} {}",
                    poi.label,
                    poi.ra_hour,
                    poi.ra_minute,
                    poi.ra_second
                );
                tracing::info!(
                    "[POI]: Selected {}. DEC: {} {} {}",
                    poi.label,
                    poi.dec_degree,
                    poi.dec_minute,
                    poi.dec_second
                );
                self.mount.set_target_ra(ra.hour, ra.minute, ra.second);
                self.mount.set_target_dec(dec.total_seconds());
                tracing::debug!(
                    "[POI]: Target RA is {}, target DEC is {} ({}s)",
                    ra,
                    dec,
                    dec.total_seconds()
                );
                self.mount.start_slewing_to_target();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Stop(Directions),
        Home,
        Park,
        Start(Directions),
        TargetRa(u8, u8, u8),
        TargetDec(i32),
        SlewToTarget,
    }

    #[derive(Clone, Default)]
    struct RecordingMount {
        calls: Rc<RefCell<Vec<Call>>>,
        slewing: Rc<RefCell<bool>>,
    }

    impl Mount for RecordingMount {
        fn stop_slewing(&mut self, directions: Directions) {
            self.calls.borrow_mut().push(Call::Stop(directions));
        }
        fn start_slewing_to_home(&mut self) {
            self.calls.borrow_mut().push(Call::Home);
        }
        fn park(&mut self) {
            self.calls.borrow_mut().push(Call::Park);
        }
        fn start_slewing(&mut self, directions: Directions) {
            self.calls.borrow_mut().push(Call::Start(directions));
        }
        fn set_target_ra(&mut self, hour: u8, minute: u8, second: u8) {
            self.calls
                .borrow_mut()
                .push(Call::TargetRa(hour, minute, second));
        }
        fn set_target_dec(&mut self, total_seconds: i32) {
            self.calls.borrow_mut().push(Call::TargetDec(total_seconds));
        }
        fn start_slewing_to_target(&mut self) {
            self.calls.borrow_mut().push(Call::SlewToTarget);
        }
        fn is_slewing_idle(&self) -> bool {
            !*self.slewing.borrow()
        }
    }

    #[derive(Clone, Default)]
    struct ScriptedKeypad {
        keys: Rc<RefCell<VecDeque<KeyId>>>,
    }

    impl ScriptedKeypad {
        fn press(&self, key: KeyId) {
            self.keys.borrow_mut().push_back(key);
        }
    }

    impl Keypad for ScriptedKeypad {
        fn key_changed(&mut self) -> Option<KeyId> {
            self.keys.borrow_mut().pop_front()
        }
    }

    #[derive(Default)]
    struct CountingMenu {
        next_calls: usize,
    }

    impl Menu for CountingMenu {
        fn set_next_active(&mut self) {
            self.next_calls += 1;
        }
    }

    type TestController = PoiController<ScriptedKeypad, RecordingMount, CountingMenu>;

    fn controller_with(catalog: Catalog) -> (TestController, ScriptedKeypad, RecordingMount) {
        let keypad = ScriptedKeypad::default();
        let mount = RecordingMount::default();
        let controller =
            PoiController::new(catalog, keypad.clone(), mount.clone(), CountingMenu::default());
        (controller, keypad, mount)
    }

    fn press(controller: &mut TestController, keypad: &ScriptedKeypad, key: KeyId) -> bool {
        keypad.press(key);
        controller.handle_input()
    }

    fn move_to(controller: &mut TestController, keypad: &ScriptedKeypad, position: usize) {
        while controller.cursor() != position {
            press(controller, keypad, KeyId::Down);
        }
    }

    #[test]
    fn wrap_crosses_each_boundary_once() {
        assert_eq!(wrap(5, 0, 5), 5);
        assert_eq!(wrap(6, 0, 5), 0);
        assert_eq!(wrap(-1, 0, 5), 5);
        assert_eq!(wrap(3, 0, 5), 3);
    }

    #[test]
    fn no_event_means_no_action() {
        let (mut controller, _keypad, mount) = controller_with(Catalog::builtin());
        assert!(!controller.handle_input());
        assert_eq!(controller.cursor(), 0);
        assert!(mount.calls.borrow().is_empty());
    }

    #[test]
    fn left_presses_cycle_back_to_start() {
        let (mut controller, keypad, _mount) = controller_with(Catalog::builtin());
        let park_index = controller.catalog().park_index();

        for start in 0..=park_index {
            move_to(&mut controller, &keypad, start);
            for _ in 0..=park_index {
                assert!(press(&mut controller, &keypad, KeyId::Left));
            }
            assert_eq!(controller.cursor(), start);
        }
    }

    #[test]
    fn cursor_stays_in_range_for_mixed_presses() {
        let (mut controller, keypad, _mount) = controller_with(Catalog::builtin());
        let park_index = controller.catalog().park_index();
        let pattern = [KeyId::Up, KeyId::Up, KeyId::Left, KeyId::Down, KeyId::Up];

        for key in pattern.iter().cycle().take(200) {
            press(&mut controller, &keypad, *key);
            assert!(controller.cursor() <= park_index);
        }
    }

    #[test]
    fn up_from_first_entry_lands_on_park() {
        let (mut controller, keypad, _mount) = controller_with(Catalog::builtin());
        press(&mut controller, &keypad, KeyId::Up);
        assert_eq!(controller.selection(), Selection::Park);
        press(&mut controller, &keypad, KeyId::Down);
        assert_eq!(controller.cursor(), 0);
    }

    #[test]
    fn select_home_stops_then_homes() {
        let (mut controller, keypad, mount) = controller_with(Catalog::builtin());
        let home = controller.catalog().home_index();
        move_to(&mut controller, &keypad, home);

        assert!(press(&mut controller, &keypad, KeyId::Select));
        assert_eq!(
            *mount.calls.borrow(),
            vec![Call::Stop(Directions::ALL_DIRECTIONS), Call::Home]
        );
    }

    #[test]
    fn select_park_and_unpark() {
        let (mut controller, keypad, mount) = controller_with(Catalog::builtin());
        let park = controller.catalog().park_index();
        let unpark = controller.catalog().unpark_index();

        move_to(&mut controller, &keypad, park);
        press(&mut controller, &keypad, KeyId::Select);
        move_to(&mut controller, &keypad, unpark);
        press(&mut controller, &keypad, KeyId::Select);

        assert_eq!(
            *mount.calls.borrow(),
            vec![
                Call::Stop(Directions::ALL_DIRECTIONS),
                Call::Park,
                Call::Stop(Directions::ALL_DIRECTIONS),
                Call::Start(Directions::TRACKING),
            ]
        );
    }

    #[test]
    fn select_southern_object_sends_negative_dec() {
        let (mut controller, keypad, mount) = controller_with(Catalog::builtin());
        // Eagle Nebula, -13°47'52".
        move_to(&mut controller, &keypad, 3);
        press(&mut controller, &keypad, KeyId::Select);

        assert_eq!(
            *mount.calls.borrow(),
            vec![
                Call::Stop(Directions::ALL_DIRECTIONS),
                Call::TargetRa(18, 20, 5),
                Call::TargetDec(-49672),
                Call::SlewToTarget,
            ]
        );
    }

    #[test]
    fn select_polaris_sends_positive_dec() {
        let (mut controller, keypad, mount) = controller_with(Catalog::builtin());
        press(&mut controller, &keypad, KeyId::Select);
        assert!(mount.calls.borrow().contains(&Call::TargetDec(321666)));
    }

    #[test]
    fn zero_degree_entry_is_never_negative() {
        let catalog =
            Catalog::new(vec![CatalogEntry::new(">Equator", (1, 0, 0), (0, 10, 5))]).unwrap();
        let (mut controller, keypad, mount) = controller_with(catalog);
        press(&mut controller, &keypad, KeyId::Select);
        assert!(mount.calls.borrow().contains(&Call::TargetDec(605)));
    }

    #[test]
    fn right_hands_over_to_next_page() {
        let (mut controller, keypad, mount) = controller_with(Catalog::builtin());
        assert!(press(&mut controller, &keypad, KeyId::Right));
        assert_eq!(controller.menu().next_calls, 1);
        assert_eq!(controller.cursor(), 0);
        assert!(mount.calls.borrow().is_empty());
    }

    #[test]
    fn release_event_changes_nothing() {
        let (mut controller, keypad, mount) = controller_with(Catalog::builtin());
        press(&mut controller, &keypad, KeyId::Down);
        assert!(press(&mut controller, &keypad, KeyId::None));
        assert_eq!(controller.cursor(), 1);
        assert!(mount.calls.borrow().is_empty());
        assert_eq!(controller.menu().next_calls, 0);
    }

    #[test]
    fn render_waits_for_idle_mount() {
        let (mut controller, keypad, mount) = controller_with(Catalog::builtin());
        assert_eq!(controller.render(), Some(">Polaris"));

        *mount.slewing.borrow_mut() = true;
        for _ in 0..controller.catalog().len() {
            assert_eq!(controller.render(), None);
            press(&mut controller, &keypad, KeyId::Down);
        }

        *mount.slewing.borrow_mut() = false;
        assert_eq!(controller.render(), Some(">Polaris"));
        assert!(mount.calls.borrow().is_empty());
    }
}
