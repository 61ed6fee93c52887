//! The UI polling loop.
//!
//! Each tick polls the keypad through the active page, then redraws the status
//! line if its text changed.

use crate::config::{Config, MountBackend};
use crate::indi_handler::IndiMount;
use crate::model::{ConsoleError, ConsoleResult};
use crate::sim_mount::SimulatedMount;
use crate::terminal::{ConsoleMenu, Page, TerminalKeypad};
use crossterm::{
    cursor::MoveToColumn,
    execute,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use poi_selector::{Catalog, Directions, KeyId, Keypad, Menu, Mount, PoiController};
use std::io::{self, Write};
use std::time::Duration;
use tokio::runtime::Handle;

const HELP_TEXT: &str = "UP/DOWN/LEFT: browse  ENTER: go  RIGHT: next page  q: quit";

/// The mount selected in the config.
pub enum ConsoleMount {
    Simulated(SimulatedMount),
    Indi(IndiMount),
}

impl ConsoleMount {
    pub fn open(backend: &MountBackend, runtime: &Handle) -> ConsoleResult<Self> {
        match backend {
            MountBackend::Simulated {
                slew_rate_deg_per_sec,
            } => Ok(ConsoleMount::Simulated(SimulatedMount::new(
                *slew_rate_deg_per_sec,
            ))),
            MountBackend::Indi { address, device } => Ok(ConsoleMount::Indi(IndiMount::connect(
                runtime,
                address,
                device.as_deref(),
            )?)),
        }
    }

    pub fn status(&self) -> String {
        match self {
            ConsoleMount::Simulated(mount) => mount.status(),
            ConsoleMount::Indi(mount) => mount.status(),
        }
    }

    fn inner(&mut self) -> &mut dyn Mount {
        match self {
            ConsoleMount::Simulated(mount) => mount,
            ConsoleMount::Indi(mount) => mount,
        }
    }
}

impl Mount for ConsoleMount {
    fn stop_slewing(&mut self, directions: Directions) {
        self.inner().stop_slewing(directions)
    }

    fn start_slewing_to_home(&mut self) {
        self.inner().start_slewing_to_home()
    }

    fn park(&mut self) {
        self.inner().park()
    }

    fn start_slewing(&mut self, directions: Directions) {
        self.inner().start_slewing(directions)
    }

    fn set_target_ra(&mut self, hour: u8, minute: u8, second: u8) {
        self.inner().set_target_ra(hour, minute, second)
    }

    fn set_target_dec(&mut self, total_seconds: i32) {
        self.inner().set_target_dec(total_seconds)
    }

    fn start_slewing_to_target(&mut self) {
        self.inner().start_slewing_to_target()
    }

    fn is_slewing_idle(&self) -> bool {
        match self {
            ConsoleMount::Simulated(mount) => mount.is_slewing_idle(),
            ConsoleMount::Indi(mount) => mount.is_slewing_idle(),
        }
    }
}

type ConsoleController = PoiController<TerminalKeypad, ConsoleMount, ConsoleMenu>;

/// Raw mode for the lifetime of the loop, restored even on early return.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> ConsoleResult<Self> {
        terminal::enable_raw_mode().map_err(|e| ConsoleError::TerminalError(e.to_string()))?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        println!();
    }
}

/// Text for the active page, or `None` to keep what is on screen.
fn page_text(controller: &ConsoleController) -> Option<String> {
    match controller.menu().page() {
        Page::Poi => controller.render().map(|label| format!("[POI] {label}")),
        Page::Status => Some(format!("[STATUS] {}", controller.mount().status())),
        Page::Help => Some(format!("[HELP] {HELP_TEXT}")),
    }
}

/// Poll input for one tick. Only the POI page hands keys to the selector;
/// other pages just move on with RIGHT.
fn poll_input(controller: &mut ConsoleController) {
    if controller.menu().page() == Page::Poi {
        if controller.handle_input() {
            controller.keypad_mut().drain_repeats();
        }
        return;
    }

    if let Some(KeyId::Right) = controller.keypad_mut().key_changed() {
        controller.menu_mut().set_next_active();
        controller.keypad_mut().drain_repeats();
    }
}

fn draw(out: &mut impl Write, text: &str) -> ConsoleResult<()> {
    execute!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(text))
        .map_err(|e| ConsoleError::TerminalError(e.to_string()))?;
    out.flush()
        .map_err(|e| ConsoleError::TerminalError(e.to_string()))
}

/// Run the console until the operator quits.
pub fn run(config: &Config, catalog: Catalog, mount: ConsoleMount) -> ConsoleResult<()> {
    let tick = Duration::from_millis(config.tick_ms.max(1));
    let mut controller = PoiController::new(
        catalog,
        TerminalKeypad::new(),
        mount,
        ConsoleMenu::default(),
    );

    let _raw = RawModeGuard::enable()?;
    let mut stdout = io::stdout();
    let mut shown = String::new();
    tracing::info!(
        "console started with {} catalog positions",
        controller.catalog().len()
    );

    loop {
        poll_input(&mut controller);
        if controller.keypad_mut().quit_requested() {
            break;
        }

        if let Some(text) = page_text(&controller) {
            if text != shown {
                draw(&mut stdout, &text)?;
                shown = text;
            }
        }

        std::thread::sleep(tick);
    }

    tracing::info!("console stopped");
    Ok(())
}
