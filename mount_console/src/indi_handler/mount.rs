use super::{connect_to_server, find_mount};
use crate::model::{ConsoleError, ConsoleResult};
use futures::StreamExt;
use indi::client::active_device::ActiveDevice;
use poi_selector::{Declination, Directions, Mount, RightAscension};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    runtime::Handle,
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    time,
};

/// How long to wait for the server to acknowledge a property change.
const CHANGE_TIMEOUT: Duration = Duration::from_secs(2);

/// A command queued for the INDI worker.
#[derive(Debug, Clone, PartialEq)]
pub enum MountCommand {
    Stop(Directions),
    Start(Directions),
    Home,
    Park,
    Goto { ra_hours: f64, dec_deg: f64 },
}

impl MountCommand {
    /// Commands after which the mount reports busy until it arrives.
    fn starts_motion(&self) -> bool {
        matches!(
            self,
            MountCommand::Home | MountCommand::Park | MountCommand::Goto { .. }
        )
    }
}

/// A single INDI property change.
#[derive(Debug, Clone, PartialEq)]
pub enum IndiRequest {
    Switch {
        property: &'static str,
        element: &'static str,
        value: bool,
    },
    Number {
        property: &'static str,
        values: Vec<(&'static str, f64)>,
    },
}

fn switch(property: &'static str, element: &'static str, value: bool) -> IndiRequest {
    IndiRequest::Switch {
        property,
        element,
        value,
    }
}

const AXIS_SWITCHES: [(Directions, &str, &str); 4] = [
    (Directions::NORTH, "TELESCOPE_MOTION_NS", "MOTION_NORTH"),
    (Directions::SOUTH, "TELESCOPE_MOTION_NS", "MOTION_SOUTH"),
    (Directions::WEST, "TELESCOPE_MOTION_WE", "MOTION_WEST"),
    (Directions::EAST, "TELESCOPE_MOTION_WE", "MOTION_EAST"),
];

/// Translate a mount command into the standard INDI telescope properties.
pub fn indi_requests(command: &MountCommand) -> Vec<IndiRequest> {
    match command {
        MountCommand::Stop(directions) => {
            let mut requests: Vec<IndiRequest> = AXIS_SWITCHES
                .iter()
                .filter(|(dir, _, _)| directions.contains(*dir))
                .map(|&(_, property, element)| switch(property, element, false))
                .collect();
            if directions.contains(Directions::ALL_DIRECTIONS) {
                requests.push(switch("TELESCOPE_ABORT_MOTION", "ABORT", true));
            }
            if directions.contains(Directions::TRACKING) {
                requests.push(switch("TELESCOPE_TRACK_STATE", "TRACK_OFF", true));
            }
            requests
        }
        MountCommand::Start(directions) => {
            let mut requests: Vec<IndiRequest> = AXIS_SWITCHES
                .iter()
                .filter(|(dir, _, _)| directions.contains(*dir))
                .map(|&(_, property, element)| switch(property, element, true))
                .collect();
            if directions.contains(Directions::TRACKING) {
                requests.push(switch("TELESCOPE_PARK", "UNPARK", true));
                requests.push(switch("TELESCOPE_TRACK_STATE", "TRACK_ON", true));
            }
            requests
        }
        MountCommand::Home => vec![switch("TELESCOPE_HOME", "GO", true)],
        MountCommand::Park => vec![switch("TELESCOPE_PARK", "PARK", true)],
        MountCommand::Goto { ra_hours, dec_deg } => vec![
            switch("ON_COORD_SET", "TRACK", true),
            IndiRequest::Number {
                property: "EQUATORIAL_EOD_COORD",
                values: vec![("RA", *ra_hours), ("DEC", *dec_deg)],
            },
        ],
    }
}

async fn send_request(device: &ActiveDevice, request: &IndiRequest) -> ConsoleResult<()> {
    let (property, outcome) = match request {
        IndiRequest::Switch {
            property,
            element,
            value,
        } => (
            *property,
            time::timeout(
                CHANGE_TIMEOUT,
                device.change(property, vec![(*element, *value)]),
            )
            .await
            .map(|result| result.map(|_| ()).map_err(|e| format!("{:?}", e))),
        ),
        IndiRequest::Number { property, values } => (
            *property,
            time::timeout(CHANGE_TIMEOUT, device.change(property, values.clone()))
                .await
                .map(|result| result.map(|_| ()).map_err(|e| format!("{:?}", e))),
        ),
    };

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ConsoleError::ServerError(format!("{property}: {e}"))),
        Err(_) => {
            // Long motions stay Busy past the timeout; the watcher tracks completion.
            tracing::debug!("{} still busy after {:?}", property, CHANGE_TIMEOUT);
            Ok(())
        }
    }
}

/// Slew state shared by the worker, the watcher and the mount handle.
///
/// Only a running watcher can clear `busy`, so motion is flagged only while one is.
#[derive(Debug)]
struct MotionState {
    busy: AtomicBool,
    watched: AtomicBool,
}

impl MotionState {
    fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            watched: AtomicBool::new(true),
        }
    }

    fn begin_motion(&self) {
        self.busy.store(true, Ordering::SeqCst);
        // The watcher may have stopped between the store and here.
        if !self.watched.load(Ordering::SeqCst) {
            self.busy.store(false, Ordering::SeqCst);
        }
    }

    fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    fn watcher_stopped(&self) {
        self.watched.store(false, Ordering::SeqCst);
        self.busy.store(false, Ordering::SeqCst);
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

/// Executes queued commands in order so a stop always lands before the next slew.
async fn run_worker(
    device: ActiveDevice,
    mut commands: UnboundedReceiver<MountCommand>,
    motion: Arc<MotionState>,
) {
    while let Some(command) = commands.recv().await {
        tracing::debug!("indi mount: {:?}", command);
        if command.starts_motion() {
            motion.begin_motion();
        }
        for request in indi_requests(&command) {
            if let Err(e) = send_request(&device, &request).await {
                tracing::warn!("indi mount: {}", e);
            }
        }
    }
}

/// Mirror the coordinate property state into the busy flag until the stream ends.
async fn watch_motion(device: ActiveDevice, motion: Arc<MotionState>) {
    follow_coordinates(&device, &motion).await;
    motion.watcher_stopped();
}

async fn follow_coordinates(device: &ActiveDevice, motion: &MotionState) {
    let param_notify = match device.get_parameter("EQUATORIAL_EOD_COORD").await {
        Ok(p) => p,
        Err(_) => match device.get_parameter("EQUATORIAL_COORD").await {
            Ok(p) => p,
            Err(_) => {
                tracing::warn!("indi mount: no coordinate property, busy state unavailable");
                return;
            }
        },
    };

    let mut changes = param_notify.subscribe().await;
    loop {
        match changes.next().await {
            Some(Ok(param_arc)) => {
                let slewing = matches!(param_arc.get_state(), indi::PropertyState::Busy);
                motion.set_busy(slewing);
            }
            Some(Err(_)) | None => break,
        }
    }
    tracing::warn!("indi mount: coordinate stream ended");
}

/// Mount driven through an INDI server.
///
/// Commands are queued to a worker task on the tokio runtime and return
/// immediately.
pub struct IndiMount {
    commands: UnboundedSender<MountCommand>,
    motion: Arc<MotionState>,
    target_ra: RightAscension,
    target_dec: Declination,
}

impl IndiMount {
    /// Connect to `address`, find the mount and start the worker tasks on `runtime`.
    pub fn connect(runtime: &Handle, address: &str, device: Option<&str>) -> ConsoleResult<Self> {
        let (client, device) = runtime.block_on(async {
            let client = connect_to_server(address).await?;
            let device = find_mount(&client, device).await?;
            Ok::<_, ConsoleError>((client, device))
        })?;

        let (tx, rx) = unbounded_channel();
        let motion = Arc::new(MotionState::new());

        runtime.spawn(watch_motion(device.clone(), motion.clone()));
        let worker_motion = motion.clone();
        runtime.spawn(async move {
            // The client owns the connection; keep it alive with the worker.
            let _client = client;
            run_worker(device, rx, worker_motion).await;
        });

        Ok(Self {
            commands: tx,
            motion,
            target_ra: RightAscension::new(0, 0, 0),
            target_dec: Declination::from_seconds(0),
        })
    }

    fn send(&self, command: MountCommand) {
        if self.commands.send(command).is_err() {
            tracing::error!("indi mount: worker stopped, command dropped");
        }
    }

    pub fn status(&self) -> String {
        if self.is_slewing_idle() {
            "INDI mount idle".to_owned()
        } else {
            "INDI mount slewing".to_owned()
        }
    }
}

impl Mount for IndiMount {
    fn stop_slewing(&mut self, directions: Directions) {
        self.send(MountCommand::Stop(directions));
    }

    fn start_slewing_to_home(&mut self) {
        self.send(MountCommand::Home);
    }

    fn park(&mut self) {
        self.send(MountCommand::Park);
    }

    fn start_slewing(&mut self, directions: Directions) {
        self.send(MountCommand::Start(directions));
    }

    fn set_target_ra(&mut self, hour: u8, minute: u8, second: u8) {
        self.target_ra = RightAscension::new(hour, minute, second);
    }

    fn set_target_dec(&mut self, total_seconds: i32) {
        self.target_dec = Declination::from_seconds(total_seconds);
    }

    fn start_slewing_to_target(&mut self) {
        self.send(MountCommand::Goto {
            ra_hours: self.target_ra.to_hours(),
            dec_deg: self.target_dec.to_degrees(),
        });
    }

    fn is_slewing_idle(&self) -> bool {
        !self.motion.is_busy()
    }
}
