use crate::model::{ConsoleError, ConsoleResult};
use indi::client::active_device::ActiveDevice;
use std::{collections::HashMap, time::Duration};
use tokio::{net::TcpStream, time};

pub mod mount;

pub use mount::IndiMount;

// INDI interface bitmask for telescope mounts
const IF_TELESCOPE: u32 = 0x0001;

const DISCOVERY_ATTEMPTS: u32 = 10;
const DISCOVERY_INTERVAL: Duration = Duration::from_millis(500);

/// Connect to an INDI server
pub async fn connect_to_server(ip_addr: &str) -> ConsoleResult<indi::client::Client> {
    let stream = TcpStream::connect(ip_addr)
        .await
        .map_err(|e| ConsoleError::ServerConnectionError(format!("{ip_addr}: {e:?}")))?;

    indi::client::new(stream, None, None)
        .map_err(|e| ConsoleError::ServerConnectionError(format!("{:?}", e)))
}

/// Name of the first device whose driver advertises the telescope interface,
/// or `preferred` if that device is present.
async fn scan_for_mount(
    client: &indi::client::Client,
    preferred: Option<&str>,
) -> Option<String> {
    let devices = client.get_devices();
    let map = devices.lock().await;

    if let Some(name) = preferred {
        return map.contains_key(name).then(|| name.to_owned());
    }

    for (name, dev_mx) in map.iter() {
        let dev = dev_mx.lock().await;
        let params = dev.get_parameters();

        // DRIVER_INFO.DRIVER_INTERFACE -> capability mask
        let mut iface_mask = 0u32;
        if let Some(driver_info_mx) = params.get("DRIVER_INFO") {
            let driver_info = driver_info_mx.lock().await;
            if let Ok(tv) = driver_info.get_values::<HashMap<String, indi::Text>>() {
                if let Some(iface) = tv.get("DRIVER_INTERFACE") {
                    if let Ok(mask) = iface.value.parse::<u32>() {
                        iface_mask = mask;
                    }
                }
            }
        }

        if (iface_mask & IF_TELESCOPE) != 0 {
            return Some(name.clone());
        }
    }
    None
}

/// Find the mount on the server, connect it and verify it answers.
///
/// Devices are announced asynchronously after the client connects, so the scan
/// is retried for a few seconds before giving up.
pub async fn find_mount(
    client: &indi::client::Client,
    preferred: Option<&str>,
) -> ConsoleResult<ActiveDevice> {
    let mut name = None;
    for _ in 0..DISCOVERY_ATTEMPTS {
        name = scan_for_mount(client, preferred).await;
        if name.is_some() {
            break;
        }
        time::sleep(DISCOVERY_INTERVAL).await;
    }
    let name = name.ok_or_else(|| {
        ConsoleError::ServerError(
            "Mount device not available. Please ensure the mount is connected to the INDI server."
                .to_owned(),
        )
    })?;

    let device = match time::timeout(Duration::from_secs(2), client.get_device::<()>(&name)).await
    {
        Ok(Ok(dev)) => dev,
        _ => {
            return Err(ConsoleError::ServerError(format!(
                "Mount device {name} did not respond"
            )))
        }
    };

    match time::timeout(
        Duration::from_secs(2),
        device.change("CONNECTION", vec![("CONNECT", true)]),
    )
    .await
    {
        Ok(Ok(_)) => {
            tracing::info!("connected to mount {}", name);
            Ok(device)
        }
        Ok(Err(e)) => Err(ConsoleError::ServerError(format!(
            "Mount device {name} refused connection: {:?}",
            e
        ))),
        Err(_) => Err(ConsoleError::ServerError(format!(
            "Mount device {name} timed out while connecting"
        ))),
    }
}
