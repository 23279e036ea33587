pub mod broker;
pub mod publisher;
pub mod subscriber;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, NetworkOptions, Transport};

use crate::config::Config;

pub use broker::{BrokerAddress, BrokerUrlError};
pub use publisher::{CommandPublisher, MqttCommandPublisher};
pub use subscriber::run_event_loop;

/// Telemetry published by the field device.
pub const SENSOR_TOPIC: &str = "coolingSystem/sensores";
/// Commands consumed by the field device.
pub const CONTROL_TOPIC: &str = "coolingSystem/controles";

/// Capacity of the client's outgoing request channel.
const REQUEST_CHANNEL_CAPACITY: usize = 100;

/// Build the MQTT client and its event loop. Nothing touches the network
/// until the event loop is polled.
pub fn connect(config: &Config) -> (AsyncClient, EventLoop) {
    let broker = &config.mqtt_broker;

    let mut options = MqttOptions::new(&config.mqtt_client_id, &broker.host, broker.port);
    options
        .set_keep_alive(config.mqtt_keep_alive())
        .set_clean_session(true);

    if let Some(user) = &config.mqtt_username {
        options.set_credentials(user.clone(), config.mqtt_password.clone().unwrap_or_default());
    }

    if broker.tls {
        options.set_transport(Transport::tls_with_default_config());
    }

    let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

    let mut network = NetworkOptions::new();
    network.set_connection_timeout(config.mqtt_connect_timeout_secs);
    eventloop.set_network_options(network);

    (client, eventloop)
}
