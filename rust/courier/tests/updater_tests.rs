use async_trait::async_trait;
use courier::gateway::IntegrationGateway;
use courier::init_logger;
use courier::sensor::{
    DeviceContext, ManagerProvider, SensorManager, SensorReading, SensorRegistration,
};
use courier::updater::{SensorUpdater, UpdaterConfig};
use courier::{CourierError, Result};
use log::LevelFilter;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, PartialEq)]
enum GatewayCall {
    Register(String),
    Update(Vec<String>),
}

#[derive(Clone, Copy)]
enum UpdateBehavior {
    Accept,
    Reject,
    Fail,
}

struct MockGateway {
    calls: Mutex<Vec<GatewayCall>>,
    update_behavior: UpdateBehavior,
    failing_registrations: HashSet<String>,
}

impl MockGateway {
    fn new(update_behavior: UpdateBehavior) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            update_behavior,
            failing_registrations: HashSet::new(),
        })
    }

    fn with_failing_registration(update_behavior: UpdateBehavior, unique_id: &str) -> Arc<Self> {
        let mut failing_registrations = HashSet::new();
        failing_registrations.insert(unique_id.to_string());
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            update_behavior,
            failing_registrations,
        })
    }

    async fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().await.clone()
    }

    async fn update_count(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| matches!(call, GatewayCall::Update(_)))
            .count()
    }
}

#[async_trait]
impl IntegrationGateway for MockGateway {
    async fn register_sensor(&self, registration: &SensorRegistration) -> Result<bool> {
        self.calls
            .lock()
            .await
            .push(GatewayCall::Register(registration.unique_id.clone()));
        if self.failing_registrations.contains(&registration.unique_id) {
            return Err(CourierError::Gateway("registration refused".to_string()));
        }
        Ok(true)
    }

    async fn update_sensors(&self, readings: &[SensorReading]) -> Result<bool> {
        self.calls.lock().await.push(GatewayCall::Update(
            readings
                .iter()
                .map(|reading| reading.unique_id.clone())
                .collect(),
        ));
        match self.update_behavior {
            UpdateBehavior::Accept => Ok(true),
            UpdateBehavior::Reject => Ok(false),
            UpdateBehavior::Fail => Err(CourierError::Gateway("gateway unreachable".to_string())),
        }
    }
}

#[derive(Clone)]
struct StubManager {
    name: String,
    sensor_ids: Vec<String>,
    fail_reads: bool,
}

impl StubManager {
    fn new(name: &str, sensor_ids: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            sensor_ids: sensor_ids.iter().map(|id| id.to_string()).collect(),
            fail_reads: false,
        }
    }

    fn failing_reads(name: &str, sensor_ids: &[&str]) -> Self {
        Self {
            fail_reads: true,
            ..Self::new(name, sensor_ids)
        }
    }
}

#[async_trait]
impl SensorManager for StubManager {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_sensors(&self, _context: &DeviceContext) -> Result<Vec<SensorReading>> {
        if self.fail_reads {
            return Err(CourierError::Other("sensor backend offline".to_string()));
        }
        Ok(self
            .sensor_ids
            .iter()
            .map(|id| SensorReading {
                unique_id: id.clone(),
                state: serde_json::json!(50),
                sensor_type: "sensor".to_string(),
                icon: "mdi:gauge".to_string(),
                attributes: None,
            })
            .collect())
    }

    async fn get_sensor_registrations(
        &self,
        _context: &DeviceContext,
    ) -> Result<Vec<SensorRegistration>> {
        Ok(self
            .sensor_ids
            .iter()
            .map(|id| SensorRegistration {
                unique_id: id.clone(),
                name: id.clone(),
                sensor_type: "sensor".to_string(),
                device_class: None,
                icon: "mdi:gauge".to_string(),
                unit_of_measurement: None,
            })
            .collect())
    }
}

struct StubProvider {
    managers: Vec<StubManager>,
}

#[async_trait]
impl ManagerProvider for StubProvider {
    async fn get_managers(&self) -> Vec<Box<dyn SensorManager>> {
        self.managers
            .iter()
            .cloned()
            .map(|manager| Box::new(manager) as Box<dyn SensorManager>)
            .collect()
    }
}

fn updater(managers: Vec<StubManager>, gateway: Arc<MockGateway>) -> SensorUpdater {
    SensorUpdater::new(
        Box::new(StubProvider { managers }),
        gateway,
        DeviceContext::new("test_device".to_string(), serde_json::json!({})),
        UpdaterConfig::default(),
    )
}

fn battery_and_wifi() -> Vec<StubManager> {
    vec![
        StubManager::new("battery", &["battery"]),
        StubManager::new("wifi", &["wifi"]),
    ]
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_accepted_update_registers_once() {
    init_logger(LevelFilter::Info);

    let gateway = MockGateway::new(UpdateBehavior::Accept);
    updater(battery_and_wifi(), gateway.clone())
        .update_sensors()
        .await;

    assert_eq!(
        gateway.calls().await,
        vec![
            GatewayCall::Register("battery".to_string()),
            GatewayCall::Register("wifi".to_string()),
            GatewayCall::Update(vec!["battery".to_string(), "wifi".to_string()]),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_rejected_update_triggers_second_registration_pass() {
    let gateway = MockGateway::new(UpdateBehavior::Reject);
    updater(battery_and_wifi(), gateway.clone())
        .update_sensors()
        .await;

    // Same descriptor set and order repeated after the rejected update.
    assert_eq!(
        gateway.calls().await,
        vec![
            GatewayCall::Register("battery".to_string()),
            GatewayCall::Register("wifi".to_string()),
            GatewayCall::Update(vec!["battery".to_string(), "wifi".to_string()]),
            GatewayCall::Register("battery".to_string()),
            GatewayCall::Register("wifi".to_string()),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_gateway_failure_is_swallowed() {
    let gateway = MockGateway::new(UpdateBehavior::Fail);

    // Must not panic or propagate; the transport error only shows in logs.
    updater(battery_and_wifi(), gateway.clone())
        .update_sensors()
        .await;

    assert_eq!(
        gateway.calls().await,
        vec![
            GatewayCall::Register("battery".to_string()),
            GatewayCall::Register("wifi".to_string()),
            GatewayCall::Update(vec!["battery".to_string(), "wifi".to_string()]),
            GatewayCall::Register("battery".to_string()),
            GatewayCall::Register("wifi".to_string()),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_register_failure_does_not_block_remaining() {
    let gateway = MockGateway::with_failing_registration(UpdateBehavior::Accept, "battery");
    updater(battery_and_wifi(), gateway.clone())
        .update_sensors()
        .await;

    assert_eq!(
        gateway.calls().await,
        vec![
            GatewayCall::Register("battery".to_string()),
            GatewayCall::Register("wifi".to_string()),
            GatewayCall::Update(vec!["battery".to_string(), "wifi".to_string()]),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_readings_flattened_in_manager_order() {
    let gateway = MockGateway::new(UpdateBehavior::Accept);
    let managers = vec![
        StubManager::new("power", &["battery_level", "battery_state"]),
        StubManager::new("network", &["wifi_connection"]),
    ];
    updater(managers, gateway.clone()).update_sensors().await;

    let calls = gateway.calls().await;
    assert_eq!(
        calls.last(),
        Some(&GatewayCall::Update(vec![
            "battery_level".to_string(),
            "battery_state".to_string(),
            "wifi_connection".to_string(),
        ]))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_manager_read_failure_skips_update() {
    let gateway = MockGateway::new(UpdateBehavior::Accept);
    let managers = vec![
        StubManager::new("battery", &["battery"]),
        StubManager::failing_reads("flaky", &["flaky"]),
    ];
    updater(managers, gateway.clone()).update_sensors().await;

    // No update reaches the gateway, but the recovery pass still runs.
    assert_eq!(
        gateway.calls().await,
        vec![
            GatewayCall::Register("battery".to_string()),
            GatewayCall::Register("flaky".to_string()),
            GatewayCall::Register("battery".to_string()),
            GatewayCall::Register("flaky".to_string()),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_run_cycles_on_manual_refresh() {
    init_logger(LevelFilter::Info);

    let gateway = MockGateway::new(UpdateBehavior::Accept);
    // Interval far in the future so only the refresh handle drives cycles.
    let updater = Arc::new(SensorUpdater::new(
        Box::new(StubProvider {
            managers: battery_and_wifi(),
        }),
        gateway.clone(),
        DeviceContext::new("test_device".to_string(), serde_json::json!({})),
        UpdaterConfig {
            update_interval: Duration::from_secs(3600),
        },
    ));

    let refresh = updater.refresh_handle();
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    let updater_clone = updater.clone();
    let handle = tokio::spawn(async move {
        updater_clone.run(cancel_clone).await.unwrap();
    });

    refresh.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    refresh.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(gateway.update_count().await, 2);
}
