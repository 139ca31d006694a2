//! Records `TickAnomaly` events so tests can assert on them.
use bevy::ecs::prelude::On;
use bevy::prelude::*;
use shoal::tick::{AnomalyContext, TickAnomaly};

/// Anomalies seen so far, oldest first.
#[derive(Resource, Default, Debug)]
pub struct CapturedAnomalies(pub Vec<(AnomalyContext, String)>);

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must take On<T> by value."
)]
fn record_anomaly(event: On<TickAnomaly>, mut captured: ResMut<CapturedAnomalies>) {
    let anomaly = event.event();
    captured.0.push((anomaly.context, anomaly.detail.clone()));
}

/// Installs the capturing observer and its resource.
pub fn install_anomaly_capture(app: &mut App) {
    app.insert_resource(CapturedAnomalies::default());
    app.world_mut().add_observer(record_anomaly);
}

/// Contexts of every captured anomaly.
pub fn captured_contexts(app: &App) -> Vec<AnomalyContext> {
    app.world()
        .get_resource::<CapturedAnomalies>()
        .map(|c| c.0.iter().map(|(context, _)| *context).collect())
        .unwrap_or_default()
}
