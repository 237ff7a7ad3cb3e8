//! Synthetic telemetry for running the tracker without a mount attached.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;

/// Format a telemetry line the way the mount sends it.
///
/// `pitch` is the raw wire value, i.e. before the decoder's polarity inversion.
pub fn encode_payload(yaw: f64, pitch: f64, roll: f64) -> String {
    format!("{yaw:.3},{pitch:.3},{roll:.3}")
}

/// Slow azimuth sweep with a sinusoidal elevation nod and a little roll wobble.
pub struct SweepSimulator {
    step: u64,
    /// Yaw advance per step, degrees.
    yaw_rate: f64,
    /// Peak pitch excursion, degrees.
    pitch_amplitude: f64,
}

impl SweepSimulator {
    pub fn new(yaw_rate: f64, pitch_amplitude: f64) -> Self {
        Self {
            step: 0,
            yaw_rate,
            pitch_amplitude,
        }
    }

    /// Raw wire angles `(yaw, pitch, roll)` for the next step.
    pub fn next_angles(&mut self) -> (f64, f64, f64) {
        let t = self.step as f64;
        self.step += 1;

        let yaw = (t * self.yaw_rate) % 360.0;
        let pitch = self.pitch_amplitude * (t * 0.01).sin();
        let roll = 2.0 * (t * 0.05).sin();
        (yaw, pitch, roll)
    }

    /// Next telemetry line.
    pub fn next_payload(&mut self) -> String {
        let (yaw, pitch, roll) = self.next_angles();
        encode_payload(yaw, pitch, roll)
    }
}

impl Default for SweepSimulator {
    fn default() -> Self {
        Self::new(0.25, 40.0)
    }
}

/// Send simulated telemetry to `target` every `period` until `cancel` is set.
pub async fn run_simulator(
    target: SocketAddr,
    period: Duration,
    cancel: Arc<AtomicBool>,
) -> std::io::Result<()> {
    let socket = UdpSocket::bind("127.0.0.1:0").await?;
    let mut sim = SweepSimulator::default();
    let mut interval = tokio::time::interval(period);
    tracing::info!(%target, ?period, "Telemetry simulator started");

    while !cancel.load(Ordering::Relaxed) {
        interval.tick().await;
        let payload = sim.next_payload();
        if let Err(e) = socket.send_to(payload.as_bytes(), target).await {
            tracing::warn!(?e, "Simulator send failed");
        }
    }

    tracing::info!("Telemetry simulator stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode;

    #[test]
    fn encoded_payload_decodes_with_inverted_pitch() {
        let payload = encode_payload(123.5, 10.25, -3.0);
        assert_eq!(payload, "123.500,10.250,-3.000");

        let sample = decode(payload.as_bytes()).unwrap();
        assert_eq!(sample.yaw, 123.5);
        assert_eq!(sample.pitch, -10.25);
        assert_eq!(sample.roll, -3.0);
    }

    #[test]
    fn sweep_stays_within_bounds() {
        let mut sim = SweepSimulator::new(7.0, 30.0);
        for _ in 0..2000 {
            let (yaw, pitch, roll) = sim.next_angles();
            assert!((0.0..360.0).contains(&yaw));
            assert!(pitch.abs() <= 30.0);
            assert!(roll.abs() <= 2.0);
        }
    }

    #[tokio::test]
    async fn simulator_delivers_datagrams_and_stops_on_cancel() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let target = receiver.local_addr().unwrap();
        let cancel = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn(run_simulator(
            target,
            Duration::from_millis(5),
            cancel.clone(),
        ));

        let mut buf = [0u8; 256];
        let (n, _) = tokio::time::timeout(Duration::from_secs(2), receiver.recv_from(&mut buf))
            .await
            .expect("simulator sent nothing")
            .unwrap();
        assert!(decode(&buf[..n]).is_ok());

        cancel.store(true, Ordering::Relaxed);
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("simulator did not stop")
            .unwrap()
            .unwrap();
    }
}
